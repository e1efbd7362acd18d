use eframe::egui::{self, Color32, CornerRadius, FontId, Frame, Margin, Stroke, TextStyle};

/// Dark gaming palette: near-black surfaces with an indigo accent.
#[derive(Debug, Clone)]
pub struct Theme {
    pub surface_0: Color32,
    pub surface_1: Color32,
    pub surface_2: Color32,
    pub surface_3: Color32,
    pub accent_primary: Color32,
    pub accent_muted: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub danger: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub border_subtle: Color32,
    pub tier_top: Color32,
    pub tier_second: Color32,
    pub tier_rest: Color32,
    pub chart_palette: [Color32; 5],
    pub spacing_8: f32,
    pub spacing_12: f32,
    pub spacing_16: f32,
    pub radius_10: u8,
    pub radius_12: u8,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            surface_0: Color32::from_rgb(0x0A, 0x0A, 0x0C),
            surface_1: Color32::from_rgb(0x0F, 0x17, 0x2A),
            surface_2: Color32::from_rgb(0x1E, 0x29, 0x3B),
            surface_3: Color32::from_rgb(0x2A, 0x36, 0x4A),
            accent_primary: Color32::from_rgb(0x81, 0x8C, 0xF8),
            accent_muted: Color32::from_rgb(0x63, 0x66, 0xF1),
            success: Color32::from_rgb(0x34, 0xD3, 0x99),
            warning: Color32::from_rgb(0xFB, 0x92, 0x3C),
            danger: Color32::from_rgb(0xF4, 0x3F, 0x5E),
            text_primary: Color32::from_rgb(0xF8, 0xFA, 0xFC),
            text_muted: Color32::from_rgb(0x94, 0xA3, 0xB8),
            border_subtle: Color32::from_rgba_premultiplied(255, 255, 255, 13),
            tier_top: Color32::from_rgb(0xFB, 0x71, 0x85),
            tier_second: Color32::from_rgb(0xFB, 0x92, 0x3C),
            tier_rest: Color32::from_rgb(0x81, 0x8C, 0xF8),
            chart_palette: [
                Color32::from_rgb(0x63, 0x66, 0xF1),
                Color32::from_rgb(0x8B, 0x5C, 0xF6),
                Color32::from_rgb(0xA8, 0x55, 0xF7),
                Color32::from_rgb(0xD9, 0x46, 0xEF),
                Color32::from_rgb(0xEC, 0x48, 0x99),
            ],
            spacing_8: 8.0,
            spacing_12: 12.0,
            spacing_16: 16.0,
            radius_10: 10,
            radius_12: 12,
        }
    }
}

impl Theme {
    pub fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = self.surface_0;
        visuals.override_text_color = Some(self.text_primary);
        visuals.widgets.noninteractive.fg_stroke.color = self.text_primary;
        visuals.widgets.noninteractive.bg_fill = self.surface_2;
        visuals.widgets.noninteractive.weak_bg_fill = self.surface_2;
        visuals.widgets.noninteractive.bg_stroke = Stroke::NONE;
        visuals.widgets.inactive.bg_fill = self.surface_2;
        visuals.widgets.inactive.fg_stroke.color = self.text_primary;
        visuals.widgets.inactive.bg_stroke = Stroke::NONE;
        visuals.widgets.hovered.bg_fill = self.surface_3;
        visuals.widgets.hovered.bg_stroke = Stroke::NONE;
        visuals.widgets.hovered.fg_stroke.color = self.text_primary;
        visuals.widgets.active.bg_fill = self.accent_muted;
        visuals.widgets.active.bg_stroke = Stroke::NONE;
        visuals.widgets.active.fg_stroke.color = self.text_primary;
        visuals.widgets.open.bg_fill = self.surface_3;
        visuals.widgets.open.bg_stroke = Stroke::NONE;
        visuals.selection.bg_fill = self.accent_muted;
        visuals.hyperlink_color = self.accent_primary;
        visuals.window_fill = self.surface_1;
        visuals.window_stroke = Stroke::NONE;
        visuals.window_corner_radius = CornerRadius::same(self.radius_10);

        let mut style = (*ctx.style()).clone();
        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(10.0, 10.0);
        style.spacing.button_padding = egui::vec2(12.0, 8.0);
        style.text_styles.insert(TextStyle::Heading, FontId::proportional(18.0));
        style.text_styles.insert(TextStyle::Body, FontId::proportional(14.0));
        style.text_styles.insert(TextStyle::Monospace, FontId::monospace(13.0));
        style.text_styles.insert(TextStyle::Small, FontId::proportional(12.0));
        ctx.set_style(style);
    }

    pub fn panel_frame(&self, fill: Color32, inner_padding: i8) -> Frame {
        Frame::new()
            .fill(fill)
            .inner_margin(Margin::same(inner_padding))
            .corner_radius(CornerRadius::same(self.radius_12))
            .stroke(Stroke::new(1.0, self.border_subtle))
    }

    pub fn card_frame(&self) -> Frame {
        self.panel_frame(self.surface_1, self.spacing_12 as i8)
    }

    pub fn tier_color(&self, rank: &str) -> Color32 {
        match rank.trim() {
            "S" => self.tier_top,
            "A" => self.tier_second,
            _ => self.tier_rest,
        }
    }

    pub fn chart_color(&self, index: usize) -> Color32 {
        self.chart_palette[index % self.chart_palette.len()]
    }
}
