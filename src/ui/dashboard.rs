use crate::model::View;
use crate::theme::Theme;
use eframe::egui::{self, ProgressBar, RichText, ScrollArea};

const STATS: [(&str, &str); 4] = [
    ("Problem Solving", "98.4%"),
    ("Strategy Precision", "A+"),
    ("Live Meta Nodes", "256"),
    ("Tournament Wins", "12"),
];

const TACTICS: [(&str, &str); 3] = [
    ("Shadow of the Erdtree Boss Guides", "Action RPG"),
    ("Valorant 8.11 Duelist Meta", "Competitive"),
    ("Cyberpunk 2077 Best Netrunner Builds", "Open World"),
];

const TRENDS: [(&str, &str, f32); 4] = [
    ("League of Legends", "+12%", 0.7),
    ("Chess.com Masters", "+45%", 0.85),
    ("Dota 2", "-3%", 0.4),
    ("CS2 Premier", "+22%", 0.6),
];

/// Static landing view. Returns the view a shortcut button navigates to.
pub fn ui(ui: &mut egui::Ui, theme: &Theme) -> Option<View> {
    let mut navigate = None;

    ScrollArea::vertical()
        .id_salt("dashboard")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.heading("System Dashboard");
            ui.label(
                RichText::new("Operational status: All intelligence nodes active.")
                    .color(theme.text_muted),
            );
            ui.add_space(theme.spacing_12);

            ui.horizontal_wrapped(|ui| {
                for (label, value) in STATS {
                    theme.card_frame().show(ui, |ui| {
                        ui.set_width(150.0);
                        ui.strong(value);
                        ui.label(RichText::new(label).small().color(theme.text_muted));
                    });
                }
            });
            ui.add_space(theme.spacing_12);

            theme.card_frame().show(ui, |ui| {
                ui.heading("Master Your Gameplay");
                ui.label(
                    RichText::new(
                        "Experience the next generation of gaming assistance. LevelUp AI \
                         analyzes complex game states and provides frame-perfect tactical \
                         advice.",
                    )
                    .color(theme.text_muted),
                );
                if ui.button("Start Session").clicked() {
                    navigate = Some(View::Chat);
                }
            });
            ui.add_space(theme.spacing_12);

            theme.card_frame().show(ui, |ui| {
                ui.strong("Recommended Tactics");
                for (title, tag) in TACTICS {
                    ui.horizontal(|ui| {
                        ui.label(title);
                        ui.label(
                            RichText::new(tag.to_uppercase())
                                .small()
                                .color(theme.accent_primary),
                        );
                    });
                }
            });
            ui.add_space(theme.spacing_12);

            theme.card_frame().show(ui, |ui| {
                ui.strong("Recent Meta Trends");
                for (game, trend, share) in TRENDS {
                    ui.horizontal(|ui| {
                        ui.label(game);
                        let color = if trend.starts_with('+') {
                            theme.success
                        } else {
                            theme.danger
                        };
                        ui.label(RichText::new(trend).color(color));
                    });
                    ui.add(ProgressBar::new(share).desired_height(6.0));
                }
                if ui.button("View Full Report").clicked() {
                    navigate = Some(View::Strategy);
                }
            });
        });

    navigate
}
