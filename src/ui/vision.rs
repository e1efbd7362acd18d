use crate::event::AppEvent;
use crate::gemini::{Gateway, GatewayError, RequestHandle};
use crate::theme::Theme;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use eframe::egui::{self, ColorImage, RichText, ScrollArea, TextureHandle, TextureOptions};

const ANALYZE_PROMPT: &str = "Analyze this game screen. Identify puzzles, enemies, or item \
recommendations based on the current state. Provide specific advice.";
const EMPTY_REPLY_FALLBACK: &str = "No analysis available.";
const FAILURE_MESSAGE: &str = "Failed to analyze image. Ensure it's a valid game screenshot.";

/// A selected screenshot: the encoded form sent over the wire plus the
/// decoded texture shown in the capture pane.
pub struct Capture {
    pub data_url: String,
    texture: TextureHandle,
}

/// Result of decoding user-selected file bytes, kept separate from the
/// texture upload so the decode path stays testable without a GPU surface.
pub struct DecodedCapture {
    pub data_url: String,
    pub size: [usize; 2],
    pub rgba: Vec<u8>,
}

pub fn decode_capture(bytes: &[u8]) -> Result<DecodedCapture, GatewayError> {
    let format = image::guess_format(bytes)
        .map_err(|err| GatewayError::InvalidImage(format!("unrecognized image format: {err}")))?;
    let decoded = image::load_from_memory(bytes)
        .map_err(|err| GatewayError::InvalidImage(format!("image failed to decode: {err}")))?;

    let data_url = format!("data:{};base64,{}", format.to_mime_type(), BASE64.encode(bytes));
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(DecodedCapture {
        data_url,
        size,
        rgba: rgba.into_raw(),
    })
}

/// Screenshot-analysis view. Selecting a new image always clears any prior
/// analysis text so a stale report is never shown against a new capture.
pub struct VisionView {
    capture: Option<Capture>,
    paragraphs: Option<Vec<String>>,
    notice: Option<String>,
    loading: bool,
    seq: u64,
    inflight: Option<RequestHandle>,
}

impl VisionView {
    pub fn new() -> Self {
        Self {
            capture: None,
            paragraphs: None,
            notice: None,
            loading: false,
            seq: 0,
            inflight: None,
        }
    }

    pub fn mount(&mut self) {}

    pub fn unmount(&mut self) {
        if let Some(handle) = self.inflight.take() {
            handle.abort();
        }
        self.seq += 1;
        self.capture = None;
        self.paragraphs = None;
        self.notice = None;
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[cfg(test)]
    pub fn paragraphs(&self) -> Option<&[String]> {
        self.paragraphs.as_deref()
    }

    pub fn select_image(&mut self, ctx: &egui::Context, bytes: &[u8]) {
        match decode_capture(bytes) {
            Ok(decoded) => {
                if let Some(handle) = self.inflight.take() {
                    handle.abort();
                }
                self.seq += 1;
                self.loading = false;
                let color_image =
                    ColorImage::from_rgba_unmultiplied(decoded.size, &decoded.rgba);
                let texture =
                    ctx.load_texture("vision_capture", color_image, TextureOptions::LINEAR);
                self.capture = Some(Capture {
                    data_url: decoded.data_url,
                    texture,
                });
                self.paragraphs = None;
                self.notice = None;
            }
            Err(err) => {
                tracing::warn!(%err, "rejected selected image");
                self.notice = Some("That file doesn't look like an image. Pick a screenshot in PNG, JPEG, GIF or WebP format.".to_string());
            }
        }
    }

    pub fn analyze(&mut self, gateway: &dyn Gateway) {
        let Some(capture) = &self.capture else {
            return;
        };
        if self.loading {
            return;
        }
        self.loading = true;
        self.seq += 1;
        self.inflight = Some(gateway.request_vision(
            self.seq,
            capture.data_url.clone(),
            ANALYZE_PROMPT.to_string(),
        ));
    }

    pub fn handle_event(&mut self, event: &AppEvent) {
        match event {
            AppEvent::VisionReady { seq, text } if *seq == self.seq && self.loading => {
                let text = if text.trim().is_empty() {
                    EMPTY_REPLY_FALLBACK.to_string()
                } else {
                    text.clone()
                };
                self.paragraphs = Some(text.lines().map(str::to_string).collect());
                self.loading = false;
                self.inflight = None;
            }
            AppEvent::VisionFailed { seq, .. } if *seq == self.seq && self.loading => {
                self.paragraphs = Some(vec![FAILURE_MESSAGE.to_string()]);
                self.loading = false;
                self.inflight = None;
            }
            _ => {}
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, theme: &Theme, gateway: &dyn Gateway) {
        let pane_width = (ui.available_width() - theme.spacing_16) / 2.0;
        ui.horizontal_top(|ui| {
            ui.vertical(|ui| {
                ui.set_width(pane_width);
                self.capture_pane(ui, theme, gateway);
            });
            ui.vertical(|ui| {
                ui.set_width(pane_width);
                self.report_pane(ui, theme);
            });
        });
    }

    fn capture_pane(&mut self, ui: &mut egui::Ui, theme: &Theme, gateway: &dyn Gateway) {
        theme.card_frame().show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Vision Core");
                if ui.button("Upload Capture").clicked() {
                    self.pick_image(ui.ctx());
                }
            });

            if let Some(notice) = &self.notice {
                ui.label(RichText::new(notice).color(theme.warning));
            }

            match &self.capture {
                Some(capture) => {
                    let max = egui::vec2(ui.available_width(), 320.0);
                    ui.add(egui::Image::new(&capture.texture).max_size(max));
                }
                None => {
                    ui.add_space(40.0);
                    ui.vertical_centered(|ui| {
                        ui.label(
                            RichText::new(
                                "Select a screenshot of a puzzle, boss fight, or UI \
                                 for instant AI assistance.",
                            )
                            .color(theme.text_muted),
                        );
                    });
                    ui.add_space(40.0);
                }
            }

            let label = if self.loading {
                "Decrypting Visuals..."
            } else {
                "Run AI Analysis"
            };
            let enabled = self.capture.is_some() && !self.loading;
            if ui
                .add_enabled(enabled, egui::Button::new(label))
                .clicked()
            {
                self.analyze(gateway);
            }

            ui.label(
                RichText::new(
                    "Tip: screenshots of skill trees, minimaps, or complex puzzles work best.",
                )
                .small()
                .color(theme.text_muted),
            );
        });
    }

    fn report_pane(&self, ui: &mut egui::Ui, theme: &Theme) {
        theme.card_frame().show(ui, |ui| {
            ui.heading("Intelligence Report");
            match &self.paragraphs {
                Some(paragraphs) => {
                    ScrollArea::vertical()
                        .id_salt("vision_report")
                        .auto_shrink([false, true])
                        .show(ui, |ui| {
                            for paragraph in paragraphs {
                                if !paragraph.trim().is_empty() {
                                    ui.label(paragraph);
                                    ui.add_space(theme.spacing_8);
                                }
                            }
                        });
                }
                None => {
                    ui.add_space(40.0);
                    ui.vertical_centered(|ui| {
                        if self.loading {
                            ui.add(egui::Spinner::new().size(32.0));
                            ui.label(
                                RichText::new("Processing neural pathways...")
                                    .italics()
                                    .color(theme.text_muted),
                            );
                        } else {
                            ui.label(
                                RichText::new("Awaiting input data").color(theme.text_muted),
                            );
                        }
                    });
                    ui.add_space(40.0);
                }
            }
        });
    }

    fn pick_image(&mut self, ctx: &egui::Context) {
        let picked = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp"])
            .pick_file();
        if let Some(path) = picked {
            match std::fs::read(&path) {
                Ok(bytes) => self.select_image(ctx, &bytes),
                Err(err) => {
                    tracing::warn!(%err, path = %path.display(), "failed to read selected file");
                    self.notice = Some("Couldn't read that file.".to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::testing::{RecordedCall, RecordingGateway};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 40, 40, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("png encode");
        bytes
    }

    fn view_with_capture(ctx: &egui::Context) -> VisionView {
        let mut view = VisionView::new();
        view.mount();
        view.select_image(ctx, &png_bytes());
        assert!(view.capture.is_some());
        view
    }

    #[test]
    fn decode_capture_builds_a_png_data_url() {
        let decoded = decode_capture(&png_bytes()).expect("valid png");
        assert!(decoded.data_url.starts_with("data:image/png;base64,"));
        assert_eq!(decoded.size, [2, 2]);
        assert_eq!(decoded.rgba.len(), 2 * 2 * 4);
    }

    #[test]
    fn decode_capture_rejects_non_image_bytes() {
        assert!(matches!(
            decode_capture(b"definitely not an image"),
            Err(GatewayError::InvalidImage(_))
        ));
    }

    #[test]
    fn selecting_a_new_image_clears_prior_analysis() {
        let ctx = egui::Context::default();
        let mut view = view_with_capture(&ctx);
        view.paragraphs = Some(vec!["old report".to_string()]);

        view.select_image(&ctx, &png_bytes());
        assert!(view.paragraphs().is_none());
    }

    #[test]
    fn selecting_a_new_image_invalidates_an_in_flight_analysis() {
        let ctx = egui::Context::default();
        let gateway = RecordingGateway::default();
        let mut view = view_with_capture(&ctx);
        view.analyze(&gateway);
        let stale_seq = view.seq;

        view.select_image(&ctx, &png_bytes());
        assert!(!view.is_loading());

        view.handle_event(&AppEvent::VisionReady {
            seq: stale_seq,
            text: "report for the previous screenshot".to_string(),
        });
        assert!(view.paragraphs().is_none());

        // The replaced capture can still be analyzed under a fresh sequence.
        view.analyze(&gateway);
        assert_eq!(gateway.call_count(), 2);
        assert!(view.is_loading());
    }

    #[test]
    fn analyze_without_an_image_is_a_no_op() {
        let gateway = RecordingGateway::default();
        let mut view = VisionView::new();
        view.analyze(&gateway);

        assert_eq!(gateway.call_count(), 0);
        assert!(!view.is_loading());
    }

    #[test]
    fn analyze_while_in_flight_is_a_no_op() {
        let ctx = egui::Context::default();
        let gateway = RecordingGateway::default();
        let mut view = view_with_capture(&ctx);
        view.analyze(&gateway);
        view.analyze(&gateway);

        assert_eq!(gateway.call_count(), 1);
    }

    #[test]
    fn analyze_sends_the_stored_data_url_and_fixed_prompt() {
        let ctx = egui::Context::default();
        let gateway = RecordingGateway::default();
        let mut view = view_with_capture(&ctx);
        view.analyze(&gateway);

        let calls = gateway.calls.borrow();
        match &calls[0] {
            RecordedCall::Vision {
                image_data, prompt, ..
            } => {
                assert!(image_data.starts_with("data:image/png;base64,"));
                assert_eq!(prompt, ANALYZE_PROMPT);
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[test]
    fn reply_is_split_into_paragraphs() {
        let ctx = egui::Context::default();
        let gateway = RecordingGateway::default();
        let mut view = view_with_capture(&ctx);
        view.analyze(&gateway);
        view.handle_event(&AppEvent::VisionReady {
            seq: view.seq,
            text: "First insight.\nSecond insight.".to_string(),
        });

        assert_eq!(
            view.paragraphs().expect("report stored"),
            ["First insight.", "Second insight."]
        );
        assert!(!view.is_loading());
    }

    #[test]
    fn empty_reply_uses_fallback_copy() {
        let ctx = egui::Context::default();
        let gateway = RecordingGateway::default();
        let mut view = view_with_capture(&ctx);
        view.analyze(&gateway);
        view.handle_event(&AppEvent::VisionReady {
            seq: view.seq,
            text: " ".to_string(),
        });

        assert_eq!(
            view.paragraphs().expect("report stored"),
            [EMPTY_REPLY_FALLBACK]
        );
    }

    #[test]
    fn failure_shows_the_fixed_error_message() {
        let ctx = egui::Context::default();
        let gateway = RecordingGateway::default();
        let mut view = view_with_capture(&ctx);
        view.analyze(&gateway);
        view.handle_event(&AppEvent::VisionFailed {
            seq: view.seq,
            error: "HTTP 500".to_string(),
        });

        assert_eq!(view.paragraphs().expect("report stored"), [FAILURE_MESSAGE]);
        assert!(!view.is_loading());
    }

    #[test]
    fn stale_result_after_unmount_is_dropped() {
        let ctx = egui::Context::default();
        let gateway = RecordingGateway::default();
        let mut view = view_with_capture(&ctx);
        view.analyze(&gateway);
        let stale = AppEvent::VisionReady {
            seq: view.seq,
            text: "late report".to_string(),
        };

        view.unmount();
        view.handle_event(&stale);
        assert!(view.paragraphs().is_none());
    }
}
