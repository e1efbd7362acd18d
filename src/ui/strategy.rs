use crate::event::AppEvent;
use crate::gemini::{Gateway, RequestHandle};
use crate::model::MetaData;
use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};
use egui_plot::{Bar, BarChart, Plot};

const DEFAULT_QUERY: &str = "Elden Ring";
const FAILURE_MESSAGE: &str =
    "Meta analysis failed. Competitive data nodes are unreachable right now — try again.";

/// Meta-analytics view. Holds the query string and the latest meta snapshot;
/// each successful query replaces the snapshot wholesale. Failures surface as
/// a visible banner instead of silently retaining stale data.
pub struct StrategyView {
    query: String,
    data: Option<MetaData>,
    error: Option<String>,
    loading: bool,
    seq: u64,
    inflight: Option<RequestHandle>,
}

impl StrategyView {
    pub fn new() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            data: None,
            error: None,
            loading: false,
            seq: 0,
            inflight: None,
        }
    }

    /// Mounting runs the default query once, before any user input.
    pub fn mount(&mut self, gateway: &dyn Gateway) {
        self.analyze(gateway);
    }

    pub fn unmount(&mut self) {
        if let Some(handle) = self.inflight.take() {
            handle.abort();
        }
        self.seq += 1;
        self.query = DEFAULT_QUERY.to_string();
        self.data = None;
        self.error = None;
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[cfg(test)]
    pub fn data(&self) -> Option<&MetaData> {
        self.data.as_ref()
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn analyze(&mut self, gateway: &dyn Gateway) {
        let game = self.query.trim().to_string();
        if game.is_empty() || self.loading {
            return;
        }
        self.loading = true;
        self.seq += 1;
        self.inflight = Some(gateway.request_meta(self.seq, game));
    }

    pub fn handle_event(&mut self, event: &AppEvent) {
        match event {
            AppEvent::MetaReady { seq, data } if *seq == self.seq && self.loading => {
                self.data = Some(data.clone());
                self.error = None;
                self.loading = false;
                self.inflight = None;
            }
            AppEvent::MetaFailed { seq, .. } if *seq == self.seq && self.loading => {
                // Previous snapshot stays visible beneath the banner.
                self.error = Some(FAILURE_MESSAGE.to_string());
                self.loading = false;
                self.inflight = None;
            }
            _ => {}
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, theme: &Theme, gateway: &dyn Gateway) {
        let mut analyze_now = false;
        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.query)
                    .desired_width(ui.available_width() - 130.0)
                    .hint_text("Search game meta (e.g. Valorant, LoL, Chess)..."),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                analyze_now = true;
            }
            analyze_now |= ui
                .add_enabled(!self.loading, egui::Button::new("Analyze Meta"))
                .clicked();
        });
        if analyze_now {
            self.analyze(gateway);
        }

        if let Some(error) = &self.error {
            theme.panel_frame(theme.surface_1, 10).show(ui, |ui| {
                ui.label(RichText::new(error).color(theme.danger));
            });
        }

        if self.loading {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.add(egui::Spinner::new().size(40.0));
                ui.label(
                    RichText::new("Scanning competitive data nodes...")
                        .italics()
                        .color(theme.text_muted),
                );
            });
            return;
        }

        match &self.data {
            Some(data) => {
                let data = data.clone();
                ScrollArea::vertical()
                    .id_salt("strategy_report")
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.heading(format!("Competitive Meta: {}", data.game_name));
                        ui.add_space(theme.spacing_8);
                        render_win_rates(ui, theme, &data);
                        ui.add_space(theme.spacing_12);
                        render_tier_list(ui, theme, &data);
                    });
            }
            None => {
                ui.vertical_centered(|ui| {
                    ui.add_space(60.0);
                    ui.label(
                        RichText::new("Enter a game name to visualize competitive meta trends.")
                            .italics()
                            .color(theme.text_muted),
                    );
                });
            }
        }
    }
}

fn render_win_rates(ui: &mut egui::Ui, theme: &Theme, data: &MetaData) {
    theme.card_frame().show(ui, |ui| {
        ui.strong("Usage & Win Efficiency");
        let bars: Vec<Bar> = data
            .win_rates
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                Bar::new(index as f64, entry.value)
                    .name(&entry.name)
                    .width(0.6)
                    .fill(theme.chart_color(index))
            })
            .collect();

        Plot::new("win_rates")
            .height(240.0)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show_axes([false, true])
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });

        ui.horizontal_wrapped(|ui| {
            for (index, entry) in data.win_rates.iter().enumerate() {
                ui.label(
                    RichText::new(format!("■ {} ({:.0})", entry.name, entry.value))
                        .small()
                        .color(theme.chart_color(index)),
                );
            }
        });
    });
}

fn render_tier_list(ui: &mut egui::Ui, theme: &Theme, data: &MetaData) {
    theme.card_frame().show(ui, |ui| {
        ui.strong("Pro Tier Analysis");
        for entry in &data.tier_list {
            ui.horizontal(|ui| {
                theme.panel_frame(theme.surface_2, 8).show(ui, |ui| {
                    ui.label(
                        RichText::new(&entry.rank)
                            .strong()
                            .color(theme.tier_color(&entry.rank)),
                    );
                });
                ui.vertical(|ui| {
                    ui.strong(&entry.character);
                    ui.label(RichText::new(&entry.reason).small().color(theme.text_muted));
                });
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TierEntry, WinRate};
    use crate::ui::testing::{RecordedCall, RecordingGateway};

    fn chess_meta() -> MetaData {
        MetaData {
            game_name: "Chess".to_string(),
            tier_list: vec![TierEntry {
                rank: "S".to_string(),
                character: "Queen".to_string(),
                reason: "mobility".to_string(),
            }],
            win_rates: vec![WinRate {
                name: "Queen".to_string(),
                value: 90.0,
            }],
        }
    }

    #[test]
    fn mount_runs_the_default_query() {
        let gateway = RecordingGateway::default();
        let mut view = StrategyView::new();
        view.mount(&gateway);

        assert!(view.is_loading());
        assert_eq!(
            gateway.calls.borrow()[0],
            RecordedCall::Meta {
                seq: 1,
                game: DEFAULT_QUERY.to_string()
            }
        );
    }

    #[test]
    fn successful_query_replaces_the_snapshot_wholesale() {
        let gateway = RecordingGateway::default();
        let mut view = StrategyView::new();
        view.mount(&gateway);
        view.handle_event(&AppEvent::MetaReady {
            seq: view.seq,
            data: chess_meta(),
        });

        let data = view.data().expect("snapshot stored");
        assert_eq!(data.game_name, "Chess");
        assert_eq!(data.tier_list.len(), 1);
        assert_eq!(data.tier_list[0].character, "Queen");
        assert_eq!(data.tier_list[0].rank, "S");
        assert_eq!(data.win_rates.len(), 1);
        assert_eq!(data.win_rates[0].value, 90.0);
        assert!(!view.is_loading());
        assert!(view.error().is_none());
    }

    #[test]
    fn empty_query_is_a_no_op() {
        let gateway = RecordingGateway::default();
        let mut view = StrategyView::new();
        view.query = "  ".to_string();
        view.analyze(&gateway);

        assert_eq!(gateway.call_count(), 0);
        assert!(!view.is_loading());
    }

    #[test]
    fn analyze_while_in_flight_is_a_no_op() {
        let gateway = RecordingGateway::default();
        let mut view = StrategyView::new();
        view.mount(&gateway);
        view.analyze(&gateway);

        assert_eq!(gateway.call_count(), 1);
    }

    #[test]
    fn failure_surfaces_a_banner_and_keeps_previous_data() {
        let gateway = RecordingGateway::default();
        let mut view = StrategyView::new();
        view.mount(&gateway);
        view.handle_event(&AppEvent::MetaReady {
            seq: view.seq,
            data: chess_meta(),
        });

        view.query = "Valorant".to_string();
        view.analyze(&gateway);
        view.handle_event(&AppEvent::MetaFailed {
            seq: view.seq,
            error: "HTTP 503".to_string(),
        });

        assert_eq!(view.error(), Some(FAILURE_MESSAGE));
        assert_eq!(view.data().expect("previous data kept").game_name, "Chess");
        assert!(!view.is_loading());
    }

    #[test]
    fn next_success_clears_the_error_banner() {
        let gateway = RecordingGateway::default();
        let mut view = StrategyView::new();
        view.mount(&gateway);
        view.handle_event(&AppEvent::MetaFailed {
            seq: view.seq,
            error: "HTTP 503".to_string(),
        });
        assert!(view.error().is_some());

        view.analyze(&gateway);
        view.handle_event(&AppEvent::MetaReady {
            seq: view.seq,
            data: chess_meta(),
        });
        assert!(view.error().is_none());
    }

    #[test]
    fn stale_result_after_unmount_is_dropped() {
        let gateway = RecordingGateway::default();
        let mut view = StrategyView::new();
        view.mount(&gateway);
        let stale = AppEvent::MetaReady {
            seq: view.seq,
            data: chess_meta(),
        };

        view.unmount();
        view.handle_event(&stale);
        assert!(view.data().is_none());
    }
}
