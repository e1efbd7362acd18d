use crate::event::AppEvent;
use crate::gemini::GeminiClient;
use crate::model::View;
use crate::theme::Theme;
use crate::ui::chat::ChatView;
use crate::ui::dashboard;
use crate::ui::strategy::StrategyView;
use crate::ui::vision::VisionView;
use eframe::egui::{self, RichText};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

const NAV_ITEMS: [View; 4] = [View::Dashboard, View::Chat, View::Strategy, View::Vision];

pub struct LevelUpApp {
    rx: Receiver<AppEvent>,
    client: GeminiClient,
    theme: Theme,
    view: View,
    chat: ChatView,
    strategy: StrategyView,
    vision: VisionView,
}

impl LevelUpApp {
    pub fn new(rx: Receiver<AppEvent>, client: GeminiClient) -> Self {
        Self {
            rx,
            client,
            theme: Theme::default(),
            view: View::Dashboard,
            chat: ChatView::new(),
            strategy: StrategyView::new(),
            vision: VisionView::new(),
        }
    }

    /// Unconditional overwrite transition. The outgoing component unmounts
    /// (state reset, in-flight request aborted) and the incoming one mounts;
    /// a self-transition changes nothing.
    fn set_view(&mut self, target: View) {
        if target == self.view {
            return;
        }
        match self.view {
            View::Dashboard => {}
            View::Chat => self.chat.unmount(),
            View::Strategy => self.strategy.unmount(),
            View::Vision => self.vision.unmount(),
        }
        self.view = target;
        match target {
            View::Dashboard => {}
            View::Chat => self.chat.mount(),
            View::Strategy => self.strategy.mount(&self.client),
            View::Vision => self.vision.mount(),
        }
    }

    fn drain_events(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.route_event(&event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn route_event(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ChatReply { .. } | AppEvent::ChatFailed { .. } => {
                self.chat.handle_event(event);
            }
            AppEvent::MetaReady { .. } | AppEvent::MetaFailed { .. } => {
                self.strategy.handle_event(event);
            }
            AppEvent::VisionReady { .. } | AppEvent::VisionFailed { .. } => {
                self.vision.handle_event(event);
            }
        }
    }

    fn any_loading(&self) -> bool {
        self.chat.is_loading() || self.strategy.is_loading() || self.vision.is_loading()
    }

    fn render_sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("sidebar")
            .resizable(false)
            .exact_width(200.0)
            .show(ctx, |ui| {
                ui.add_space(self.theme.spacing_12);
                ui.horizontal(|ui| {
                    ui.strong(
                        RichText::new("LevelUp")
                            .size(20.0)
                            .color(self.theme.text_primary),
                    );
                    ui.strong(
                        RichText::new("AI")
                            .size(20.0)
                            .color(self.theme.accent_primary),
                    );
                });
                ui.add_space(self.theme.spacing_16);

                let mut clicked = None;
                for item in NAV_ITEMS {
                    let selected = self.view == item;
                    let label = if selected {
                        RichText::new(item.label()).color(self.theme.accent_primary)
                    } else {
                        RichText::new(item.label())
                    };
                    if ui.selectable_label(selected, label).clicked() {
                        clicked = Some(item);
                    }
                }
                if let Some(target) = clicked {
                    self.set_view(target);
                }
            });
    }

    fn render_active_view(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            match self.view {
                View::Dashboard => {
                    if let Some(target) = dashboard::ui(ui, &self.theme) {
                        self.set_view(target);
                    }
                }
                View::Chat => self.chat.ui(ui, &self.theme, &self.client),
                View::Strategy => self.strategy.ui(ui, &self.theme, &self.client),
                View::Vision => self.vision.ui(ui, &self.theme, &self.client),
            }
        });
    }
}

impl eframe::App for LevelUpApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        if self.any_loading() {
            // Events arrive from worker tasks between frames; keep polling.
            ctx.request_repaint_after(Duration::from_millis(100));
        }
        self.render_sidebar(ctx);
        self.render_active_view(ctx);
    }
}
