use crate::event::AppEvent;
use crate::gemini::{Gateway, RequestHandle};
use crate::model::{ChatMessage, Role};
use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};

const GREETING: &str = "Hello, Commander. I am LevelUp AI. How can I assist your gameplay today?";
const EMPTY_REPLY_FALLBACK: &str = "I couldn't process that request.";
const FAILURE_MESSAGE: &str = "Error: Could not reach gaming intelligence servers.";

/// Conversational view. Owns the transcript for the life of one mount; the
/// loading flag doubles as the per-view mutual-exclusion latch, so at most
/// one exchange is ever in flight.
pub struct ChatView {
    transcript: Vec<ChatMessage>,
    input: String,
    loading: bool,
    seq: u64,
    inflight: Option<RequestHandle>,
    scroll_to_bottom: bool,
}

impl ChatView {
    pub fn new() -> Self {
        Self {
            transcript: Vec::new(),
            input: String::new(),
            loading: false,
            seq: 0,
            inflight: None,
            scroll_to_bottom: false,
        }
    }

    pub fn mount(&mut self) {
        self.transcript
            .push(ChatMessage::new(Role::Model, GREETING));
        self.scroll_to_bottom = true;
    }

    /// Tears the session down: the transcript does not survive navigation,
    /// and a reply still in flight is aborted and its event invalidated.
    pub fn unmount(&mut self) {
        if let Some(handle) = self.inflight.take() {
            handle.abort();
        }
        self.seq += 1;
        self.transcript.clear();
        self.input.clear();
        self.loading = false;
        self.scroll_to_bottom = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[cfg(test)]
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn send(&mut self, gateway: &dyn Gateway) {
        let prompt = self.input.trim().to_string();
        if prompt.is_empty() || self.loading {
            return;
        }

        self.transcript
            .push(ChatMessage::new(Role::User, prompt.clone()));
        self.input.clear();
        self.loading = true;
        self.seq += 1;
        self.scroll_to_bottom = true;
        // History is passed empty: each exchange is stateless on the wire.
        self.inflight = Some(gateway.request_chat(self.seq, prompt, Vec::new()));
    }

    pub fn handle_event(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ChatReply { seq, text } if *seq == self.seq && self.loading => {
                let text = if text.trim().is_empty() {
                    EMPTY_REPLY_FALLBACK.to_string()
                } else {
                    text.clone()
                };
                self.transcript.push(ChatMessage::new(Role::Model, text));
                self.loading = false;
                self.inflight = None;
                self.scroll_to_bottom = true;
            }
            AppEvent::ChatFailed { seq, .. } if *seq == self.seq && self.loading => {
                self.transcript
                    .push(ChatMessage::new(Role::Model, FAILURE_MESSAGE));
                self.loading = false;
                self.inflight = None;
                self.scroll_to_bottom = true;
            }
            _ => {}
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, theme: &Theme, gateway: &dyn Gateway) {
        ui.horizontal(|ui| {
            ui.heading("AI Gaming Strategist");
            ui.label(
                RichText::new("Synchronized & Ready")
                    .color(theme.success)
                    .small(),
            );
        });
        ui.separator();

        let transcript_height = (ui.available_height() - 80.0).max(120.0);
        ScrollArea::vertical()
            .id_salt("chat_transcript")
            .max_height(transcript_height)
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for message in &self.transcript {
                    render_message(ui, theme, message);
                }

                if self.loading {
                    ui.horizontal(|ui| {
                        ui.add(egui::Spinner::new());
                        ui.label(
                            RichText::new("Analyzing game mechanics...")
                                .italics()
                                .color(theme.text_muted),
                        );
                    });
                }

                if self.scroll_to_bottom {
                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                }
            });
        self.scroll_to_bottom = false;

        ui.separator();
        let mut send_now = false;
        ui.horizontal(|ui| {
            let response = ui.add_enabled(
                !self.loading,
                egui::TextEdit::singleline(&mut self.input)
                    .desired_width(ui.available_width() - 70.0)
                    .hint_text("Ask about a boss fight, build, or puzzle..."),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                send_now = true;
            }

            let clicked = ui
                .add_enabled(
                    !self.loading && !self.input.trim().is_empty(),
                    egui::Button::new("Send"),
                )
                .clicked();
            send_now |= clicked;
        });

        if send_now {
            self.send(gateway);
        }
    }
}

fn render_message(ui: &mut egui::Ui, theme: &Theme, message: &ChatMessage) {
    let (align, fill, speaker) = match message.role {
        Role::User => (egui::Align::Max, theme.accent_muted, "You"),
        Role::Model => (egui::Align::Min, theme.surface_2, "LevelUp AI"),
    };
    ui.with_layout(egui::Layout::top_down(align), |ui| {
        theme.panel_frame(fill, 10).show(ui, |ui| {
            ui.set_max_width(ui.available_width() * 0.85);
            ui.label(RichText::new(speaker).small().color(theme.text_muted));
            if message.image.is_some() {
                ui.label(RichText::new("[attached capture]").small().italics());
            }
            ui.label(&message.text);
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::testing::{RecordedCall, RecordingGateway};

    fn mounted_view() -> ChatView {
        let mut view = ChatView::new();
        view.mount();
        view
    }

    fn reply(view: &ChatView, text: &str) -> AppEvent {
        AppEvent::ChatReply {
            seq: view.seq,
            text: text.to_string(),
        }
    }

    #[test]
    fn each_successful_send_adds_a_user_and_a_model_message() {
        let gateway = RecordingGateway::default();
        let mut view = mounted_view();
        assert_eq!(view.transcript().len(), 1);

        for n in 1..=3u64 {
            view.input = format!("question {n}");
            view.send(&gateway);
            let event = reply(&view, &format!("answer {n}"));
            view.handle_event(&event);
            assert_eq!(view.transcript().len(), 1 + 2 * n as usize);
        }

        let roles: Vec<Role> = view.transcript().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::Model,
                Role::User,
                Role::Model,
                Role::User,
                Role::Model,
                Role::User,
                Role::Model
            ]
        );
        assert_eq!(view.transcript().last().expect("non-empty").text, "answer 3");
        assert!(!view.is_loading());
    }

    #[test]
    fn chat_history_is_sent_empty() {
        let gateway = RecordingGateway::default();
        let mut view = mounted_view();
        view.input = "hello".to_string();
        view.send(&gateway);

        let calls = gateway.calls.borrow();
        match &calls[0] {
            RecordedCall::Chat {
                prompt,
                history_len,
                ..
            } => {
                assert_eq!(prompt, "hello");
                assert_eq!(*history_len, 0);
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[test]
    fn whitespace_only_send_is_a_no_op() {
        let gateway = RecordingGateway::default();
        let mut view = mounted_view();
        view.input = "   \t ".to_string();
        view.send(&gateway);

        assert_eq!(view.transcript().len(), 1);
        assert_eq!(gateway.call_count(), 0);
        assert!(!view.is_loading());
    }

    #[test]
    fn send_while_in_flight_is_a_no_op() {
        let gateway = RecordingGateway::default();
        let mut view = mounted_view();
        view.input = "first".to_string();
        view.send(&gateway);
        assert!(view.is_loading());

        view.input = "second".to_string();
        view.send(&gateway);
        assert_eq!(gateway.call_count(), 1);
        assert_eq!(view.transcript().len(), 2);
        assert_eq!(view.input, "second");
    }

    #[test]
    fn transport_failure_appends_exactly_one_fixed_error_message() {
        let gateway = RecordingGateway::default();
        let mut view = mounted_view();
        view.input = "hello".to_string();
        view.send(&gateway);

        view.handle_event(&AppEvent::ChatFailed {
            seq: view.seq,
            error: "connection refused".to_string(),
        });
        assert_eq!(view.transcript().len(), 3);
        let last = view.transcript().last().expect("non-empty");
        assert_eq!(last.role, Role::Model);
        assert_eq!(last.text, FAILURE_MESSAGE);
        assert!(!view.is_loading());
    }

    #[test]
    fn empty_reply_uses_fallback_copy() {
        let gateway = RecordingGateway::default();
        let mut view = mounted_view();
        view.input = "hello".to_string();
        view.send(&gateway);
        let event = reply(&view, "  ");
        view.handle_event(&event);

        assert_eq!(
            view.transcript().last().expect("non-empty").text,
            EMPTY_REPLY_FALLBACK
        );
    }

    #[test]
    fn reply_arriving_after_unmount_is_dropped() {
        let gateway = RecordingGateway::default();
        let mut view = mounted_view();
        view.input = "hello".to_string();
        view.send(&gateway);
        let stale = reply(&view, "late answer");

        view.unmount();
        view.mount();
        view.handle_event(&stale);

        assert_eq!(view.transcript().len(), 1);
        assert!(!view.is_loading());
    }
}
