use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// The four top-level views. Exactly one is active at any time; transitions
/// are unconditional overwrites with no history stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Chat,
    Strategy,
    Vision,
}

impl View {
    pub fn label(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Chat => "AI Assistant",
            View::Strategy => "Meta Hub",
            View::Vision => "Vision Mode",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Role name on the generative-AI wire format.
    pub fn wire_name(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One transcript entry. Immutable once appended; the transcript lives only
/// as long as the chat view stays mounted.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub timestamp: u64,
    pub image: Option<String>,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: now_millis(),
            image: None,
        }
    }
}

/// A prior conversational turn handed to the gateway alongside a prompt.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

/// Structured competitive summary for one game, produced wholesale by a
/// single gateway call and replaced atomically on each new query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaData {
    pub game_name: String,
    pub tier_list: Vec<TierEntry>,
    pub win_rates: Vec<WinRate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TierEntry {
    pub rank: String,
    pub character: String,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WinRate {
    pub name: String,
    pub value: f64,
}

pub fn now_millis() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_millis() as u64,
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_view_is_dashboard() {
        assert_eq!(View::default(), View::Dashboard);
    }

    #[test]
    fn meta_data_deserializes_camel_case_payload() {
        let payload = r#"{
            "gameName": "Chess",
            "tierList": [{"rank": "S", "character": "Queen", "reason": "mobility"}],
            "winRates": [{"name": "Queen", "value": 90}]
        }"#;
        let meta: MetaData = serde_json::from_str(payload).expect("payload should parse");
        assert_eq!(meta.game_name, "Chess");
        assert_eq!(meta.tier_list.len(), 1);
        assert_eq!(meta.tier_list[0].character, "Queen");
        assert_eq!(meta.win_rates[0].value, 90.0);
    }
}
