use crate::event::AppEvent;
use crate::model::{ChatTurn, MetaData};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::mpsc;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const CHAT_MODEL: &str = "gemini-3-pro-preview";
const META_MODEL: &str = "gemini-3-flash-preview";
const VISION_MODEL: &str = "gemini-2.5-flash-image";

const SYSTEM_INSTRUCTION: &str = "You are LevelUp AI, a world-class gaming expert. You provide \
detailed, accurate tips for problem solving (puzzles, level navigation, boss fights) and \
high-level competitive strategies (meta shifts, builds, tactical positioning). Keep responses \
concise but information-dense. Use Markdown.";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request to intelligence service failed: {0}")]
    RemoteService(#[from] reqwest::Error),
    #[error("intelligence service returned HTTP {status}: {detail}")]
    RemoteStatus { status: u16, detail: String },
    #[error("malformed response from intelligence service: {0}")]
    MalformedResponse(String),
    #[error("invalid image payload: {0}")]
    InvalidImage(String),
}

/// Handle to one outstanding request. Aborting is best-effort: a component
/// aborts on unmount so a reply can never outlive its view.
pub struct RequestHandle {
    abort: Option<AbortHandle>,
}

impl RequestHandle {
    pub fn detached() -> Self {
        Self { abort: None }
    }

    pub fn abort(&self) {
        if let Some(handle) = &self.abort {
            handle.abort();
        }
    }
}

impl From<AbortHandle> for RequestHandle {
    fn from(abort: AbortHandle) -> Self {
        Self { abort: Some(abort) }
    }
}

/// The boundary every view talks through. Calls are fire-and-forget; results
/// come back as [`AppEvent`]s stamped with the caller's generation number.
/// Views receive this as an explicit dependency so tests can substitute a
/// recording double.
pub trait Gateway {
    fn request_chat(&self, seq: u64, prompt: String, history: Vec<ChatTurn>) -> RequestHandle;
    fn request_meta(&self, seq: u64, game: String) -> RequestHandle;
    fn request_vision(&self, seq: u64, image_data: String, prompt: String) -> RequestHandle;
}

/// Thin client over the hosted generative-AI REST endpoint. One outbound
/// request per call; no retries, caching, or rate limiting. Timeouts are left
/// to the transport's defaults.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    tx: mpsc::Sender<AppEvent>,
    runtime: Handle,
}

impl GeminiClient {
    pub fn new(api_key: String, tx: mpsc::Sender<AppEvent>, runtime: Handle) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            tx,
            runtime,
        }
    }
}

impl Gateway for GeminiClient {
    fn request_chat(&self, seq: u64, prompt: String, history: Vec<ChatTurn>) -> RequestHandle {
        let http = self.http.clone();
        let api_key = self.api_key.clone();
        let tx = self.tx.clone();
        let task = self.runtime.spawn(async move {
            let body = chat_request_body(&prompt, &history);
            match generate(&http, &api_key, CHAT_MODEL, body).await {
                Ok(text) => {
                    let _ = tx.send(AppEvent::ChatReply { seq, text });
                }
                Err(err) => {
                    tracing::error!(%err, "chat request failed");
                    let _ = tx.send(AppEvent::ChatFailed {
                        seq,
                        error: err.to_string(),
                    });
                }
            }
        });
        RequestHandle::from(task.abort_handle())
    }

    fn request_meta(&self, seq: u64, game: String) -> RequestHandle {
        let http = self.http.clone();
        let api_key = self.api_key.clone();
        let tx = self.tx.clone();
        let task = self.runtime.spawn(async move {
            let body = meta_request_body(&game);
            let outcome = match generate(&http, &api_key, META_MODEL, body).await {
                Ok(text) => parse_meta(&text),
                Err(err) => Err(err),
            };
            match outcome {
                Ok(data) => {
                    let _ = tx.send(AppEvent::MetaReady { seq, data });
                }
                Err(err) => {
                    tracing::error!(%err, game = %game, "meta request failed");
                    let _ = tx.send(AppEvent::MetaFailed {
                        seq,
                        error: err.to_string(),
                    });
                }
            }
        });
        RequestHandle::from(task.abort_handle())
    }

    fn request_vision(&self, seq: u64, image_data: String, prompt: String) -> RequestHandle {
        let http = self.http.clone();
        let api_key = self.api_key.clone();
        let tx = self.tx.clone();
        let task = self.runtime.spawn(async move {
            let outcome = match vision_request_body(&image_data, &prompt) {
                Ok(body) => generate(&http, &api_key, VISION_MODEL, body).await,
                Err(err) => Err(err),
            };
            match outcome {
                Ok(text) => {
                    let _ = tx.send(AppEvent::VisionReady { seq, text });
                }
                Err(err) => {
                    tracing::error!(%err, "vision request failed");
                    let _ = tx.send(AppEvent::VisionFailed {
                        seq,
                        error: err.to_string(),
                    });
                }
            }
        });
        RequestHandle::from(task.abort_handle())
    }
}

async fn generate(
    http: &reqwest::Client,
    api_key: &str,
    model: &str,
    body: Value,
) -> Result<String, GatewayError> {
    let url = format!("{API_BASE}/{model}:generateContent");
    let response = http
        .post(&url)
        .query(&[("key", api_key)])
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(GatewayError::RemoteStatus {
            status: status.as_u16(),
            detail: truncate(&text, 200),
        });
    }

    extract_text(&text)
}

fn chat_request_body(prompt: &str, history: &[ChatTurn]) -> Value {
    let mut contents: Vec<Value> = history
        .iter()
        .map(|turn| {
            json!({
                "role": turn.role.wire_name(),
                "parts": [{"text": turn.text}]
            })
        })
        .collect();
    contents.push(json!({
        "role": "user",
        "parts": [{"text": prompt}]
    }));

    json!({
        "contents": contents,
        "systemInstruction": {"parts": [{"text": SYSTEM_INSTRUCTION}]},
        "generationConfig": {
            "thinkingConfig": {"thinkingBudget": 4000}
        }
    })
}

fn meta_request_body(game: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{"text": format!(
                "Provide a current meta-analysis for \"{game}\". Include a brief tier list \
                 and win rate estimates. Format as JSON."
            )}]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": meta_response_schema()
        }
    })
}

fn meta_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "gameName": {"type": "STRING"},
            "tierList": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "rank": {"type": "STRING"},
                        "character": {"type": "STRING"},
                        "reason": {"type": "STRING"}
                    },
                    "required": ["rank", "character", "reason"]
                }
            },
            "winRates": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": {"type": "STRING"},
                        "value": {"type": "NUMBER"}
                    },
                    "required": ["name", "value"]
                }
            }
        },
        "required": ["gameName", "tierList", "winRates"]
    })
}

fn vision_request_body(image_data: &str, prompt: &str) -> Result<Value, GatewayError> {
    let (mime_type, payload) = strip_data_url(image_data)?;
    Ok(json!({
        "contents": [{
            "role": "user",
            "parts": [
                {"inlineData": {"mimeType": mime_type, "data": payload}},
                {"text": prompt}
            ]
        }]
    }))
}

/// Splits a `data:<mime>;base64,<payload>` string into its mime type and raw
/// base64 payload. Bare base64 input passes through as `image/png`. The
/// payload must decode as base64 or the image is rejected outright.
fn strip_data_url(input: &str) -> Result<(String, String), GatewayError> {
    let (mime_type, payload) = match input.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest.split_once(',').ok_or_else(|| {
                GatewayError::InvalidImage("data URL is missing its payload".to_string())
            })?;
            let mime = header
                .split(';')
                .next()
                .filter(|mime| !mime.is_empty())
                .unwrap_or("image/png");
            (mime.to_string(), payload.to_string())
        }
        None => ("image/png".to_string(), input.to_string()),
    };

    if payload.trim().is_empty() {
        return Err(GatewayError::InvalidImage("empty image payload".to_string()));
    }
    BASE64
        .decode(payload.trim())
        .map_err(|err| GatewayError::InvalidImage(format!("payload is not base64: {err}")))?;

    Ok((mime_type, payload))
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Pulls the concatenated text parts out of a raw generateContent response.
/// A response with no candidate at all is malformed; a candidate with empty
/// text is returned as-is and left to the caller's fallback copy.
fn extract_text(raw: &str) -> Result<String, GatewayError> {
    let response: GenerateContentResponse = serde_json::from_str(raw)
        .map_err(|err| GatewayError::MalformedResponse(err.to_string()))?;
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::MalformedResponse("response has no candidates".to_string()))?;

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();
    Ok(text)
}

/// A structured meta reply must be valid JSON matching [`MetaData`]. Empty
/// text is a malformed response, never an empty-but-valid result.
fn parse_meta(text: &str) -> Result<MetaData, GatewayError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::MalformedResponse(
            "empty structured response".to_string(),
        ));
    }
    serde_json::from_str(trimmed).map_err(|err| GatewayError::MalformedResponse(err.to_string()))
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        text.to_string()
    } else {
        let mut end = max;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}
