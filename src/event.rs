use crate::model::MetaData;

/// Results of gateway calls, delivered from tokio tasks to the UI thread
/// over an mpsc channel and drained once per frame.
///
/// Every variant carries the generation number the issuing component stamped
/// on the request. A component bumps its generation when it unmounts, so a
/// late reply for a torn-down view is dropped instead of applied.
#[derive(Debug, Clone)]
pub enum AppEvent {
    ChatReply { seq: u64, text: String },
    ChatFailed { seq: u64, error: String },
    MetaReady { seq: u64, data: MetaData },
    MetaFailed { seq: u64, error: String },
    VisionReady { seq: u64, text: String },
    VisionFailed { seq: u64, error: String },
}
