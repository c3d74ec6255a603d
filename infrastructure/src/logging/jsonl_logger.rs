//! JSONL transcript of conversation events.
//!
//! Every [`ConversationEvent`] becomes one JSON line carrying its `type` and
//! an RFC 3339 `timestamp`. The file is opened in append mode and each line
//! is written with a single `write_all`, so sessions sharing a transcript
//! never interleave partial records.

use serde_json::{Map, Value};
use sre_application::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Appends conversation events to a JSONL transcript.
pub struct JsonlConversationLogger {
    file: Mutex<File>,
}

impl JsonlConversationLogger {
    /// Open (or create) the transcript at `path`, creating parent
    /// directories. `None` means the session runs without a transcript.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Cannot create transcript directory {}: {}", parent.display(), e);
            return None;
        }

        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                debug!("Conversation transcript: {}", path.display());
                Some(Self {
                    file: Mutex::new(file),
                })
            }
            Err(e) => {
                warn!("Cannot open transcript {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Object payloads gain `type` and `timestamp` keys; anything else is
/// nested under `data`.
fn record(event: ConversationEvent, timestamp: String) -> Value {
    let mut fields = match event.payload {
        Value::Object(map) => map,
        other => Map::from_iter([("data".to_string(), other)]),
    };
    fields.insert("type".to_string(), Value::from(event.event_type));
    fields.insert("timestamp".to_string(), Value::String(timestamp));
    Value::Object(fields)
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let Ok(mut line) = serde_json::to_string(&record(event, timestamp)) else {
            return;
        };
        line.push('\n');

        if let Ok(mut file) = self.file.lock()
            && let Err(e) = file.write_all(line.as_bytes())
        {
            debug!("Transcript write failed: {}", e);
        }
    }
}
