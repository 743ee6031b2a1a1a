//! Autofill Event Logger
//!
//! One structured record per autofill milestone, emitted under the
//! `autofill_events` target so it can be routed to the NDJSON file.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::{preview, redact_sensitive_data};

const PREVIEW_CHARS: usize = 160;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AutofillEvent {
    UploadReceived {
        filename: String,
        mime_type: String,
        bytes: usize,
    },
    TextExtracted {
        provider: String,
        tokens: usize,
        text_preview: String,
    },
    EngineReplied {
        provider: String,
        model: String,
        latency_ms: u64,
        reply_preview: String,
    },
    Merged {
        updated_fields: Vec<String>,
    },
    Failed {
        kind: String,
        error_msg: String,
    },
    Cancelled,
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: AutofillEvent,
}

pub struct AutofillEventLogger;

impl AutofillEventLogger {
    /// Redacts the event's free text and hands it to `tracing`.
    pub fn log_event(session_id: &str, mut event: AutofillEvent) {
        match &mut event {
            AutofillEvent::TextExtracted { text_preview, .. } => {
                *text_preview = preview(text_preview, PREVIEW_CHARS);
            }
            AutofillEvent::EngineReplied { reply_preview, .. } => {
                *reply_preview = preview(reply_preview, PREVIEW_CHARS);
            }
            AutofillEvent::Failed { error_msg, .. } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            _ => {}
        }

        let entry = EventLogEntry {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event,
        };

        match serde_json::to_string(&entry) {
            Ok(json) => info!(target: "autofill_events", session_id, event = %json, "Autofill event"),
            Err(_) => info!(target: "autofill_events", session_id, event = ?entry, "Autofill event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_with_type_tag() {
        let entry = EventLogEntry {
            session_id: "s1".into(),
            timestamp: Utc::now(),
            event: AutofillEvent::Merged {
                updated_fields: vec!["amount".into()],
            },
        };
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v["event"]["type"], "merged");
        assert_eq!(v["event"]["updated_fields"][0], "amount");
    }

    #[test]
    fn log_event_without_subscriber_is_a_noop() {
        AutofillEventLogger::log_event("s1", AutofillEvent::Cancelled);
    }
}
