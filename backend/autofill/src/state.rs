use chrono::{DateTime, Utc};
use lcforge_core::{AutofillError, FailureKind, FieldName, FieldRecord};
use lcforge_logging::redact_sensitive_data;
use lcforge_mapper::ParseTier;
use serde::Serialize;
use std::fmt;

/// Where a session is in the upload chain.
///
/// A successful merge passes through `Merged` and lands back on `Idle` in
/// the same step, so `Merged` is reported as a [`SubmitOutcome`] rather than
/// held as a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutofillState {
    Idle,
    Extracting,
    Mapping,
    Failed,
}

impl AutofillState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Extracting | Self::Mapping)
    }
}

impl fmt::Display for AutofillState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Extracting => "extracting",
            Self::Mapping => "mapping",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// The banner shown while a session sits in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureInfo {
    pub kind: FailureKind,
    pub message: String,
    pub retryable: bool,
}

impl From<&AutofillError> for FailureInfo {
    fn from(err: &AutofillError) -> Self {
        Self {
            kind: err.kind(),
            message: redact_sensitive_data(&err.to_string()),
            retryable: true,
        }
    }
}

/// Session-owned form values plus upload status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub fields: FieldRecord,
    pub state: AutofillState,
    pub error: Option<FailureInfo>,
    /// Filename of the most recent upload.
    pub last_upload: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            fields: FieldRecord::new(),
            state: AutofillState::Idle,
            error: None,
            last_upload: None,
            updated_at: Utc::now(),
        }
    }
}

/// Result of one `submit`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    #[serde(rename_all = "camelCase")]
    Merged {
        form: FieldRecord,
        updated: Vec<FieldName>,
        /// The engine's answer changed nothing.
        noop: bool,
        ocr_text: String,
        tier: ParseTier,
    },
    Failed(FailureInfo),
}

impl SubmitOutcome {
    pub fn is_merged(&self) -> bool {
        matches!(self, Self::Merged { .. })
    }
}
