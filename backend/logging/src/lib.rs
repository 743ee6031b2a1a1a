//! Telemetry and structured logging components for LcForge.
//!
//! Handles log redaction, console and rolling NDJSON file output, and the
//! autofill event trail.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{AutofillEvent, AutofillEventLogger, EventLogEntry};
pub use logger::{init_logger, LogOptions};
pub use redact::{preview, redact_sensitive_data};
