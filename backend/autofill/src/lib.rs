//! Autofill Orchestrator for the LC request form.
//!
//! Ties the text extraction gateway and the field mapper together behind a
//! per-form state machine: `Idle → Extracting → Mapping → (merge) → Idle`,
//! with any failure parking the session in `Failed` until retried.

pub mod session;
pub mod state;

pub use session::{AutofillSession, StageTimeouts};
pub use state::{AutofillState, FailureInfo, FormState, SubmitOutcome};
