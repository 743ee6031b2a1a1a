pub mod error;
pub mod field;
pub mod merge;
pub mod record;
pub mod traits;
pub mod types;

pub use error::{AutofillError, FailureKind, GatewayError};
pub use field::{FieldName, UnknownField, FIELD_COUNT};
pub use merge::{merge, reconcile, Reconciliation};
pub use record::{FieldRecord, PartialRecord};
pub use traits::{LlmProvider, LlmRequest, LlmResponse, TextExtractor};
pub use types::{
    is_image, mime_from_extension, sniff_mime_type, token_count, ExtractedText, ImageUpload,
    MIN_TOKENS,
};
