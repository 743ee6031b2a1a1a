//! LcForge HTTP API.
//!
//! Session routes for the form-bound upload flow plus the session-free
//! `imagetotext` and `ai` routes.

pub mod attachments;
pub mod error;
pub mod health_api;
pub mod server;
pub mod session_registry;
pub mod sessions_api;
pub mod stateless_api;

pub use error::ApiError;
pub use server::{AppState, build_router, start_server};
pub use session_registry::SessionRegistry;
