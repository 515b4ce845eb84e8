//! # Axum Helpers
//!
//! Shared utilities for the HTTP layer.
//!
//! ## Modules
//!
//! - **[`auth`]**: request-scoped principal carrier and its extractor
//! - **[`errors`]**: structured error response envelope
//! - **[`extractors`]**: custom extractors (validated JSON)

pub mod auth;
pub mod errors;
pub mod extractors;

pub use auth::{Principal, RequestContext};
pub use errors::{messages, ErrorResponse};
pub use extractors::ValidatedJson;
