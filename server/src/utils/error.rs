//! Unified error handling
//!
//! Re-exports the shared error types and provides response helpers.
//!
//! # Usage
//!
//! ```ignore
//! // Return an error
//! Err(AppError::not_found("Product"))
//!
//! // Return a success envelope
//! Ok(ok(data))
//! ```

use axum::Json;
use serde::Serialize;

pub use shared::error::{ApiResponse, AppError, ErrorCategory, ErrorCode};

/// Create a successful response envelope
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// Create a successful response envelope with a custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success_with_message(message, data))
}
