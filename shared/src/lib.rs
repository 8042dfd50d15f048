//! Shared types for the pharmacy POS backend
//!
//! Contains the pieces that must stay in sync between the server and any
//! client talking to it:
//!
//! - **Error system** (`error`): unified [`ErrorCode`] enumeration, the
//!   [`AppError`] type and the [`ApiResponse`] envelope.
//! - **Client DTOs** (`client`): request/response bodies for the auth API.

pub mod client;
pub mod error;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
