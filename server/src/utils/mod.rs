//! Utility module
//!
//! - [`AppError`] / [`ApiResponse`] - unified error and response types (from shared)
//! - Logging, validation limits and retry helpers

pub mod error;
pub mod logger;
pub mod result;
pub mod retry;
pub mod validation;

pub use error::{ApiResponse, AppError, ErrorCategory, ErrorCode};
pub use error::{ok, ok_with_message};
pub use result::AppResult;
pub use retry::retry_transient;
pub use validation::{
    MAX_DESCRIPTION_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN,
    validate_optional_text, validate_password, validate_required_text,
};
