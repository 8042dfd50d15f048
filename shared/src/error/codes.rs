//! Unified error codes for the pharmacy POS backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Sale errors
//! - 5xxx: Cart errors
//! - 6xxx: Product errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Refresh token has been revoked
    TokenRevoked = 1005,
    /// Account is disabled
    AccountDisabled = 1006,
    /// Username already registered
    UsernameExists = 1007,
    /// Email already registered
    EmailExists = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2002,

    // ==================== 4xxx: Sale ====================
    /// Sale not found
    SaleNotFound = 4001,
    /// Sale is not in pending state
    SaleNotPending = 4002,
    /// Cart is empty, cannot checkout
    EmptyCart = 4003,
    /// Invalid sale modality
    InvalidModality = 4004,
    /// Invalid sale state filter
    InvalidSaleState = 4005,

    // ==================== 5xxx: Cart ====================
    /// Product not present in cart
    CartItemNotFound = 5001,
    /// Quantity must be greater than zero
    InvalidQuantity = 5002,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Barcode already registered
    BarcodeExists = 6002,
    /// Insufficient stock for requested quantity
    InsufficientStock = 6003,
    /// Product is soft-deleted and unavailable
    ProductDeleted = 6004,
    /// Product is not deleted, cannot restore
    ProductNotDeleted = 6005,
    /// Product has an invalid price
    InvalidPrice = 6006,
    /// Product has no stored image
    ImageNotFound = 6007,
    /// Uploaded image is missing or empty
    InvalidImage = 6008,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Cache store error
    CacheError = 9003,
    /// Configuration error
    ConfigError = 9004,
    /// Service unavailable (transient failure, retries exhausted)
    ServiceUnavailable = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::TokenRevoked => "Refresh token has been revoked",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::UsernameExists => "Username is already registered",
            ErrorCode::EmailExists => "Email is already registered",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Sale
            ErrorCode::SaleNotFound => "Sale not found",
            ErrorCode::SaleNotPending => "Sale is not in pending state",
            ErrorCode::EmptyCart => "Cart is empty",
            ErrorCode::InvalidModality => "Invalid sale modality",
            ErrorCode::InvalidSaleState => "Invalid sale state",

            // Cart
            ErrorCode::CartItemNotFound => "Product is not in the cart",
            ErrorCode::InvalidQuantity => "Quantity must be greater than zero",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::BarcodeExists => "Barcode is already registered",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::ProductDeleted => "Product is not available",
            ErrorCode::ProductNotDeleted => "Product is not deleted",
            ErrorCode::InvalidPrice => "Product has an invalid price",
            ErrorCode::ImageNotFound => "Product image not found",
            ErrorCode::InvalidImage => "Image payload is missing or empty",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::CacheError => "Cache store error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            1 => Ok(Self::Unknown),
            2 => Ok(Self::ValidationFailed),
            3 => Ok(Self::NotFound),
            4 => Ok(Self::AlreadyExists),
            5 => Ok(Self::InvalidRequest),
            6 => Ok(Self::InvalidFormat),
            7 => Ok(Self::RequiredField),
            8 => Ok(Self::ValueOutOfRange),

            1001 => Ok(Self::NotAuthenticated),
            1002 => Ok(Self::InvalidCredentials),
            1003 => Ok(Self::TokenExpired),
            1004 => Ok(Self::TokenInvalid),
            1005 => Ok(Self::TokenRevoked),
            1006 => Ok(Self::AccountDisabled),
            1007 => Ok(Self::UsernameExists),
            1008 => Ok(Self::EmailExists),

            2001 => Ok(Self::PermissionDenied),
            2002 => Ok(Self::AdminRequired),

            4001 => Ok(Self::SaleNotFound),
            4002 => Ok(Self::SaleNotPending),
            4003 => Ok(Self::EmptyCart),
            4004 => Ok(Self::InvalidModality),
            4005 => Ok(Self::InvalidSaleState),

            5001 => Ok(Self::CartItemNotFound),
            5002 => Ok(Self::InvalidQuantity),

            6001 => Ok(Self::ProductNotFound),
            6002 => Ok(Self::BarcodeExists),
            6003 => Ok(Self::InsufficientStock),
            6004 => Ok(Self::ProductDeleted),
            6005 => Ok(Self::ProductNotDeleted),
            6006 => Ok(Self::InvalidPrice),
            6007 => Ok(Self::ImageNotFound),
            6008 => Ok(Self::InvalidImage),

            9001 => Ok(Self::InternalError),
            9002 => Ok(Self::DatabaseError),
            9003 => Ok(Self::CacheError),
            9004 => Ok(Self::ConfigError),
            9005 => Ok(Self::ServiceUnavailable),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
