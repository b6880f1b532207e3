//! Error types for Keygate

use thiserror::Error;

/// Core errors that can occur in Keygate
#[derive(Debug, Error)]
pub enum Error {
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("Purchase error: {0}")]
    Purchase(#[from] PurchaseError),

    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Address parsing errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address must start with 0x: {address}")]
    MissingPrefix { address: String },

    #[error("Address {address} has {length} hex digits, expected 40")]
    InvalidLength { address: String, length: usize },

    #[error("Address {address} is not valid hex: {reason}")]
    InvalidHex { address: String, reason: String },
}

/// Checkout session errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Checkout session not found: {id}")]
    SessionNotFound { id: String },

    #[error("Lock {address} is not offered in this checkout")]
    UnknownLock { address: String },

    #[error("No purchase is pending for lock {address}")]
    NoPendingPurchase { address: String },

    #[error("Checkout must offer at least one lock")]
    NoLocks,
}

/// Errors surfaced by the external purchase action
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("Purchase rejected by wallet: {reason}")]
    Rejected { reason: String },

    #[error("Purchase submission failed: {message}")]
    SubmissionFailed { message: String },

    #[error("Purchase was abandoned before a transaction was submitted")]
    Abandoned,
}

/// Event page errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("Event not found: {slug}")]
    NotFound { slug: String },

    #[error("Failed to fetch event: {message}")]
    FetchFailed { message: String },

    #[error("Unknown timezone: {timezone}")]
    InvalidTimezone { timezone: String },

    #[error("Invalid event date or time: {value}")]
    InvalidDate { value: String },
}

/// Result type alias for Keygate operations
pub type Result<T> = std::result::Result<T, Error>;

impl CheckoutError {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SessionNotFound { .. } => "session_not_found",
            Self::UnknownLock { .. } => "unknown_lock",
            Self::NoPendingPurchase { .. } => "no_pending_purchase",
            Self::NoLocks => "no_locks",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::SessionNotFound { .. } | Self::UnknownLock { .. } => 404,
            Self::NoPendingPurchase { .. } => 409,
            Self::NoLocks => 400,
        }
    }
}

impl EventError {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "event_not_found",
            Self::FetchFailed { .. } => "event_fetch_failed",
            Self::InvalidTimezone { .. } => "invalid_timezone",
            Self::InvalidDate { .. } => "invalid_date",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::FetchFailed { .. } => 503,
            Self::InvalidTimezone { .. } | Self::InvalidDate { .. } => 422,
        }
    }
}
