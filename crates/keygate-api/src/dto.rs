//! Data Transfer Objects for API requests and responses

use checkout::{AccountContext, Lock, LockRow};
use event_page::{CheckoutConfig, Event};
use keygate_core::{AccountAddress, LockAddress, TxHash};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub network: String,
}

impl HealthResponse {
    pub fn for_network(network: &str) -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            network: network.to_string(),
        }
    }
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }
}

/// Open a checkout over one or more locks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    pub locks: Vec<Lock>,
    pub account: AccountContext,
}

/// Checkout state as seen by the frontend
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub checkout_id: Uuid,
    pub session_id: Uuid,
    pub purchasing_lock_address: Option<LockAddress>,
    pub locks: Vec<LockRow>,
}

/// Wallet result for a pending purchase: either the submitted hash or the
/// wallet's error message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTransactionRequest {
    #[serde(default)]
    pub hash: Option<TxHash>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub session_id: Uuid,
}

/// A lock and one of its managers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockManagerDto {
    pub lock: LockAddress,
    pub manager: AccountAddress,
}

/// Publish or update an event page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertEventRequest {
    pub event: Event,
    pub checkout_config: CheckoutConfig,
    #[serde(default)]
    pub lock_managers: Vec<LockManagerDto>,
}

/// Query for `GET /events/:slug`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventQuery {
    #[serde(default)]
    pub viewer: Option<AccountAddress>,
    #[serde(default)]
    pub locale: Option<String>,
}
