//! Event records and their checkout configuration

use indexmap::IndexMap;
use keygate_core::{ChainId, LockAddress};
use serde::{Deserialize, Serialize};

/// Ticketing metadata attached to an event. Dates are `YYYY-MM-DD`, times
/// `HH:MM` in the event's timezone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(default)]
    pub event_start_date: Option<String>,
    #[serde(default)]
    pub event_start_time: Option<String>,
    #[serde(default)]
    pub event_end_date: Option<String>,
    #[serde(default)]
    pub event_end_time: Option<String>,
    /// IANA timezone name; UTC when absent
    #[serde(default)]
    pub event_timezone: Option<String>,
    #[serde(default)]
    pub event_address: Option<String>,
    #[serde(default)]
    pub event_cover_image: Option<String>,
}

/// An event page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Hex color without the leading `#`
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub ticket: Ticket,
}

impl Event {
    pub fn has_location(&self) -> bool {
        self.ticket
            .event_address
            .as_deref()
            .is_some_and(|address| !address.is_empty())
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.ticket
            .event_cover_image
            .as_deref()
            .filter(|image| !image.is_empty())
    }
}

/// Per-lock entry of a paywall config
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaywallLockConfig {
    #[serde(default)]
    pub network: Option<ChainId>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Paywall config listing the locks sold on the event page, in display order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaywallConfig {
    pub locks: IndexMap<LockAddress, PaywallLockConfig>,
    #[serde(default)]
    pub network: Option<ChainId>,
}

impl PaywallConfig {
    /// Lock network, falling back to the config-wide network
    pub fn network_for(&self, lock: &LockAddress) -> Option<ChainId> {
        self.locks
            .get(lock)
            .and_then(|entry| entry.network)
            .or(self.network)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default)]
    pub id: Option<String>,
    pub config: PaywallConfig,
}

/// Public URL of an event page
pub fn get_event_url(site_url: &str, slug: &str) -> String {
    format!("{}/event/{}", site_url.trim_end_matches('/'), slug)
}
