//! Configuration types for Keygate

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::NATIVE_BALANCE_KEY;
use crate::{Error, Network};

/// Network configuration for a checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network the locks live on
    pub network: Network,

    /// Symbol shown next to native-currency key prices.
    /// Defaults to the network's own symbol when empty.
    #[serde(default)]
    pub base_currency_symbol: String,

    /// Key under which the native balance appears in a `Balances` map
    #[serde(default = "default_native_balance_key")]
    pub native_balance_key: String,
}

fn default_native_balance_key() -> String {
    NATIVE_BALANCE_KEY.to_string()
}

impl NetworkConfig {
    pub fn base_symbol(&self) -> &str {
        if self.base_currency_symbol.is_empty() {
            self.network.base_currency_symbol()
        } else {
            &self.base_currency_symbol
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            base_currency_symbol: String::new(),
            native_balance_key: default_native_balance_key(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Network settings
    #[serde(default)]
    pub network: NetworkConfig,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Public site URL used to build event links
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Locale used when the viewer does not provide one
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

fn default_api_port() -> u16 {
    19080
}

fn default_site_url() -> String {
    "https://app.unlock-protocol.com".to_string()
}

fn default_locale() -> String {
    "en-US".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            api_port: default_api_port(),
            site_url: default_site_url(),
            default_locale: default_locale(),
        }
    }
}

impl AppConfig {
    /// Parse a JSON config document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}
