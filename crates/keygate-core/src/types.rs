//! Core type definitions for Keygate

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::AddressError;

/// EVM account or contract address (20 bytes, `0x`-prefixed hex).
///
/// Stored lowercase so that checksummed and plain spellings of the same
/// address compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and normalize an address.
    pub fn parse(addr: impl AsRef<str>) -> Result<Self, AddressError> {
        let raw = addr.as_ref().trim();
        let digits = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .ok_or_else(|| AddressError::MissingPrefix {
                address: raw.to_string(),
            })?;

        if digits.len() != 40 {
            return Err(AddressError::InvalidLength {
                address: raw.to_string(),
                length: digits.len(),
            });
        }

        hex::decode(digits).map_err(|e| AddressError::InvalidHex {
            address: raw.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of a lock contract
pub type LockAddress = Address;

/// Address of the purchasing account
pub type AccountAddress = Address;

/// Transaction handle returned once a purchase submission is accepted.
///
/// Opaque: the ledger decides its format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// EVM chain id
pub type ChainId = u64;

/// Well-known networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Goerli,
    Polygon,
    Gnosis,
    Optimism,
    Arbitrum,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Goerli => "goerli",
            Self::Polygon => "polygon",
            Self::Gnosis => "gnosis",
            Self::Optimism => "optimism",
            Self::Arbitrum => "arbitrum",
        }
    }

    pub fn chain_id(&self) -> ChainId {
        match self {
            Self::Mainnet => 1,
            Self::Goerli => 5,
            Self::Polygon => 137,
            Self::Gnosis => 100,
            Self::Optimism => 10,
            Self::Arbitrum => 42161,
        }
    }

    /// Symbol of the currency used to pay gas and native-priced keys
    pub fn base_currency_symbol(&self) -> &'static str {
        match self {
            Self::Mainnet | Self::Goerli | Self::Optimism | Self::Arbitrum => "ETH",
            Self::Polygon => "MATIC",
            Self::Gnosis => "xDAI",
        }
    }

    pub fn from_chain_id(chain_id: ChainId) -> Option<Self> {
        match chain_id {
            1 => Some(Self::Mainnet),
            5 => Some(Self::Goerli),
            137 => Some(Self::Polygon),
            100 => Some(Self::Gnosis),
            10 => Some(Self::Optimism),
            42161 => Some(Self::Arbitrum),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key expiration in seconds
pub type Seconds = u64;

/// Constants
pub mod constants {
    use super::Seconds;

    /// Expiration duration used by locks whose keys never expire
    pub const NON_EXPIRING_DURATION: Seconds = u64::MAX;

    /// Balance key for the native currency of a network
    pub const NATIVE_BALANCE_KEY: &str = "eth";

    pub const SECONDS_PER_MINUTE: Seconds = 60;
    pub const SECONDS_PER_HOUR: Seconds = 60 * SECONDS_PER_MINUTE;
    pub const SECONDS_PER_DAY: Seconds = 24 * SECONDS_PER_HOUR;
}
