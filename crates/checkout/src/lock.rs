//! Checkout input and output records

use std::collections::HashMap;

use keygate_core::constants::NATIVE_BALANCE_KEY;
use keygate_core::{AccountAddress, Address, LockAddress, Seconds, TxHash};
use serde::{Deserialize, Serialize};

/// A lock offered in the checkout. Immutable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lock {
    pub address: LockAddress,
    pub name: String,
    /// Key validity in seconds (`u64::MAX` for keys that never expire)
    pub expiration_duration: Seconds,
    /// Key price as a decimal string in whole currency units (e.g. "0.01")
    pub key_price: String,
    /// ERC20 contract the lock is priced in; `None` for the native currency
    #[serde(default)]
    pub currency_contract_address: Option<Address>,
    #[serde(default)]
    pub currency_symbol: Option<String>,
    #[serde(default)]
    pub max_number_of_keys: u64,
    #[serde(default)]
    pub outstanding_keys: u64,
    #[serde(default)]
    pub unlimited_keys: bool,
}

impl Lock {
    /// Key this lock's currency is listed under in a [`Balances`] map
    pub fn balance_key<'a>(&'a self, native_key: &'a str) -> &'a str {
        match &self.currency_contract_address {
            Some(contract) => contract.as_str(),
            None => native_key,
        }
    }
}

/// Account balances keyed by currency contract address, or by the native key
/// (`"eth"`) for the network currency. Amounts are decimal strings.
pub type Balances = HashMap<String, String>;

/// A key already held by the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveKey {
    pub lock: LockAddress,
    pub owner: AccountAddress,
}

/// Emitted to the parent once a purchase submission yields a transaction hash
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionInfo {
    pub lock: LockAddress,
    pub hash: TxHash,
}

/// Everything about the purchasing account the coordinators read.
/// Read-only for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountContext {
    pub account: AccountAddress,
    #[serde(default)]
    pub balances: Balances,
    #[serde(default)]
    pub active_keys: Vec<ActiveKey>,
    #[serde(default = "default_native_balance_key")]
    pub native_balance_key: String,
}

fn default_native_balance_key() -> String {
    NATIVE_BALANCE_KEY.to_string()
}

impl AccountContext {
    pub fn new(account: AccountAddress) -> Self {
        Self {
            account,
            balances: Balances::new(),
            active_keys: Vec::new(),
            native_balance_key: default_native_balance_key(),
        }
    }

    pub fn with_balance(mut self, currency: impl Into<String>, amount: impl Into<String>) -> Self {
        self.balances.insert(currency.into(), amount.into());
        self
    }

    pub fn with_active_key(mut self, lock: LockAddress) -> Self {
        let owner = self.account.clone();
        self.active_keys.push(ActiveKey { lock, owner });
        self
    }

    /// Key held for `lock`, if any
    pub fn key_for(&self, lock: &LockAddress) -> Option<&ActiveKey> {
        self.active_keys.iter().find(|key| &key.lock == lock)
    }

    pub fn holds_any_key(&self) -> bool {
        !self.active_keys.is_empty()
    }

    /// Balance for a currency key. Contract addresses match case-insensitively.
    pub fn balance(&self, currency: &str) -> Option<&str> {
        self.balances
            .get(currency)
            .or_else(|| {
                self.balances
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(currency))
                    .map(|(_, amount)| amount)
            })
            .map(String::as_str)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn address(byte: u8) -> Address {
        Address::parse(format!("0x{}", format!("{:02x}", byte).repeat(20))).unwrap()
    }

    pub fn lock(byte: u8, price: &str) -> Lock {
        Lock {
            address: address(byte),
            name: format!("Lock {}", byte),
            expiration_duration: 30 * 86_400,
            key_price: price.to_string(),
            currency_contract_address: None,
            currency_symbol: None,
            max_number_of_keys: 100,
            outstanding_keys: 0,
            unlimited_keys: false,
        }
    }

    pub fn account() -> AccountContext {
        AccountContext::new(address(0xaa))
    }
}
