//! Lock display helpers
//!
//! Pure functions, no async. These build the strings a lock row shows and
//! the affordability check that separates Purchaseable from
//! InsufficientBalance.

use keygate_core::constants::{
    NON_EXPIRING_DURATION, SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE,
};
use keygate_core::{LockAddress, Seconds};
use serde::Serialize;

use crate::lock::{AccountContext, Lock};

/// Display props handed to the variant renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockProps {
    pub address: LockAddress,
    pub name: String,
    pub formatted_duration: String,
    pub formatted_key_price: String,
    pub formatted_keys_available: String,
}

impl LockProps {
    pub fn for_lock(lock: &Lock, base_symbol: &str) -> Self {
        Self {
            address: lock.address.clone(),
            name: lock.name.clone(),
            formatted_duration: durations_as_text_from_seconds(lock.expiration_duration),
            formatted_key_price: formatted_key_price(lock, base_symbol),
            formatted_keys_available: lock_keys_available(lock),
        }
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Human readable key duration, e.g. "1 day, 2 hours and 30 minutes".
pub fn durations_as_text_from_seconds(seconds: Seconds) -> String {
    if seconds == NON_EXPIRING_DURATION {
        return "Forever".to_string();
    }
    if seconds == 0 {
        return plural(0, "second");
    }

    let days = seconds / SECONDS_PER_DAY;
    let hours = (seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
    let minutes = (seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let secs = seconds % SECONDS_PER_MINUTE;

    let parts: Vec<String> = [
        (days, "day"),
        (hours, "hour"),
        (minutes, "minute"),
        (secs, "second"),
    ]
    .iter()
    .filter(|(count, _)| *count > 0)
    .map(|(count, unit)| plural(*count, unit))
    .collect();

    match parts.split_last() {
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} and {}", rest.join(", "), last),
        None => plural(0, "second"),
    }
}

/// Currency symbol for a lock's key price
pub fn lock_ticker_symbol(lock: &Lock, base_symbol: &str) -> String {
    match (&lock.currency_contract_address, &lock.currency_symbol) {
        (None, _) => base_symbol.to_string(),
        (Some(_), Some(symbol)) if !symbol.is_empty() => symbol.clone(),
        (Some(_), _) => "ERC20".to_string(),
    }
}

/// "{price} {symbol}"
pub fn formatted_key_price(lock: &Lock, base_symbol: &str) -> String {
    format!("{} {}", lock.key_price, lock_ticker_symbol(lock, base_symbol))
}

/// Remaining keys, or "Unlimited"
pub fn lock_keys_available(lock: &Lock) -> String {
    if lock.unlimited_keys {
        return "Unlimited".to_string();
    }
    number_with_commas(lock.max_number_of_keys.saturating_sub(lock.outstanding_keys))
}

fn number_with_commas(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Whether the account's balance in the lock's currency covers the key price.
///
/// A missing or unparseable balance (or price) never affords, even for a
/// free lock.
pub fn user_can_afford_key(lock: &Lock, account: &AccountContext) -> bool {
    let Ok(price) = lock.key_price.trim().parse::<f64>() else {
        return false;
    };
    let currency = lock.balance_key(&account.native_balance_key);
    let Some(balance) = account
        .balance(currency)
        .and_then(|b| b.trim().parse::<f64>().ok())
    else {
        return false;
    };
    price <= balance
}
