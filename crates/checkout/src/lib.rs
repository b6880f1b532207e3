//! Multi-lock checkout
//!
//! A checkout offers one or more locks. Each lock row is driven by a
//! [`LockCoordinator`] which derives the row's [`LockVariant`] from the shared
//! [`CheckoutStore`], the account's balances and keys, and the state of its
//! [`PurchaseHook`]. Only one purchase may be started per checkout session.

pub mod aggregator;
pub mod coordinator;
pub mod format;
pub mod lock;
pub mod purchase;
pub mod session;
pub mod store;

pub use aggregator::{TransactionLedger, TransactionSink};
pub use coordinator::{derive_state, ClickOutcome, HandleObserver, LockCoordinator, LockVariant};
pub use format::{
    durations_as_text_from_seconds, formatted_key_price, lock_keys_available, lock_ticker_symbol,
    user_can_afford_key, LockProps,
};
pub use lock::{AccountContext, ActiveKey, Balances, Lock, TransactionInfo};
pub use purchase::{KeyPurchaser, PurchaseHook, PurchaseStatus};
pub use session::{CheckoutSession, LockRow};
pub use store::{CheckoutSnapshot, CheckoutStore};
