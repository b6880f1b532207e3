//! Lock coordinator
//!
//! One coordinator per lock row. It decides which variant the row shows,
//! handles the row's click, and forwards the purchase's transaction hash to
//! the parent exactly once per distinct hash.
//!
//! Variant priority (first match wins):
//!   1. Confirmed           - this lock is purchasing and a hash or key exists
//!   2. Processing          - this lock is purchasing, nothing back yet
//!   3. Disabled            - another lock is purchasing, or any key is held
//!   4. Purchaseable        - balance covers the price
//!   5. InsufficientBalance - otherwise

use std::sync::{Arc, Weak};

use keygate_core::{LockAddress, PurchaseError, TxHash};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::aggregator::TransactionSink;
use crate::format::{user_can_afford_key, LockProps};
use crate::lock::{AccountContext, Lock, TransactionInfo};
use crate::purchase::{KeyPurchaser, PurchaseHook, PurchaseStatus};
use crate::store::{CheckoutSnapshot, CheckoutStore};

/// Presentation variant of a lock row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockVariant {
    Confirmed,
    Processing,
    Disabled,
    Purchaseable,
    InsufficientBalance,
}

impl LockVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Disabled => "disabled",
            Self::Purchaseable => "purchaseable",
            Self::InsufficientBalance => "insufficient_balance",
        }
    }

    /// Only a purchaseable row reacts to clicks in the UI
    pub fn is_clickable(&self) -> bool {
        matches!(self, Self::Purchaseable)
    }
}

/// Derive the variant of `lock`'s row. Pure.
pub fn derive_state(
    lock: &Lock,
    snapshot: &CheckoutSnapshot,
    account: &AccountContext,
    transaction_hash: Option<&TxHash>,
) -> LockVariant {
    let purchasing = snapshot.purchasing_lock_address.as_ref();

    if purchasing == Some(&lock.address) {
        if transaction_hash.is_some() || account.key_for(&lock.address).is_some() {
            return LockVariant::Confirmed;
        }
        return LockVariant::Processing;
    }

    if purchasing.is_some() || account.holds_any_key() {
        return LockVariant::Disabled;
    }

    if user_can_afford_key(lock, account) {
        LockVariant::Purchaseable
    } else {
        LockVariant::InsufficientBalance
    }
}

/// Result of clicking a lock row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClickOutcome {
    /// This lock is now the session's purchase; the purchase action was invoked
    Started,
    /// A purchase was already started in this session; nothing changed
    Ignored { purchasing: LockAddress },
}

/// Remembers the last hash reported so each distinct hash is emitted once
#[derive(Debug, Default)]
pub struct HandleObserver {
    last_seen: Option<TxHash>,
}

impl HandleObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the info to emit if `status` carries a hash not seen before
    pub fn observe(&mut self, lock: &LockAddress, status: &PurchaseStatus) -> Option<TransactionInfo> {
        let hash = status.transaction_hash()?;
        if self.last_seen.as_ref() == Some(hash) {
            return None;
        }
        self.last_seen = Some(hash.clone());
        Some(TransactionInfo {
            lock: lock.clone(),
            hash: hash.clone(),
        })
    }
}

/// Coordinates one lock row of a checkout
pub struct LockCoordinator {
    lock: Arc<Lock>,
    account: Arc<AccountContext>,
    store: CheckoutStore,
    hook: PurchaseHook,
    sink: Arc<dyn TransactionSink>,
}

impl LockCoordinator {
    /// Create the coordinator and start forwarding transaction hashes to `sink`.
    ///
    /// Must be called from within a tokio runtime. The forwarding task ends
    /// when the coordinator is dropped.
    pub fn spawn(
        lock: Lock,
        account: Arc<AccountContext>,
        store: CheckoutStore,
        purchaser: Arc<dyn KeyPurchaser>,
        sink: Arc<dyn TransactionSink>,
    ) -> (Arc<Self>, JoinHandle<()>) {
        let lock = Arc::new(lock);
        let hook = PurchaseHook::new(lock.clone(), account.account.clone(), purchaser);
        let coordinator = Arc::new(Self {
            lock,
            account,
            store,
            hook,
            sink,
        });
        let task = Self::forward_transactions(Arc::downgrade(&coordinator), coordinator.hook.subscribe());
        (coordinator, task)
    }

    fn forward_transactions(
        coordinator: Weak<Self>,
        mut status: tokio::sync::watch::Receiver<PurchaseStatus>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut observer = HandleObserver::new();
            while status.changed().await.is_ok() {
                let current = status.borrow_and_update().clone();
                let Some(this) = coordinator.upgrade() else {
                    break;
                };
                let Some(info) = observer.observe(&this.lock.address, &current) else {
                    continue;
                };
                // Only the session's purchasing lock reports
                if this.store.purchasing_lock_address().await.as_ref() != Some(&info.lock) {
                    tracing::debug!("Dropping stale transaction {} for lock {}", info.hash, info.lock);
                    continue;
                }
                tracing::info!("Emitting transaction {} for lock {}", info.hash, info.lock);
                this.sink.emit_transaction_info(info);
            }
        })
    }

    pub fn lock(&self) -> &Lock {
        &self.lock
    }

    pub fn address(&self) -> &LockAddress {
        &self.lock.address
    }

    pub fn transaction_hash(&self) -> Option<TxHash> {
        self.hook.transaction_hash()
    }

    /// Failure reported by the purchase action, if any
    pub fn purchase_error(&self) -> Option<PurchaseError> {
        self.hook.status().error().cloned()
    }

    pub fn props(&self, base_symbol: &str) -> LockProps {
        LockProps::for_lock(&self.lock, base_symbol)
    }

    /// Current variant of this row
    pub async fn variant(&self) -> LockVariant {
        let snapshot = self.store.snapshot().await;
        let hash = self.hook.transaction_hash();
        derive_state(&self.lock, &snapshot, &self.account, hash.as_ref())
    }

    /// Handle a click on this row.
    ///
    /// No-op once any purchase was started in the session; otherwise records
    /// this lock as purchasing and invokes the purchase action.
    pub async fn on_click(&self) -> ClickOutcome {
        if !self.store.begin_purchase(&self.lock.address).await {
            let purchasing = self
                .store
                .purchasing_lock_address()
                .await
                .unwrap_or_else(|| self.lock.address.clone());
            tracing::debug!(
                "Ignoring click on lock {}: purchase of {} already started",
                self.lock.address,
                purchasing
            );
            return ClickOutcome::Ignored { purchasing };
        }

        tracing::info!("Starting key purchase for lock {}", self.lock.address);
        self.hook.purchase_key();
        ClickOutcome::Started
    }

    pub(crate) fn reset_purchase(&self) {
        self.hook.reset();
    }
}
