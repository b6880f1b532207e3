//! Purchase hook
//!
//! Wraps the external purchase action for one (lock, account) pair and
//! publishes its progress on a watch channel. The transaction hash shows up
//! there once the wallet has submitted the purchase.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use keygate_core::{AccountAddress, PurchaseError, TxHash};
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};

use crate::lock::Lock;

/// External wallet/contract layer that submits key purchases
#[async_trait]
pub trait KeyPurchaser: Send + Sync {
    /// Submit a key purchase; resolves with the transaction hash once the
    /// ledger has accepted the submission.
    async fn purchase_key(
        &self,
        lock: &Lock,
        account: &AccountAddress,
    ) -> Result<TxHash, PurchaseError>;

    /// Drop every purchase still waiting on the wallet. Called when the
    /// checkout starts a new session.
    async fn cancel_pending(&self) {}
}

/// Progress of a purchase
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PurchaseStatus {
    #[default]
    Idle,
    Submitting,
    Submitted(TxHash),
    Failed(PurchaseError),
}

impl PurchaseStatus {
    pub fn transaction_hash(&self) -> Option<&TxHash> {
        match self {
            Self::Submitted(hash) => Some(hash),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&PurchaseError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Purchase action for one lock, bound to the purchasing account
pub struct PurchaseHook {
    lock: Arc<Lock>,
    account: AccountAddress,
    purchaser: Arc<dyn KeyPurchaser>,
    status: Arc<watch::Sender<PurchaseStatus>>,
    /// Bumped on reset; results of purchases started earlier are dropped
    generation: Arc<AtomicU64>,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl PurchaseHook {
    pub fn new(lock: Arc<Lock>, account: AccountAddress, purchaser: Arc<dyn KeyPurchaser>) -> Self {
        let (status, _) = watch::channel(PurchaseStatus::Idle);
        Self {
            lock,
            account,
            purchaser,
            status: Arc::new(status),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(None),
        }
    }

    /// Subscribe to status changes
    pub fn subscribe(&self) -> watch::Receiver<PurchaseStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> PurchaseStatus {
        self.status.borrow().clone()
    }

    pub fn transaction_hash(&self) -> Option<TxHash> {
        self.status.borrow().transaction_hash().cloned()
    }

    /// Start the purchase in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn purchase_key(&self) -> JoinHandle<()> {
        self.status.send_replace(PurchaseStatus::Submitting);

        let lock = self.lock.clone();
        let account = self.account.clone();
        let purchaser = self.purchaser.clone();
        let status = self.status.clone();
        let generation = self.generation.clone();
        let started = generation.load(Ordering::SeqCst);

        let task = tokio::spawn(async move {
            let outcome = match purchaser.purchase_key(&lock, &account).await {
                Ok(hash) => {
                    tracing::info!("Purchase for lock {} submitted: {}", lock.address, hash);
                    PurchaseStatus::Submitted(hash)
                }
                Err(e) => {
                    tracing::warn!("Purchase for lock {} failed: {}", lock.address, e);
                    PurchaseStatus::Failed(e)
                }
            };
            let published = status.send_if_modified(|current| {
                if generation.load(Ordering::SeqCst) != started {
                    return false;
                }
                *current = outcome;
                true
            });
            if !published {
                tracing::debug!("Dropping result of reset purchase for lock {}", lock.address);
            }
        });

        let previous = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task.abort_handle());
        if let Some(previous) = previous {
            previous.abort();
        }
        task
    }

    /// Back to idle for a new checkout session. A purchase still running is
    /// aborted and its result never published.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = in_flight {
            task.abort();
        }
        self.status.send_replace(PurchaseStatus::Idle);
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::*;
    use super::*;
    use crate::lock::fixtures::*;

    fn hook(purchaser: Arc<dyn KeyPurchaser>) -> PurchaseHook {
        PurchaseHook::new(Arc::new(lock(1, "1")), address(0xaa), purchaser)
    }

    #[tokio::test]
    async fn test_successful_purchase_publishes_hash() {
        let purchaser = ScriptedPurchaser::ok("0xfeed");
        let hook = hook(purchaser.clone());
        assert_eq!(hook.status(), PurchaseStatus::Idle);

        hook.purchase_key().await.unwrap();
        assert_eq!(hook.transaction_hash(), Some(TxHash::new("0xfeed")));
        assert_eq!(purchaser.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_purchase_is_recorded() {
        let hook = hook(ScriptedPurchaser::failing(PurchaseError::Rejected {
            reason: "user denied".into(),
        }));

        hook.purchase_key().await.unwrap();
        let status = hook.status();
        assert_eq!(status.transaction_hash(), None);
        assert!(matches!(status.error(), Some(PurchaseError::Rejected { .. })));
    }

    #[tokio::test]
    async fn test_status_is_submitting_while_pending() {
        let hook = hook(Arc::new(StuckPurchaser));
        let task = hook.purchase_key();
        assert_eq!(hook.status(), PurchaseStatus::Submitting);
        task.abort();
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let hook = hook(ScriptedPurchaser::ok("0x01"));
        let mut rx = hook.subscribe();
        hook.purchase_key().await.unwrap();

        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen, PurchaseStatus::Submitted(TxHash::new("0x01")));

        hook.reset();
        assert_eq!(hook.status(), PurchaseStatus::Idle);
    }

    #[tokio::test]
    async fn test_reset_aborts_in_flight_purchase() {
        let purchaser = GatedPurchaser::new();
        let hook = hook(purchaser.clone());
        let task = hook.purchase_key();
        assert_eq!(hook.status(), PurchaseStatus::Submitting);

        hook.reset();
        purchaser.release(1);

        assert!(task.await.unwrap_err().is_cancelled());
        assert_eq!(hook.status(), PurchaseStatus::Idle);
        assert_eq!(hook.transaction_hash(), None);
    }

    #[tokio::test]
    async fn test_purchase_after_reset_publishes() {
        let purchaser = GatedPurchaser::new();
        let hook = hook(purchaser.clone());
        let _stale = hook.purchase_key();
        hook.reset();

        let task = hook.purchase_key();
        purchaser.release(1);
        task.await.unwrap();
        assert_eq!(hook.transaction_hash(), Some(TxHash::new("tx-Lock 1")));
    }
}
