//! Checkout session: all lock rows of one checkout sharing one store

use std::sync::Arc;

use keygate_core::{CheckoutError, LockAddress, NetworkConfig, TxHash};
use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::aggregator::{TransactionLedger, TransactionSink};
use crate::coordinator::{ClickOutcome, LockCoordinator, LockVariant};
use crate::format::LockProps;
use crate::lock::{AccountContext, Lock, TransactionInfo};
use crate::purchase::KeyPurchaser;
use crate::store::CheckoutStore;

/// Everything a renderer needs for one lock row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRow {
    #[serde(flatten)]
    pub props: LockProps,
    pub variant: LockVariant,
    pub transaction_hash: Option<TxHash>,
    pub purchase_error: Option<String>,
}

/// One user's checkout across one or more locks
pub struct CheckoutSession {
    store: CheckoutStore,
    account: Arc<AccountContext>,
    network: NetworkConfig,
    coordinators: Vec<Arc<LockCoordinator>>,
    ledger: TransactionLedger,
    purchaser: Arc<dyn KeyPurchaser>,
    forwarders: Vec<JoinHandle<()>>,
}

impl CheckoutSession {
    /// Build one coordinator per lock. Must be called within a tokio runtime.
    pub fn new(
        locks: Vec<Lock>,
        account: AccountContext,
        network: NetworkConfig,
        purchaser: Arc<dyn KeyPurchaser>,
    ) -> Result<Self, CheckoutError> {
        if locks.is_empty() {
            return Err(CheckoutError::NoLocks);
        }

        let store = CheckoutStore::new();
        let account = Arc::new(account);
        let ledger = TransactionLedger::new();
        let sink: Arc<dyn TransactionSink> = Arc::new(ledger.clone());

        let mut coordinators = Vec::with_capacity(locks.len());
        let mut forwarders = Vec::with_capacity(locks.len());
        for lock in locks {
            let (coordinator, task) = LockCoordinator::spawn(
                lock,
                account.clone(),
                store.clone(),
                purchaser.clone(),
                sink.clone(),
            );
            coordinators.push(coordinator);
            forwarders.push(task);
        }

        tracing::debug!(
            "Checkout for {} opened with {} locks",
            account.account,
            coordinators.len()
        );

        Ok(Self {
            store,
            account,
            network,
            coordinators,
            ledger,
            purchaser,
            forwarders,
        })
    }

    pub fn store(&self) -> &CheckoutStore {
        &self.store
    }

    pub fn account(&self) -> &AccountContext {
        &self.account
    }

    pub async fn session_id(&self) -> Uuid {
        self.store.session_id().await
    }

    pub fn coordinator(&self, address: &LockAddress) -> Result<&Arc<LockCoordinator>, CheckoutError> {
        self.coordinators
            .iter()
            .find(|c| c.address() == address)
            .ok_or_else(|| CheckoutError::UnknownLock {
                address: address.to_string(),
            })
    }

    /// Evaluate every row in offer order
    pub async fn rows(&self) -> Vec<LockRow> {
        let base_symbol = self.network.base_symbol();
        let mut rows = Vec::with_capacity(self.coordinators.len());
        for coordinator in &self.coordinators {
            rows.push(LockRow {
                props: coordinator.props(base_symbol),
                variant: coordinator.variant().await,
                transaction_hash: coordinator.transaction_hash(),
                purchase_error: coordinator.purchase_error().map(|e| e.to_string()),
            });
        }
        rows
    }

    pub async fn click(&self, address: &LockAddress) -> Result<ClickOutcome, CheckoutError> {
        let coordinator = self.coordinator(address)?;
        Ok(coordinator.on_click().await)
    }

    /// Transaction info emitted so far, in arrival order
    pub fn transactions(&self) -> Vec<TransactionInfo> {
        self.ledger.history()
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    /// Start a new checkout session over the same locks and account.
    ///
    /// Purchases still in flight are aborted and the purchaser drops what it
    /// was waiting on, so no result from the old session reaches the ledger.
    pub async fn reset(&self) -> Uuid {
        let session_id = self.store.reset().await;
        for coordinator in &self.coordinators {
            coordinator.reset_purchase();
        }
        self.purchaser.cancel_pending().await;
        self.ledger.clear();
        session_id
    }
}

impl Drop for CheckoutSession {
    fn drop(&mut self) {
        for task in &self.forwarders {
            task.abort();
        }
    }
}
