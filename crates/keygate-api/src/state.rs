//! Application state shared across API handlers

use std::collections::HashMap;
use std::sync::Arc;

use checkout::{AccountContext, CheckoutSession, KeyPurchaser, Lock};
use event_page::LockManagers;
use keygate_core::{AccountAddress, AppConfig, CheckoutError, LockAddress};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::catalog::EventCatalog;
use crate::wallet_bridge::WalletBridge;

/// A checkout opened through the API and the bridge its purchases wait on
pub struct CheckoutEntry {
    pub session: CheckoutSession,
    pub bridge: Arc<WalletBridge>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RwLock<AppConfig>,
    checkouts: RwLock<HashMap<Uuid, Arc<CheckoutEntry>>>,
    events: Arc<EventCatalog>,
    lock_managers: RwLock<LockManagers>,
}

impl AppState {
    /// Create a new application state with default config
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create with a specific config
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config: RwLock::new(config),
                checkouts: RwLock::new(HashMap::new()),
                events: Arc::new(EventCatalog::new()),
                lock_managers: RwLock::new(LockManagers::new()),
            }),
        }
    }

    /// Get current config
    pub async fn config(&self) -> AppConfig {
        self.inner.config.read().await.clone()
    }

    /// Open a checkout and return its id
    pub async fn open_checkout(
        &self,
        locks: Vec<Lock>,
        account: AccountContext,
    ) -> Result<(Uuid, Arc<CheckoutEntry>), CheckoutError> {
        let network = self.inner.config.read().await.network.clone();
        let bridge = Arc::new(WalletBridge::new());
        let session = CheckoutSession::new(locks, account, network, bridge.clone())?;

        let id = Uuid::new_v4();
        let entry = Arc::new(CheckoutEntry { session, bridge });
        self.inner.checkouts.write().await.insert(id, entry.clone());
        tracing::info!("Opened checkout {}", id);
        Ok((id, entry))
    }

    pub async fn checkout(&self, id: Uuid) -> Result<Arc<CheckoutEntry>, CheckoutError> {
        self.inner
            .checkouts
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| CheckoutError::SessionNotFound { id: id.to_string() })
    }

    /// Remove a checkout. Its pending wallet purchases are cancelled and its
    /// forwarder tasks stop once the last handler holding it returns.
    pub async fn close_checkout(&self, id: Uuid) -> Result<(), CheckoutError> {
        let entry = self
            .inner
            .checkouts
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| CheckoutError::SessionNotFound { id: id.to_string() })?;
        entry.bridge.cancel_pending().await;
        tracing::info!("Closed checkout {}", id);
        Ok(())
    }

    pub async fn open_checkouts(&self) -> usize {
        self.inner.checkouts.read().await.len()
    }

    pub fn events(&self) -> Arc<EventCatalog> {
        self.inner.events.clone()
    }

    pub async fn lock_managers(&self) -> LockManagers {
        self.inner.lock_managers.read().await.clone()
    }

    pub async fn add_lock_managers(
        &self,
        managers: impl IntoIterator<Item = (LockAddress, AccountAddress)>,
    ) {
        let mut known = self.inner.lock_managers.write().await;
        for (lock, manager) in managers {
            known.add(lock, manager);
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
