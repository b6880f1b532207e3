//! Shared checkout store
//!
//! One store per checkout session, cloned into every lock coordinator.
//! It holds the single lock address being purchased, if any.

use std::sync::Arc;

use keygate_core::LockAddress;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Point-in-time view of the store, used for pure state derivation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSnapshot {
    pub session_id: Uuid,
    pub purchasing_lock_address: Option<LockAddress>,
}

impl CheckoutSnapshot {
    /// Snapshot of a fresh session
    pub fn idle() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            purchasing_lock_address: None,
        }
    }

    pub fn purchasing(address: LockAddress) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            purchasing_lock_address: Some(address),
        }
    }
}

#[derive(Debug)]
struct CheckoutState {
    session_id: Uuid,
    purchasing_lock_address: Option<LockAddress>,
}

/// Session-scoped checkout store
#[derive(Clone, Debug)]
pub struct CheckoutStore {
    inner: Arc<RwLock<CheckoutState>>,
}

impl CheckoutStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(CheckoutState {
                session_id: Uuid::new_v4(),
                purchasing_lock_address: None,
            })),
        }
    }

    pub async fn session_id(&self) -> Uuid {
        self.inner.read().await.session_id
    }

    /// Lock currently being (or already) purchased in this session
    pub async fn purchasing_lock_address(&self) -> Option<LockAddress> {
        self.inner.read().await.purchasing_lock_address.clone()
    }

    /// Overwrite the purchasing address. No validation.
    pub async fn set_purchasing_lock_address(&self, address: LockAddress) {
        let mut state = self.inner.write().await;
        state.purchasing_lock_address = Some(address);
    }

    /// Record `address` as purchasing unless a purchase was already started.
    ///
    /// Check and write happen under one write guard. Returns `false` and
    /// leaves the store untouched when an address is already held.
    pub async fn begin_purchase(&self, address: &LockAddress) -> bool {
        let mut state = self.inner.write().await;
        if state.purchasing_lock_address.is_some() {
            return false;
        }
        state.purchasing_lock_address = Some(address.clone());
        true
    }

    pub async fn snapshot(&self) -> CheckoutSnapshot {
        let state = self.inner.read().await;
        CheckoutSnapshot {
            session_id: state.session_id,
            purchasing_lock_address: state.purchasing_lock_address.clone(),
        }
    }

    /// Start a new checkout session
    pub async fn reset(&self) -> Uuid {
        let mut state = self.inner.write().await;
        state.session_id = Uuid::new_v4();
        state.purchasing_lock_address = None;
        tracing::debug!("Checkout store reset, new session {}", state.session_id);
        state.session_id
    }
}

impl Default for CheckoutStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::fixtures::address;

    #[tokio::test]
    async fn test_new_store_is_idle() {
        let store = CheckoutStore::new();
        assert_eq!(store.purchasing_lock_address().await, None);
    }

    #[tokio::test]
    async fn test_set_overwrites_unconditionally() {
        let store = CheckoutStore::new();
        store.set_purchasing_lock_address(address(1)).await;
        store.set_purchasing_lock_address(address(2)).await;
        assert_eq!(store.purchasing_lock_address().await, Some(address(2)));
    }

    #[tokio::test]
    async fn test_begin_purchase_only_once() {
        let store = CheckoutStore::new();
        assert!(store.begin_purchase(&address(1)).await);
        assert!(!store.begin_purchase(&address(2)).await);
        assert!(!store.begin_purchase(&address(1)).await);
        assert_eq!(store.purchasing_lock_address().await, Some(address(1)));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = CheckoutStore::new();
        let other = store.clone();
        assert!(other.begin_purchase(&address(3)).await);
        assert_eq!(store.purchasing_lock_address().await, Some(address(3)));
        assert_eq!(store.session_id().await, other.session_id().await);
    }

    #[tokio::test]
    async fn test_concurrent_begins_admit_one() {
        let store = CheckoutStore::new();
        let mut handles = Vec::new();
        for byte in 1..=16u8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.begin_purchase(&address(byte)).await
            }));
        }
        let mut started = 0;
        for handle in handles {
            if handle.await.unwrap() {
                started += 1;
            }
        }
        assert_eq!(started, 1);
        assert!(store.purchasing_lock_address().await.is_some());
    }

    #[tokio::test]
    async fn test_reset_starts_new_session() {
        let store = CheckoutStore::new();
        let before = store.session_id().await;
        store.begin_purchase(&address(1)).await;

        let after = store.reset().await;
        assert_ne!(before, after);
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.session_id, after);
        assert_eq!(snapshot.purchasing_lock_address, None);
    }
}
