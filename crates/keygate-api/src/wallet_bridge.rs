//! Bridge between checkout purchases and the frontend wallet
//!
//! The browser wallet signs and submits the purchase transaction. A purchase
//! started through the API waits here until the frontend reports the
//! resulting hash (or the wallet's failure) for that lock.

use std::collections::HashMap;

use async_trait::async_trait;
use checkout::{KeyPurchaser, Lock};
use keygate_core::{AccountAddress, CheckoutError, LockAddress, PurchaseError, TxHash};
use tokio::sync::{oneshot, Mutex};

type PendingResult = Result<TxHash, PurchaseError>;

#[derive(Default)]
pub struct WalletBridge {
    pending: Mutex<HashMap<LockAddress, oneshot::Sender<PendingResult>>>,
}

impl WalletBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_pending(&self, lock: &LockAddress) -> bool {
        self.pending.lock().await.contains_key(lock)
    }

    /// Resolve the pending purchase for `lock` with the wallet's result
    pub async fn report(&self, lock: &LockAddress, result: PendingResult) -> Result<(), CheckoutError> {
        let no_pending = || CheckoutError::NoPendingPurchase {
            address: lock.to_string(),
        };
        let sender = self.pending.lock().await.remove(lock).ok_or_else(no_pending)?;

        // A purchase aborted by a checkout reset leaves a closed sender behind
        if sender.is_closed() || sender.send(result).is_err() {
            tracing::warn!("Purchase for lock {} was no longer awaited", lock);
            return Err(no_pending());
        }
        Ok(())
    }
}

#[async_trait]
impl KeyPurchaser for WalletBridge {
    async fn purchase_key(&self, lock: &Lock, account: &AccountAddress) -> Result<TxHash, PurchaseError> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(lock.address.clone(), tx);
        tracing::info!(
            "Awaiting wallet submission for lock {} from {}",
            lock.address,
            account
        );
        rx.await.unwrap_or(Err(PurchaseError::Abandoned))
    }

    async fn cancel_pending(&self) {
        let mut pending = self.pending.lock().await;
        if !pending.is_empty() {
            tracing::info!("Cancelling {} pending wallet purchase(s)", pending.len());
        }
        pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use keygate_core::Address;

    use super::*;

    fn addr(byte: u8) -> Address {
        Address::parse(format!("0x{}", format!("{:02x}", byte).repeat(20))).unwrap()
    }

    fn lock() -> Lock {
        serde_json::from_value(serde_json::json!({
            "address": addr(1).as_str(),
            "name": "General admission",
            "expirationDuration": 86400,
            "keyPrice": "0.01"
        }))
        .unwrap()
    }

    async fn wait_pending(bridge: &WalletBridge, lock: &LockAddress) {
        for _ in 0..100 {
            if bridge.is_pending(lock).await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn test_report_resolves_purchase() {
        let bridge = Arc::new(WalletBridge::new());
        let task = {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.purchase_key(&lock(), &addr(0xaa)).await })
        };
        wait_pending(&bridge, &addr(1)).await;

        bridge.report(&addr(1), Ok(TxHash::new("0x99"))).await.unwrap();
        assert_eq!(task.await.unwrap(), Ok(TxHash::new("0x99")));
        assert!(!bridge.is_pending(&addr(1)).await);
    }

    #[tokio::test]
    async fn test_report_without_pending_purchase() {
        let bridge = WalletBridge::new();
        let err = bridge
            .report(&addr(1), Ok(TxHash::new("0x1")))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::NoPendingPurchase { .. }));
    }

    #[tokio::test]
    async fn test_discarded_sender_abandons_purchase() {
        let bridge = Arc::new(WalletBridge::new());
        let task = {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.purchase_key(&lock(), &addr(0xaa)).await })
        };
        wait_pending(&bridge, &addr(1)).await;

        bridge.pending.lock().await.clear();
        assert_eq!(task.await.unwrap(), Err(PurchaseError::Abandoned));
    }

    #[tokio::test]
    async fn test_cancel_pending_rejects_late_report() {
        let bridge = Arc::new(WalletBridge::new());
        let task = {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.purchase_key(&lock(), &addr(0xaa)).await })
        };
        wait_pending(&bridge, &addr(1)).await;

        bridge.cancel_pending().await;
        assert_eq!(task.await.unwrap(), Err(PurchaseError::Abandoned));

        let err = bridge
            .report(&addr(1), Ok(TxHash::new("0xold")))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::NoPendingPurchase { .. }));
    }

    #[tokio::test]
    async fn test_report_for_aborted_purchase() {
        let bridge = Arc::new(WalletBridge::new());
        let task = {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.purchase_key(&lock(), &addr(0xaa)).await })
        };
        wait_pending(&bridge, &addr(1)).await;
        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        let err = bridge
            .report(&addr(1), Ok(TxHash::new("0xold")))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::NoPendingPurchase { .. }));
        assert!(!bridge.is_pending(&addr(1)).await);
    }
}
