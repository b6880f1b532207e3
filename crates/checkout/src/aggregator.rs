//! Parent-side collection of emitted transaction info

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use keygate_core::{LockAddress, TxHash};
use tokio::sync::mpsc;

use crate::lock::TransactionInfo;

/// Receiver of `{lock, hash}` reports from lock coordinators
pub trait TransactionSink: Send + Sync {
    fn emit_transaction_info(&self, info: TransactionInfo);
}

impl TransactionSink for mpsc::UnboundedSender<TransactionInfo> {
    fn emit_transaction_info(&self, info: TransactionInfo) {
        if let Err(e) = self.send(info) {
            tracing::warn!("Transaction info for lock {} dropped: receiver closed", e.0.lock);
        }
    }
}

#[derive(Debug, Default)]
struct Ledger {
    latest: HashMap<LockAddress, TxHash>,
    history: Vec<TransactionInfo>,
}

/// Aggregates transaction info across all locks of a checkout.
///
/// Keeps the latest hash per lock plus every report in arrival order.
#[derive(Clone, Debug, Default)]
pub struct TransactionLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash_for(&self, lock: &LockAddress) -> Option<TxHash> {
        let ledger = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        ledger.latest.get(lock).cloned()
    }

    /// All reports in arrival order
    pub fn history(&self) -> Vec<TransactionInfo> {
        let ledger = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        ledger.history.clone()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .history
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut ledger = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        ledger.latest.clear();
        ledger.history.clear();
    }
}

impl TransactionSink for TransactionLedger {
    fn emit_transaction_info(&self, info: TransactionInfo) {
        tracing::debug!("Recording transaction {} for lock {}", info.hash, info.lock);
        let mut ledger = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        ledger.latest.insert(info.lock.clone(), info.hash.clone());
        ledger.history.push(info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::fixtures::address;

    fn info(byte: u8, hash: &str) -> TransactionInfo {
        TransactionInfo {
            lock: address(byte),
            hash: TxHash::new(hash),
        }
    }

    #[test]
    fn test_ledger_tracks_latest_and_history() {
        let ledger = TransactionLedger::new();
        assert!(ledger.is_empty());

        ledger.emit_transaction_info(info(1, "0xa"));
        ledger.emit_transaction_info(info(2, "0xb"));
        ledger.emit_transaction_info(info(1, "0xc"));

        assert_eq!(ledger.hash_for(&address(1)), Some(TxHash::new("0xc")));
        assert_eq!(ledger.hash_for(&address(2)), Some(TxHash::new("0xb")));
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.history()[0], info(1, "0xa"));

        ledger.clear();
        assert!(ledger.is_empty());
        assert_eq!(ledger.hash_for(&address(1)), None);
    }

    #[test]
    fn test_clones_share_ledger() {
        let ledger = TransactionLedger::new();
        let sink: Arc<dyn TransactionSink> = Arc::new(ledger.clone());
        sink.emit_transaction_info(info(4, "0xd"));
        assert_eq!(ledger.hash_for(&address(4)), Some(TxHash::new("0xd")));
    }

    #[tokio::test]
    async fn test_channel_sink() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.emit_transaction_info(info(5, "0xe"));
        assert_eq!(rx.recv().await, Some(info(5, "0xe")));

        drop(rx);
        // Closed receiver is logged, not a panic
        tx.emit_transaction_info(info(5, "0xf"));
    }
}
