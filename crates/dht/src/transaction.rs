use std::collections::HashMap;

use lokinet_core::RouterId;

use crate::error::{DhtError, Result};

/// Default per-transaction timeout (§4.7).
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionKey {
    pub asker: RouterId,
    pub txid: u64,
}

#[derive(Debug, Clone)]
pub enum PendingKind {
    FindRouter { target: RouterId },
    FindIntro { service_key: [u8; 32] },
    PublishIntro,
}

#[derive(Debug, Clone)]
pub struct PendingTransaction {
    pub kind: PendingKind,
    pub started_at: u64,
}

/// Outstanding lookups and publishes, keyed by `(RouterID asker, txid)` (§4.7). Duplicate ids
/// from the same asker are rejected rather than silently overwriting the earlier transaction.
#[derive(Default)]
pub struct TransactionTable {
    pending: HashMap<TransactionKey, PendingTransaction>,
}

impl TransactionTable {
    pub fn new() -> Self {
        Self { pending: HashMap::new() }
    }

    pub fn start(&mut self, key: TransactionKey, kind: PendingKind, now: u64) -> Result<()> {
        if self.pending.contains_key(&key) {
            return Err(DhtError::DuplicateTransaction(key.asker));
        }
        self.pending.insert(key, PendingTransaction { kind, started_at: now });
        Ok(())
    }

    /// Remove and return a transaction on receipt of its matching response.
    pub fn complete(&mut self, key: &TransactionKey) -> Option<PendingTransaction> {
        self.pending.remove(key)
    }

    /// Drop transactions older than `DEFAULT_TIMEOUT_SECS`; pending lookups resolve to "not
    /// found" and pending publishes are simply forgotten (§4.7).
    pub fn expire(&mut self, now: u64) -> Vec<TransactionKey> {
        let expired: Vec<TransactionKey> = self
            .pending
            .iter()
            .filter(|(_, tx)| now.saturating_sub(tx.started_at) >= DEFAULT_TIMEOUT_SECS)
            .map(|(key, _)| *key)
            .collect();
        for key in &expired {
            self.pending.remove(key);
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_txid_from_same_asker_is_rejected() {
        let mut table = TransactionTable::new();
        let key = TransactionKey { asker: [1u8; 32], txid: 9 };
        table.start(key, PendingKind::PublishIntro, 0).unwrap();
        let err = table.start(key, PendingKind::PublishIntro, 0).unwrap_err();
        assert!(matches!(err, DhtError::DuplicateTransaction(_)));
    }

    #[test]
    fn same_txid_from_different_asker_is_independent() {
        let mut table = TransactionTable::new();
        table
            .start(TransactionKey { asker: [1u8; 32], txid: 9 }, PendingKind::PublishIntro, 0)
            .unwrap();
        table
            .start(TransactionKey { asker: [2u8; 32], txid: 9 }, PendingKind::PublishIntro, 0)
            .unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn expire_drops_old_transactions_only() {
        let mut table = TransactionTable::new();
        let old = TransactionKey { asker: [1u8; 32], txid: 1 };
        let fresh = TransactionKey { asker: [2u8; 32], txid: 2 };
        table.start(old, PendingKind::PublishIntro, 0).unwrap();
        table.start(fresh, PendingKind::PublishIntro, 15).unwrap();

        let expired = table.expire(20);
        assert_eq!(expired, vec![old]);
        assert_eq!(table.len(), 1);
        assert!(table.complete(&fresh).is_some());
    }
}
