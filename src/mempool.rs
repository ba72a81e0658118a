//! Pending transactions proposed for the next block

use std::collections::HashMap;

use crate::types::{Hash, Transaction};

/// Holding area keyed by transaction hash; performs no validation.
#[derive(Debug, Clone, Default)]
pub struct TransactionPool {
    transactions: HashMap<Hash, Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `tx`; a transaction with the same hash is stored once
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.insert(tx.hash(), tx);
    }

    pub fn remove_transaction(&mut self, tx_hash: &Hash) -> Option<Transaction> {
        self.transactions.remove(tx_hash)
    }

    pub fn get_transaction(&self, tx_hash: &Hash) -> Option<&Transaction> {
        self.transactions.get(tx_hash)
    }

    pub fn contains(&self, tx_hash: &Hash) -> bool {
        self.transactions.contains_key(tx_hash)
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
