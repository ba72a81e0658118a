//! The unspent-output set
use std::collections::HashMap;

use crate::types::{Integer, OutPoint, TransactionOutput};

/// Mapping from unspent-output key to the output it names.
///
/// Cloning yields an independent snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoPool {
    map: HashMap<OutPoint, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `output` under `outpoint`, replacing any previous entry
    pub fn add_utxo(&mut self, outpoint: OutPoint, output: TransactionOutput) {
        self.map.insert(outpoint, output);
    }

    pub fn remove_utxo(&mut self, outpoint: &OutPoint) -> Option<TransactionOutput> {
        self.map.remove(outpoint)
    }

    pub fn get_tx_output(&self, outpoint: &OutPoint) -> Option<&TransactionOutput> {
        self.map.get(outpoint)
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.map.contains_key(outpoint)
    }

    /// All keys, sorted
    pub fn all_utxo(&self) -> Vec<OutPoint> {
        let mut keys: Vec<OutPoint> = self.map.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Sum of all unspent values; saturates instead of overflowing.
    pub fn total_value(&self) -> Integer {
        self.map
            .values()
            .fold(0, |acc: Integer, output| acc.saturating_add(output.value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OutPoint, &TransactionOutput)> {
        self.map.iter()
    }
}

impl FromIterator<(OutPoint, TransactionOutput)> for UtxoPool {
    fn from_iter<I: IntoIterator<Item = (OutPoint, TransactionOutput)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}
