//! Transaction validation against an unspent-output snapshot

use std::collections::HashSet;

use tracing::debug;

use crate::crypto::SignatureVerifier;
use crate::types::*;
use crate::utxo::UtxoPool;

/// Validates transactions against a private copy of the unspent-output set
/// and applies the ones it accepts.
pub struct TxHandler<'v, V: SignatureVerifier> {
    utxo_pool: UtxoPool,
    verifier: &'v V,
}

impl<'v, V: SignatureVerifier> TxHandler<'v, V> {
    pub fn new(utxo_pool: UtxoPool, verifier: &'v V) -> Self {
        Self {
            utxo_pool,
            verifier,
        }
    }

    /// CheckTx: 𝒯𝒳 × 𝒰𝒮 → {valid, invalid}
    ///
    /// A transaction tx is valid against the current pool us iff:
    /// 1. every input's outpoint is in us
    /// 2. every input's signature verifies against the owner of that outpoint
    /// 3. no outpoint is claimed twice by tx
    /// 4. every output value is non-negative
    /// 5. Σ input values ≥ Σ output values
    ///
    /// Performs no mutation.
    pub fn check_tx(&self, tx: &Transaction) -> ValidationResult {
        // 4. output values
        let mut total_output_value: Integer = 0;
        for (i, output) in tx.outputs.iter().enumerate() {
            if output.value < 0 {
                return ValidationResult::Invalid(format!(
                    "Negative value {} at output {}",
                    output.value, i
                ));
            }
            total_output_value = match total_output_value.checked_add(output.value) {
                Some(total) => total,
                None => return ValidationResult::Invalid("Output value overflow".to_string()),
            };
        }

        let mut claimed = HashSet::with_capacity(tx.inputs.len());
        let mut total_input_value: Integer = 0;

        for (i, input) in tx.inputs.iter().enumerate() {
            let outpoint = input.outpoint();

            // 3. internal double spend
            if !claimed.insert(outpoint) {
                return ValidationResult::Invalid(format!("Outpoint claimed twice at input {}", i));
            }

            // 1. presence in the pool
            let utxo = match self.utxo_pool.get_tx_output(&outpoint) {
                Some(utxo) => utxo,
                None => {
                    return ValidationResult::Invalid(format!("Input {} not found in UTXO pool", i))
                }
            };

            // 2. signature by the owner
            let signed_data = match tx.raw_data_to_sign(i) {
                Some(data) => data,
                None => return ValidationResult::Invalid(format!("No signing data for input {}", i)),
            };
            if !self
                .verifier
                .verify(&utxo.address, &signed_data, &input.signature)
            {
                return ValidationResult::Invalid(format!("Invalid signature at input {}", i));
            }

            total_input_value = match total_input_value.checked_add(utxo.value) {
                Some(total) => total,
                None => return ValidationResult::Invalid("Input value overflow".to_string()),
            };
        }

        // 5. value balance
        if total_input_value < total_output_value {
            return ValidationResult::Invalid(format!(
                "Total inputs {} less than total outputs {}",
                total_input_value, total_output_value
            ));
        }

        ValidationResult::Valid
    }

    pub fn is_valid_tx(&self, tx: &Transaction) -> bool {
        self.check_tx(tx).is_valid()
    }

    /// HandleTxs: 𝒯𝒳* × 𝒰𝒮 → 𝒯𝒳* × 𝒰𝒮
    ///
    /// Repeated passes over the not-yet-accepted candidates; each valid candidate
    /// is applied to the pool immediately so later candidates may spend its
    /// outputs. Stops after a pass that accepts nothing. Returns the accepted
    /// transactions in acceptance order.
    pub fn handle_txs(&mut self, possible_txs: &[Transaction]) -> Vec<Transaction> {
        let mut accepted = Vec::new();
        let mut remaining: Vec<(&Transaction, String)> =
            possible_txs.iter().map(|tx| (tx, String::new())).collect();

        loop {
            let mut rejected = Vec::new();
            let before = accepted.len();

            for (tx, _) in remaining {
                match self.check_tx(tx) {
                    ValidationResult::Valid => {
                        self.apply_transaction(tx);
                        accepted.push(tx.clone());
                    }
                    ValidationResult::Invalid(reason) => rejected.push((tx, reason)),
                }
            }

            remaining = rejected;
            if accepted.len() == before || remaining.is_empty() {
                break;
            }
        }

        // Reasons come from the final pass, against the fully updated pool.
        for (tx, reason) in &remaining {
            debug!(tx = %hex::encode(tx.hash()), %reason, "transaction rejected");
        }

        accepted
    }

    /// ApplyTransaction: us' = (us \ {i.prevout : i ∈ tx.inputs}) ∪ {(tx.id, i) ↦ tx.outputs[i]}
    fn apply_transaction(&mut self, tx: &Transaction) {
        for input in &tx.inputs {
            self.utxo_pool.remove_utxo(&input.outpoint());
        }

        let tx_hash = tx.hash();
        for (i, output) in tx.outputs.iter().enumerate() {
            self.utxo_pool
                .add_utxo(OutPoint::new(tx_hash, i as Natural), output.clone());
        }
    }

    pub fn utxo_pool(&self) -> &UtxoPool {
        &self.utxo_pool
    }

    pub fn into_utxo_pool(self) -> UtxoPool {
        self.utxo_pool
    }
}
