//! Core ledger types: outputs, inputs, transactions and blocks

use serde::{Deserialize, Serialize};

use crate::crypto::sha256_hash;

/// Hash type: 256-bit content hash
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Natural number type
pub type Natural = u64;

/// Integer type
pub type Integer = i64;

/// OutPoint: the unspent-output key, (producing transaction hash, output index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: Natural,
}

impl OutPoint {
    pub fn new(hash: Hash, index: Natural) -> Self {
        Self { hash, index }
    }
}

/// Transaction Output: value paid to the owner of `address`
///
/// `address` is the owner's serialized secp256k1 public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: Integer,
    pub address: ByteString,
}

/// Transaction Input: a reference to a previous output plus the spender's signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prev_tx_hash: Hash,
    pub output_index: Natural,
    pub signature: ByteString,
}

impl TransactionInput {
    /// The unspent-output key this input consumes
    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.prev_tx_hash, self.output_index)
    }
}

/// Transaction: ordered inputs and ordered outputs
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// A value-minting transaction with no inputs and a single output
    pub fn coinbase(value: Integer, address: ByteString) -> Self {
        Self {
            inputs: Vec::new(),
            outputs: vec![TransactionOutput { value, address }],
        }
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty() && self.outputs.len() == 1
    }

    pub fn add_input(&mut self, prev_tx_hash: Hash, output_index: Natural) {
        self.inputs.push(TransactionInput {
            prev_tx_hash,
            output_index,
            signature: Vec::new(),
        });
    }

    pub fn add_output(&mut self, value: Integer, address: ByteString) {
        self.outputs.push(TransactionOutput { value, address });
    }

    /// Attach `signature` to the input at `index`; returns false if there is no such input
    pub fn add_signature(&mut self, index: usize, signature: ByteString) -> bool {
        match self.inputs.get_mut(index) {
            Some(input) => {
                input.signature = signature;
                true
            }
            None => false,
        }
    }

    /// The output key produced by this transaction at `index`
    pub fn outpoint(&self, index: Natural) -> OutPoint {
        OutPoint::new(self.hash(), index)
    }

    /// Bytes bound by the signature of input `index`:
    /// that input's outpoint followed by every output.
    pub fn raw_data_to_sign(&self, index: usize) -> Option<ByteString> {
        let input = self.inputs.get(index)?;
        let mut data = Vec::new();
        data.extend_from_slice(&input.prev_tx_hash);
        data.extend_from_slice(&input.output_index.to_le_bytes());
        for output in &self.outputs {
            encode_output(&mut data, output);
        }
        Some(data)
    }

    /// Full serialization, signatures included
    pub fn raw_tx(&self) -> ByteString {
        let mut data = Vec::new();
        data.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            data.extend_from_slice(&input.prev_tx_hash);
            data.extend_from_slice(&input.output_index.to_le_bytes());
            data.extend_from_slice(&(input.signature.len() as u32).to_le_bytes());
            data.extend_from_slice(&input.signature);
        }
        data.extend_from_slice(&(self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            encode_output(&mut data, output);
        }
        data
    }

    /// Content hash of the transaction
    pub fn hash(&self) -> Hash {
        sha256_hash(&self.raw_tx())
    }
}

fn encode_output(data: &mut ByteString, output: &TransactionOutput) {
    data.extend_from_slice(&output.value.to_le_bytes());
    data.extend_from_slice(&(output.address.len() as u32).to_le_bytes());
    data.extend_from_slice(&output.address);
}

/// Block: previous-block reference, coinbase and regular transactions
///
/// `prev_block_hash` is `None` only for a genesis block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub prev_block_hash: Option<Hash>,
    pub coinbase: Transaction,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(prev_block_hash: Option<Hash>, coinbase: Transaction) -> Self {
        Self {
            prev_block_hash,
            coinbase,
            transactions: Vec::new(),
        }
    }

    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    pub fn is_genesis(&self) -> bool {
        self.prev_block_hash.is_none()
    }

    /// Content hash over the previous hash, the coinbase and every regular transaction
    pub fn hash(&self) -> Hash {
        let mut data = Vec::new();
        match &self.prev_block_hash {
            Some(prev) => {
                data.push(1);
                data.extend_from_slice(prev);
            }
            None => data.push(0),
        }
        data.extend_from_slice(&self.coinbase.raw_tx());
        for tx in &self.transactions {
            data.extend_from_slice(&tx.raw_tx());
        }
        sha256_hash(&data)
    }
}

/// Validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(String),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}
