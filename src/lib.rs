//! # UTXO-Chain
//!
//! Bounded-memory view of a UTXO ledger that grows as a tree of blocks.
//!
//! The crate accepts blocks one at a time, validates the transactions each block
//! carries against the unspent-output set of the block it extends, follows the
//! tallest branch, and forgets history that can no longer be extended.
//!
//! ## Architecture
//!
//! Leaves first:
//! - [`utxo::UtxoPool`]: unspent-output set, copied per branch
//! - [`transaction::TxHandler`]: single-transaction checks and greedy batch acceptance
//! - [`mempool::TransactionPool`]: transactions waiting for a block
//! - [`blockchain::BlockChain`]: the block tree, fork choice and pruning
//!
//! Hashing and signature verification live in [`crypto`]; signature checks go
//! through the [`crypto::SignatureVerifier`] trait.
//!
//! ## Usage
//!
//! ```rust
//! use utxo_chain::{Block, BlockChain, Transaction};
//! use utxo_chain::crypto::{address_of, sign};
//! use secp256k1::SecretKey;
//!
//! let alice = SecretKey::from_slice(&[1; 32]).unwrap();
//! let bob = SecretKey::from_slice(&[2; 32]).unwrap();
//!
//! let genesis = Block::new(None, Transaction::coinbase(10, address_of(&alice)));
//! let mut chain = BlockChain::new(genesis.clone());
//!
//! let mut tx = Transaction::new();
//! tx.add_input(genesis.coinbase.hash(), 0);
//! tx.add_output(10, address_of(&bob));
//! let data = tx.raw_data_to_sign(0).unwrap();
//! tx.add_signature(0, sign(&alice, &data));
//!
//! let mut block = Block::new(Some(genesis.hash()), Transaction::coinbase(10, address_of(&bob)));
//! block.add_transaction(tx.clone());
//!
//! assert!(chain.add_block(block));
//! assert!(chain.max_height_utxo_pool().contains(&tx.outpoint(0)));
//! ```

pub mod types;
pub mod constants;
pub mod crypto;
pub mod utxo;
pub mod transaction;
pub mod mempool;
pub mod blockchain;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use blockchain::BlockChain;
pub use config::ChainConfig;
pub use crypto::{Secp256k1Verifier, SignatureVerifier};
pub use mempool::TransactionPool;
pub use transaction::TxHandler;
pub use utxo::UtxoPool;
pub use error::{LedgerError, Result};
