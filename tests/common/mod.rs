//! Shared helpers for integration tests

#![allow(dead_code)]

use secp256k1::SecretKey;
use utxo_chain::crypto::{address_of, sign};
use utxo_chain::*;

pub fn key(byte: u8) -> SecretKey {
    SecretKey::from_slice(&[byte; 32]).unwrap()
}

pub fn genesis(owner: &SecretKey, value: Integer) -> Block {
    Block::new(None, Transaction::coinbase(value, address_of(owner)))
}

pub fn block_on(prev: Hash, miner: &SecretKey, txs: Vec<Transaction>) -> Block {
    let mut block = Block::new(Some(prev), Transaction::coinbase(25, address_of(miner)));
    for tx in txs {
        block.add_transaction(tx);
    }
    block
}

/// Spend `coins` (all owned by `from`) into the given outputs, signing every input
pub fn pay(from: &SecretKey, coins: &[OutPoint], outputs: &[(Integer, &SecretKey)]) -> Transaction {
    let mut tx = Transaction::new();
    for coin in coins {
        tx.add_input(coin.hash, coin.index);
    }
    for (value, to) in outputs {
        tx.add_output(*value, address_of(to));
    }
    for i in 0..tx.inputs.len() {
        let data = tx.raw_data_to_sign(i).unwrap();
        tx.add_signature(i, sign(from, &data));
    }
    tx
}
