//! Forked chain of blocks with bounded retention
//!
//! Every retained block lives in an arena keyed by its hash. A node refers to
//! its predecessor through `block.prev_block_hash` and to its successors through
//! a list of child hashes, so evicting a node is a plain map removal.
//!
//! Fork choice: a block strictly taller than the current tip becomes the new
//! tip; a block at equal height never displaces it.
//!
//! Retention: once the tip is more than `cut_off_age` heights above the
//! frontier (the oldest retained nodes), the frontier is replaced by the
//! children of all its members and the old members are evicted. Blocks
//! extending an evicted node are refused.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::ChainConfig;
use crate::constants::GENESIS_HEIGHT;
use crate::crypto::{Secp256k1Verifier, SignatureVerifier};
use crate::error::{LedgerError, Result};
use crate::mempool::TransactionPool;
use crate::transaction::TxHandler;
use crate::types::*;
use crate::utxo::UtxoPool;

/// A retained block with the ledger state after applying it
#[derive(Debug, Clone)]
struct ChainNode {
    block: Block,
    height: Natural,
    utxo_pool: UtxoPool,
    children: Vec<Hash>,
}

pub struct BlockChain<V: SignatureVerifier = Secp256k1Verifier> {
    nodes: HashMap<Hash, ChainNode>,
    frontier: Vec<Hash>,
    tip: Hash,
    height: Natural,
    tx_pool: TransactionPool,
    config: ChainConfig,
    verifier: V,
}

impl BlockChain<Secp256k1Verifier> {
    /// Create a chain holding only `genesis_block`, with default configuration.
    ///
    /// The genesis block is trusted as given.
    pub fn new(genesis_block: Block) -> Self {
        Self::build(genesis_block, ChainConfig::default(), Secp256k1Verifier::new())
    }
}

impl<V: SignatureVerifier> BlockChain<V> {
    pub fn with_config(genesis_block: Block, config: ChainConfig, verifier: V) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(genesis_block, config, verifier))
    }

    fn build(genesis_block: Block, config: ChainConfig, verifier: V) -> Self {
        let mut utxo_pool = UtxoPool::new();
        credit_coinbase(&mut utxo_pool, &genesis_block.coinbase, config.coinbase_index);

        let genesis_hash = genesis_block.hash();
        let genesis = ChainNode {
            block: genesis_block,
            height: GENESIS_HEIGHT,
            utxo_pool,
            children: Vec::new(),
        };

        let mut nodes = HashMap::new();
        nodes.insert(genesis_hash, genesis);

        Self {
            nodes,
            frontier: vec![genesis_hash],
            tip: genesis_hash,
            height: GENESIS_HEIGHT,
            tx_pool: TransactionPool::new(),
            config,
            verifier,
        }
    }

    /// The block at the canonical tip
    pub fn max_height_block(&self) -> &Block {
        &self.tip_node().block
    }

    pub fn max_height_hash(&self) -> Hash {
        self.tip
    }

    pub fn max_height(&self) -> Natural {
        self.height
    }

    /// Copy of the unspent outputs at the canonical tip, to build the next block on
    pub fn max_height_utxo_pool(&self) -> UtxoPool {
        self.tip_node().utxo_pool.clone()
    }

    pub fn transaction_pool(&self) -> &TransactionPool {
        &self.tx_pool
    }

    /// Queue `tx` for a future block; no validation happens here
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.tx_pool.add_transaction(tx);
    }

    /// Add `block` if it extends a retained block and all its transactions apply.
    ///
    /// Returns false on any rejection; state is untouched in that case.
    pub fn add_block(&mut self, block: Block) -> bool {
        self.try_add_block(block).is_ok()
    }

    /// Like [`BlockChain::add_block`], reporting the new block's hash or the rejection cause.
    ///
    /// Every rejection is logged at debug level.
    pub fn try_add_block(&mut self, block: Block) -> Result<Hash> {
        self.connect_block(block).map_err(|e| {
            debug!(error = %e, "block rejected");
            e
        })
    }

    fn connect_block(&mut self, block: Block) -> Result<Hash> {
        let prev_hash = block
            .prev_block_hash
            .ok_or(LedgerError::GenesisResubmitted)?;

        let (parent_height, snapshot) = match self.nodes.get(&prev_hash) {
            Some(parent) => (parent.height, parent.utxo_pool.clone()),
            None => return Err(LedgerError::UnknownPredecessor(hex::encode(prev_hash))),
        };

        let block_hash = block.hash();
        if self.nodes.contains_key(&block_hash) {
            return Err(LedgerError::DuplicateBlock(hex::encode(block_hash)));
        }

        let mut handler = TxHandler::new(snapshot, &self.verifier);
        let accepted = handler.handle_txs(&block.transactions);
        if accepted.len() != block.transactions.len() {
            return Err(LedgerError::InvalidTransactions {
                declared: block.transactions.len(),
                accepted: accepted.len(),
            });
        }

        let mut utxo_pool = handler.into_utxo_pool();
        credit_coinbase(&mut utxo_pool, &block.coinbase, self.config.coinbase_index);

        for tx in &block.transactions {
            self.tx_pool.remove_transaction(&tx.hash());
        }

        let height = parent_height + 1;
        if let Some(parent) = self.nodes.get_mut(&prev_hash) {
            parent.children.push(block_hash);
        }
        self.nodes.insert(
            block_hash,
            ChainNode {
                block,
                height,
                utxo_pool,
                children: Vec::new(),
            },
        );

        if height > self.height {
            self.height = height;
            self.tip = block_hash;
            info!(height, hash = %hex::encode(block_hash), "new chain tip");
            self.advance_frontier();
        } else {
            debug!(height, hash = %hex::encode(block_hash), "block stored on side branch");
        }

        Ok(block_hash)
    }

    /// Evict the frontier once the tip has grown more than `cut_off_age` past it.
    ///
    /// The trigger looks at the first frontier member only; all members share one height.
    fn advance_frontier(&mut self) {
        let frontier_height = match self.frontier.first().and_then(|h| self.nodes.get(h)) {
            Some(node) => node.height,
            None => return,
        };
        if self.height - frontier_height <= self.config.cut_off_age {
            return;
        }

        let old_frontier = std::mem::take(&mut self.frontier);
        for hash in &old_frontier {
            if let Some(node) = self.nodes.remove(hash) {
                self.frontier.extend(node.children);
            }
        }

        debug!(
            evicted = old_frontier.len(),
            frontier = self.frontier.len(),
            frontier_height = frontier_height + 1,
            "frontier advanced"
        );
    }

    pub fn block(&self, hash: &Hash) -> Option<&Block> {
        self.nodes.get(hash).map(|node| &node.block)
    }

    pub fn height_of(&self, hash: &Hash) -> Option<Natural> {
        self.nodes.get(hash).map(|node| node.height)
    }

    /// Copy of the unspent outputs after `hash` was applied, if still retained
    pub fn utxo_pool_at(&self, hash: &Hash) -> Option<UtxoPool> {
        self.nodes.get(hash).map(|node| node.utxo_pool.clone())
    }

    pub fn children_of(&self, hash: &Hash) -> Option<&[Hash]> {
        self.nodes.get(hash).map(|node| node.children.as_slice())
    }

    pub fn contains_block(&self, hash: &Hash) -> bool {
        self.nodes.contains_key(hash)
    }

    /// Hashes of the oldest retained blocks
    pub fn frontier(&self) -> &[Hash] {
        &self.frontier
    }

    pub fn retained_len(&self) -> usize {
        self.nodes.len()
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    fn tip_node(&self) -> &ChainNode {
        self.nodes
            .get(&self.tip)
            .expect("tip descends from the frontier and is never evicted")
    }
}

/// Mint the coinbase output at `index` into `utxo_pool`
fn credit_coinbase(utxo_pool: &mut UtxoPool, coinbase: &Transaction, index: Natural) {
    if let Some(output) = usize::try_from(index)
        .ok()
        .and_then(|i| coinbase.outputs.get(i))
    {
        utxo_pool.add_utxo(OutPoint::new(coinbase.hash(), index), output.clone());
    }
}
