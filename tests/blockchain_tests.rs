//! Integration tests for chain growth, fork choice and pruning

mod common;

use common::*;
use utxo_chain::*;

#[test]
fn test_spend_genesis_coinbase() {
    let (x, y, miner) = (key(1), key(2), key(3));
    let g = genesis(&x, 10);
    let mut chain = BlockChain::new(g.clone());

    let coin = g.coinbase.outpoint(COINBASE_INDEX);
    let tx = pay(&x, &[coin], &[(10, &y)]);
    let b1 = block_on(g.hash(), &miner, vec![tx.clone()]);

    assert!(chain.add_block(b1.clone()));
    assert_eq!(chain.max_height(), 2);

    let pool = chain.max_height_utxo_pool();
    assert!(pool.contains(&b1.coinbase.outpoint(COINBASE_INDEX)));
    assert!(pool.contains(&tx.outpoint(0)));
    assert!(!pool.contains(&coin));
    assert_eq!(pool.get_tx_output(&tx.outpoint(0)).map(|o| o.value), Some(10));
}

#[test]
fn test_competing_block_is_side_branch() {
    let x = key(1);
    let g = genesis(&x, 10);
    let mut chain = BlockChain::new(g.clone());

    let b1 = block_on(g.hash(), &key(2), vec![]);
    let b2 = block_on(g.hash(), &key(3), vec![]);
    assert!(chain.add_block(b1.clone()));
    assert!(chain.add_block(b2.clone()));

    assert_eq!(chain.max_height_block(), &b1);
    assert!(chain.contains_block(&b2.hash()));
    assert_eq!(chain.children_of(&g.hash()).map(|c| c.len()), Some(2));
}

#[test]
fn test_side_branches_keep_independent_state() {
    let (x, y, z) = (key(1), key(2), key(3));
    let g = genesis(&x, 10);
    let mut chain = BlockChain::new(g.clone());
    let coin = g.coinbase.outpoint(0);

    let to_y = pay(&x, &[coin], &[(10, &y)]);
    let to_z = pay(&x, &[coin], &[(10, &z)]);
    let b1 = block_on(g.hash(), &key(4), vec![to_y.clone()]);
    let b2 = block_on(g.hash(), &key(5), vec![to_z.clone()]);

    // The same coin may be spent once on each branch.
    assert!(chain.add_block(b1.clone()));
    assert!(chain.add_block(b2.clone()));

    let left = chain.utxo_pool_at(&b1.hash()).unwrap();
    let right = chain.utxo_pool_at(&b2.hash()).unwrap();
    assert!(left.contains(&to_y.outpoint(0)) && !left.contains(&to_z.outpoint(0)));
    assert!(right.contains(&to_z.outpoint(0)) && !right.contains(&to_y.outpoint(0)));
    assert!(chain.utxo_pool_at(&g.hash()).unwrap().contains(&coin));
}

#[test]
fn test_no_double_spend_along_branch() {
    let (x, y, z) = (key(1), key(2), key(3));
    let g = genesis(&x, 10);
    let mut chain = BlockChain::new(g.clone());
    let coin = g.coinbase.outpoint(0);

    let b1 = block_on(g.hash(), &key(4), vec![pay(&x, &[coin], &[(10, &y)])]);
    assert!(chain.add_block(b1.clone()));

    let again = block_on(b1.hash(), &key(5), vec![pay(&x, &[coin], &[(10, &z)])]);
    assert_eq!(
        chain.try_add_block(again),
        Err(LedgerError::InvalidTransactions { declared: 1, accepted: 0 })
    );
    assert_eq!(chain.max_height(), 2);
}

#[test]
fn test_double_spend_within_block_rejects_block() {
    let (x, y, z) = (key(1), key(2), key(3));
    let g = genesis(&x, 10);
    let mut chain = BlockChain::new(g.clone());
    let coin = g.coinbase.outpoint(0);

    let block = block_on(
        g.hash(),
        &key(4),
        vec![pay(&x, &[coin], &[(10, &y)]), pay(&x, &[coin], &[(10, &z)])],
    );
    assert!(!chain.add_block(block));
    assert_eq!(chain.retained_len(), 1);
    assert_eq!(chain.max_height_utxo_pool(), chain.utxo_pool_at(&g.hash()).unwrap());
}

#[test]
fn test_dependent_transactions_in_one_block() {
    let (x, y, z) = (key(1), key(2), key(3));
    let g = genesis(&x, 10);
    let mut chain = BlockChain::new(g.clone());

    let first = pay(&x, &[g.coinbase.outpoint(0)], &[(6, &y), (4, &x)]);
    let second = pay(&y, &[first.outpoint(0)], &[(6, &z)]);

    // Declared child-before-parent; still accepted.
    let block = block_on(g.hash(), &key(4), vec![second.clone(), first.clone()]);
    assert!(chain.add_block(block));

    let pool = chain.max_height_utxo_pool();
    assert!(pool.contains(&second.outpoint(0)));
    assert!(pool.contains(&first.outpoint(1)));
    assert!(!pool.contains(&first.outpoint(0)));
}

#[test]
fn test_spending_block_coinbase_in_next_block() {
    let (x, miner, y) = (key(1), key(2), key(3));
    let g = genesis(&x, 10);
    let mut chain = BlockChain::new(g.clone());

    let b1 = block_on(g.hash(), &miner, vec![]);
    assert!(chain.add_block(b1.clone()));

    let reward = b1.coinbase.outpoint(COINBASE_INDEX);
    let b2 = block_on(b1.hash(), &key(4), vec![pay(&miner, &[reward], &[(25, &y)])]);
    assert!(chain.add_block(b2));
}

#[test]
fn test_pool_tracks_pending_transactions() {
    let (x, y) = (key(1), key(2));
    let g = genesis(&x, 10);
    let mut chain = BlockChain::new(g.clone());

    let tx = pay(&x, &[g.coinbase.outpoint(0)], &[(10, &y)]);
    let unrelated = pay(&y, &[OutPoint::new([9; 32], 0)], &[(1, &x)]);
    chain.add_transaction(tx.clone());
    chain.add_transaction(unrelated.clone());
    assert_eq!(chain.transaction_pool().len(), 2);

    assert!(chain.add_block(block_on(g.hash(), &key(3), vec![tx.clone()])));
    assert!(!chain.transaction_pool().contains(&tx.hash()));
    assert!(chain.transaction_pool().contains(&unrelated.hash()));
}

#[test]
fn test_evicted_predecessor_is_refused() {
    let g = genesis(&key(1), 10);
    let mut chain = BlockChain::new(g.clone());

    let mut prev = g.hash();
    for i in 0..(CUT_OFF_AGE as u8 + 1) {
        prev = chain.try_add_block(block_on(prev, &key(20 + i), vec![])).unwrap();
    }
    assert_eq!(chain.max_height(), CUT_OFF_AGE + 2);

    // Genesis sits at max_height - CUT_OFF_AGE - 1 and has been evicted.
    assert!(!chain.contains_block(&g.hash()));
    assert!(!chain.add_block(block_on(g.hash(), &key(60), vec![])));
}

#[test]
fn test_block_at_horizon_still_accepted() {
    let g = genesis(&key(1), 10);
    let mut chain = BlockChain::new(g.clone());

    let mut prev = g.hash();
    for i in 0..CUT_OFF_AGE as u8 {
        prev = chain.try_add_block(block_on(prev, &key(20 + i), vec![])).unwrap();
    }
    assert_eq!(chain.max_height(), CUT_OFF_AGE + 1);
    assert!(chain.contains_block(&g.hash()));
    assert!(chain.add_block(block_on(g.hash(), &key(60), vec![])));
}

#[test]
fn test_tip_copy_is_defensive() {
    let x = key(1);
    let g = genesis(&x, 10);
    let chain = BlockChain::new(g.clone());

    let mut copy = chain.max_height_utxo_pool();
    copy.remove_utxo(&g.coinbase.outpoint(0));
    assert!(chain.max_height_utxo_pool().contains(&g.coinbase.outpoint(0)));
}

#[test]
fn test_custom_config_from_json() {
    let config = ChainConfig::from_json_str(r#"{ "cut_off_age": 1 }"#).unwrap();
    let g = genesis(&key(1), 10);
    let mut chain = BlockChain::with_config(g.clone(), config, Secp256k1Verifier::new()).unwrap();

    let b1 = chain.try_add_block(block_on(g.hash(), &key(2), vec![])).unwrap();
    chain.try_add_block(block_on(b1, &key(3), vec![])).unwrap();
    assert!(!chain.contains_block(&g.hash()));
    assert_eq!(chain.config().cut_off_age, 1);
}

mod properties {
    use super::common::*;
    use proptest::prelude::*;
    use utxo_chain::*;

    proptest! {
        #[test]
        fn prop_height_monotonic_and_memory_bounded(
            parents in proptest::collection::vec(any::<prop::sample::Index>(), 1..40)
        ) {
            let config = ChainConfig { cut_off_age: 3, ..ChainConfig::default() };
            let g = genesis(&key(1), 10);
            let mut chain = BlockChain::with_config(g.clone(), config, Secp256k1Verifier::new()).unwrap();
            let mut seen = vec![g.hash()];
            let mut last_height = chain.max_height();

            for (n, parent) in parents.iter().enumerate() {
                let prev = *parent.get(&seen[..]);
                let miner = key(2 + (n % 200) as u8);
                let mut block = block_on(prev, &miner, vec![]);
                // Distinguish blocks that share a parent and a miner.
                block.coinbase.outputs[0].value = n as Integer;

                let tip_before = chain.max_height_hash();
                let retained = chain.contains_block(&prev);
                let parent_height = chain.height_of(&prev);
                let added = chain.add_block(block.clone());
                prop_assert_eq!(added, retained);

                if added {
                    seen.push(block.hash());
                    let height = parent_height.unwrap() + 1;
                    if height <= last_height {
                        prop_assert_eq!(chain.max_height_hash(), tip_before);
                    }
                }

                prop_assert!(chain.max_height() >= last_height);
                last_height = chain.max_height();

                for hash in &seen {
                    if let Some(h) = chain.height_of(hash) {
                        prop_assert!(h + config.cut_off_age >= chain.max_height());
                    }
                }
                prop_assert!(chain.contains_block(&chain.max_height_hash()));
            }
        }
    }
}
