//! Ledger constants

use crate::types::Natural;

/// Retention horizon: how many heights the frontier may trail the canonical tip
pub const CUT_OFF_AGE: Natural = 10;

/// Output index at which a block's coinbase mints value
pub const COINBASE_INDEX: Natural = 0;

/// Height of the genesis node
pub const GENESIS_HEIGHT: Natural = 1;
