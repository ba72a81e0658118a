//! Chain tree configuration

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::constants::{COINBASE_INDEX, CUT_OFF_AGE};
use crate::error::{LedgerError, Result};
use crate::types::Natural;

/// Tunables for a [`crate::BlockChain`]
///
/// Missing fields fall back to the defaults, so `{}` is a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Maximum height gap between the frontier and the canonical tip
    pub cut_off_age: Natural,
    /// Output index of the coinbase output credited to each block's snapshot
    pub coinbase_index: Natural,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            cut_off_age: CUT_OFF_AGE,
            coinbase_index: COINBASE_INDEX,
        }
    }
}

impl ChainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cut_off_age == 0 {
            return Err(LedgerError::InvalidConfig(
                "cut_off_age must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("parsing chain config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading chain config {}", path.display()))?;
        Self::from_json_str(&json)
    }
}
