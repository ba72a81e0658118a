//! Error types for chain growth

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Unknown predecessor block: {0}")]
    UnknownPredecessor(String),

    #[error("Genesis block already established")]
    GenesisResubmitted,

    #[error("Block already in chain: {0}")]
    DuplicateBlock(String),

    #[error("Only {accepted} of {declared} transactions could be applied")]
    InvalidTransactions { declared: usize, accepted: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
