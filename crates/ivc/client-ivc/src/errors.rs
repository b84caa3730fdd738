//! Error types for the IVC session

use goblin::GoblinError;
use ivc_commitments::CommitmentError;
use ivc_core::CoreError;
use protogalaxy::FoldingError;
use thiserror::Error;

/// Result type for IVC operations
pub type Result<T> = std::result::Result<T, IvcError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IvcError {
    #[error("Commitment error: {0}")]
    Commitment(#[from] CommitmentError),

    #[error("Merge error: {0}")]
    Goblin(#[from] GoblinError),

    #[error("Circuit error: {0}")]
    Core(#[from] CoreError),

    #[error("Folding error: {0}")]
    Folding(#[from] FoldingError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No circuit has been accumulated")]
    NothingAccumulated,

    #[error("Inconsistent session state: {0}")]
    InvalidState(String),
}
