//! Error types for the op queue and the merge protocol

use ivc_commitments::CommitmentError;
use thiserror::Error;

/// Result type for op queue and merge operations
pub type Result<T> = std::result::Result<T, GoblinError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GoblinError {
    #[error("Commitment error: {0}")]
    Commitment(#[from] CommitmentError),

    /// Merging requires at least one earlier subtable
    #[error("Previous op table is empty")]
    EmptyPreviousTable,

    #[error("Malformed merge proof: {0}")]
    MalformedProof(String),
}
