//! Error types for circuits, instances and the decider

use goblin::GoblinError;
use ivc_commitments::CommitmentError;
use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Commitment error: {0}")]
    Commitment(#[from] CommitmentError),

    #[error("Op queue error: {0}")]
    Goblin(#[from] GoblinError),

    #[error("Circuit needs {rows} rows but the trace has {capacity}")]
    CircuitTooLarge { rows: usize, capacity: usize },

    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    #[error("Arithmetic gate {index} is not satisfied")]
    UnsatisfiedGate { index: usize },

    /// The grand product hit a zero denominator; resample the challenges
    #[error("Zero denominator in grand product at row {row}")]
    ZeroDenominator { row: usize },

    #[error("Verification key mismatch: {0}")]
    VerificationKeyMismatch(String),

    #[error("Malformed decider proof: {0}")]
    MalformedProof(String),
}
