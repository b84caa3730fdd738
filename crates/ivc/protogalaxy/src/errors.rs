//! Error types for folding

use ivc_commitments::CommitmentError;
use ivc_core::CoreError;
use thiserror::Error;

/// Result type for folding operations
pub type Result<T> = std::result::Result<T, FoldingError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FoldingError {
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Commitment error: {0}")]
    Commitment(#[from] CommitmentError),

    /// F(0) must equal the accumulator's target sum
    #[error("Perturbator constant {actual} does not match target sum {expected}")]
    PerturbatorMismatch { expected: String, actual: String },

    #[error("Cannot fold a circuit of size {incoming} into an accumulator of size {accumulator}")]
    SizeMismatch { accumulator: usize, incoming: usize },

    /// Re-sent accumulator data differs from the verifier's own copy
    #[error("Accumulator mismatch: {0}")]
    AccumulatorMismatch(String),

    #[error("Verification key mismatch: {0}")]
    VerificationKeyMismatch(String),

    /// Interpolation hit a zero denominator; the domain repeats a point
    #[error("Zero denominator at domain point {point}")]
    ZeroDenominator { point: usize },

    #[error("Invalid folding proof: {0}")]
    MalformedProof(String),
}
