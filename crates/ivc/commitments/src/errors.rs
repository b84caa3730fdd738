//! Error types for commitments, openings and transcripts

use thiserror::Error;

/// Result type for commitment operations
pub type Result<T> = std::result::Result<T, CommitmentError>;

/// Errors that can occur while committing, opening or replaying a transcript
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommitmentError {
    /// Invalid commitment parameters
    #[error("Invalid commitment parameters: {0}")]
    InvalidParameters(String),

    /// Polynomial does not fit in the commitment key
    #[error("Invalid polynomial degree: expected at most {expected}, got {actual}")]
    InvalidDegree { expected: usize, actual: usize },

    /// The claimed evaluation does not match the polynomial, so (X - challenge) does not divide it
    #[error("Opening quotient has a nonzero remainder")]
    NonZeroRemainder,

    /// Multi-scalar multiplication error
    #[error("Multi-scalar multiplication error: {0}")]
    MsmError(String),

    /// The proof ended before the verifier finished reading
    #[error("Proof exhausted while reading '{label}'")]
    ProofExhausted { label: String },

    /// Bytes in the proof do not encode a valid element
    #[error("Malformed transcript element '{label}'")]
    MalformedElement { label: String },
}
