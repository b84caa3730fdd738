//! # Commitments for the client IVC stack
//!
//! Polynomial commitments and the Fiat-Shamir plumbing shared by the merge
//! protocol, the folding protocol and the decider.
//!
//! ## Components
//!
//! - [`commitment_key`]: monomial KZG commitment keys over BLS12-381
//! - [`kzg`]: opening proofs and their reduction to a pairing check
//! - [`transcript`]: Merlin transcript carrying the proof bytes
//! - [`msm`]: Multi-scalar multiplication
//! - [`polynomial`]: dense univariate helpers

pub mod commitment_key;
pub mod errors;
pub mod kzg;
pub mod msm;
pub mod polynomial;
pub mod transcript;

// Re-export key types
pub use commitment_key::{setup, CommitmentKey, VerifierCommitmentKey};
pub use errors::{CommitmentError, Result};
pub use kzg::{Kzg, OpeningClaim, OpeningPair, PairingPoints};
pub use transcript::{Proof, Transcript, TranscriptElement};

/// BLS12-381 scalar field used throughout the stack
pub type Scalar = bls12_381::Scalar;

/// BLS12-381 group element used for commitments
pub type GroupElement = bls12_381::G1Affine;

/// BLS12-381 projective group element
pub type GroupProjective = bls12_381::G1Projective;
