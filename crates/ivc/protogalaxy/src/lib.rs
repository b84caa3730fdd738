//! # ProtoGalaxy
//!
//! Folding of one incoming instance into an accumulator. The accumulator
//! carries a relaxed relation: its rows, weighted by the gate separators of
//! `gate_challenges`, sum to `target_sum`. Folding a valid instance into a
//! valid accumulator yields a valid accumulator.
//!
//! ## Components
//!
//! - [`prover`]: [`ProtogalaxyProver`], producing the folded accumulator and a proof
//! - [`verifier`]: [`ProtogalaxyVerifier`], folding the verifier's accumulator from a proof
//! - [`recursive_verifier`]: the verifier appended to a circuit of the IVC chain
//! - [`prover_internal`]: perturbator and combiner computations

pub mod errors;
pub mod prover;
pub mod prover_internal;
pub mod recursive_verifier;
pub mod shared;
pub mod univariate;
pub mod verifier;

// Re-export key types
pub use errors::{FoldingError, Result};
pub use prover::{FoldingResult, ProtogalaxyProver};
pub use recursive_verifier::{add_recursive_folding_verifier, recursive_verifier_public_inputs};
pub use verifier::ProtogalaxyVerifier;

pub use ivc_commitments::{GroupElement, GroupProjective, Scalar};
