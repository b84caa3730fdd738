//! # IVC Core
//!
//! The constraint system folded by the IVC: circuits, their execution trace, the
//! relation every row satisfies, the prover/verifier instance types and a
//! transparent decider for the final accumulator.
//!
//! ## Components
//!
//! - [`circuit`]: gates, public inputs and recorded ECC operations
//! - [`trace`]: layout of a circuit into columns
//! - [`flavor`]: column layout and protocol constants
//! - [`relations`]: subrelations and their batching
//! - [`instance`]: [`ProverInstance`], [`VerifierInstance`], [`VerificationKey`]
//! - [`prover`] / [`verifier`]: the decider

pub mod circuit;
pub mod errors;
pub mod flavor;
pub mod gate_separator;
pub mod instance;
pub mod prover;
pub mod relations;
pub mod trace;
pub mod verifier;

// Re-export key types
pub use circuit::{ArithmeticGate, Circuit, Variable};
pub use errors::{CoreError, Result};
pub use instance::{ProverInstance, VerificationKey, VerifierInstance};
pub use prover::DeciderProver;
pub use relations::RelationParameters;
pub use verifier::DeciderVerifier;

pub use ivc_commitments::{GroupElement, GroupProjective, Scalar};
