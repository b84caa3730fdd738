//! # Goblin op queue and merge protocol
//!
//! Circuits delegate elliptic-curve work to a shared queue instead of proving it
//! in-circuit. Each circuit contributes one subtable of ops; the merge protocol
//! proves that the aggregate table grew by exactly that subtable.
//!
//! ## Components
//!
//! - [`EccOpQueue`]: op recording with a native accumulator
//! - [`ecc_ops`]: opcodes and the ultra / ECC VM op encodings
//! - [`ecc_ops_table`]: prepend/append subtable storage
//! - [`MergeProver`] and [`MergeVerifier`]: the merge argument
//! - [`GoblinVerifier`]: verification of a whole chain of merge proofs

pub mod chain;
pub mod curve;
pub mod ecc_ops;
pub mod ecc_ops_table;
pub mod errors;
pub mod merge_prover;
pub mod merge_verifier;
pub mod op_queue;

// Re-export key types
pub use chain::{initial_table_commitments, initial_table_size, GoblinProof, GoblinVerifier};
pub use ecc_ops::{EccOpCode, EccvmOperation, UltraOp, NUM_OP_WIRES, ULTRA_ROWS_PER_OP};
pub use ecc_ops_table::{EccOpsTable, MergeSettings};
pub use errors::{GoblinError, Result};
pub use merge_prover::{commit_table_columns, MergeProver};
pub use merge_verifier::{MergeVerification, MergeVerifier};
pub use op_queue::{EccOpQueue, TableColumns};

pub use ivc_commitments::{GroupElement, GroupProjective, Scalar};
