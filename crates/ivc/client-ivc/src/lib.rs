//! # Client IVC
//!
//! Incrementally verifiable computation over a sequence of circuits. Every
//! circuit's elliptic-curve operations are merged into one op table (Goblin),
//! its instance is folded into a running accumulator (ProtoGalaxy), and the
//! final accumulator is decided once.
//!
//! ```no_run
//! use client_ivc::{ClientIvc, IvcConfig};
//! use ivc_core::{Circuit, GroupElement, Scalar};
//!
//! let mut ivc = ClientIvc::new(IvcConfig::default(), &mut rand::thread_rng()).unwrap();
//! for i in 0..3u64 {
//!     let mut circuit = Circuit::new();
//!     let a = circuit.add_public_variable(Scalar::from(i));
//!     let b = circuit.add_variable(Scalar::from(i + 1));
//!     let c = circuit.add_variable(Scalar::from(2 * i + 1));
//!     circuit.create_add_gate(a, b, c);
//!     circuit.queue_ecc_mul_accum(GroupElement::generator(), Scalar::from(i + 2));
//!     circuit.queue_ecc_eq();
//!     ivc.accumulate(circuit, None).unwrap();
//! }
//! let proof = ivc.prove().unwrap();
//! let inputs = ivc.verification_inputs().unwrap();
//! assert!(ivc.verify(&proof, &inputs));
//! ```

pub mod client_ivc;
pub mod config;
pub mod errors;
pub mod logging;
pub mod proof;

// Re-export key types
pub use client_ivc::ClientIvc;
pub use config::IvcConfig;
pub use errors::{IvcError, Result};
pub use proof::{ClientIvcProof, IvcVerificationInputs};
