//! Folding verifier appended to a circuit
//!
//! The verifier runs natively; the circuit receives the folded accumulator's
//! target sum and gate challenges as public inputs, tied together by a chain
//! of addition gates. The shape of the appended block depends only on the
//! circuit size, so a circuit's verification key can be computed before the
//! folding proof it will verify exists.

use crate::errors::Result;
use crate::verifier::ProtogalaxyVerifier;
use ivc_commitments::Proof;
use ivc_core::{Circuit, VerificationKey, VerifierInstance};
use tracing::debug;

/// Public inputs added by [`add_recursive_folding_verifier`]
pub fn recursive_verifier_public_inputs(log_circuit_size: usize) -> usize {
    1 + log_circuit_size
}

/// Verify `proof` against `accumulator` and `incoming_vk`, recording the result in `circuit`
///
/// Returns the folded verifier accumulator.
pub fn add_recursive_folding_verifier(
    circuit: &mut Circuit,
    accumulator: &VerifierInstance,
    incoming_vk: &VerificationKey,
    proof: &Proof,
) -> Result<VerifierInstance> {
    let folded = ProtogalaxyVerifier::new(accumulator, incoming_vk).verify_folding_proof(proof)?;

    let mut running = circuit.add_public_variable(folded.target_sum);
    for challenge in &folded.gate_challenges {
        let challenge_idx = circuit.add_public_variable(*challenge);
        let sum = circuit.add_variable(circuit.get_variable(running) + challenge);
        circuit.create_add_gate(running, challenge_idx, sum);
        running = sum;
    }

    debug!(
        public_inputs = recursive_verifier_public_inputs(folded.gate_challenges.len()),
        "appended recursive folding verifier"
    );
    Ok(folded)
}
