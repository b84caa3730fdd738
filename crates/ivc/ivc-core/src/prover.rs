//! Decider prover
//!
//! Transparent decider for a folded accumulator: it reveals every committed
//! column so the verifier can re-commit them and evaluate the relaxed relation
//! directly. Proof size and verifier work are linear in the circuit size.

use crate::flavor::ENTITY_LABELS;
use crate::instance::ProverInstance;
use crate::Result;
use ivc_commitments::{Proof, Transcript};
use tracing::{debug, instrument};

pub(crate) const DECIDER_TRANSCRIPT_LABEL: &[u8] = b"decider";

pub struct DeciderProver<'a> {
    accumulator: &'a ProverInstance,
    transcript: Transcript,
}

impl<'a> DeciderProver<'a> {
    pub fn new(accumulator: &'a ProverInstance) -> Self {
        Self {
            accumulator,
            transcript: Transcript::new(DECIDER_TRANSCRIPT_LABEL),
        }
    }

    #[instrument(skip_all, name = "decider_prove")]
    pub fn construct_proof(mut self) -> Result<Proof> {
        let circuit_size = self.accumulator.circuit_size();
        self.transcript
            .send_to_verifier("circuit_size", &(circuit_size as u32));
        for (label, poly) in ENTITY_LABELS
            .iter()
            .zip(self.accumulator.polynomials.get_all())
        {
            self.transcript.send_all_to_verifier(label, poly);
        }
        let proof = self.transcript.export_proof();
        debug!(circuit_size, proof_bytes = proof.len(), "constructed decider proof");
        Ok(proof)
    }
}
