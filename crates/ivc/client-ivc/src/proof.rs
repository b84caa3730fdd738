//! Session proof and the public data it is verified against

use goblin::{GoblinProof, MergeSettings};
use ivc_commitments::Proof;
use ivc_core::{VerificationKey, VerifierInstance};

/// Final folding step, decider over the folded accumulator and the merge chain
#[derive(Clone, Debug, PartialEq)]
pub struct ClientIvcProof {
    pub folding_proof: Proof,
    pub decider_proof: Proof,
    pub goblin_proof: GoblinProof,
}

impl ClientIvcProof {
    /// Total proof bytes across all components
    pub fn size(&self) -> usize {
        self.folding_proof.len()
            + self.decider_proof.len()
            + self
                .goblin_proof
                .merge_proofs
                .iter()
                .map(Proof::len)
                .sum::<usize>()
    }
}

/// What the verifier holds besides the proof
#[derive(Clone, Debug, PartialEq)]
pub struct IvcVerificationInputs {
    /// Verifier accumulator before the final fold
    pub accumulator: VerifierInstance,
    /// Key of the instance folded last
    pub instance_vk: VerificationKey,
    /// Merge settings of each step, in order
    pub merge_settings: Vec<MergeSettings>,
}
