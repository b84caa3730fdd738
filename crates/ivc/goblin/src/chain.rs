//! Goblin proof: the chain of merge proofs of a session
//!
//! Each merge proof exposes commitments to the previous and the current aggregate
//! table. Consecutive proofs must agree: the previous table of step k is the
//! current table of step k-1, and the very first previous table is the seeded
//! mock subtable. The verifier tracks the table's row count the same way, so each
//! merge's shift is derived from sizes it already knows.

use crate::ecc_ops::NUM_OP_WIRES;
use crate::ecc_ops_table::MergeSettings;
use crate::merge_prover::commit_table_columns;
use crate::merge_verifier::MergeVerifier;
use crate::op_queue::EccOpQueue;
use crate::{GroupElement, Result};
use ivc_commitments::{CommitmentKey, Proof, VerifierCommitmentKey};
use tracing::{debug, warn};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GoblinProof {
    pub merge_proofs: Vec<Proof>,
}

impl GoblinProof {
    pub fn len(&self) -> usize {
        self.merge_proofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merge_proofs.is_empty()
    }
}

/// Row count of [`EccOpQueue::seeded`]
pub fn initial_table_size() -> usize {
    EccOpQueue::seeded().get_ultra_ops_table_num_rows()
}

/// Commitments to the columns of [`EccOpQueue::seeded`]
pub fn initial_table_commitments(ck: &CommitmentKey) -> Result<[GroupElement; NUM_OP_WIRES]> {
    commit_table_columns(ck, &EccOpQueue::seeded().construct_table_columns())
}

pub struct GoblinVerifier<'a> {
    verifier_key: &'a VerifierCommitmentKey,
    initial_table_commitments: [GroupElement; NUM_OP_WIRES],
}

impl<'a> GoblinVerifier<'a> {
    pub fn new(
        verifier_key: &'a VerifierCommitmentKey,
        initial_table_commitments: [GroupElement; NUM_OP_WIRES],
    ) -> Self {
        Self {
            verifier_key,
            initial_table_commitments,
        }
    }

    /// Verify every merge proof under its settings and the chaining between them
    pub fn verify(&self, proof: &GoblinProof, settings: &[MergeSettings]) -> bool {
        if proof.is_empty() || proof.len() != settings.len() {
            warn!(
                proofs = proof.len(),
                settings = settings.len(),
                "merge proof count does not match settings"
            );
            return false;
        }

        let mut expected_previous = self.initial_table_commitments;
        let mut table_size = initial_table_size();
        let mut pairing_points = Vec::with_capacity(proof.len());
        for (step, (merge_proof, merge_settings)) in
            proof.merge_proofs.iter().zip(settings).enumerate()
        {
            let verifier = MergeVerifier::new(*merge_settings, self.verifier_key);
            let verification = match verifier.reduce_verify(merge_proof, table_size) {
                Ok(verification) => verification,
                Err(err) => {
                    warn!(step, %err, "malformed merge proof");
                    return false;
                }
            };
            if !verification.checks_passed() {
                return false;
            }
            if verification.previous_table_commitments != expected_previous {
                warn!(step, "merge chain broken");
                return false;
            }
            expected_previous = verification.current_table_commitments;
            table_size = verification.table_size;
            pairing_points.push(verification.pairing_points);
        }

        let verified = pairing_points
            .iter()
            .all(|points| points.check(self.verifier_key));
        debug!(steps = proof.len(), verified, "verified merge chain");
        verified
    }
}
