//! Merge verifier

use crate::ecc_ops::NUM_OP_WIRES;
use crate::ecc_ops_table::MergeSettings;
use crate::merge_prover::{COMMITMENT_LABELS, EVALUATION_LABELS, MERGE_TRANSCRIPT_LABEL};
use crate::{GoblinError, GroupElement, Result, Scalar};
use group::Curve;
use ivc_commitments::{
    msm, Kzg, OpeningClaim, OpeningPair, PairingPoints, Proof, Transcript, VerifierCommitmentKey,
};
use tracing::warn;

/// Everything the verifier learns from one merge proof
#[derive(Clone, Debug, PartialEq)]
pub struct MergeVerification {
    pub identity_checked: bool,
    /// `deg t < |t|`, from the shifted subtable commitment
    pub degree_checked: bool,
    pub pairing_points: PairingPoints,
    pub subtable_commitments: [GroupElement; NUM_OP_WIRES],
    pub previous_table_commitments: [GroupElement; NUM_OP_WIRES],
    pub current_table_commitments: [GroupElement; NUM_OP_WIRES],
    /// Rows of the aggregate table after this merge
    pub table_size: usize,
}

impl MergeVerification {
    pub fn checks_passed(&self) -> bool {
        self.identity_checked && self.degree_checked
    }
}

pub struct MergeVerifier<'a> {
    settings: MergeSettings,
    verifier_key: &'a VerifierCommitmentKey,
}

impl<'a> MergeVerifier<'a> {
    pub fn new(settings: MergeSettings, verifier_key: &'a VerifierCommitmentKey) -> Self {
        Self {
            settings,
            verifier_key,
        }
    }

    /// Replay the proof, check the concatenation identity and the subtable degree
    /// bound, and reduce the batched opening to pairing points
    ///
    /// `previous_table_size` is the row count of the table being merged into,
    /// known to the verifier from the seeded table and earlier merges. Malformed
    /// proofs are errors.
    pub fn reduce_verify(
        &self,
        proof: &Proof,
        previous_table_size: usize,
    ) -> Result<MergeVerification> {
        let mut transcript = Transcript::from_proof(MERGE_TRANSCRIPT_LABEL, proof);

        let subtable_size: u32 = transcript.receive_from_prover("subtable_size")?;
        let subtable_size = subtable_size as usize;
        let key_size = self.verifier_key.size;
        let table_size = previous_table_size + subtable_size;
        if previous_table_size == 0 || table_size > key_size {
            return Err(GoblinError::MalformedProof(format!(
                "cannot merge {} rows into {} with a key of size {}",
                subtable_size, previous_table_size, key_size
            )));
        }

        let mut commitments = [[GroupElement::identity(); NUM_OP_WIRES]; 4];
        for (table, label) in commitments.iter_mut().zip(COMMITMENT_LABELS) {
            for (j, commitment) in table.iter_mut().enumerate() {
                *commitment = transcript.receive_from_prover(&format!("{}_{}", label, j))?;
            }
        }

        let kappa = transcript.get_challenge("kappa");

        let mut evaluations = [[Scalar::zero(); NUM_OP_WIRES]; 4];
        for (table, label) in evaluations.iter_mut().zip(EVALUATION_LABELS) {
            for (j, evaluation) in table.iter_mut().enumerate() {
                *evaluation = transcript.receive_from_prover(&format!("{}_{}", label, j))?;
            }
        }

        let shift_size = match self.settings {
            MergeSettings::Prepend => subtable_size,
            MergeSettings::Append => previous_table_size,
        };
        let kappa_shift = kappa.pow_vartime(&[shift_size as u64, 0, 0, 0]);
        let kappa_degree_shift = kappa.pow_vartime(&[(key_size - subtable_size) as u64, 0, 0, 0]);
        let [subtable_evals, previous_evals, current_evals, shifted_evals] = evaluations;
        let identity_checked = (0..NUM_OP_WIRES).all(|j| {
            let expected = match self.settings {
                MergeSettings::Prepend => subtable_evals[j] + kappa_shift * previous_evals[j],
                MergeSettings::Append => previous_evals[j] + kappa_shift * subtable_evals[j],
            };
            current_evals[j] == expected
        });
        if !identity_checked {
            warn!(settings = ?self.settings, "merge identity failed");
        }
        let degree_checked =
            (0..NUM_OP_WIRES).all(|j| shifted_evals[j] == kappa_degree_shift * subtable_evals[j]);
        if !degree_checked {
            warn!(subtable_size, "subtable degree check failed");
        }

        let alpha = transcript.get_challenge("alpha");

        let num_claims = commitments.len() * NUM_OP_WIRES;
        let mut alpha_pows = Vec::with_capacity(num_claims);
        let mut alpha_pow = Scalar::one();
        for _ in 0..num_claims {
            alpha_pows.push(alpha_pow);
            alpha_pow *= alpha;
        }
        let flat_commitments: Vec<GroupElement> = commitments.iter().flatten().copied().collect();
        let batched_commitment = msm::msm(&alpha_pows, &flat_commitments)?.to_affine();
        let batched_evaluation = evaluations
            .iter()
            .flatten()
            .zip(alpha_pows.iter())
            .fold(Scalar::zero(), |acc, (eval, pow)| acc + eval * pow);

        let claim = OpeningClaim {
            opening_pair: OpeningPair {
                challenge: kappa,
                evaluation: batched_evaluation,
            },
            commitment: batched_commitment,
        };
        let pairing_points = Kzg::reduce_verify(&claim, &mut transcript)?;

        if !transcript.is_exhausted() {
            return Err(GoblinError::MalformedProof(
                "trailing bytes after merge proof".to_string(),
            ));
        }

        let [subtable_commitments, previous_table_commitments, current_table_commitments, _] =
            commitments;
        Ok(MergeVerification {
            identity_checked,
            degree_checked,
            pairing_points,
            subtable_commitments,
            previous_table_commitments,
            current_table_commitments,
            table_size,
        })
    }

    /// Identity, degree and pairing checks; malformed proofs verify as false
    pub fn verify_proof(&self, proof: &Proof, previous_table_size: usize) -> bool {
        match self.reduce_verify(proof, previous_table_size) {
            Ok(verification) => {
                verification.checks_passed()
                    && verification.pairing_points.check(self.verifier_key)
            }
            Err(err) => {
                warn!(%err, "rejecting malformed merge proof");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge_prover::MergeProver;
    use crate::op_queue::EccOpQueue;
    use crate::GroupProjective;
    use ff::Field;
    use ivc_commitments::{setup, CommitmentKey};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SEEDED_ROWS: usize = 4;

    fn keys() -> (CommitmentKey, VerifierCommitmentKey) {
        setup(64, &mut StdRng::seed_from_u64(11)).unwrap()
    }

    fn queue_with_circuit(settings: MergeSettings, num_adds: usize) -> EccOpQueue {
        let mut rng = StdRng::seed_from_u64(num_adds as u64);
        let mut queue = EccOpQueue::seeded();
        queue.initialize_new_subtable(settings);
        for _ in 0..num_adds {
            let point = (GroupProjective::generator() * Scalar::random(&mut rng)).to_affine();
            queue.add_accumulate(point);
        }
        queue.mul_accumulate(GroupElement::generator(), Scalar::random(&mut rng));
        queue.eq_and_reset();
        queue
    }

    #[test]
    fn test_merge_prepend_verifies() {
        let (ck, vk) = keys();
        let queue = queue_with_circuit(MergeSettings::Prepend, 2);
        let proof = MergeProver::new(&queue, &ck).construct_proof().unwrap();
        let verifier = MergeVerifier::new(MergeSettings::Prepend, &vk);
        assert!(verifier.verify_proof(&proof, SEEDED_ROWS));
    }

    #[test]
    fn test_merge_append_verifies() {
        let (ck, vk) = keys();
        let queue = queue_with_circuit(MergeSettings::Append, 3);
        let proof = MergeProver::new(&queue, &ck).construct_proof().unwrap();
        assert!(MergeVerifier::new(MergeSettings::Append, &vk).verify_proof(&proof, SEEDED_ROWS));
    }

    #[test]
    fn test_merge_wrong_settings_fails() {
        let (ck, vk) = keys();
        let queue = queue_with_circuit(MergeSettings::Prepend, 1);
        let proof = MergeProver::new(&queue, &ck).construct_proof().unwrap();
        assert!(!MergeVerifier::new(MergeSettings::Append, &vk).verify_proof(&proof, SEEDED_ROWS));
    }

    #[test]
    fn test_merge_commitments_match_tables() {
        let (ck, vk) = keys();
        let queue = queue_with_circuit(MergeSettings::Prepend, 1);
        let proof = MergeProver::new(&queue, &ck).construct_proof().unwrap();
        let verification = MergeVerifier::new(MergeSettings::Prepend, &vk)
            .reduce_verify(&proof, SEEDED_ROWS)
            .unwrap();
        assert_eq!(verification.table_size, queue.get_ultra_ops_table_num_rows());

        let seeded = EccOpQueue::seeded().construct_table_columns();
        assert_eq!(
            verification.previous_table_commitments,
            crate::merge_prover::commit_table_columns(&ck, &seeded).unwrap()
        );
        assert_eq!(
            verification.current_table_commitments,
            crate::merge_prover::commit_table_columns(&ck, &queue.construct_table_columns())
                .unwrap()
        );
    }

    #[test]
    fn test_merge_tampered_proof_fails() {
        let (ck, vk) = keys();
        let queue = queue_with_circuit(MergeSettings::Prepend, 2);
        let proof = MergeProver::new(&queue, &ck).construct_proof().unwrap();
        let verifier = MergeVerifier::new(MergeSettings::Prepend, &vk);

        for position in [0, 10, proof.len() / 2, proof.len() - 1] {
            let mut tampered = proof.clone();
            tampered.data[position] ^= 0x01;
            assert!(!verifier.verify_proof(&tampered, SEEDED_ROWS), "byte {}", position);
        }

        let mut truncated = proof.clone();
        truncated.data.pop();
        assert!(!verifier.verify_proof(&truncated, SEEDED_ROWS));

        let mut extended = proof;
        extended.data.push(0);
        assert!(!verifier.verify_proof(&extended, SEEDED_ROWS));
    }

    #[test]
    fn test_merge_rejects_rewritten_subtable_size() {
        let (ck, vk) = keys();
        let queue = queue_with_circuit(MergeSettings::Append, 2);
        let proof = MergeProver::new(&queue, &ck).construct_proof().unwrap();
        let verifier = MergeVerifier::new(MergeSettings::Append, &vk);
        assert!(verifier.verify_proof(&proof, SEEDED_ROWS));

        let mut rewritten = proof;
        rewritten.data[..4].copy_from_slice(&2u32.to_le_bytes());
        assert!(!verifier.verify_proof(&rewritten, SEEDED_ROWS));
    }

    #[test]
    fn test_merge_rejects_wrong_previous_size() {
        let (ck, vk) = keys();
        let queue = queue_with_circuit(MergeSettings::Append, 1);
        let proof = MergeProver::new(&queue, &ck).construct_proof().unwrap();
        let verifier = MergeVerifier::new(MergeSettings::Append, &vk);
        assert!(!verifier.verify_proof(&proof, SEEDED_ROWS + 2));
        assert!(!verifier.verify_proof(&proof, 0));
        assert!(matches!(
            verifier.reduce_verify(&proof, vk.size),
            Err(GoblinError::MalformedProof(_))
        ));
    }

    #[test]
    fn test_merge_understated_subtable_fails_degree_check() {
        let (ck, vk) = keys();
        let queue = queue_with_circuit(MergeSettings::Append, 2);
        let actual = queue.get_current_subtable_num_rows();
        let proof = MergeProver::new(&queue, &ck)
            .prove_claiming(actual - 2)
            .unwrap();

        let verification = MergeVerifier::new(MergeSettings::Append, &vk)
            .reduce_verify(&proof, SEEDED_ROWS)
            .unwrap();
        assert!(verification.identity_checked);
        assert!(!verification.degree_checked);
        assert!(verification.pairing_points.check(&vk));
        assert!(!MergeVerifier::new(MergeSettings::Append, &vk).verify_proof(&proof, SEEDED_ROWS));
    }

    #[test]
    fn test_degree_check_column_pads_to_key_size() {
        let column = vec![Scalar::one(), Scalar::from(2u64)];
        let shifted = crate::merge_prover::degree_check_column(&column, 5);
        assert_eq!(shifted.len(), 5);
        assert_eq!(&shifted[3..], &column[..]);
        assert!(shifted[..3].iter().all(|c| *c == Scalar::zero()));
    }

    #[test]
    fn test_merge_requires_previous_table() {
        let (ck, _) = keys();
        let mut queue = EccOpQueue::new();
        queue.initialize_new_subtable(MergeSettings::Prepend);
        queue.add_accumulate(GroupElement::generator());
        assert!(matches!(
            MergeProver::new(&queue, &ck).construct_proof(),
            Err(GoblinError::EmptyPreviousTable)
        ));
    }
}
