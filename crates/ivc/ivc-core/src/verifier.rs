//! Decider verifier

use crate::flavor::{ProverPolynomials, ENTITY_LABELS, NUM_PRECOMPUTED_ENTITIES};
use crate::gate_separator::separated_sum;
use crate::instance::VerifierInstance;
use crate::prover::DECIDER_TRANSCRIPT_LABEL;
use crate::relations::compute_row_evaluations;
use crate::{CoreError, Result, Scalar};
use ivc_commitments::{CommitmentKey, Proof, Transcript};
use tracing::{debug, warn};

pub struct DeciderVerifier<'a> {
    accumulator: &'a VerifierInstance,
    commitment_key: &'a CommitmentKey,
}

impl<'a> DeciderVerifier<'a> {
    pub fn new(accumulator: &'a VerifierInstance, commitment_key: &'a CommitmentKey) -> Self {
        Self {
            accumulator,
            commitment_key,
        }
    }

    /// Accept iff the revealed columns match the accumulator's commitments and
    /// the relaxed relation sums to its target
    pub fn verify_proof(&self, proof: &Proof) -> bool {
        match self.reduce_verify(proof) {
            Ok(verified) => verified,
            Err(err) => {
                warn!(%err, "rejecting malformed decider proof");
                false
            }
        }
    }

    fn reduce_verify(&self, proof: &Proof) -> Result<bool> {
        let accumulator = self.accumulator;
        let vk = &accumulator.verification_key;
        let mut transcript = Transcript::from_proof(DECIDER_TRANSCRIPT_LABEL, proof);

        let circuit_size: u32 = transcript.receive_from_prover("circuit_size")?;
        if circuit_size as usize != vk.circuit_size {
            return Err(CoreError::MalformedProof(format!(
                "circuit size {} does not match the key's {}",
                circuit_size, vk.circuit_size
            )));
        }

        let columns = ENTITY_LABELS
            .iter()
            .map(|label| transcript.receive_all_from_prover::<Scalar>(label, vk.circuit_size))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if !transcript.is_exhausted() {
            return Err(CoreError::MalformedProof(
                "trailing bytes after decider proof".to_string(),
            ));
        }
        let polynomials = ProverPolynomials::from_columns(columns)
            .ok_or_else(|| CoreError::MalformedProof("ragged columns".to_string()))?;

        let column_slices: Vec<&[Scalar]> = polynomials.get_all().iter().map(Vec::as_slice).collect();
        let commitments = self.commitment_key.commit_all(&column_slices)?;
        let (precomputed, witness) = commitments.split_at(NUM_PRECOMPUTED_ENTITIES);
        if precomputed != vk.commitments.as_slice() {
            warn!("decider columns do not match the verification key");
            return Ok(false);
        }
        if witness != accumulator.witness_commitments.as_slice() {
            warn!("decider columns do not match the witness commitments");
            return Ok(false);
        }

        let row_evaluations = compute_row_evaluations(
            &polynomials,
            &accumulator.public_inputs,
            &accumulator.alphas,
            &accumulator.relation_parameters,
        );
        let sum = separated_sum(&accumulator.gate_challenges, &row_evaluations);
        let verified = sum == accumulator.target_sum;
        debug!(verified, "decider check");
        Ok(verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Circuit;
    use crate::flavor::column;
    use crate::instance::ProverInstance;
    use crate::prover::DeciderProver;
    use crate::relations::RelationParameters;
    use crate::GroupElement;
    use ivc_commitments::setup;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn accumulator_pair(ck: &CommitmentKey) -> (ProverInstance, VerifierInstance) {
        let mut circuit = Circuit::new();
        let a = circuit.add_public_variable(Scalar::from(2u64));
        let b = circuit.add_variable(Scalar::from(9u64));
        let c = circuit.add_variable(Scalar::from(18u64));
        circuit.create_mul_gate(a, b, c);
        circuit.queue_ecc_add_accum(GroupElement::generator());
        circuit.queue_ecc_eq();

        let mut instance = ProverInstance::new(&circuit, 4, ck, None).unwrap();
        let params = RelationParameters {
            eta: Scalar::from(3u64),
            beta: Scalar::from(5u64),
            gamma: Scalar::from(7u64),
        };
        instance.compute_sorted_accumulator(params.eta);
        instance.compute_grand_product(params.beta, params.gamma).unwrap();
        instance.relation_parameters = params;
        instance.alphas = (1..13u64).map(Scalar::from).collect();
        instance.gate_challenges = (20..24u64).map(Scalar::from).collect();
        // A relaxed instance: make one row nonzero and record the resulting sum.
        instance.polynomials.get_mut(column::Q_C)[10] = Scalar::from(4u64);
        instance.target_sum = instance.compute_relation_sum();
        let witness: Vec<&[Scalar]> = instance.polynomials.witness().iter().map(Vec::as_slice).collect();
        instance.witness_commitments = ck.commit_all(&witness).unwrap();
        instance.verification_key =
            crate::VerificationKey::from_polynomials(&instance.polynomials, 1, ck).unwrap();
        instance.is_accumulator = true;

        let verifier_instance = VerifierInstance {
            verification_key: instance.verification_key.clone(),
            public_inputs: instance.public_inputs.clone(),
            witness_commitments: instance.witness_commitments.clone(),
            relation_parameters: instance.relation_parameters,
            alphas: instance.alphas.clone(),
            target_sum: instance.target_sum,
            gate_challenges: instance.gate_challenges.clone(),
            is_accumulator: true,
        };
        (instance, verifier_instance)
    }

    #[test]
    fn test_decider_accepts_honest_accumulator() {
        let (ck, _) = setup(16, &mut StdRng::seed_from_u64(4)).unwrap();
        let (instance, verifier_instance) = accumulator_pair(&ck);
        assert_ne!(instance.target_sum, Scalar::zero());
        let proof = DeciderProver::new(&instance).construct_proof().unwrap();
        assert!(DeciderVerifier::new(&verifier_instance, &ck).verify_proof(&proof));
    }

    #[test]
    fn test_decider_rejects_wrong_target() {
        let (ck, _) = setup(16, &mut StdRng::seed_from_u64(4)).unwrap();
        let (instance, mut verifier_instance) = accumulator_pair(&ck);
        verifier_instance.target_sum += Scalar::one();
        let proof = DeciderProver::new(&instance).construct_proof().unwrap();
        assert!(!DeciderVerifier::new(&verifier_instance, &ck).verify_proof(&proof));
    }

    #[test]
    fn test_decider_rejects_tampered_proof() {
        let (ck, _) = setup(16, &mut StdRng::seed_from_u64(4)).unwrap();
        let (instance, verifier_instance) = accumulator_pair(&ck);
        let proof = DeciderProver::new(&instance).construct_proof().unwrap();
        let verifier = DeciderVerifier::new(&verifier_instance, &ck);
        for position in [0, 4, proof.len() / 2, proof.len() - 1] {
            let mut tampered = proof.clone();
            tampered.data[position] ^= 0x01;
            assert!(!verifier.verify_proof(&tampered), "byte {}", position);
        }
    }
}
