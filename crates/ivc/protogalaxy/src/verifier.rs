//! ProtoGalaxy folding verifier
//!
//! Replays the folding transcript and folds its own accumulator with the same
//! challenges the prover used. The result must match the prover's accumulator
//! commitment for commitment; the decider checks the rest.

use crate::errors::{FoldingError, Result};
use crate::shared::{
    alpha_labels, compute_next_target_sum, compute_round_challenge_pows, fold_commitments,
    fold_scalars, label, lagranges, update_gate_challenges, ACCUMULATOR_DOMAIN_SEPARATOR,
    FOLDING_TRANSCRIPT_LABEL, INCOMING_DOMAIN_SEPARATOR,
};
use crate::univariate::Univariate;
use crate::{GroupElement, Scalar};
use ivc_commitments::{polynomial, Proof, Transcript};
use ivc_core::flavor::{
    precomputed_labels, witness_labels, BATCHED_EXTENDED_LENGTH, NUM_PRECOMPUTED_ENTITIES,
    NUM_SUBRELATION_SEPARATORS, NUM_WIRES,
};
use ivc_core::{RelationParameters, VerificationKey, VerifierInstance};
use tracing::{debug, instrument};

pub struct ProtogalaxyVerifier<'a> {
    accumulator: &'a VerifierInstance,
    incoming_vk: &'a VerificationKey,
}

impl<'a> ProtogalaxyVerifier<'a> {
    /// `accumulator` may be an existing accumulator or a fresh instance built
    /// from a verification key
    pub fn new(accumulator: &'a VerifierInstance, incoming_vk: &'a VerificationKey) -> Self {
        Self {
            accumulator,
            incoming_vk,
        }
    }

    /// Fold the incoming instance into a copy of the accumulator
    #[instrument(skip_all, name = "protogalaxy_verify")]
    pub fn verify_folding_proof(&self, proof: &Proof) -> Result<VerifierInstance> {
        let mut transcript = Transcript::from_proof(FOLDING_TRANSCRIPT_LABEL, proof);
        let mut accumulator = self.accumulator.clone();
        let mut incoming = VerifierInstance::new(self.incoming_vk.clone());

        let is_accumulator: u32 = transcript
            .receive_from_prover(&label(ACCUMULATOR_DOMAIN_SEPARATOR, "is_accumulator"))?;
        if (is_accumulator != 0) != accumulator.is_accumulator {
            return Err(FoldingError::AccumulatorMismatch(format!(
                "proof folds into {} accumulator",
                if is_accumulator != 0 { "an existing" } else { "a fresh" }
            )));
        }
        if accumulator.is_accumulator {
            receive_accumulator(&mut transcript, &accumulator, ACCUMULATOR_DOMAIN_SEPARATOR)?;
        } else {
            receive_and_finalise_instance(
                &mut transcript,
                &mut accumulator,
                ACCUMULATOR_DOMAIN_SEPARATOR,
            )?;
        }
        receive_and_finalise_instance(&mut transcript, &mut incoming, INCOMING_DOMAIN_SEPARATOR)?;

        let vk = &accumulator.verification_key;
        if vk.circuit_size != incoming.verification_key.circuit_size {
            return Err(FoldingError::SizeMismatch {
                accumulator: vk.circuit_size,
                incoming: incoming.verification_key.circuit_size,
            });
        }

        // Perturbator round
        let delta = transcript.get_challenge("delta");
        let deltas = compute_round_challenge_pows(vk.log_circuit_size, delta);
        let perturbator: Vec<Scalar> =
            transcript.receive_all_from_prover("perturbator", vk.log_circuit_size + 1)?;
        if perturbator[0] != accumulator.target_sum {
            return Err(FoldingError::PerturbatorMismatch {
                expected: format!("{:?}", accumulator.target_sum),
                actual: format!("{:?}", perturbator[0]),
            });
        }
        let perturbator_challenge = transcript.get_challenge("perturbator_challenge");
        let perturbator_evaluation = polynomial::evaluate(&perturbator, perturbator_challenge);

        // Combiner quotient round
        let quotient_evaluations: Vec<Scalar> = transcript
            .receive_all_from_prover("combiner_quotient", BATCHED_EXTENDED_LENGTH - 2)?;
        let combiner_challenge = transcript.get_challenge("combiner_quotient_challenge");
        if !transcript.is_exhausted() {
            return Err(FoldingError::MalformedProof(
                "trailing bytes after folding proof".to_string(),
            ));
        }
        let quotient_evaluation =
            Univariate::new(quotient_evaluations, 2).evaluate(combiner_challenge)?;

        let gate_challenges = update_gate_challenges(
            perturbator_challenge,
            &accumulator.gate_challenges,
            &deltas,
        );
        let (l0, l1) = lagranges(combiner_challenge);

        let mut folded = accumulator.clone();
        folded.public_inputs = fold_scalars(&accumulator.public_inputs, &incoming.public_inputs, l0, l1);
        folded.verification_key.num_public_inputs = folded.public_inputs.len();
        folded.verification_key.commitments = fold_commitments(
            &accumulator.verification_key.commitments,
            &incoming.verification_key.commitments,
            l0,
            l1,
        );
        folded.witness_commitments = fold_commitments(
            &accumulator.witness_commitments,
            &incoming.witness_commitments,
            l0,
            l1,
        );
        folded.relation_parameters = accumulator
            .relation_parameters
            .fold(&incoming.relation_parameters, l0, l1);
        folded.alphas = fold_scalars(&accumulator.alphas, &incoming.alphas, l0, l1);
        folded.target_sum =
            compute_next_target_sum(perturbator_evaluation, quotient_evaluation, combiner_challenge);
        folded.gate_challenges = gate_challenges;
        folded.is_accumulator = true;

        debug!(proof_bytes = proof.len(), "verified folding proof");
        Ok(folded)
    }
}

fn receive_commitments(
    transcript: &mut Transcript,
    d: &str,
    names: &[&str],
) -> Result<Vec<GroupElement>> {
    names
        .iter()
        .map(|name| {
            transcript
                .receive_from_prover::<GroupElement>(&label(d, name))
                .map_err(FoldingError::from)
        })
        .collect()
}

/// Sizes and public inputs, checked against `vk`
fn receive_instance_header(
    transcript: &mut Transcript,
    vk: &VerificationKey,
    d: &str,
) -> Result<Vec<Scalar>> {
    let circuit_size: u32 = transcript.receive_from_prover(&label(d, "circuit_size"))?;
    if circuit_size as usize != vk.circuit_size {
        return Err(FoldingError::VerificationKeyMismatch(format!(
            "instance {} has {} rows, key has {}",
            d, circuit_size, vk.circuit_size
        )));
    }
    let public_input_size: u32 = transcript.receive_from_prover(&label(d, "public_input_size"))?;
    if public_input_size as usize != vk.num_public_inputs {
        return Err(FoldingError::VerificationKeyMismatch(format!(
            "instance {} has {} public inputs, key has {}",
            d, public_input_size, vk.num_public_inputs
        )));
    }
    let public_inputs =
        transcript.receive_all_from_prover(&label(d, "public_input"), vk.num_public_inputs)?;
    Ok(public_inputs)
}

/// Precomputed commitments; they must match `vk`
fn receive_verification_key(
    transcript: &mut Transcript,
    vk: &VerificationKey,
    d: &str,
) -> Result<()> {
    let commitments = receive_commitments(transcript, d, precomputed_labels())?;
    if vk.commitments.len() != NUM_PRECOMPUTED_ENTITIES || commitments != vk.commitments {
        return Err(FoldingError::VerificationKeyMismatch(format!(
            "instance {} precomputed commitments differ from the key",
            d
        )));
    }
    Ok(())
}

fn receive_and_finalise_instance(
    transcript: &mut Transcript,
    instance: &mut VerifierInstance,
    d: &str,
) -> Result<()> {
    instance.public_inputs = receive_instance_header(transcript, &instance.verification_key, d)?;

    let labels = witness_labels();
    let mut witness_commitments = receive_commitments(transcript, d, &labels[..2 * NUM_WIRES])?;

    let eta = transcript.get_challenge(&label(d, "eta"));
    witness_commitments.push(transcript.receive_from_prover(&label(d, labels[2 * NUM_WIRES]))?);

    let challenges = transcript.get_challenges(&[label(d, "beta"), label(d, "gamma")]);
    let (beta, gamma) = (challenges[0], challenges[1]);
    witness_commitments
        .push(transcript.receive_from_prover(&label(d, labels[2 * NUM_WIRES + 1]))?);

    instance.alphas = transcript.get_challenges(&alpha_labels(d, NUM_SUBRELATION_SEPARATORS));
    receive_verification_key(transcript, &instance.verification_key, d)?;
    instance.witness_commitments = witness_commitments;
    instance.relation_parameters = RelationParameters { eta, beta, gamma };
    instance.target_sum = Scalar::zero();
    instance.gate_challenges = vec![Scalar::zero(); instance.verification_key.log_circuit_size];
    Ok(())
}

/// Read back a re-sent accumulator and compare it with the verifier's copy
fn receive_accumulator(
    transcript: &mut Transcript,
    accumulator: &VerifierInstance,
    d: &str,
) -> Result<()> {
    let mismatch = |what: &str| FoldingError::AccumulatorMismatch(format!("{} differs", what));

    let public_inputs = receive_instance_header(transcript, &accumulator.verification_key, d)?;
    if public_inputs != accumulator.public_inputs {
        return Err(mismatch("public inputs"));
    }
    if receive_commitments(transcript, d, witness_labels())? != accumulator.witness_commitments {
        return Err(mismatch("witness commitments"));
    }

    let eta: Scalar = transcript.receive_from_prover(&label(d, "eta"))?;
    let beta: Scalar = transcript.receive_from_prover(&label(d, "beta"))?;
    let gamma: Scalar = transcript.receive_from_prover(&label(d, "gamma"))?;
    if (RelationParameters { eta, beta, gamma }) != accumulator.relation_parameters {
        return Err(mismatch("relation parameters"));
    }

    let alphas = alpha_labels(d, accumulator.alphas.len())
        .iter()
        .map(|name| transcript.receive_from_prover::<Scalar>(name))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    if alphas != accumulator.alphas {
        return Err(mismatch("alphas"));
    }
    receive_verification_key(transcript, &accumulator.verification_key, d)?;

    let target_sum: Scalar = transcript.receive_from_prover(&label(d, "target_sum"))?;
    if target_sum != accumulator.target_sum {
        return Err(mismatch("target sum"));
    }
    let gate_challenges: Vec<Scalar> = transcript.receive_all_from_prover(
        &label(d, "gate_challenge"),
        accumulator.gate_challenges.len(),
    )?;
    if gate_challenges != accumulator.gate_challenges {
        return Err(mismatch("gate challenges"));
    }
    Ok(())
}
