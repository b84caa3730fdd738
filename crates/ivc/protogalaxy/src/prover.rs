//! ProtoGalaxy folding prover
//!
//! Folds one incoming instance into an accumulator in four rounds:
//!
//! 1. Complete both instances' witnesses under the transcript (an existing
//!    accumulator is only re-sent).
//! 2. Perturbator: commit to `F(X) = sum_i pow_i(beta + delta X) f_i` of the
//!    accumulator and draw the perturbator challenge.
//! 3. Combiner quotient: send `K` on {2, .., 10} and draw the combiner challenge.
//! 4. Fold every polynomial, commitment and challenge with `(1 - gamma, gamma)`.

use crate::errors::{FoldingError, Result};
use crate::prover_internal::{
    compute_combiner, compute_combiner_quotient, compute_perturbator, evaluate_perturbator,
};
use crate::shared::{
    alpha_labels, compute_next_target_sum, compute_round_challenge_pows, fold_commitments,
    fold_scalars, label, lagranges, update_gate_challenges, ACCUMULATOR_DOMAIN_SEPARATOR,
    FOLDING_TRANSCRIPT_LABEL, INCOMING_DOMAIN_SEPARATOR,
};
use crate::Scalar;
use ivc_commitments::{CommitmentKey, Proof, Transcript};
use ivc_core::flavor::{
    column, precomputed_labels, witness_labels, NUM_SUBRELATION_SEPARATORS, NUM_WIRES,
};
use ivc_core::{ProverInstance, RelationParameters};
use rayon::prelude::*;
use tracing::{debug, instrument};

/// Folded accumulator and the proof a verifier replays to fold its own copy
#[derive(Clone, Debug)]
pub struct FoldingResult {
    pub accumulator: ProverInstance,
    pub proof: Proof,
}

pub struct ProtogalaxyProver<'a> {
    accumulator: ProverInstance,
    incoming: ProverInstance,
    commitment_key: &'a CommitmentKey,
    transcript: Transcript,
}

impl<'a> ProtogalaxyProver<'a> {
    /// `accumulator` may be an existing accumulator or a fresh instance
    pub fn new(
        accumulator: ProverInstance,
        incoming: ProverInstance,
        commitment_key: &'a CommitmentKey,
    ) -> Self {
        Self {
            accumulator,
            incoming,
            commitment_key,
            transcript: Transcript::new(FOLDING_TRANSCRIPT_LABEL),
        }
    }

    #[instrument(skip_all, name = "protogalaxy_prove")]
    pub fn prove(mut self) -> Result<FoldingResult> {
        if self.accumulator.circuit_size() != self.incoming.circuit_size() {
            return Err(FoldingError::SizeMismatch {
                accumulator: self.accumulator.circuit_size(),
                incoming: self.incoming.circuit_size(),
            });
        }

        self.run_oink_on_each_instance()?;
        let (deltas, perturbator, perturbator_challenge) = self.perturbator_round()?;
        let (gate_challenges, perturbator_evaluation, combiner_challenge, quotient_evaluation) =
            self.combiner_quotient_round(&deltas, &perturbator, perturbator_challenge)?;
        self.update_target_sum_and_fold(
            gate_challenges,
            perturbator_evaluation,
            quotient_evaluation,
            combiner_challenge,
        );

        let proof = self.transcript.export_proof();
        debug!(
            proof_bytes = proof.len(),
            circuit_size = self.accumulator.circuit_size(),
            "folded incoming instance"
        );
        Ok(FoldingResult {
            accumulator: self.accumulator,
            proof,
        })
    }

    fn run_oink_on_each_instance(&mut self) -> Result<()> {
        let is_accumulator = u32::from(self.accumulator.is_accumulator);
        self.transcript.send_to_verifier(
            &label(ACCUMULATOR_DOMAIN_SEPARATOR, "is_accumulator"),
            &is_accumulator,
        );
        if self.accumulator.is_accumulator {
            send_accumulator(
                &mut self.transcript,
                &self.accumulator,
                ACCUMULATOR_DOMAIN_SEPARATOR,
            );
        } else {
            finalise_and_send_instance(
                &mut self.transcript,
                &mut self.accumulator,
                self.commitment_key,
                ACCUMULATOR_DOMAIN_SEPARATOR,
            )?;
        }
        finalise_and_send_instance(
            &mut self.transcript,
            &mut self.incoming,
            self.commitment_key,
            INCOMING_DOMAIN_SEPARATOR,
        )
    }

    fn perturbator_round(&mut self) -> Result<(Vec<Scalar>, Vec<Scalar>, Scalar)> {
        let delta = self.transcript.get_challenge("delta");
        let deltas = compute_round_challenge_pows(self.accumulator.log_circuit_size(), delta);
        let perturbator = compute_perturbator(&self.accumulator, &deltas);

        if perturbator[0] != self.accumulator.target_sum {
            return Err(FoldingError::PerturbatorMismatch {
                expected: format!("{:?}", self.accumulator.target_sum),
                actual: format!("{:?}", perturbator[0]),
            });
        }

        self.transcript.send_all_to_verifier("perturbator", &perturbator);
        let perturbator_challenge = self.transcript.get_challenge("perturbator_challenge");
        Ok((deltas, perturbator, perturbator_challenge))
    }

    fn combiner_quotient_round(
        &mut self,
        deltas: &[Scalar],
        perturbator: &[Scalar],
        perturbator_challenge: Scalar,
    ) -> Result<(Vec<Scalar>, Scalar, Scalar, Scalar)> {
        let gate_challenges = update_gate_challenges(
            perturbator_challenge,
            &self.accumulator.gate_challenges,
            deltas,
        );
        let perturbator_evaluation = evaluate_perturbator(perturbator, perturbator_challenge);
        let combiner = compute_combiner(&self.accumulator, &self.incoming, &gate_challenges);
        let quotient = compute_combiner_quotient(&combiner, perturbator_evaluation)?;

        self.transcript
            .send_all_to_verifier("combiner_quotient", &quotient.evaluations);
        let combiner_challenge = self.transcript.get_challenge("combiner_quotient_challenge");
        let quotient_evaluation = quotient.evaluate(combiner_challenge)?;
        Ok((
            gate_challenges,
            perturbator_evaluation,
            combiner_challenge,
            quotient_evaluation,
        ))
    }

    fn update_target_sum_and_fold(
        &mut self,
        gate_challenges: Vec<Scalar>,
        perturbator_evaluation: Scalar,
        quotient_evaluation: Scalar,
        combiner_challenge: Scalar,
    ) {
        let (l0, l1) = lagranges(combiner_challenge);
        let incoming = &self.incoming;
        let accumulator = &mut self.accumulator;

        accumulator
            .polynomials
            .get_all_mut()
            .par_iter_mut()
            .zip(incoming.polynomials.get_all().par_iter())
            .for_each(|(acc, inc)| {
                for (a, b) in acc.iter_mut().zip(inc.iter()) {
                    *a = *a * l0 + b * l1;
                }
            });

        accumulator.public_inputs =
            fold_scalars(&accumulator.public_inputs, &incoming.public_inputs, l0, l1);
        accumulator.verification_key.num_public_inputs = accumulator.public_inputs.len();
        accumulator.verification_key.commitments = fold_commitments(
            &accumulator.verification_key.commitments,
            &incoming.verification_key.commitments,
            l0,
            l1,
        );
        accumulator.witness_commitments = fold_commitments(
            &accumulator.witness_commitments,
            &incoming.witness_commitments,
            l0,
            l1,
        );
        accumulator.relation_parameters = accumulator
            .relation_parameters
            .fold(&incoming.relation_parameters, l0, l1);
        accumulator.alphas = fold_scalars(&accumulator.alphas, &incoming.alphas, l0, l1);
        accumulator.target_sum =
            compute_next_target_sum(perturbator_evaluation, quotient_evaluation, combiner_challenge);
        accumulator.gate_challenges = gate_challenges;
        accumulator.is_accumulator = true;
    }
}

/// Sizes and public inputs shared by both transcript forms
fn send_instance_header(transcript: &mut Transcript, instance: &ProverInstance, d: &str) {
    let vk = &instance.verification_key;
    transcript.send_to_verifier(&label(d, "circuit_size"), &(vk.circuit_size as u32));
    transcript.send_to_verifier(
        &label(d, "public_input_size"),
        &(instance.public_inputs.len() as u32),
    );
    transcript.send_all_to_verifier(&label(d, "public_input"), &instance.public_inputs);
}

/// Precomputed commitments, sent once the instance's alphas are fixed
fn send_verification_key(transcript: &mut Transcript, instance: &ProverInstance, d: &str) {
    let commitments = &instance.verification_key.commitments;
    for (name, commitment) in precomputed_labels().iter().zip(commitments.iter()) {
        transcript.send_to_verifier(&label(d, name), commitment);
    }
}

/// Commit the witness of a fresh instance and derive its challenges
fn finalise_and_send_instance(
    transcript: &mut Transcript,
    instance: &mut ProverInstance,
    ck: &CommitmentKey,
    d: &str,
) -> Result<()> {
    send_instance_header(transcript, instance, d);

    let labels = witness_labels();
    let wires: Vec<&[Scalar]> = (0..2 * NUM_WIRES)
        .map(|j| instance.polynomials.get(column::W_1 + j))
        .collect();
    let mut witness_commitments = ck.commit_all(&wires)?;
    for (name, commitment) in labels.iter().zip(witness_commitments.iter()) {
        transcript.send_to_verifier(&label(d, name), commitment);
    }

    let eta = transcript.get_challenge(&label(d, "eta"));
    instance.compute_sorted_accumulator(eta);
    let sorted_accum = ck.commit(instance.polynomials.get(column::SORTED_ACCUM))?;
    transcript.send_to_verifier(&label(d, labels[2 * NUM_WIRES]), &sorted_accum);
    witness_commitments.push(sorted_accum);

    let challenges = transcript.get_challenges(&[label(d, "beta"), label(d, "gamma")]);
    let (beta, gamma) = (challenges[0], challenges[1]);
    instance.compute_grand_product(beta, gamma)?;
    let z_perm = ck.commit(instance.polynomials.get(column::Z_PERM))?;
    transcript.send_to_verifier(&label(d, labels[2 * NUM_WIRES + 1]), &z_perm);
    witness_commitments.push(z_perm);

    instance.alphas = transcript.get_challenges(&alpha_labels(d, NUM_SUBRELATION_SEPARATORS));
    send_verification_key(transcript, instance, d);
    instance.witness_commitments = witness_commitments;
    instance.relation_parameters = RelationParameters { eta, beta, gamma };
    instance.target_sum = Scalar::zero();
    instance.gate_challenges = vec![Scalar::zero(); instance.log_circuit_size()];
    Ok(())
}

/// Re-send an accumulator so its data is bound by the transcript
fn send_accumulator(transcript: &mut Transcript, accumulator: &ProverInstance, d: &str) {
    send_instance_header(transcript, accumulator, d);
    for (name, commitment) in witness_labels()
        .iter()
        .zip(accumulator.witness_commitments.iter())
    {
        transcript.send_to_verifier(&label(d, name), commitment);
    }
    let params = &accumulator.relation_parameters;
    transcript.send_to_verifier(&label(d, "eta"), &params.eta);
    transcript.send_to_verifier(&label(d, "beta"), &params.beta);
    transcript.send_to_verifier(&label(d, "gamma"), &params.gamma);
    for (name, alpha) in alpha_labels(d, accumulator.alphas.len())
        .iter()
        .zip(accumulator.alphas.iter())
    {
        transcript.send_to_verifier(name, alpha);
    }
    send_verification_key(transcript, accumulator, d);
    transcript.send_to_verifier(&label(d, "target_sum"), &accumulator.target_sum);
    transcript.send_all_to_verifier(&label(d, "gate_challenge"), &accumulator.gate_challenges);
}
