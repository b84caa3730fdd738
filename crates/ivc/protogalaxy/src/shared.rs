//! Computations and transcript labels shared by the folding prover and verifier

use crate::{GroupElement, GroupProjective, Scalar};

/// Domain separator of the accumulator in the folding transcript
pub const ACCUMULATOR_DOMAIN_SEPARATOR: &str = "0";

/// Domain separator of the incoming instance in the folding transcript
pub const INCOMING_DOMAIN_SEPARATOR: &str = "1";

pub(crate) const FOLDING_TRANSCRIPT_LABEL: &[u8] = b"protogalaxy";

pub(crate) fn label(domain_separator: &str, name: &str) -> String {
    format!("{}_{}", domain_separator, name)
}

pub(crate) fn alpha_labels(domain_separator: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("{}_alpha_{}", domain_separator, i))
        .collect()
}

/// `[delta, delta^2, delta^4, ..., delta^(2^(log_n - 1))]`
pub fn compute_round_challenge_pows(log_circuit_size: usize, delta: Scalar) -> Vec<Scalar> {
    let mut pows = Vec::with_capacity(log_circuit_size);
    let mut current = delta;
    for _ in 0..log_circuit_size {
        pows.push(current);
        current = current.square();
    }
    pows
}

/// `beta_i* = beta_i + perturbator_challenge * delta_i`
pub fn update_gate_challenges(
    perturbator_challenge: Scalar,
    gate_challenges: &[Scalar],
    deltas: &[Scalar],
) -> Vec<Scalar> {
    gate_challenges
        .iter()
        .zip(deltas.iter())
        .map(|(beta, delta)| beta + perturbator_challenge * delta)
        .collect()
}

/// Lagrange basis over {0, 1} at `challenge`: `(1 - challenge, challenge)`
pub fn lagranges(challenge: Scalar) -> (Scalar, Scalar) {
    (Scalar::one() - challenge, challenge)
}

/// `challenge * (challenge - 1)`, vanishing on {0, 1}
pub fn vanishing_polynomial(challenge: Scalar) -> Scalar {
    challenge * (challenge - Scalar::one())
}

/// `F(alpha) L_0(gamma) + Z(gamma) K(gamma)`
pub fn compute_next_target_sum(
    perturbator_evaluation: Scalar,
    combiner_quotient_evaluation: Scalar,
    combiner_challenge: Scalar,
) -> Scalar {
    let (l0, _) = lagranges(combiner_challenge);
    perturbator_evaluation * l0
        + vanishing_polynomial(combiner_challenge) * combiner_quotient_evaluation
}

/// `l0 * a + l1 * b`, zero-padding the shorter vector
pub fn fold_scalars(a: &[Scalar], b: &[Scalar], l0: Scalar, l1: Scalar) -> Vec<Scalar> {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(Scalar::zero());
            let y = b.get(i).copied().unwrap_or(Scalar::zero());
            x * l0 + y * l1
        })
        .collect()
}

/// `l0 * a + l1 * b` for commitment vectors of equal length
pub fn fold_commitments(
    a: &[GroupElement],
    b: &[GroupElement],
    l0: Scalar,
    l1: Scalar,
) -> Vec<GroupElement> {
    let projective: Vec<GroupProjective> = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| x * l0 + y * l1)
        .collect();
    let mut folded = vec![GroupElement::identity(); projective.len()];
    GroupProjective::batch_normalize(&projective, &mut folded);
    folded
}
