//! Gate separator polynomial `pow_i(beta) = prod_{bit b of i} beta_b`

use crate::Scalar;

/// All `2^len(betas)` separator values; bit `b` of the row index selects `betas[b]`
pub fn compute_gate_separators(betas: &[Scalar]) -> Vec<Scalar> {
    let mut pows = Vec::with_capacity(1 << betas.len());
    pows.push(Scalar::one());
    for beta in betas {
        let upper: Vec<Scalar> = pows.iter().map(|p| p * beta).collect();
        pows.extend(upper);
    }
    pows
}

/// Sum over rows of `pow_i(betas) * evaluations[i]`
pub fn separated_sum(betas: &[Scalar], evaluations: &[Scalar]) -> Scalar {
    compute_gate_separators(betas)
        .iter()
        .zip(evaluations.iter())
        .fold(Scalar::zero(), |acc, (pow, eval)| acc + pow * eval)
}
