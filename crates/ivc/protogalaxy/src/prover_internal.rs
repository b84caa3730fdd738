//! Perturbator and combiner computations of the folding prover

use crate::univariate::Univariate;
use crate::{FoldingError, Result, Scalar};
use ivc_commitments::polynomial;
use ivc_core::flavor::{Row, BATCHED_EXTENDED_LENGTH};
use ivc_core::gate_separator::compute_gate_separators;
use ivc_core::relations::{batch_subrelations, evaluate_subrelations};
use ivc_core::{ProverInstance, RelationParameters};
use rayon::prelude::*;

/// Coefficients of `F(X) = sum_i pow_i(beta + delta X) f_i`
///
/// Rows are the leaves of a binary tree. Level `l` merges siblings that differ
/// in bit `l` of the row index: `parent = left + right * (beta_l + delta_l X)`,
/// so a node at level `l` has degree `l`.
pub fn construct_perturbator_coefficients(
    betas: &[Scalar],
    deltas: &[Scalar],
    full_honk_evaluations: &[Scalar],
) -> Vec<Scalar> {
    let mut level: Vec<Vec<Scalar>> = full_honk_evaluations.iter().map(|e| vec![*e]).collect();
    for (beta, delta) in betas.iter().zip(deltas.iter()) {
        level = level
            .par_chunks(2)
            .map(|pair| {
                let left = &pair[0];
                let right = pair.get(1).map(Vec::as_slice).unwrap_or(&[]);
                let mut parent = vec![Scalar::zero(); left.len() + 1];
                for (j, coeff) in left.iter().enumerate() {
                    parent[j] += coeff;
                }
                for (j, coeff) in right.iter().enumerate() {
                    parent[j] += coeff * beta;
                    parent[j + 1] += coeff * delta;
                }
                parent
            })
            .collect();
    }
    level
        .into_iter()
        .next()
        .unwrap_or_else(|| vec![Scalar::zero(); betas.len() + 1])
}

/// Perturbator of the accumulator for the round challenges `deltas`
pub fn compute_perturbator(accumulator: &ProverInstance, deltas: &[Scalar]) -> Vec<Scalar> {
    construct_perturbator_coefficients(
        &accumulator.gate_challenges,
        deltas,
        &accumulator.row_evaluations(),
    )
}

pub fn evaluate_perturbator(coefficients: &[Scalar], point: Scalar) -> Scalar {
    polynomial::evaluate(coefficients, point)
}

/// `G(k) = sum_i pow_i(beta*) f(row_i(k))` for `k` in {0, .., 10}, where
/// `row_i(k)` interpolates the accumulator at 0 and the incoming instance at 1
pub fn compute_combiner(
    accumulator: &ProverInstance,
    incoming: &ProverInstance,
    gate_challenges: &[Scalar],
) -> Vec<Scalar> {
    let points: Vec<Scalar> = (0..BATCHED_EXTENDED_LENGTH)
        .map(|k| Scalar::from(k as u64))
        .collect();
    let parameters: Vec<RelationParameters> = points
        .iter()
        .map(|k| {
            accumulator
                .relation_parameters
                .interpolate(&incoming.relation_parameters, *k)
        })
        .collect();
    let alphas: Vec<Vec<Scalar>> = points
        .iter()
        .map(|k| {
            let (l0, l1) = (Scalar::one() - k, *k);
            accumulator
                .alphas
                .iter()
                .zip(incoming.alphas.iter())
                .map(|(a, b)| a * l0 + b * l1)
                .collect()
        })
        .collect();
    let gate_separators = compute_gate_separators(gate_challenges);

    (0..accumulator.circuit_size())
        .into_par_iter()
        .map(|i| {
            let mut contribution = vec![Scalar::zero(); BATCHED_EXTENDED_LENGTH];
            let pow = gate_separators[i];
            if pow == Scalar::zero() {
                return contribution;
            }
            let row_0 = accumulator.row(i);
            let row_1 = incoming.row(i);
            for (k, point) in points.iter().enumerate() {
                let row = Row::interpolate(&row_0, &row_1, *point);
                let evals = evaluate_subrelations(&row, &parameters[k]);
                contribution[k] = pow * batch_subrelations(&evals, &alphas[k]);
            }
            contribution
        })
        .reduce(
            || vec![Scalar::zero(); BATCHED_EXTENDED_LENGTH],
            |mut acc, row| {
                for (a, b) in acc.iter_mut().zip(row.iter()) {
                    *a += b;
                }
                acc
            },
        )
}

/// `K(k) = (G(k) - F(alpha) L_0(k)) / Z(k)` on {2, .., 10}
///
/// The numerator vanishes at 0 and 1, so the quotient is a polynomial and its
/// values on the remaining points determine it.
pub fn compute_combiner_quotient(
    combiner: &[Scalar],
    perturbator_evaluation: Scalar,
) -> Result<Univariate> {
    let evaluations = combiner
        .iter()
        .enumerate()
        .skip(2)
        .map(|(k, g)| {
            let point = Scalar::from(k as u64);
            let lagrange_0 = Scalar::one() - point;
            let vanishing = point * (point - Scalar::one());
            let inverse = Option::<Scalar>::from(vanishing.invert())
                .ok_or(FoldingError::ZeroDenominator { point: k })?;
            Ok((g - perturbator_evaluation * lagrange_0) * inverse)
        })
        .collect::<Result<Vec<Scalar>>>()?;
    Ok(Univariate::new(evaluations, 2))
}
