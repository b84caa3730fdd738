//! The relation satisfied row by row by a valid instance
//!
//! Subrelations, indexed as they are batched:
//!
//! | index | name | expression |
//! |---|---|---|
//! | 0 | arithmetic | `q_m w_l w_r + q_l w_l + q_r w_r + q_o w_o + q_4 w_4 + q_c` |
//! | 1 | public input | `q_pub (w_l - pub)` |
//! | 2..5 | op wire copy | `q_ecc (op_j - w_j)` |
//! | 6..9 | op wire vanishing | `(1 - q_ecc) op_j` |
//! | 10 | sorted accumulator | `sorted - (w_l + eta w_r + eta^2 w_o)` |
//! | 11 | grand product | `z prod(w_j + beta id_j + gamma) - z_shift prod(w_j + beta sigma_j + gamma)` |
//! | 12 | grand product init | `lagrange_first (z - 1)` |

use crate::flavor::{column, ProverPolynomials, Row, NUM_SUBRELATIONS, NUM_WIRES};
use crate::Scalar;
use rayon::prelude::*;

/// Challenges the witness columns depend on
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RelationParameters {
    pub eta: Scalar,
    pub beta: Scalar,
    pub gamma: Scalar,
}

impl RelationParameters {
    /// `l0 * self + l1 * other`, component-wise
    pub fn fold(&self, other: &RelationParameters, l0: Scalar, l1: Scalar) -> Self {
        Self {
            eta: self.eta * l0 + other.eta * l1,
            beta: self.beta * l0 + other.beta * l1,
            gamma: self.gamma * l0 + other.gamma * l1,
        }
    }

    /// Parameters of the instance interpolated through `self` at 0 and `other` at 1
    pub fn interpolate(&self, other: &RelationParameters, k: Scalar) -> Self {
        self.fold(other, Scalar::one() - k, k)
    }
}

/// Evaluate every subrelation on one row
pub fn evaluate_subrelations(row: &Row, params: &RelationParameters) -> [Scalar; NUM_SUBRELATIONS] {
    let mut evals = [Scalar::zero(); NUM_SUBRELATIONS];
    let (w_l, w_r, w_o, w_4) = (row.wire(0), row.wire(1), row.wire(2), row.wire(3));

    evals[0] = row[column::Q_M] * w_l * w_r
        + row[column::Q_L] * w_l
        + row[column::Q_R] * w_r
        + row[column::Q_O] * w_o
        + row[column::Q_4] * w_4
        + row[column::Q_C];

    evals[1] = row[column::Q_PUB] * (w_l - row[column::PUBLIC_INPUT]);

    let q_ecc = row[column::Q_ECC];
    for j in 0..NUM_WIRES {
        evals[2 + j] = q_ecc * (row.ecc_op_wire(j) - row.wire(j));
        evals[2 + NUM_WIRES + j] = (Scalar::one() - q_ecc) * row.ecc_op_wire(j);
    }

    let eta = params.eta;
    evals[10] = row[column::SORTED_ACCUM] - (w_l + eta * w_r + eta * eta * w_o);

    let mut numerator = Scalar::one();
    let mut denominator = Scalar::one();
    for j in 0..NUM_WIRES {
        numerator *= row.wire(j) + params.beta * row.id(j) + params.gamma;
        denominator *= row.wire(j) + params.beta * row.sigma(j) + params.gamma;
    }
    evals[11] = row[column::Z_PERM] * numerator - row[column::Z_PERM_SHIFT] * denominator;

    evals[12] = row[column::LAGRANGE_FIRST] * (row[column::Z_PERM] - Scalar::one());

    evals
}

/// `f_0 + sum_j alphas[j - 1] * f_j`
pub fn batch_subrelations(evals: &[Scalar; NUM_SUBRELATIONS], alphas: &[Scalar]) -> Scalar {
    evals[1..]
        .iter()
        .zip(alphas.iter())
        .fold(evals[0], |acc, (eval, alpha)| acc + eval * alpha)
}

/// Batched relation value at every row
pub fn compute_row_evaluations(
    polynomials: &ProverPolynomials,
    public_inputs: &[Scalar],
    alphas: &[Scalar],
    params: &RelationParameters,
) -> Vec<Scalar> {
    (0..polynomials.circuit_size())
        .into_par_iter()
        .map(|i| {
            let row = polynomials.row(i, public_inputs);
            batch_subrelations(&evaluate_subrelations(&row, params), alphas)
        })
        .collect()
}
