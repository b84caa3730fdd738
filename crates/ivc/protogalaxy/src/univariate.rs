//! Univariate polynomials given by evaluations on consecutive integers

use crate::{FoldingError, Result, Scalar};

/// Evaluations at `domain_start, domain_start + 1, ...`
#[derive(Clone, Debug, PartialEq)]
pub struct Univariate {
    pub evaluations: Vec<Scalar>,
    pub domain_start: usize,
}

impl Univariate {
    pub fn new(evaluations: Vec<Scalar>, domain_start: usize) -> Self {
        Self {
            evaluations,
            domain_start,
        }
    }

    pub fn domain_point(&self, j: usize) -> Scalar {
        Scalar::from((self.domain_start + j) as u64)
    }

    /// Lagrange interpolation at `point`
    pub fn evaluate(&self, point: Scalar) -> Result<Scalar> {
        let len = self.evaluations.len();
        let mut result = Scalar::zero();
        for (j, evaluation) in self.evaluations.iter().enumerate() {
            let x_j = self.domain_point(j);
            let mut numerator = Scalar::one();
            let mut denominator = Scalar::one();
            for m in (0..len).filter(|m| *m != j) {
                let x_m = self.domain_point(m);
                numerator *= point - x_m;
                denominator *= x_j - x_m;
            }
            let inverse = Option::<Scalar>::from(denominator.invert()).ok_or(
                FoldingError::ZeroDenominator {
                    point: self.domain_start + j,
                },
            )?;
            result += evaluation * numerator * inverse;
        }
        Ok(result)
    }
}
