//! Dense univariate polynomials in monomial form

use crate::{CommitmentError, Result, Scalar};
use ff::Field;

/// Horner evaluation of a coefficient vector at `point`
pub fn evaluate(coefficients: &[Scalar], point: Scalar) -> Scalar {
    coefficients
        .iter()
        .rev()
        .fold(Scalar::zero(), |acc, coeff| acc * point + coeff)
}

/// `target += scalar * other`, growing `target` if `other` is longer
pub fn add_scaled(target: &mut Vec<Scalar>, other: &[Scalar], scalar: Scalar) {
    if target.len() < other.len() {
        target.resize(other.len(), Scalar::zero());
    }
    for (t, o) in target.iter_mut().zip(other.iter()) {
        *t += *o * scalar;
    }
}

/// Synthetic division by (X - root), returning the quotient and the remainder
pub fn divide_by_linear(coefficients: &[Scalar], root: Scalar) -> (Vec<Scalar>, Scalar) {
    if coefficients.is_empty() {
        return (Vec::new(), Scalar::zero());
    }
    let mut quotient = vec![Scalar::zero(); coefficients.len() - 1];
    let mut carry = Scalar::zero();
    for i in (0..coefficients.len()).rev() {
        let value = coefficients[i] + carry * root;
        if i == 0 {
            return (quotient, value);
        }
        quotient[i - 1] = value;
        carry = value;
    }
    (quotient, carry)
}

/// Computes (p(X) - evaluation) / (X - root), rejecting a nonzero remainder
pub fn opening_quotient(
    coefficients: &[Scalar],
    root: Scalar,
    evaluation: Scalar,
) -> Result<Vec<Scalar>> {
    let mut shifted = coefficients.to_vec();
    if shifted.is_empty() {
        shifted.push(Scalar::zero());
    }
    shifted[0] -= evaluation;
    let (quotient, remainder) = divide_by_linear(&shifted, root);
    if !bool::from(remainder.is_zero()) {
        return Err(CommitmentError::NonZeroRemainder);
    }
    Ok(quotient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::thread_rng;

    #[test]
    fn test_polynomial_evaluation() {
        // 1 + 2x + 3x^2 at x = 2
        let coeffs = vec![Scalar::from(1u64), Scalar::from(2u64), Scalar::from(3u64)];
        assert_eq!(evaluate(&coeffs, Scalar::from(2u64)), Scalar::from(17u64));
        assert_eq!(evaluate(&[], Scalar::from(2u64)), Scalar::zero());
    }

    #[test]
    fn test_divide_by_linear() {
        let mut rng = thread_rng();
        let coeffs: Vec<Scalar> = (0..9).map(|_| Scalar::random(&mut rng)).collect();
        let root = Scalar::random(&mut rng);
        let (quotient, remainder) = divide_by_linear(&coeffs, root);

        assert_eq!(remainder, evaluate(&coeffs, root));
        let x = Scalar::random(&mut rng);
        assert_eq!(
            evaluate(&quotient, x) * (x - root) + remainder,
            evaluate(&coeffs, x)
        );
    }

    #[test]
    fn test_opening_quotient_rejects_wrong_evaluation() {
        let coeffs = vec![Scalar::from(4u64), Scalar::from(1u64)];
        let root = Scalar::from(3u64);
        assert!(opening_quotient(&coeffs, root, Scalar::from(7u64)).is_ok());
        assert_eq!(
            opening_quotient(&coeffs, root, Scalar::from(8u64)),
            Err(CommitmentError::NonZeroRemainder)
        );
    }

    #[test]
    fn test_add_scaled_grows_target() {
        let mut target = vec![Scalar::one()];
        add_scaled(&mut target, &[Scalar::one(), Scalar::one()], Scalar::from(5u64));
        assert_eq!(target, vec![Scalar::from(6u64), Scalar::from(5u64)]);
    }

    proptest! {
        #[test]
        fn prop_quotient_times_divisor_restores_polynomial(
            raw in prop::collection::vec(any::<u64>(), 1..12),
            root in any::<u64>(),
            x in any::<u64>(),
        ) {
            let coeffs: Vec<Scalar> = raw.iter().map(|c| Scalar::from(*c)).collect();
            let (root, x) = (Scalar::from(root), Scalar::from(x));
            let (quotient, remainder) = divide_by_linear(&coeffs, root);
            prop_assert_eq!(quotient.len() + 1, coeffs.len());
            prop_assert_eq!(evaluate(&quotient, x) * (x - root) + remainder, evaluate(&coeffs, x));
        }
    }
}
