//! Monomial-basis KZG commitment keys
//!
//! The structured reference string is generated from a caller-supplied RNG. That
//! is only suitable for tests and local sessions: whoever holds the RNG output
//! knows the trapdoor.

use crate::{msm, CommitmentError, GroupElement, GroupProjective, Result, Scalar};
use bls12_381::{G2Affine, G2Projective};
use ff::Field;
use group::Curve;
use rand_core::RngCore;
use rayon::prelude::*;
use tracing::debug;

/// Prover key: `[1]_1, [tau]_1, ..., [tau^(size-1)]_1`
#[derive(Clone, Debug)]
pub struct CommitmentKey {
    monomials: Vec<GroupElement>,
}

/// Verifier key for the final pairing check
#[derive(Clone, Debug, PartialEq)]
pub struct VerifierCommitmentKey {
    pub g1: GroupElement,
    pub g2: G2Affine,
    pub tau_g2: G2Affine,
    /// Number of monomials in the matching prover key; bounds committed degrees
    pub size: usize,
}

/// Generate a commitment key able to commit to polynomials with `size` coefficients
pub fn setup(
    size: usize,
    rng: &mut impl RngCore,
) -> Result<(CommitmentKey, VerifierCommitmentKey)> {
    if size == 0 {
        return Err(CommitmentError::InvalidParameters(
            "commitment key size must be positive".to_string(),
        ));
    }

    let tau = Scalar::random(&mut *rng);
    let mut powers = Vec::with_capacity(size);
    let mut current = Scalar::one();
    for _ in 0..size {
        powers.push(current);
        current *= tau;
    }

    let projective: Vec<GroupProjective> = powers
        .par_iter()
        .map(|power| GroupProjective::generator() * power)
        .collect();
    let mut monomials = vec![GroupElement::identity(); size];
    GroupProjective::batch_normalize(&projective, &mut monomials);

    let verifier_key = VerifierCommitmentKey {
        g1: GroupElement::generator(),
        g2: G2Affine::generator(),
        tau_g2: (G2Projective::generator() * tau).to_affine(),
        size,
    };
    debug!(size, "generated commitment key");

    Ok((CommitmentKey { monomials }, verifier_key))
}

impl CommitmentKey {
    /// Maximum number of coefficients a committed polynomial may have
    pub fn size(&self) -> usize {
        self.monomials.len()
    }

    pub fn commit(&self, coefficients: &[Scalar]) -> Result<GroupElement> {
        if coefficients.len() > self.monomials.len() {
            return Err(CommitmentError::InvalidDegree {
                expected: self.monomials.len(),
                actual: coefficients.len(),
            });
        }
        let result = msm::parallel_msm(coefficients, &self.monomials[..coefficients.len()])?;
        Ok(result.to_affine())
    }

    /// Commit to several polynomials in parallel, preserving order
    pub fn commit_all(&self, polynomials: &[&[Scalar]]) -> Result<Vec<GroupElement>> {
        polynomials.par_iter().map(|p| self.commit(p)).collect()
    }
}
