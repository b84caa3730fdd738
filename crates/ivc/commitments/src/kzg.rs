//! KZG opening proofs reduced to a single pairing check

use crate::commitment_key::{CommitmentKey, VerifierCommitmentKey};
use crate::transcript::Transcript;
use crate::{polynomial, GroupElement, GroupProjective, Result, Scalar};
use bls12_381::Bls12;
use group::prime::PrimeCurveAffine;
use group::Curve;
use pairing::Engine;
use tracing::{debug, warn};

/// Transcript label of the quotient commitment
pub const QUOTIENT_LABEL: &str = "KZG:W";

/// Claimed evaluation `evaluation = p(challenge)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpeningPair {
    pub challenge: Scalar,
    pub evaluation: Scalar,
}

/// An opening pair together with the commitment it is claimed for
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpeningClaim {
    pub opening_pair: OpeningPair,
    pub commitment: GroupElement,
}

/// Points for the deferred check `e(p0, [1]_2) == e(p1, [tau]_2)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairingPoints {
    pub p0: GroupElement,
    pub p1: GroupElement,
}

impl PairingPoints {
    pub fn check(&self, vk: &VerifierCommitmentKey) -> bool {
        let lhs = Bls12::pairing(&self.p0, &vk.g2);
        let rhs = Bls12::pairing(&self.p1, &vk.tau_g2);
        let verified = lhs == rhs;
        if !verified {
            warn!("KZG pairing check failed");
        }
        verified
    }
}

pub struct Kzg;

impl Kzg {
    /// Commit to the quotient (p(X) - v) / (X - challenge) and send it
    pub fn compute_opening_proof(
        ck: &CommitmentKey,
        polynomial: &[Scalar],
        opening_pair: &OpeningPair,
        transcript: &mut Transcript,
    ) -> Result<()> {
        let quotient = polynomial::opening_quotient(
            polynomial,
            opening_pair.challenge,
            opening_pair.evaluation,
        )?;
        let quotient_commitment = ck.commit(&quotient)?;
        transcript.send_to_verifier(QUOTIENT_LABEL, &quotient_commitment);
        debug!(degree = quotient.len(), "computed KZG opening proof");
        Ok(())
    }

    /// Receive the quotient commitment W and return
    /// `p0 = C - v*[1]_1 + challenge*W`, `p1 = W`
    pub fn reduce_verify(
        claim: &OpeningClaim,
        transcript: &mut Transcript,
    ) -> Result<PairingPoints> {
        let quotient_commitment: GroupElement = transcript.receive_from_prover(QUOTIENT_LABEL)?;
        let pair = &claim.opening_pair;
        let p0: GroupProjective = claim.commitment.to_curve()
            - GroupElement::generator() * pair.evaluation
            + quotient_commitment * pair.challenge;
        Ok(PairingPoints {
            p0: p0.to_affine(),
            p1: quotient_commitment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment_key::setup;
    use ff::Field;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn open_and_verify(evaluation_offset: Scalar) -> bool {
        let mut rng = StdRng::seed_from_u64(42);
        let (ck, vk) = setup(32, &mut rng).unwrap();
        let poly: Vec<Scalar> = (0..20).map(|_| Scalar::random(&mut rng)).collect();
        let challenge = Scalar::random(&mut rng);
        let evaluation = polynomial::evaluate(&poly, challenge);
        let pair = OpeningPair { challenge, evaluation };

        let mut prover_transcript = Transcript::new(b"kzg-test");
        Kzg::compute_opening_proof(&ck, &poly, &pair, &mut prover_transcript).unwrap();
        let proof = prover_transcript.export_proof();

        let claim = OpeningClaim {
            opening_pair: OpeningPair {
                challenge,
                evaluation: evaluation + evaluation_offset,
            },
            commitment: ck.commit(&poly).unwrap(),
        };
        let mut verifier_transcript = Transcript::from_proof(b"kzg-test", &proof);
        let points = Kzg::reduce_verify(&claim, &mut verifier_transcript).unwrap();
        points.check(&vk)
    }

    #[test]
    fn test_kzg_open_verify() {
        assert!(open_and_verify(Scalar::zero()));
    }

    #[test]
    fn test_kzg_wrong_evaluation_fails() {
        assert!(!open_and_verify(Scalar::one()));
    }

    #[test]
    fn test_kzg_prover_rejects_false_claim() {
        let mut rng = StdRng::seed_from_u64(5);
        let (ck, _) = setup(8, &mut rng).unwrap();
        let poly = vec![Scalar::one(), Scalar::one()];
        let pair = OpeningPair {
            challenge: Scalar::one(),
            evaluation: Scalar::one(),
        };
        let mut transcript = Transcript::new(b"kzg-test");
        assert_eq!(
            Kzg::compute_opening_proof(&ck, &poly, &pair, &mut transcript),
            Err(crate::CommitmentError::NonZeroRemainder)
        );
    }
}
