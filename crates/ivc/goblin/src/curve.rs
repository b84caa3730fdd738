//! Splitting curve points and scalars into field-sized limbs
//!
//! Base-field coordinates do not fit in the scalar field, so each coordinate is
//! cut at bit 136 into a low and a high limb. Scalars are cut at bit 128 so both
//! halves stay short enough for the ECC VM's endomorphism decomposition.

use crate::{GroupElement, Scalar};

/// Bits in one bigfield limb
pub const NUM_LIMB_BITS: usize = 68;

/// Bit position of the low/high coordinate split
pub const COORDINATE_SPLIT_BITS: usize = 2 * NUM_LIMB_BITS;

/// Bit position of the z_1/z_2 scalar split
pub const SCALAR_SPLIT_BITS: usize = 128;

/// Interpret up to 32 little-endian bytes as an integer below 2^256
fn scalar_from_le_bytes(bytes: &[u8]) -> Scalar {
    let mut padded = [0u8; 32];
    padded[..bytes.len()].copy_from_slice(bytes);
    let mut limbs = [0u64; 4];
    for (limb, chunk) in limbs.iter_mut().zip(padded.chunks_exact(8)) {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        *limb = u64::from_le_bytes(word);
    }
    Scalar::from_raw(limbs)
}

/// Split a 48-byte big-endian coordinate into (lo, hi) at bit 136
fn split_coordinate(big_endian: &[u8]) -> (Scalar, Scalar) {
    let little_endian: Vec<u8> = big_endian.iter().rev().copied().collect();
    let split = COORDINATE_SPLIT_BITS / 8;
    (
        scalar_from_le_bytes(&little_endian[..split]),
        scalar_from_le_bytes(&little_endian[split..]),
    )
}

/// `[x_lo, x_hi, y_lo, y_hi]`; the point at infinity maps to zeros
pub fn point_limbs(point: &GroupElement) -> [Scalar; 4] {
    let mut encoded = point.to_uncompressed();
    // Clear the compression, infinity and sort flags.
    encoded[0] &= 0x1f;
    let (x_lo, x_hi) = split_coordinate(&encoded[..48]);
    let (y_lo, y_hi) = split_coordinate(&encoded[48..]);
    [x_lo, x_hi, y_lo, y_hi]
}

/// `(z_1, z_2)` with `scalar = z_1 + 2^128 * z_2`
pub fn split_scalar(scalar: &Scalar) -> (Scalar, Scalar) {
    let bytes = scalar.to_bytes();
    let split = SCALAR_SPLIT_BITS / 8;
    (
        scalar_from_le_bytes(&bytes[..split]),
        scalar_from_le_bytes(&bytes[split..]),
    )
}

pub fn reconstruct_scalar(z_1: &Scalar, z_2: &Scalar) -> Scalar {
    let shift = Scalar::from_raw([0, 0, 1, 0]);
    z_1 + z_2 * shift
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GroupProjective;
    use ff::Field;
    use group::Curve;
    use proptest::prelude::*;
    use rand::thread_rng;

    #[test]
    fn test_identity_limbs_are_zero() {
        let limbs = point_limbs(&GroupElement::identity());
        assert!(limbs.iter().all(|l| *l == Scalar::zero()));
    }

    #[test]
    fn test_coordinate_limbs_recompose() {
        let point = (GroupProjective::generator() * Scalar::random(&mut thread_rng())).to_affine();
        let limbs = point_limbs(&point);

        let mut recomposed = [0u8; 48];
        recomposed[..17].copy_from_slice(&limbs[0].to_bytes()[..17]);
        recomposed[17..].copy_from_slice(&limbs[1].to_bytes()[..31]);
        recomposed.reverse();

        let mut expected = [0u8; 48];
        expected.copy_from_slice(&point.to_uncompressed()[..48]);
        expected[0] &= 0x1f;
        assert_eq!(recomposed, expected);

        // The low limb never exceeds 136 bits
        assert!(limbs[0].to_bytes()[17..].iter().all(|b| *b == 0));
        assert!(limbs[2].to_bytes()[17..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_split_small_scalar() {
        let (z_1, z_2) = split_scalar(&Scalar::from(12345u64));
        assert_eq!(z_1, Scalar::from(12345u64));
        assert_eq!(z_2, Scalar::zero());
    }

    proptest! {
        #[test]
        fn prop_split_scalar_recomposes(limbs in any::<[u64; 4]>()) {
            let scalar = Scalar::from_raw(limbs);
            let (z_1, z_2) = split_scalar(&scalar);
            prop_assert_eq!(reconstruct_scalar(&z_1, &z_2), scalar);
            prop_assert!(z_1.to_bytes()[16..].iter().all(|b| *b == 0));
            prop_assert!(z_2.to_bytes()[16..].iter().all(|b| *b == 0));
        }
    }
}
