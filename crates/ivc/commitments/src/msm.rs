//! Multi-scalar multiplication utilities
//!
//! Every commitment in the stack is an MSM against the monomial SRS, so this is the
//! hot path of both the merge prover and the folding prover.

use crate::{CommitmentError, GroupElement, GroupProjective, Result, Scalar};
use ff::{Field, PrimeField};
use group::prime::PrimeCurveAffine;
use group::Group;
use rayon::prelude::*;
use std::cmp;

/// Scalar bit length covered by the windows
const SCALAR_BITS: usize = 256;

/// Performs multi-scalar multiplication: sum_i(scalars[i] * points[i])
pub fn msm(scalars: &[Scalar], points: &[GroupElement]) -> Result<GroupProjective> {
    if scalars.len() != points.len() {
        return Err(CommitmentError::MsmError(format!(
            "{} scalars against {} points",
            scalars.len(),
            points.len()
        )));
    }

    if scalars.is_empty() {
        return Ok(GroupProjective::identity());
    }

    if scalars.len() <= 32 {
        return Ok(simple_msm(scalars, points));
    }

    Ok(pippenger_msm(scalars, points))
}

/// Double-and-add over each term, used for small inputs
fn simple_msm(scalars: &[Scalar], points: &[GroupElement]) -> GroupProjective {
    scalars
        .iter()
        .zip(points.iter())
        .filter(|(scalar, _)| !bool::from(scalar.is_zero()))
        .map(|(scalar, point)| point.to_curve() * scalar)
        .fold(GroupProjective::identity(), |acc, point| acc + point)
}

/// Bucket method over fixed windows, most significant window first
fn pippenger_msm(scalars: &[Scalar], points: &[GroupElement]) -> GroupProjective {
    let window_size = optimal_window_size(scalars.len());
    let num_windows = (SCALAR_BITS + window_size - 1) / window_size;

    let reprs: Vec<[u8; 32]> = scalars.par_iter().map(|s| s.to_repr()).collect();

    let window_sums: Vec<GroupProjective> = (0..num_windows)
        .into_par_iter()
        .map(|window_idx| {
            let bit_start = window_idx * window_size;
            let bit_end = cmp::min(bit_start + window_size, SCALAR_BITS);
            process_window(&reprs, points, bit_start, bit_end)
        })
        .collect();

    let mut result = GroupProjective::identity();
    for window_idx in (0..num_windows).rev() {
        let bit_start = window_idx * window_size;
        let bit_end = cmp::min(bit_start + window_size, SCALAR_BITS);
        for _ in 0..(bit_end - bit_start) {
            result = result.double();
        }
        result += window_sums[window_idx];
    }
    result
}

/// Sum of bucket_index * bucket over one window
fn process_window(
    reprs: &[[u8; 32]],
    points: &[GroupElement],
    bit_start: usize,
    bit_end: usize,
) -> GroupProjective {
    let num_buckets = (1 << (bit_end - bit_start)) - 1;
    let mut buckets = vec![GroupProjective::identity(); num_buckets];

    for (repr, point) in reprs.iter().zip(points.iter()) {
        let bucket_idx = extract_window_bits(repr, bit_start, bit_end);
        if bucket_idx > 0 {
            buckets[bucket_idx - 1] += point;
        }
    }

    let mut result = GroupProjective::identity();
    let mut running_sum = GroupProjective::identity();
    for bucket in buckets.into_iter().rev() {
        running_sum += bucket;
        result += running_sum;
    }
    result
}

/// Extract bits [bit_start, bit_end) of a little-endian scalar representation
fn extract_window_bits(repr: &[u8; 32], bit_start: usize, bit_end: usize) -> usize {
    let mut result = 0usize;
    for bit_idx in bit_start..bit_end {
        let byte_idx = bit_idx / 8;
        if byte_idx < repr.len() {
            let bit = (repr[byte_idx] >> (bit_idx % 8)) & 1;
            result |= (bit as usize) << (bit_idx - bit_start);
        }
    }
    result
}

fn optimal_window_size(n: usize) -> usize {
    if n <= 32 {
        3
    } else if n <= 128 {
        4
    } else if n <= 512 {
        5
    } else if n <= 2048 {
        6
    } else if n <= 8192 {
        7
    } else {
        8
    }
}

/// Splits the MSM into per-thread chunks for very large inputs
pub fn parallel_msm(scalars: &[Scalar], points: &[GroupElement]) -> Result<GroupProjective> {
    if scalars.len() != points.len() {
        return Err(CommitmentError::MsmError(format!(
            "{} scalars against {} points",
            scalars.len(),
            points.len()
        )));
    }

    if scalars.len() <= 1024 {
        return msm(scalars, points);
    }

    let chunk_size = cmp::max(1024, scalars.len() / rayon::current_num_threads());

    let partial_results: Result<Vec<GroupProjective>> = scalars
        .par_chunks(chunk_size)
        .zip(points.par_chunks(chunk_size))
        .map(|(scalar_chunk, point_chunk)| msm(scalar_chunk, point_chunk))
        .collect();

    Ok(partial_results?
        .into_iter()
        .fold(GroupProjective::identity(), |acc, partial| acc + partial))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff::Field;
    use group::Curve;
    use rand::thread_rng;

    fn random_input(n: usize) -> (Vec<Scalar>, Vec<GroupElement>) {
        let mut rng = thread_rng();
        let scalars = (0..n).map(|_| Scalar::random(&mut rng)).collect();
        let points = (0..n)
            .map(|_| GroupProjective::random(&mut rng).to_affine())
            .collect();
        (scalars, points)
    }

    #[test]
    fn test_msm_matches_naive_sum() {
        for n in [5, 33, 200] {
            let (scalars, points) = random_input(n);
            let expected = scalars
                .iter()
                .zip(points.iter())
                .fold(GroupProjective::identity(), |acc, (s, p)| acc + p * s);
            assert_eq!(msm(&scalars, &points).unwrap(), expected, "n = {}", n);
        }
    }

    #[test]
    fn test_msm_empty() {
        let result = msm(&[], &[]).unwrap();
        assert_eq!(result, GroupProjective::identity());
    }

    #[test]
    fn test_msm_small_scalars() {
        let g = GroupElement::generator();
        let scalars: Vec<Scalar> = (0..40u64).map(Scalar::from).collect();
        let points = vec![g; 40];
        let expected = GroupProjective::generator() * Scalar::from((0..40u64).sum::<u64>());
        assert_eq!(msm(&scalars, &points).unwrap(), expected);
    }

    #[test]
    fn test_msm_length_mismatch() {
        let result = msm(&[Scalar::one()], &[]);
        assert!(matches!(result, Err(CommitmentError::MsmError(_))));
    }

    #[test]
    fn test_extract_window_bits() {
        let repr = Scalar::from(0b11010110u64).to_repr();
        assert_eq!(extract_window_bits(&repr, 0, 4), 6);
        assert_eq!(extract_window_bits(&repr, 4, 8), 13);
    }

    #[test]
    fn test_parallel_msm() {
        let (scalars, points) = random_input(2000);
        assert_eq!(
            msm(&scalars, &points).unwrap(),
            parallel_msm(&scalars, &points).unwrap()
        );
    }
}
