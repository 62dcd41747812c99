//! Randomness for the scheme.
//!
//! - Secret key and encryption randomness: uniform ternary {-1, 0, 1}
//! - Error polynomials: discrete Gaussian with sigma = 3.2, sampled
//!   signed so every RNS limb sees the same integer
//! - Public randomness: uniform in Zq, independently per limb

use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::rns::{CrtBasis, RnsPoly};

/// Standard deviation of the RLWE error distribution.
pub const ERROR_STD_DEV: f64 = 3.2;

/// Ternary vector with each coefficient drawn uniformly from {-1, 0, 1}.
pub(crate) fn sample_ternary<R: Rng>(rng: &mut R, n: usize) -> Vec<i64> {
    (0..n).map(|_| rng.gen_range(-1i64..=1)).collect()
}

/// Discrete Gaussian vector, returned signed; callers reduce into
/// whichever basis they need so all limbs stay consistent.
pub(crate) fn sample_gaussian<R: Rng>(rng: &mut R, n: usize, sigma: f64) -> Vec<i64> {
    let normal = Normal::new(0.0, sigma).expect("sigma must be positive and finite");
    (0..n).map(|_| normal.sample(rng).round() as i64).collect()
}

/// Uniform ring element: independent uniform residues per limb, which is
/// uniform in R_Q by CRT.
pub(crate) fn sample_uniform<R: Rng>(rng: &mut R, n: usize, basis: &CrtBasis) -> RnsPoly {
    let limbs = (0..basis.len())
        .map(|i| {
            let q = basis.modulus(i);
            (0..n).map(|_| rng.gen_range(0..q)).collect()
        })
        .collect();
    RnsPoly { limbs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ntt::NttTable;
    use std::sync::Arc;

    #[test]
    fn test_ternary_distribution() {
        let mut rng = rand::thread_rng();
        let n = 30000;
        let samples = sample_ternary(&mut rng, n);
        assert!(samples.iter().all(|&c| (-1..=1).contains(&c)));

        let expected = n as isize / 3;
        let tolerance = (n as f64 * 0.05) as isize;
        for v in [-1i64, 0, 1] {
            let count = samples.iter().filter(|&&c| c == v).count() as isize;
            assert!(
                (count - expected).abs() < tolerance,
                "count({v}) = {count}, expected about {expected}"
            );
        }
    }

    #[test]
    fn test_gaussian_distribution() {
        let mut rng = rand::thread_rng();
        let n = 30000;
        let samples = sample_gaussian(&mut rng, n, ERROR_STD_DEV);

        let mean = samples.iter().sum::<i64>() as f64 / n as f64;
        let variance = samples
            .iter()
            .map(|&x| (x as f64 - mean).powi(2))
            .sum::<f64>()
            / n as f64;
        assert!(mean.abs() < 0.2, "gaussian mean too far from 0: {mean}");
        assert!(
            (variance.sqrt() - ERROR_STD_DEV).abs() < 0.3,
            "gaussian sigma off: {}",
            variance.sqrt()
        );
    }

    #[test]
    fn test_uniform_range() {
        let n = 64;
        let q = crate::math::prime::find_ntt_prime(50, 2 * n as u64, &[]).unwrap();
        let basis = CrtBasis::new(vec![Arc::new(NttTable::new(n, q))]);
        let mut rng = rand::thread_rng();
        let poly = sample_uniform(&mut rng, n, &basis);
        assert!(poly.limbs[0].iter().all(|&c| c < q));
    }
}
