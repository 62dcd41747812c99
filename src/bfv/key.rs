//! Key material: secret key, public key, and the relinearization
//! (evaluation) key.

use std::sync::Arc;

use rand::Rng;

use super::params::{CryptoParams, DIGIT_BITS};
use super::rns::RnsPoly;
use super::sampling::{sample_gaussian, sample_ternary, sample_uniform, ERROR_STD_DEV};

/// Ternary secret, kept as signed coefficients so it can be reduced into
/// the basis of whatever level a ciphertext has descended to.
#[derive(Debug, Clone)]
pub struct SecretKey {
    pub(crate) coeffs: Vec<i64>,
}

impl SecretKey {
    pub(crate) fn generate<R: Rng>(rng: &mut R, params: &CryptoParams) -> Self {
        Self {
            coeffs: sample_ternary(rng, params.ring_dim()),
        }
    }
}

/// RLWE public key (p0, p1) = (-(a*s + e), a) at the top of the chain.
#[derive(Debug, Clone)]
pub struct PublicKey {
    pub(crate) p0: RnsPoly,
    pub(crate) p1: RnsPoly,
}

impl PublicKey {
    pub(crate) fn generate<R: Rng>(rng: &mut R, sk: &SecretKey, params: &CryptoParams) -> Self {
        let n = params.ring_dim();
        let basis = params.level_basis(params.max_level());
        let s = RnsPoly::from_signed(&sk.coeffs, basis);

        let a = sample_uniform(rng, n, basis);
        let e = RnsPoly::from_signed(&sample_gaussian(rng, n, ERROR_STD_DEV), basis);
        let p0 = a.ntt_mul(&s, basis).add(&e, basis).negate(basis);
        Self { p0, p1: a }
    }
}

/// Relinearization key: for each digit index j, an encryption of
/// T^j * s^2 under s, with T = 2^DIGIT_BITS:
///
///   b_j = T^j * s^2 - (a_j * s + e_j),   a_j uniform.
///
/// Generated once at the top level; the key equation holds limb-wise, so
/// restricting to the active primes (and the digits covering Q_l) makes
/// the same key serve every level of the chain.
#[derive(Debug, Clone)]
pub struct EvaluationKey {
    pub(crate) a: Vec<RnsPoly>,
    pub(crate) b: Vec<RnsPoly>,
}

impl EvaluationKey {
    pub(crate) fn generate<R: Rng>(
        rng: &mut R,
        sk: &SecretKey,
        params: &Arc<CryptoParams>,
    ) -> Self {
        let n = params.ring_dim();
        let top = params.max_level();
        let basis = params.level_basis(top);
        let s = RnsPoly::from_signed(&sk.coeffs, basis);
        let s2 = s.ntt_mul(&s, basis);

        let digits = params.digit_count(top);
        let mut a = Vec::with_capacity(digits);
        let mut b = Vec::with_capacity(digits);
        // t_pow[i] = T^j mod q_i, advanced once per digit
        let mut t_pow: Vec<u64> = vec![1; basis.len()];
        for _ in 0..digits {
            let a_j = sample_uniform(rng, n, basis);
            let e_j = RnsPoly::from_signed(&sample_gaussian(rng, n, ERROR_STD_DEV), basis);
            let mask = a_j.ntt_mul(&s, basis).add(&e_j, basis);
            let b_j = s2.mul_scalar_rns(&t_pow, basis).sub(&mask, basis);
            a.push(a_j);
            b.push(b_j);
            for (i, p) in t_pow.iter_mut().enumerate() {
                *p = crate::math::prime::mulmod(*p, 1u64 << DIGIT_BITS, basis.modulus(i));
            }
        }
        Self { a, b }
    }

    pub(crate) fn num_digits(&self) -> usize {
        self.a.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn test_public_key_phase_is_small() {
        // p0 + p1 * s = -e, so the phase must be gaussian-sized
        let params = CryptoParams::derive(65537, 1, 1024).unwrap();
        let basis = params.level_basis(params.max_level());
        let mut rng = rand::thread_rng();
        let sk = SecretKey::generate(&mut rng, &params);
        let pk = PublicKey::generate(&mut rng, &sk, &params);

        let s = RnsPoly::from_signed(&sk.coeffs, basis);
        let phase = pk.p0.add(&pk.p1.ntt_mul(&s, basis), basis);
        // sigma = 3.2, so anything past 20 sigma means the key is broken
        let bound = BigInt::from(64);
        for c in phase.lift_centered(basis) {
            assert!(c.magnitude() < bound.magnitude(), "phase coefficient {c} too large");
        }
    }

    #[test]
    fn test_evaluation_key_digit_count() {
        let params = CryptoParams::derive(65537, 2, 1024).unwrap();
        let mut rng = rand::thread_rng();
        let sk = SecretKey::generate(&mut rng, &params);
        let evk = EvaluationKey::generate(&mut rng, &sk, &params);
        assert_eq!(evk.num_digits(), params.digit_count(params.max_level()));
        assert_eq!(evk.a.len(), evk.b.len());
    }

    #[test]
    fn test_evaluation_key_equation() {
        // b_j + a_j * s = T^j * s^2 - e_j, so subtracting T^j * s^2
        // must leave only gaussian-sized coefficients
        let params = CryptoParams::derive(65537, 0, 1024).unwrap();
        let basis = params.level_basis(0);
        let mut rng = rand::thread_rng();
        let sk = SecretKey::generate(&mut rng, &params);
        let evk = EvaluationKey::generate(&mut rng, &sk, &params);

        let s = RnsPoly::from_signed(&sk.coeffs, basis);
        let s2 = s.ntt_mul(&s, basis);
        let mut t_pow: Vec<u64> = vec![1; basis.len()];
        for j in 0..evk.num_digits() {
            let phase = evk.b[j].add(&evk.a[j].ntt_mul(&s, basis), basis);
            let residual = phase.sub(&s2.mul_scalar_rns(&t_pow, basis), basis);
            for c in residual.lift_centered(basis) {
                let mag: BigInt = c;
                assert!(
                    mag.magnitude() < BigInt::from(64u64).magnitude(),
                    "digit {j}: residual {mag} not gaussian-sized"
                );
            }
            for (i, p) in t_pow.iter_mut().enumerate() {
                *p = crate::math::prime::mulmod(*p, 1u64 << DIGIT_BITS, basis.modulus(i));
            }
        }
    }
}
