//! RNS ring elements: polynomials in Zq[X]/(X^N + 1) with q a product of
//! small coprime primes, stored limb-wise (one residue vector per prime).
//!
//! Limb operations are independent and run on rayon workers; the only
//! cross-limb steps are the exact CRT lift (Garner reconstruction via
//! num-bigint) and the reduction of big coefficients back into a basis.

use std::sync::Arc;

use num_bigint::{BigInt, BigUint, Sign};
use rayon::prelude::*;

use crate::math::ntt::NttTable;
use crate::math::prime::{addmod, invmod, mulmod, submod};

pub(crate) fn biguint_to_u64(x: &BigUint) -> u64 {
    debug_assert!(x.bits() <= 64);
    x.to_u64_digits().first().copied().unwrap_or(0)
}

pub(crate) fn biguint_mod_u64(x: &BigUint, q: u64) -> u64 {
    biguint_to_u64(&(x % q))
}

pub(crate) fn bigint_mod_u64(x: &BigInt, q: u64) -> u64 {
    let mut r = x % q;
    if r.sign() == Sign::Minus {
        r += q;
    }
    biguint_to_u64(r.magnitude())
}

/// Rounded division x / d for d > 0, rounding half away from zero.
pub(crate) fn div_round(x: &BigInt, d: &BigInt) -> BigInt {
    debug_assert_eq!(d.sign(), Sign::Plus);
    let q = x / d;
    let r = x - &q * d;
    if (r.magnitude() << 1usize) >= *d.magnitude() {
        if r.sign() == Sign::Minus {
            q - 1u64
        } else {
            q + 1u64
        }
    } else {
        q
    }
}

/// A CRT basis: an ordered set of NTT-friendly primes with the constants
/// needed for exact reconstruction of values mod their product.
#[derive(Debug, Clone)]
pub struct CrtBasis {
    tables: Vec<Arc<NttTable>>,
    product: BigUint,
    half: BigUint,
    /// product / q_i
    qhat: Vec<BigUint>,
    /// (qhat_i mod q_i)^-1 mod q_i
    qhat_inv: Vec<u64>,
}

impl CrtBasis {
    pub fn new(tables: Vec<Arc<NttTable>>) -> Self {
        let product = tables
            .iter()
            .fold(BigUint::from(1u64), |acc, t| acc * t.modulus());
        let half = &product >> 1usize;
        let qhat: Vec<BigUint> = tables.iter().map(|t| &product / t.modulus()).collect();
        let qhat_inv = tables
            .iter()
            .zip(qhat.iter())
            .map(|(t, qh)| invmod(biguint_mod_u64(qh, t.modulus()), t.modulus()))
            .collect();
        Self {
            tables,
            product,
            half,
            qhat,
            qhat_inv,
        }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn modulus(&self, i: usize) -> u64 {
        self.tables[i].modulus()
    }

    pub fn table(&self, i: usize) -> &NttTable {
        &self.tables[i]
    }

    /// Product of all primes in the basis.
    pub fn product(&self) -> &BigUint {
        &self.product
    }
}

/// A ring element in RNS form. `limbs[i]` holds the coefficients mod the
/// i-th prime of whichever basis the element lives in; operations take the
/// basis explicitly and only touch its first `basis.len()` limbs, so an
/// element built at the top of the chain remains usable after descent.
#[derive(Debug, Clone)]
pub struct RnsPoly {
    pub(crate) limbs: Vec<Vec<u64>>,
}

impl RnsPoly {
    pub fn zero(basis: &CrtBasis, n: usize) -> Self {
        Self {
            limbs: vec![vec![0u64; n]; basis.len()],
        }
    }

    /// Same small unsigned coefficients in every limb. Values must be
    /// below every prime of the basis.
    pub fn broadcast(coeffs: &[u64], basis: &CrtBasis) -> Self {
        debug_assert!(coeffs
            .iter()
            .all(|&c| (0..basis.len()).all(|i| c < basis.modulus(i))));
        Self {
            limbs: vec![coeffs.to_vec(); basis.len()],
        }
    }

    /// Reduce small signed coefficients into the basis.
    pub fn from_signed(coeffs: &[i64], basis: &CrtBasis) -> Self {
        let limbs = (0..basis.len())
            .map(|i| {
                let q = basis.modulus(i);
                coeffs
                    .iter()
                    .map(|&c| {
                        if c >= 0 {
                            c as u64 % q
                        } else {
                            let r = c.unsigned_abs() % q;
                            if r == 0 {
                                0
                            } else {
                                q - r
                            }
                        }
                    })
                    .collect()
            })
            .collect();
        Self { limbs }
    }

    /// Reduce arbitrary-precision signed coefficients into the basis.
    pub fn from_bigint(coeffs: &[BigInt], basis: &CrtBasis) -> Self {
        let limbs = (0..basis.len())
            .into_par_iter()
            .map(|i| {
                let q = basis.modulus(i);
                coeffs.iter().map(|c| bigint_mod_u64(c, q)).collect()
            })
            .collect();
        Self { limbs }
    }

    pub fn add(&self, other: &Self, basis: &CrtBasis) -> Self {
        let limbs = (0..basis.len())
            .map(|i| {
                let q = basis.modulus(i);
                self.limbs[i]
                    .iter()
                    .zip(other.limbs[i].iter())
                    .map(|(&a, &b)| addmod(a, b, q))
                    .collect()
            })
            .collect();
        Self { limbs }
    }

    pub fn sub(&self, other: &Self, basis: &CrtBasis) -> Self {
        let limbs = (0..basis.len())
            .map(|i| {
                let q = basis.modulus(i);
                self.limbs[i]
                    .iter()
                    .zip(other.limbs[i].iter())
                    .map(|(&a, &b)| submod(a, b, q))
                    .collect()
            })
            .collect();
        Self { limbs }
    }

    pub fn negate(&self, basis: &CrtBasis) -> Self {
        let limbs = (0..basis.len())
            .map(|i| {
                let q = basis.modulus(i);
                self.limbs[i]
                    .iter()
                    .map(|&a| if a == 0 { 0 } else { q - a })
                    .collect()
            })
            .collect();
        Self { limbs }
    }

    /// Per-limb scalar multiplication; `scalars[i]` applies to limb i.
    pub fn mul_scalar_rns(&self, scalars: &[u64], basis: &CrtBasis) -> Self {
        let limbs = (0..basis.len())
            .map(|i| {
                let q = basis.modulus(i);
                self.limbs[i]
                    .iter()
                    .map(|&a| mulmod(a, scalars[i], q))
                    .collect()
            })
            .collect();
        Self { limbs }
    }

    /// Negacyclic polynomial product via per-limb NTT, limbs in parallel.
    pub fn ntt_mul(&self, other: &Self, basis: &CrtBasis) -> Self {
        let limbs = (0..basis.len())
            .into_par_iter()
            .map(|i| basis.table(i).negacyclic_mul(&self.limbs[i], &other.limbs[i]))
            .collect();
        Self { limbs }
    }

    /// Exact CRT lift to centered integer coefficients in (-Q/2, Q/2].
    pub fn lift_centered(&self, basis: &CrtBasis) -> Vec<BigInt> {
        let n = self.limbs[0].len();
        (0..n)
            .into_par_iter()
            .map(|j| {
                let mut acc = BigUint::from(0u64);
                for i in 0..basis.len() {
                    let q = basis.modulus(i);
                    let term = mulmod(self.limbs[i][j], basis.qhat_inv[i], q);
                    acc += &basis.qhat[i] * term;
                }
                acc %= &basis.product;
                if acc > basis.half {
                    BigInt::from_biguint(Sign::Plus, acc)
                        - BigInt::from_biguint(Sign::Plus, basis.product.clone())
                } else {
                    BigInt::from_biguint(Sign::Plus, acc)
                }
            })
            .collect()
    }

    /// Exact CRT lift to unsigned coefficients in [0, Q).
    pub fn lift_unsigned(&self, basis: &CrtBasis) -> Vec<BigUint> {
        let n = self.limbs[0].len();
        (0..n)
            .into_par_iter()
            .map(|j| {
                let mut acc = BigUint::from(0u64);
                for i in 0..basis.len() {
                    let q = basis.modulus(i);
                    let term = mulmod(self.limbs[i][j], basis.qhat_inv[i], q);
                    acc += &basis.qhat[i] * term;
                }
                acc % &basis.product
            })
            .collect()
    }
}
