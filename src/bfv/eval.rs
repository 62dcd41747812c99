//! Homomorphic evaluation: addition, subtraction, negation, and
//! multiplication with relinearization and modulus switching.
//!
//! Multiplication is the only operation that descends the modulus chain.
//! The tensor product is computed exactly: both operands are CRT-lifted to
//! centered integers and re-reduced into an extended basis whose product
//! exceeds N * Q_l^2, so the degree-two intermediate reconstructs without
//! wraparound before the t/Q_l scaling.

use std::sync::Arc;

use num_bigint::BigInt;

use super::ciphertext::Ciphertext;
use super::context::{BfvContext, Feature};
use super::error::{BfvError, Result};
use super::key::EvaluationKey;
use super::params::DIGIT_BITS;
use super::rns::{div_round, RnsPoly};

const DIGITS_PER_WORD: usize = (64 / DIGIT_BITS) as usize;
const DIGIT_MASK: u64 = (1u64 << DIGIT_BITS) - 1;

fn same_level(lhs: &Ciphertext, rhs: &Ciphertext) -> Result<usize> {
    if lhs.level == rhs.level {
        Ok(lhs.level)
    } else {
        Err(BfvError::LevelMismatch {
            lhs: lhs.level,
            rhs: rhs.level,
        })
    }
}

impl BfvContext {
    /// Component-wise ciphertext sum at a common level.
    pub fn eval_add(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Result<Ciphertext> {
        self.require(Feature::LeveledEvaluation)?;
        self.check_owned(lhs)?;
        self.check_owned(rhs)?;
        let level = same_level(lhs, rhs)?;
        let basis = self.params().level_basis(level);
        Ok(Ciphertext {
            c0: lhs.c0.add(&rhs.c0, basis),
            c1: lhs.c1.add(&rhs.c1, basis),
            level,
            params: Arc::clone(self.params()),
        })
    }

    /// Component-wise ciphertext difference at a common level.
    pub fn eval_sub(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Result<Ciphertext> {
        self.require(Feature::LeveledEvaluation)?;
        self.check_owned(lhs)?;
        self.check_owned(rhs)?;
        let level = same_level(lhs, rhs)?;
        let basis = self.params().level_basis(level);
        Ok(Ciphertext {
            c0: lhs.c0.sub(&rhs.c0, basis),
            c1: lhs.c1.sub(&rhs.c1, basis),
            level,
            params: Arc::clone(self.params()),
        })
    }

    pub fn eval_negate(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        self.require(Feature::LeveledEvaluation)?;
        self.check_owned(ct)?;
        let basis = self.params().level_basis(ct.level);
        Ok(Ciphertext {
            c0: ct.c0.negate(basis),
            c1: ct.c1.negate(basis),
            level: ct.level,
            params: Arc::clone(self.params()),
        })
    }

    /// Homomorphic multiplication: tensor product, relinearization with
    /// the stored evaluation key, then one modulus switch, yielding a
    /// ciphertext one level below the operating level.
    ///
    /// Operands at different levels are first brought to the lower of the
    /// two by modulus switching, so a product can be multiplied with a
    /// fresh ciphertext directly. Fails with `DepthExceeded` when the
    /// operating level is already 0 and with `RelinKeyMissing` when
    /// `eval_mult_key_gen` has not run.
    pub fn eval_mult(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Result<Ciphertext> {
        self.require(Feature::LeveledEvaluation)?;
        self.check_owned(lhs)?;
        self.check_owned(rhs)?;
        let evk = Arc::clone(self.relin_key().ok_or(BfvError::RelinKeyMissing)?);
        let level = lhs.level.min(rhs.level);
        if level == 0 {
            return Err(BfvError::DepthExceeded);
        }
        let lhs = self.bring_to_level(lhs, level);
        let rhs = self.bring_to_level(rhs, level);

        let params = self.params();
        let basis = params.level_basis(level);
        let ext = params.mult_basis(level);

        let a0 = RnsPoly::from_bigint(&lhs.c0.lift_centered(basis), ext);
        let a1 = RnsPoly::from_bigint(&lhs.c1.lift_centered(basis), ext);
        let b0 = RnsPoly::from_bigint(&rhs.c0.lift_centered(basis), ext);
        let b1 = RnsPoly::from_bigint(&rhs.c1.lift_centered(basis), ext);

        // degree-two intermediate in the (1, s, s^2) basis
        let d0 = a0.ntt_mul(&b0, ext);
        let d1 = a0.ntt_mul(&b1, ext).add(&a1.ntt_mul(&b0, ext), ext);
        let d2 = a1.ntt_mul(&b1, ext);

        // exact rounded scaling by t/Q_l back into the level basis
        let t = params.plain_modulus();
        let q = BigInt::from(basis.product().clone());
        let scale = |d: RnsPoly| -> RnsPoly {
            let scaled: Vec<BigInt> = d
                .lift_centered(ext)
                .into_iter()
                .map(|x| div_round(&(x * t), &q))
                .collect();
            RnsPoly::from_bigint(&scaled, basis)
        };
        let e0 = scale(d0);
        let e1 = scale(d1);
        let e2 = scale(d2);

        let (r0, r1) = self.relinearize(&e2, level, &evk);
        let relinearized = Ciphertext {
            c0: e0.add(&r0, basis),
            c1: e1.add(&r1, basis),
            level,
            params: Arc::clone(params),
        };
        Ok(self.mod_switch_down(&relinearized))
    }

    /// Replace the s^2 component by linear terms: decompose `e2` lifted to
    /// [0, Q_l) into base-2^DIGIT_BITS digits and pair each digit with the
    /// matching evaluation-key entry.
    fn relinearize(&self, e2: &RnsPoly, level: usize, evk: &EvaluationKey) -> (RnsPoly, RnsPoly) {
        let params = self.params();
        let basis = params.level_basis(level);
        let n = params.ring_dim();
        let words: Vec<Vec<u64>> = e2
            .lift_unsigned(basis)
            .iter()
            .map(|x| x.to_u64_digits())
            .collect();

        let mut r0 = RnsPoly::zero(basis, n);
        let mut r1 = RnsPoly::zero(basis, n);
        debug_assert!(params.digit_count(level) <= evk.num_digits());
        for j in 0..params.digit_count(level) {
            let word = j / DIGITS_PER_WORD;
            let shift = (j % DIGITS_PER_WORD) as u32 * DIGIT_BITS;
            let digit: Vec<u64> = words
                .iter()
                .map(|w| (w.get(word).copied().unwrap_or(0) >> shift) & DIGIT_MASK)
                .collect();
            let d = RnsPoly::broadcast(&digit, basis);
            r0 = r0.add(&d.ntt_mul(&evk.b[j], basis), basis);
            r1 = r1.add(&d.ntt_mul(&evk.a[j], basis), basis);
        }
        (r0, r1)
    }

    fn bring_to_level(&self, ct: &Ciphertext, target: usize) -> Ciphertext {
        let mut cur = ct.clone();
        while cur.level > target {
            cur = self.mod_switch_down(&cur);
        }
        cur
    }

    /// Rounded division by the dropped prime, re-reduced into the basis
    /// one level down.
    fn mod_switch_down(&self, ct: &Ciphertext) -> Ciphertext {
        let level = ct.level;
        debug_assert!(level > 0);
        let from = self.params().level_basis(level);
        let to = self.params().level_basis(level - 1);
        let dropped = BigInt::from(self.params().moduli()[level]);
        let switch = |c: &RnsPoly| {
            let coeffs: Vec<BigInt> = c
                .lift_centered(from)
                .into_iter()
                .map(|x| div_round(&x, &dropped))
                .collect();
            RnsPoly::from_bigint(&coeffs, to)
        };
        Ciphertext {
            c0: switch(&ct.c0),
            c1: switch(&ct.c1),
            level: level - 1,
            params: Arc::clone(self.params()),
        }
    }
}
