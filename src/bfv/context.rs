//! The crypto context: parameter handle, feature gating, key generation,
//! encryption and decryption. Homomorphic evaluation lives in `eval`.

use std::collections::HashSet;
use std::sync::Arc;

use num_bigint::BigInt;

use super::ciphertext::Ciphertext;
use super::encoding::Plaintext;
use super::error::{BfvError, Result};
use super::key::{EvaluationKey, PublicKey, SecretKey};
use super::params::{CryptoParams, DEFAULT_RING_DIM};
use super::rns::{bigint_mod_u64, div_round, RnsPoly};
use super::sampling::{sample_gaussian, sample_ternary, ERROR_STD_DEV};

/// Capability groups. Every operation checks its group before running, so
/// a context only does what it was explicitly configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Key generation, encryption, decryption.
    Encryption,
    /// Relinearization key generation and use.
    KeySwitching,
    /// EvalAdd, EvalSub, EvalNegate, EvalMult.
    LeveledEvaluation,
}

/// Entry point of the scheme. Holds the derived parameters, the set of
/// enabled features, and the relinearization key once generated.
pub struct BfvContext {
    params: Arc<CryptoParams>,
    features: HashSet<Feature>,
    relin_key: Option<Arc<EvaluationKey>>,
}

impl BfvContext {
    /// Build a context for the given plaintext modulus and multiplicative
    /// depth at the default ring dimension. No features are enabled yet.
    pub fn new(plain_modulus: u64, depth: usize) -> Result<Self> {
        Self::with_ring_dim(plain_modulus, depth, DEFAULT_RING_DIM)
    }

    /// Same as [`BfvContext::new`] with an explicit ring dimension.
    pub fn with_ring_dim(plain_modulus: u64, depth: usize, n: usize) -> Result<Self> {
        Ok(Self {
            params: CryptoParams::derive(plain_modulus, depth, n)?,
            features: HashSet::new(),
            relin_key: None,
        })
    }

    pub fn enable(&mut self, feature: Feature) {
        self.features.insert(feature);
    }

    pub fn params(&self) -> &Arc<CryptoParams> {
        &self.params
    }

    pub(crate) fn require(&self, feature: Feature) -> Result<()> {
        if self.features.contains(&feature) {
            Ok(())
        } else {
            Err(BfvError::FeatureNotEnabled(feature))
        }
    }

    pub(crate) fn relin_key(&self) -> Option<&Arc<EvaluationKey>> {
        self.relin_key.as_ref()
    }

    /// Operations never mix parameter sets: a ciphertext is only valid
    /// under the context that produced it.
    pub(crate) fn check_owned(&self, ct: &Ciphertext) -> Result<()> {
        if Arc::ptr_eq(&self.params, &ct.params) {
            Ok(())
        } else {
            Err(BfvError::Parameter(
                "ciphertext was produced under a different context".to_string(),
            ))
        }
    }

    /// Generate a fresh ternary secret key and matching public key.
    pub fn key_gen(&self) -> Result<(PublicKey, SecretKey)> {
        self.require(Feature::Encryption)?;
        let mut rng = rand::thread_rng();
        let sk = SecretKey::generate(&mut rng, &self.params);
        let pk = PublicKey::generate(&mut rng, &sk, &self.params);
        Ok((pk, sk))
    }

    /// Generate the relinearization key for `sk` and keep it on the
    /// context for every subsequent multiplication.
    pub fn eval_mult_key_gen(&mut self, sk: &SecretKey) -> Result<Arc<EvaluationKey>> {
        self.require(Feature::KeySwitching)?;
        let mut rng = rand::thread_rng();
        let evk = Arc::new(EvaluationKey::generate(&mut rng, sk, &self.params));
        self.relin_key = Some(Arc::clone(&evk));
        Ok(evk)
    }

    /// Pack a vector of integers into a plaintext; see [`Plaintext`].
    pub fn make_packed_plaintext(&self, values: &[i64]) -> Result<Plaintext> {
        Plaintext::encode(values, &self.params)
    }

    /// Encrypt at the top of the modulus chain:
    ///
    ///   c0 = pk0 * u + e0 + Delta * m,   c1 = pk1 * u + e1
    ///
    /// with u ternary and e0, e1 gaussian.
    pub fn encrypt(&self, pk: &PublicKey, pt: &Plaintext) -> Result<Ciphertext> {
        self.require(Feature::Encryption)?;
        let n = self.params.ring_dim();
        let top = self.params.max_level();
        let basis = self.params.level_basis(top);
        let mut rng = rand::thread_rng();

        let u = RnsPoly::from_signed(&sample_ternary(&mut rng, n), basis);
        let e0 = RnsPoly::from_signed(&sample_gaussian(&mut rng, n, ERROR_STD_DEV), basis);
        let e1 = RnsPoly::from_signed(&sample_gaussian(&mut rng, n, ERROR_STD_DEV), basis);

        // m has coefficients in [0, t), below every chain prime
        let m = RnsPoly::broadcast(&pt.coeffs, basis);
        let delta_m = m.mul_scalar_rns(self.params.delta_rns(top), basis);

        let c0 = pk.p0.ntt_mul(&u, basis).add(&e0, basis).add(&delta_m, basis);
        let c1 = pk.p1.ntt_mul(&u, basis).add(&e1, basis);
        Ok(Ciphertext {
            c0,
            c1,
            level: top,
            params: Arc::clone(&self.params),
        })
    }

    /// Decrypt at the ciphertext's current level:
    ///
    ///   m = round(t * (c0 + c1 * s) / Q_l) mod t.
    ///
    /// Decryption is exact while the noise stays below Q_l / (2t); past
    /// that point the rounding silently lands on wrong residues. The
    /// caller controls the budget through the configured depth.
    ///
    /// The returned plaintext spans every slot; truncate with
    /// [`Plaintext::decode`].
    pub fn decrypt(&self, sk: &SecretKey, ct: &Ciphertext) -> Result<Plaintext> {
        self.require(Feature::Encryption)?;
        self.check_owned(ct)?;
        let basis = self.params.level_basis(ct.level);
        let s = RnsPoly::from_signed(&sk.coeffs, basis);
        let phase = ct.c0.add(&ct.c1.ntt_mul(&s, basis), basis);

        let t = self.params.plain_modulus();
        let q = BigInt::from(basis.product().clone());
        let coeffs = phase
            .lift_centered(basis)
            .into_iter()
            .map(|x| bigint_mod_u64(&div_round(&(x * t), &q), t))
            .collect();
        Ok(Plaintext::from_coeffs(coeffs, &self.params))
    }
}
