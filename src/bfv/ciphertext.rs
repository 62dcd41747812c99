use std::sync::Arc;

use super::params::CryptoParams;
use super::rns::RnsPoly;

/// Degree-one BFV ciphertext (c0, c1) satisfying
/// c0 + c1 * s = Delta_l * m + noise (mod Q_l).
///
/// `level` selects the active prefix of the modulus chain; every
/// multiplication descends it by one.
#[derive(Debug, Clone)]
pub struct Ciphertext {
    pub(crate) c0: RnsPoly,
    pub(crate) c1: RnsPoly,
    pub(crate) level: usize,
    pub(crate) params: Arc<CryptoParams>,
}

impl Ciphertext {
    /// Remaining level; fresh ciphertexts start at the configured depth
    /// and reach 0 when no further multiplications are possible.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Shared parameters this ciphertext was produced under.
    pub fn params(&self) -> &Arc<CryptoParams> {
        &self.params
    }
}
