//! Packed plaintexts: batching integer vectors into the slots of one ring
//! element over Z_t.
//!
//! With t prime and t ≡ 1 (mod 2N) the negacyclic transform over Z_t is an
//! isomorphism between coefficient vectors and slot vectors, so slot-wise
//! addition and multiplication of plaintexts correspond to ring addition
//! and multiplication of the encoded elements. Encoding applies the
//! inverse transform to the (zero-padded) slot vector; decoding applies
//! the forward transform and truncates to the declared length.

use std::sync::Arc;

use super::error::{BfvError, Result};
use super::params::CryptoParams;

/// One ring element over Z_t together with the significant slot count the
/// encoder was given. Immutable after creation.
#[derive(Debug, Clone)]
pub struct Plaintext {
    pub(crate) coeffs: Vec<u64>,
    pub(crate) len: usize,
    pub(crate) params: Arc<CryptoParams>,
}

impl Plaintext {
    /// Pack a vector of integers, reduced mod t, into one ring element.
    pub(crate) fn encode(values: &[i64], params: &Arc<CryptoParams>) -> Result<Self> {
        let slots = params.num_slots();
        if values.len() > slots {
            return Err(BfvError::Encoding(format!(
                "vector of length {} exceeds the {} available slots",
                values.len(),
                slots
            )));
        }
        let t = params.plain_modulus();
        let mut slot_vec = vec![0u64; slots];
        for (dst, &v) in slot_vec.iter_mut().zip(values.iter()) {
            *dst = v.rem_euclid(t as i64) as u64;
        }
        params.plain_table().inverse(&mut slot_vec);
        Ok(Self {
            coeffs: slot_vec,
            len: values.len(),
            params: Arc::clone(params),
        })
    }

    /// Wrap an already-reduced coefficient vector (used by decryption).
    /// Decryption cannot recover the encoder's declared length, so the
    /// result spans every slot and callers truncate via [`Self::decode`].
    pub(crate) fn from_coeffs(coeffs: Vec<u64>, params: &Arc<CryptoParams>) -> Self {
        let len = coeffs.len();
        Self {
            coeffs,
            len,
            params: Arc::clone(params),
        }
    }

    /// Unpack the slots, truncated to `declared_len` entries in [0, t).
    pub fn decode(&self, declared_len: usize) -> Vec<u64> {
        let mut slot_vec = self.coeffs.clone();
        self.params.plain_table().forward(&mut slot_vec);
        slot_vec.truncate(declared_len.min(self.params.num_slots()));
        slot_vec
    }

    /// Declared slot count: the encoder's input length, or the full slot
    /// count for plaintexts produced by decryption.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
