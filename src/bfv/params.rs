//! Parameter derivation: ring dimension, plaintext modulus, and the
//! descending chain of ciphertext primes, plus every table derived from
//! them (per-level CRT bases, extended multiplication bases, NTT tables,
//! Delta = floor(Q_l / t) per level).

use std::sync::Arc;

use num_bigint::BigUint;

use super::error::{BfvError, Result};
use super::rns::{biguint_mod_u64, CrtBasis};
use crate::math::ntt::NttTable;
use crate::math::prime::{find_ntt_prime, is_prime};

/// Bit width of every chain and auxiliary prime.
pub(crate) const PRIME_BITS: u32 = 50;

/// Relinearization digit base is 2^DIGIT_BITS.
pub(crate) const DIGIT_BITS: u32 = 16;

/// Ring dimension used when the caller does not pick one.
pub const DEFAULT_RING_DIM: usize = 2048;

/// Immutable shared state derived once at context creation and referenced
/// by every key, plaintext, and ciphertext.
#[derive(Debug)]
pub struct CryptoParams {
    n: usize,
    plain_modulus: u64,
    depth: usize,
    /// Chain primes q_0..q_L, dropped from the back, one per multiplication.
    moduli: Vec<u64>,
    /// Auxiliary primes for the extended multiplication basis.
    aux_moduli: Vec<u64>,
    /// level_bases[l] = CRT basis {q_0..q_l}.
    level_bases: Vec<CrtBasis>,
    /// mult_bases[l] = {q_0..q_l} ++ {p_0..p_{l+1}}; its product exceeds
    /// N * Q_l^2 / 2, so tensor products reconstruct exactly.
    mult_bases: Vec<CrtBasis>,
    /// delta_rns[l][i] = floor(Q_l / t) mod q_i.
    delta_rns: Vec<Vec<u64>>,
    /// Batching transform over Z_t.
    plain_table: NttTable,
}

impl CryptoParams {
    /// Derive parameters for the given plaintext modulus and
    /// multiplicative depth. The chain holds depth + 1 primes.
    pub fn derive(plain_modulus: u64, depth: usize, n: usize) -> Result<Arc<Self>> {
        if !n.is_power_of_two() || n < 8 {
            return Err(BfvError::Parameter(format!(
                "ring dimension {n} must be a power of two, at least 8"
            )));
        }
        let two_n = 2 * n as u64;
        if plain_modulus < 2 || !is_prime(plain_modulus) || plain_modulus % two_n != 1 {
            return Err(BfvError::Parameter(format!(
                "plaintext modulus {plain_modulus} must be a prime congruent to 1 mod {two_n} \
                 to support batching over a ring of dimension {n}"
            )));
        }
        // Noise headroom: every multiplication grows the error by roughly
        // 2*N*t before the rescale divides it back down by one chain
        // prime, so each prime must dominate that factor comfortably.
        let growth = 2u128 * n as u128 * plain_modulus as u128;
        if growth << 6 >= 1u128 << PRIME_BITS {
            return Err(BfvError::Parameter(format!(
                "noise budget infeasible: ring dimension {n} with plaintext modulus \
                 {plain_modulus} exceeds the {PRIME_BITS}-bit prime headroom"
            )));
        }

        let num_levels = depth + 1;
        let num_aux = depth + 2;
        let mut primes: Vec<u64> = Vec::with_capacity(num_levels + num_aux);
        for _ in 0..num_levels + num_aux {
            let q = find_ntt_prime(PRIME_BITS, two_n, &primes).ok_or_else(|| {
                BfvError::Parameter(format!(
                    "not enough {PRIME_BITS}-bit NTT-friendly primes for ring dimension {n} \
                     and depth {depth}"
                ))
            })?;
            primes.push(q);
        }
        let moduli = primes[..num_levels].to_vec();
        let aux_moduli = primes[num_levels..].to_vec();

        let chain_tables: Vec<Arc<NttTable>> = moduli
            .iter()
            .map(|&q| Arc::new(NttTable::new(n, q)))
            .collect();
        let aux_tables: Vec<Arc<NttTable>> = aux_moduli
            .iter()
            .map(|&q| Arc::new(NttTable::new(n, q)))
            .collect();

        let mut level_bases = Vec::with_capacity(num_levels);
        let mut mult_bases = Vec::with_capacity(num_levels);
        let mut delta_rns = Vec::with_capacity(num_levels);
        for l in 0..num_levels {
            let level = CrtBasis::new(chain_tables[..=l].to_vec());
            let mut ext = chain_tables[..=l].to_vec();
            ext.extend_from_slice(&aux_tables[..=l + 1]);
            let delta: BigUint = level.product() / plain_modulus;
            delta_rns.push(
                moduli[..=l]
                    .iter()
                    .map(|&q| biguint_mod_u64(&delta, q))
                    .collect(),
            );
            level_bases.push(level);
            mult_bases.push(CrtBasis::new(ext));
        }

        Ok(Arc::new(Self {
            n,
            plain_modulus,
            depth,
            moduli,
            aux_moduli,
            level_bases,
            mult_bases,
            delta_rns,
            plain_table: NttTable::new(n, plain_modulus),
        }))
    }

    pub fn ring_dim(&self) -> usize {
        self.n
    }

    /// Number of SIMD slots (full packing: one slot per coefficient).
    pub fn num_slots(&self) -> usize {
        self.n
    }

    pub fn plain_modulus(&self) -> u64 {
        self.plain_modulus
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Level fresh ciphertexts start at.
    pub fn max_level(&self) -> usize {
        self.depth
    }

    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    pub(crate) fn aux_moduli(&self) -> &[u64] {
        &self.aux_moduli
    }

    pub(crate) fn level_basis(&self, level: usize) -> &CrtBasis {
        &self.level_bases[level]
    }

    pub(crate) fn mult_basis(&self, level: usize) -> &CrtBasis {
        &self.mult_bases[level]
    }

    pub(crate) fn delta_rns(&self, level: usize) -> &[u64] {
        &self.delta_rns[level]
    }

    pub(crate) fn plain_table(&self) -> &NttTable {
        &self.plain_table
    }

    /// Relinearization digits needed to cover Q_level in base 2^DIGIT_BITS.
    pub(crate) fn digit_count(&self, level: usize) -> usize {
        let bits = self.level_bases[level].product().bits();
        bits.div_ceil(DIGIT_BITS as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_chain_properties() {
        let params = CryptoParams::derive(65537, 2, 1024).unwrap();
        assert_eq!(params.moduli().len(), 3);
        assert_eq!(params.aux_moduli().len(), 4);
        assert_eq!(params.max_level(), 2);
        assert_eq!(params.num_slots(), 1024);

        let two_n = 2 * 1024;
        let mut seen = vec![];
        for &q in params.moduli().iter().chain(params.aux_moduli()) {
            assert!(is_prime(q), "{q} is not prime");
            assert_eq!(q % two_n, 1, "{q} is not NTT-friendly");
            assert!(!seen.contains(&q), "duplicate prime {q}");
            seen.push(q);
        }
    }

    #[test]
    fn test_mult_basis_covers_tensor_range() {
        let params = CryptoParams::derive(65537, 2, 1024).unwrap();
        for l in 0..=params.max_level() {
            let q = params.level_basis(l).product().clone();
            let bound = &q * &q * (params.ring_dim() as u64);
            assert!(
                params.mult_basis(l).product() > &bound,
                "extended basis too small at level {l}"
            );
        }
    }

    #[test]
    fn test_delta_consistency() {
        let params = CryptoParams::derive(65537, 1, 1024).unwrap();
        for l in 0..=params.max_level() {
            let delta = params.level_basis(l).product() / 65537u64;
            for (i, &q) in params.moduli()[..=l].iter().enumerate() {
                assert_eq!(params.delta_rns(l)[i], biguint_mod_u64(&delta, q));
            }
        }
    }

    #[test]
    fn test_rejects_non_power_of_two_dimension() {
        let err = CryptoParams::derive(65537, 1, 1000).unwrap_err();
        assert!(matches!(err, BfvError::Parameter(_)));
    }

    #[test]
    fn test_rejects_batching_unfriendly_plain_modulus() {
        // 65536 is not prime
        assert!(matches!(
            CryptoParams::derive(65536, 1, 1024).unwrap_err(),
            BfvError::Parameter(_)
        ));
        // 7681 is prime but 7680 is not divisible by 2 * 1024
        assert!(matches!(
            CryptoParams::derive(7681, 1, 1024).unwrap_err(),
            BfvError::Parameter(_)
        ));
        // 12289 = 1 + 6 * 2048 is batching-friendly and must be accepted
        assert!(CryptoParams::derive(12289, 1, 1024).is_ok());
    }

    #[test]
    fn test_rejects_oversized_plain_modulus() {
        // prime ~2^40, batching-friendly, but far past the noise headroom
        let t = find_ntt_prime(40, 2 * 1024, &[]).unwrap();
        assert!(matches!(
            CryptoParams::derive(t, 1, 1024).unwrap_err(),
            BfvError::Parameter(_)
        ));
    }

    #[test]
    fn test_digit_count() {
        let params = CryptoParams::derive(65537, 2, 1024).unwrap();
        let bits = params.level_basis(2).product().bits();
        assert_eq!(params.digit_count(2), bits.div_ceil(16) as usize);
        assert!(params.digit_count(0) < params.digit_count(2));
    }
}
