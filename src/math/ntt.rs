//! Negacyclic Number-Theoretic Transform over a runtime u64 modulus.
//!
//! Radix-2 iterative Cooley-Tukey over Z_q with a precomputed power table,
//! wrapped with the psi-twist so that pointwise multiplication in the
//! transform domain realizes polynomial multiplication mod (X^N + 1, q).

use super::prime::{addmod, invmod, modpow, mulmod, primitive_root_of_unity, submod};

fn is_power_of_two(n: usize) -> bool {
    n != 0 && n & (n - 1) == 0
}

/// bit reversal
/// the length of x should be a power of two
fn bitrev<T: Copy>(x: &mut [T]) {
    let n = x.len();
    debug_assert!(is_power_of_two(n));

    let mut rho = vec![0usize; n];
    let mut k = 2;

    while k <= n {
        // compute rho_k(0: k-1)
        for i in 0..k / 2 {
            rho[i + k / 2] = 2 * rho[i] + 1;
            rho[i] = 2 * rho[i];
        }
        k *= 2;
    }

    for i in 0..n {
        if i < rho[i] {
            x.swap(i, rho[i]);
        }
    }
}

/// In-place forward transform of x with respect to the root whose powers
/// are tabulated in pow_table (pow_table[j] = w^j, j < n/2).
fn ntt_radix2(x: &mut [u64], pow_table: &[u64], q: u64) {
    let n = x.len();
    debug_assert!(is_power_of_two(n));

    bitrev(x);

    let mut k = 2;
    while k <= n {
        for r in 0..n / k {
            for j in 0..k / 2 {
                let tau = mulmod(pow_table[n / k * j], x[r * k + j + k / 2], q);
                x[r * k + j + k / 2] = submod(x[r * k + j], tau, q);
                x[r * k + j] = addmod(x[r * k + j], tau, q);
            }
        }
        k *= 2;
    }
}

fn power_table(root: u64, n: usize, q: u64) -> Vec<u64> {
    let mut table = Vec::with_capacity(n / 2);
    let mut temp = 1u64;
    for _ in 0..n / 2 {
        table.push(temp);
        temp = mulmod(temp, root, q);
    }
    table
}

/// Precomputed transform tables for one modulus q ≡ 1 (mod 2n).
#[derive(Debug, Clone)]
pub struct NttTable {
    q: u64,
    n: usize,
    /// psi^i for i in 0..n, psi a primitive 2n-th root of unity.
    psi_pow: Vec<u64>,
    /// psi^-i for i in 0..n.
    psi_inv_pow: Vec<u64>,
    /// omega^j for j in 0..n/2, omega = psi^2.
    omega_pow: Vec<u64>,
    omega_inv_pow: Vec<u64>,
    n_inv: u64,
}

impl NttTable {
    pub fn new(n: usize, q: u64) -> Self {
        assert!(is_power_of_two(n), "ring dimension must be a power of two");
        assert_eq!((q - 1) % (2 * n as u64), 0, "q must be 1 mod 2n");

        let psi = primitive_root_of_unity(2 * n as u64, q);
        let psi_inv = invmod(psi, q);
        debug_assert_eq!(modpow(psi, n as u64, q), q - 1);

        let mut psi_pow = Vec::with_capacity(n);
        let mut psi_inv_pow = Vec::with_capacity(n);
        let (mut fwd, mut inv) = (1u64, 1u64);
        for _ in 0..n {
            psi_pow.push(fwd);
            psi_inv_pow.push(inv);
            fwd = mulmod(fwd, psi, q);
            inv = mulmod(inv, psi_inv, q);
        }

        let omega = mulmod(psi, psi, q);
        Self {
            q,
            n,
            psi_pow,
            psi_inv_pow,
            omega_pow: power_table(omega, n, q),
            omega_inv_pow: power_table(invmod(omega, q), n, q),
            n_inv: invmod(n as u64, q),
        }
    }

    pub fn modulus(&self) -> u64 {
        self.q
    }

    pub fn ring_dim(&self) -> usize {
        self.n
    }

    /// Coefficients -> evaluations at the odd powers of psi, in the
    /// transform's fixed order.
    pub fn forward(&self, x: &mut [u64]) {
        debug_assert_eq!(x.len(), self.n);
        for (xi, psi) in x.iter_mut().zip(self.psi_pow.iter()) {
            *xi = mulmod(*xi, *psi, self.q);
        }
        ntt_radix2(x, &self.omega_pow, self.q);
    }

    pub fn inverse(&self, x: &mut [u64]) {
        debug_assert_eq!(x.len(), self.n);
        ntt_radix2(x, &self.omega_inv_pow, self.q);
        for (xi, psi) in x.iter_mut().zip(self.psi_inv_pow.iter()) {
            *xi = mulmod(mulmod(*xi, self.n_inv, self.q), *psi, self.q);
        }
    }

    /// Negacyclic product of two coefficient vectors mod (X^n + 1, q).
    pub fn negacyclic_mul(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        let mut fa = a.to_vec();
        let mut fb = b.to_vec();
        self.forward(&mut fa);
        self.forward(&mut fb);
        for (x, y) in fa.iter_mut().zip(fb.iter()) {
            *x = mulmod(*x, *y, self.q);
        }
        self.inverse(&mut fa);
        fa
    }
}
