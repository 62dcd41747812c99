//! Modular arithmetic and prime search for NTT-friendly u64 moduli.

/// (a * b) mod p without overflow for any 64-bit operands.
pub(crate) fn mulmod(a: u64, b: u64, p: u64) -> u64 {
    ((a as u128 * b as u128) % p as u128) as u64
}

pub(crate) fn addmod(a: u64, b: u64, p: u64) -> u64 {
    let s = a + b;
    if s >= p {
        s - p
    } else {
        s
    }
}

pub(crate) fn submod(a: u64, b: u64, p: u64) -> u64 {
    if a >= b {
        a - b
    } else {
        a + p - b
    }
}

pub(crate) fn modpow(mut a: u64, mut n: u64, p: u64) -> u64 {
    let mut res = 1;
    a %= p;
    while n > 0 {
        if n % 2 == 1 {
            res = mulmod(res, a, p);
        }
        a = mulmod(a, a, p);
        n /= 2;
    }
    res
}

/// Inverse of a mod p, for prime p.
pub(crate) fn invmod(a: u64, p: u64) -> u64 {
    modpow(a, p - 2, p)
}

pub(crate) fn prime_factors(mut n: u64) -> Vec<u64> {
    let mut res = vec![];
    let mut i = 2;
    while i * i <= n {
        if n % i == 0 {
            res.push(i);
            n /= i;
            while n % i == 0 {
                n /= i;
            }
        }
        i += 1;
    }
    if n > 1 {
        res.push(n);
    }
    res
}

/// Miller-Rabin prime test, deterministic for all u64 with this witness set.
pub(crate) fn is_prime(n: u64) -> bool {
    if n == 2 || n == 3 {
        return true;
    }
    if n < 2 || n % 2 == 0 {
        return false;
    }

    // n-1 = 2^k * q, with q odd
    let (k, q) = {
        let mut k = 0;
        let mut q = n - 1;
        while q % 2 == 0 {
            k += 1;
            q /= 2;
        }
        (k, q)
    };

    'witness: for &w in &[2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        if w % n == 0 {
            continue;
        }
        let mut a = modpow(w, q, n);
        if a == 1 {
            continue;
        }
        for _ in 0..k {
            if a == n - 1 {
                continue 'witness;
            }
            a = mulmod(a, a, n);
        }
        return false;
    }
    true
}

/// Smallest generator of the multiplicative group mod prime p.
pub(crate) fn primitive_root(p: u64) -> u64 {
    let factors = prime_factors(p - 1);
    'candidate: for g in 2..p {
        for &f in &factors {
            if modpow(g, (p - 1) / f, p) == 1 {
                continue 'candidate;
            }
        }
        return g;
    }
    unreachable!("p is not prime");
}

/// Primitive m-th root of unity mod prime p; requires m | p - 1.
pub(crate) fn primitive_root_of_unity(m: u64, p: u64) -> u64 {
    assert_eq!((p - 1) % m, 0, "m must divide p - 1");
    let g = primitive_root(p);
    modpow(g, (p - 1) / m, p)
}

/// Largest prime q < 2^bits with q ≡ 1 (mod m), searching downward.
/// Skips any prime already listed in `used`.
pub(crate) fn find_ntt_prime(bits: u32, m: u64, used: &[u64]) -> Option<u64> {
    assert!(bits < 64);
    let upper = (1u64 << bits) - 1;
    let lower = 1u64 << (bits - 1);

    let mut candidate = upper - (upper % m) + 1;
    if candidate > upper {
        candidate -= m;
    }
    while candidate >= lower {
        if is_prime(candidate) && !used.contains(&candidate) {
            return Some(candidate);
        }
        if candidate < lower + m {
            break;
        }
        candidate -= m;
    }
    None
}
