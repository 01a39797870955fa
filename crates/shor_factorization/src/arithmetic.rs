// =============================================================================
// Shor Factorization - Classical Number Theory
// =============================================================================
// Table of Contents:
//   1. Re-exports (gcd, mod_pow, bit_length)
//   2. Primality - Deterministic Miller-Rabin for u64
//   3. Perfect powers
// =============================================================================

pub use quantum_device_abstraction::modular_arithmetic::{bit_length, gcd, mod_pow};

// =============================================================================
// 2. Primality
// =============================================================================

/// Witnesses that make Miller-Rabin deterministic for every `u64`.
const MILLER_RABIN_WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for &p in &MILLER_RABIN_WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }

    // n - 1 = 2^s · d with d odd
    let mut d = n - 1;
    let mut s = 0u32;
    while d % 2 == 0 {
        d /= 2;
        s += 1;
    }

    'witness: for &a in &MILLER_RABIN_WITNESSES {
        let mut x = mod_pow(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = (x as u128 * x as u128 % n as u128) as u64;
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

// =============================================================================
// 3. Perfect powers
// =============================================================================

/// `Some((b, k))` with `b^k == n`, `k ≥ 2` and `b` as small as possible.
pub fn perfect_power(n: u64) -> Option<(u64, u32)> {
    if n < 4 {
        return None;
    }
    let max_exponent = bit_length(n) as u32 - 1;
    (2..=max_exponent).rev().find_map(|k| {
        let root = integer_root(n, k);
        (root >= 2 && root.checked_pow(k) == Some(n)).then_some((root, k))
    })
}

/// `⌊n^(1/k)⌋`.
pub fn integer_root(n: u64, k: u32) -> u64 {
    if k == 1 || n < 2 {
        return n;
    }
    let mut root = (n as f64).powf(1.0 / k as f64).round() as u64;
    while root > 0 && root.checked_pow(k).is_none_or(|p| p > n) {
        root -= 1;
    }
    while (root + 1).checked_pow(k).is_some_and(|p| p <= n) {
        root += 1;
    }
    root
}
