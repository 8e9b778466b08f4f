//! Modular arithmetic toolkit.
//!
//! Free functions over [`Integer`] for the number theory the p-adic
//! layers are built from: square roots modulo primes (Tonelli–Shanks)
//! and prime powers (Hensel lifting), Teichmüller representatives,
//! primitive roots, the Chinese remainder theorem and small-integer
//! factorization.
//!
//! Moduli here are runtime values (`p^N` grows with the requested
//! precision), so everything works on big integers rather than a
//! const-generic machine-word modulus.

use num_traits::{One, Zero};

use crate::Integer;

/// Computes `base^exp (mod modulus)` by binary exponentiation.
///
/// # Panics
///
/// Panics if `exp` is negative or `modulus` is not positive.
#[must_use]
pub fn mod_pow(base: &Integer, exp: &Integer, modulus: &Integer) -> Integer {
    base.pow_mod(exp, modulus)
}

/// Computes the inverse of `a` modulo `modulus`.
///
/// Returns `None` when `gcd(a, modulus) != 1`.
#[must_use]
pub fn mod_inverse(a: &Integer, modulus: &Integer) -> Option<Integer> {
    a.mod_inverse(modulus)
}

/// Splits a non-zero integer as `p^v * u` with `p` not dividing `u`.
///
/// Returns the pair `(v, u)`.
///
/// # Panics
///
/// Panics if `x` is zero or `p < 2`.
#[must_use]
pub fn int_valuation(x: &Integer, p: u64) -> (usize, Integer) {
    assert!(!x.is_zero(), "valuation of zero is undefined");
    assert!(p >= 2, "p must be >= 2");
    let p = Integer::from(p);
    let mut v = 0;
    let mut u = x.clone();
    while u.is_divisible_by(&p) {
        u = u / &p;
        v += 1;
    }
    (v, u)
}

/// Computes the Legendre symbol `(a|p)` for an odd prime `p`.
///
/// Returns 0 when `p | a`, +1 for quadratic residues, −1 otherwise.
#[must_use]
pub fn legendre_symbol(a: &Integer, p: u64) -> i8 {
    let p_int = Integer::from(p);
    let a = a.rem_euclid(&p_int);
    if a.is_zero() {
        return 0;
    }
    let exp = Integer::from((p - 1) / 2);
    let r = a.pow_mod(&exp, &p_int);
    if r.is_one() {
        1
    } else {
        -1
    }
}

/// Returns true if `a` is a square modulo the odd prime `p`.
#[must_use]
pub fn is_quadratic_residue(a: &Integer, p: u64) -> bool {
    legendre_symbol(a, p) == 1
}

/// Computes a square root of `a` modulo a prime `p` by Tonelli–Shanks.
///
/// Returns `None` when no root exists. For `p = 2` the root is the
/// residue itself; `p ≡ 3 (mod 4)` uses the direct exponent shortcut.
#[must_use]
pub fn sqrt_mod_prime(a: &Integer, p: u64) -> Option<Integer> {
    let p_int = Integer::from(p);
    let a = a.rem_euclid(&p_int);
    if a.is_zero() {
        return Some(Integer::zero());
    }
    if p == 2 {
        return Some(a);
    }
    if legendre_symbol(&a, p) != 1 {
        return None;
    }
    if p % 4 == 3 {
        let exp = Integer::from((p + 1) / 4);
        return Some(a.pow_mod(&exp, &p_int));
    }

    // Write p - 1 = q * 2^s with q odd.
    let mut q = p - 1;
    let mut s = 0u32;
    while q % 2 == 0 {
        q /= 2;
        s += 1;
    }

    // Find a quadratic non-residue z.
    let mut z = 2u64;
    while legendre_symbol(&Integer::from(z), p) != -1 {
        z += 1;
    }

    let q_int = Integer::from(q);
    let mut m = s;
    let mut c = Integer::from(z).pow_mod(&q_int, &p_int);
    let mut t = a.pow_mod(&q_int, &p_int);
    let mut r = a.pow_mod(&Integer::from((q + 1) / 2), &p_int);

    while !t.is_one() {
        // Smallest i with t^(2^i) = 1.
        let mut i = 0u32;
        let mut t2 = t.clone();
        while !t2.is_one() {
            t2 = (&t2 * &t2).rem_euclid(&p_int);
            i += 1;
        }

        let mut b = c;
        for _ in 0..(m - i - 1) {
            b = (&b * &b).rem_euclid(&p_int);
        }

        m = i;
        c = (&b * &b).rem_euclid(&p_int);
        t = (&t * &c).rem_euclid(&p_int);
        r = (&r * &b).rem_euclid(&p_int);
    }

    Some(r)
}

/// Computes a square root of `a` modulo `p^n` by Tonelli–Shanks at
/// precision 1 followed by one linear Hensel step per digit.
///
/// `a` must be coprime to `p`; for `p = 2` it must satisfy
/// `a = 1 (mod 8)` (with `n >= 3`; lower precisions reduce the
/// condition accordingly). Returns `None` when no root exists.
#[must_use]
pub fn sqrt_mod_prime_power(a: &Integer, p: u64, n: usize) -> Option<Integer> {
    assert!(n >= 1, "precision must be >= 1");
    let p_int = Integer::from(p);
    let modulus = p_int.pow(u32::try_from(n).expect("precision fits u32"));
    let a = a.rem_euclid(&modulus);

    if p == 2 {
        // Units of Z_2 are squares exactly when they are 1 mod 8.
        if a.is_divisible_by(&p_int) {
            return None;
        }
        if n == 2 && a.rem_euclid(&Integer::from(4u64)) != Integer::one() {
            return None;
        }
        if n >= 3 && a.rem_euclid(&Integer::from(8u64)) != Integer::one() {
            return None;
        }
        let mut root = Integer::one();
        for k in 3..n {
            let pk1 = p_int.pow(u32::try_from(k + 1).expect("precision fits u32"));
            let check = (&(&root * &root) - &a).rem_euclid(&pk1);
            if !check.is_zero() {
                root = root + p_int.pow(u32::try_from(k - 1).expect("precision fits u32"));
            }
        }
        return Some(root.rem_euclid(&modulus));
    }

    let mut root = sqrt_mod_prime(&a, p)?;
    if root.is_zero() {
        return if a.is_zero() { Some(root) } else { None };
    }
    for k in 1..n {
        let pk = p_int.pow(u32::try_from(k).expect("precision fits u32"));
        let pk1 = &pk * &p_int;
        let f = (&(&root * &root) - &a).rem_euclid(&pk1);
        if !f.is_zero() {
            // root <- root - (f / p^k) * (2 root)^{-1} * p^k  (mod p^{k+1})
            let two_root_inv = (Integer::new(2) * &root).mod_inverse(&p_int)?;
            let correction = ((f / &pk) * &two_root_inv).rem_euclid(&p_int);
            root = (root - correction * pk).rem_euclid(&pk1);
        }
    }
    Some(root.rem_euclid(&modulus))
}

/// Computes the Teichmüller representative of `a` modulo `p^n`: the
/// unique `(p−1)`-th root of unity in `Z_p` congruent to `a` mod `p`
/// (zero when `p | a`).
///
/// Iterates `a <- a^p (mod p^n)` to its fixed point; each step gains at
/// least one digit, so at most `n` iterations run.
#[must_use]
pub fn teichmuller_lift(a: &Integer, p: u64, n: usize) -> Integer {
    let modulus = Integer::from(p).pow(u32::try_from(n).expect("precision fits u32"));
    let p_exp = Integer::from(p);
    let mut x = a.rem_euclid(&modulus);
    for _ in 0..=n {
        let y = x.pow_mod(&p_exp, &modulus);
        if y == x {
            break;
        }
        x = y;
    }
    x
}

/// Finds the least primitive root modulo an odd prime `p`.
///
/// # Panics
///
/// Panics if `p < 3` or `p` is not prime (the search would not
/// terminate correctly).
#[must_use]
pub fn primitive_root(p: u64) -> u64 {
    assert!(p >= 3, "primitive roots are searched for odd primes only");
    let factors = factorize(p - 1);
    let p_int = Integer::from(p);
    'candidate: for g in 2..p {
        for &(q, _) in &factors {
            let exp = Integer::from((p - 1) / q);
            if Integer::from(g).pow_mod(&exp, &p_int).is_one() {
                continue 'candidate;
            }
        }
        return g;
    }
    unreachable!("every prime has a primitive root");
}

/// Finds a generator of `(Z/p^k Z)*` for an odd prime `p`.
///
/// A primitive root `g` mod `p` generates mod every `p^k` unless
/// `g^{p−1} = 1 (mod p^2)`, in which case `g + p` does.
#[must_use]
pub fn primitive_root_mod_prime_power(p: u64, k: u32) -> u64 {
    let g = primitive_root(p);
    if k == 1 {
        return g;
    }
    let p2 = Integer::from(p).pow(2);
    let exp = Integer::from(p - 1);
    if Integer::from(g).pow_mod(&exp, &p2).is_one() {
        g + p
    } else {
        g
    }
}

/// Solves a system of congruences `x = r_i (mod m_i)` by the Chinese
/// remainder theorem.
///
/// The moduli must be pairwise coprime; returns `None` otherwise (or
/// when the list is empty). The result is reduced modulo the product of
/// the moduli.
#[must_use]
pub fn crt(congruences: &[(Integer, Integer)]) -> Option<Integer> {
    let (first, rest) = congruences.split_first()?;
    let mut x = first.0.rem_euclid(&first.1);
    let mut m = first.1.clone();
    for (r, modulus) in rest {
        // x + m*t = r (mod modulus)  =>  t = (r - x) * m^{-1}
        let m_inv = m.mod_inverse(modulus)?;
        let t = ((r - &x) * m_inv).rem_euclid(modulus);
        x = x + &m * &t;
        m = &m * modulus;
        x = x.rem_euclid(&m);
    }
    Some(x)
}

/// Factorizes a small integer by trial division.
///
/// Returns prime/exponent pairs in ascending prime order. The target
/// moduli of this library are small, so no sub-exponential method is
/// needed here.
#[must_use]
pub fn factorize(n: u64) -> Vec<(u64, u32)> {
    let mut factors = Vec::new();
    let mut n = n;
    let mut d = 2u64;
    while d * d <= n {
        if n % d == 0 {
            let mut e = 0;
            while n % d == 0 {
                n /= d;
                e += 1;
            }
            factors.push((d, e));
        }
        d += if d == 2 { 1 } else { 2 };
    }
    if n > 1 {
        factors.push((n, 1));
    }
    factors
}

/// Computes Euler's totient of a small integer.
#[must_use]
pub fn euler_phi(n: u64) -> u64 {
    factorize(n)
        .into_iter()
        .map(|(p, e)| p.pow(e - 1) * (p - 1))
        .product()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_valuation() {
        let (v, u) = int_valuation(&Integer::new(392), 7); // 392 = 7^2 * 8
        assert_eq!(v, 2);
        assert_eq!(u.to_i64(), Some(8));

        let (v, u) = int_valuation(&Integer::new(-5), 5);
        assert_eq!(v, 1);
        assert_eq!(u.to_i64(), Some(-1));
    }

    #[test]
    fn test_legendre() {
        // Squares mod 7: 1, 2, 4
        assert_eq!(legendre_symbol(&Integer::new(2), 7), 1);
        assert_eq!(legendre_symbol(&Integer::new(3), 7), -1);
        assert_eq!(legendre_symbol(&Integer::new(14), 7), 0);
    }

    #[test]
    fn test_sqrt_mod_prime() {
        let r = sqrt_mod_prime(&Integer::new(2), 7).unwrap();
        let r = r.to_i64().unwrap();
        assert!(r == 3 || r == 4);

        assert!(sqrt_mod_prime(&Integer::new(3), 7).is_none());

        // p = 1 (mod 4) exercises the full Tonelli-Shanks loop
        let r = sqrt_mod_prime(&Integer::new(10), 13).unwrap();
        let r = r.to_i64().unwrap();
        assert_eq!((r * r) % 13, 10);
    }

    #[test]
    fn test_sqrt_mod_prime_power() {
        let n = 20;
        let m = Integer::from(7u64).pow(n);
        let r = sqrt_mod_prime_power(&Integer::new(2), 7, n as usize).unwrap();
        assert_eq!((&r * &r).rem_euclid(&m).to_i64(), Some(2));

        // 17 = 1 (mod 8) is a 2-adic square
        let m2 = Integer::from(2u64).pow(12);
        let r = sqrt_mod_prime_power(&Integer::new(17), 2, 12).unwrap();
        assert_eq!((&r * &r).rem_euclid(&m2).to_i64(), Some(17));

        // 3 = 3 (mod 8) is not
        assert!(sqrt_mod_prime_power(&Integer::new(3), 2, 12).is_none());
    }

    #[test]
    fn test_teichmuller() {
        let p = 7u64;
        let n = 10;
        let m = Integer::from(p).pow(n);
        for a in 1..7i64 {
            let w = teichmuller_lift(&Integer::new(a), p, n as usize);
            // omega(a)^(p-1) = 1 exactly
            assert!(w.pow_mod(&Integer::from(p - 1), &m).is_one());
            // omega(a) = a (mod p)
            assert_eq!(
                w.rem_euclid(&Integer::from(p)),
                Integer::new(a).rem_euclid(&Integer::from(p))
            );
            // idempotent
            assert_eq!(teichmuller_lift(&w, p, n as usize), w);
        }
        // omega(0) = 0
        assert!(teichmuller_lift(&Integer::new(7), p, 3).is_divisible_by(&Integer::from(p)));
    }

    #[test]
    fn test_primitive_root() {
        assert_eq!(primitive_root(7), 3);
        assert_eq!(primitive_root(5), 2);
        // Order of the returned generator is exactly p - 1
        let p = 23u64;
        let g = primitive_root(p);
        let p_int = Integer::from(p);
        let mut seen = 1u64;
        let mut x = Integer::from(g);
        while !x.is_one() {
            x = (x * Integer::from(g)).rem_euclid(&p_int);
            seen += 1;
        }
        assert_eq!(seen, p - 1);
    }

    #[test]
    fn test_crt() {
        let x = crt(&[
            (Integer::new(2), Integer::new(3)),
            (Integer::new(3), Integer::new(5)),
            (Integer::new(2), Integer::new(7)),
        ])
        .unwrap();
        assert_eq!(x.to_i64(), Some(23));

        // Non-coprime moduli fail
        assert!(crt(&[
            (Integer::new(1), Integer::new(4)),
            (Integer::new(2), Integer::new(6)),
        ])
        .is_none());
    }

    #[test]
    fn test_factorize_phi() {
        assert_eq!(factorize(360), vec![(2, 3), (3, 2), (5, 1)]);
        assert_eq!(factorize(97), vec![(97, 1)]);
        assert_eq!(euler_phi(1), 1);
        assert_eq!(euler_phi(8), 4);
        assert_eq!(euler_phi(360), 96);
    }
}
