//! Bernoulli numbers, Bernoulli polynomials and generalized Bernoulli
//! numbers attached to a Dirichlet character.
//!
//! Ordinary Bernoulli numbers are exact rationals, produced by the
//! closed recursion `sum_{k=0}^{n} C(n+1, k) B_k = 0` and memoized in a
//! process-wide cache. The generalized numbers
//!
//! `B_{n,chi} = f^{n-1} * sum_{a=1}^{f} chi(a) B_n(a/f)`
//!
//! are assembled with cyclotomic character values and reduced back to
//! `Qp`; for the characters this library targets the reduction is exact
//! (the non-constant coefficients vanish identically).

use num_traits::{One, Zero};
use parking_lot::RwLock;

use iwasawa_characters::DirichletCharacter;
use iwasawa_integers::{Integer, Rational};
use iwasawa_padic::{Cyclotomic, PadicError, Qp};

/// Process-wide cache of `B_0, B_1, ...`. Guarded by an `RwLock`; pure
/// memoization, so concurrent fills agree.
static BERNOULLI_CACHE: RwLock<Vec<Rational>> = RwLock::new(Vec::new());

/// Returns the n-th Bernoulli number as an exact rational
/// (`B_1 = -1/2` convention).
#[must_use]
pub fn bernoulli(n: usize) -> Rational {
    {
        let cache = BERNOULLI_CACHE.read();
        if let Some(b) = cache.get(n) {
            return b.clone();
        }
    }
    let mut cache = BERNOULLI_CACHE.write();
    if cache.is_empty() {
        cache.push(Rational::one());
    }
    while cache.len() <= n {
        let m = cache.len();
        // B_m = -(1/(m+1)) * sum_{k<m} C(m+1, k) B_k
        let mut acc = Rational::zero();
        for (k, b) in cache.iter().enumerate() {
            let c = Rational::from_integer(Integer::binomial(m as u64 + 1, k as u64));
            acc = acc + c * b.clone();
        }
        let b = -(acc / Rational::from_integer(Integer::from(m as u64 + 1)));
        cache.push(b);
    }
    cache[n].clone()
}

/// Empties the Bernoulli cache.
pub fn clear_bernoulli_cache() {
    BERNOULLI_CACHE.write().clear();
}

/// Evaluates the n-th Bernoulli polynomial
/// `B_n(x) = sum_k C(n,k) B_k x^{n-k}` exactly.
#[must_use]
pub fn bernoulli_polynomial(n: usize, x: &Rational) -> Rational {
    let mut acc = Rational::zero();
    let mut x_power = Rational::one();
    // iterate k downward so x_power tracks x^{n-k}
    for k in (0..=n).rev() {
        let c = Rational::from_integer(Integer::binomial(n as u64, k as u64));
        acc = acc + c * bernoulli(k) * x_power.clone();
        x_power = x_power * x.clone();
    }
    acc
}

/// Computes the generalized Bernoulli number `B_{n,chi}` as a `Qp`.
///
/// The principal character short-circuits to the ordinary `B_n` (so
/// `B_{1,chi_0} = -1/2`); other characters must be primitive.
///
/// # Errors
///
/// `Unsupported` for `n = 0` or an imprimitive non-principal
/// character; `NotScalar`/`NotRepresentable` propagated from the
/// cyclotomic layer when the value genuinely leaves `Q_p`.
pub fn generalized_bernoulli(
    n: usize,
    chi: &DirichletCharacter,
    precision: usize,
) -> Result<Qp, PadicError> {
    if n == 0 {
        return Err(PadicError::Unsupported(
            "generalized Bernoulli numbers start at n = 1".into(),
        ));
    }
    let prime = chi.prime();
    if chi.is_principal() {
        return Qp::from_ratio(&bernoulli(n), prime, precision);
    }
    if !chi.is_primitive() {
        return Err(PadicError::Unsupported(
            "generalized Bernoulli numbers need a primitive character".into(),
        ));
    }

    let f = chi.conductor();
    // B_n(a/f) has valuation down to -n*v_p(f); work with enough guard
    // digits that the published precision survives the cancellation
    let mut vp_f = 0usize;
    let mut m = f;
    while m % prime == 0 {
        vp_f += 1;
        m /= prime;
    }
    let work = precision + n * vp_f + 1;

    let mut acc = Cyclotomic::zero(prime, work);
    for a in 1..=f {
        let chi_a = chi.evaluate_cyclotomic(i64::try_from(a).expect("conductor fits i64"), work)?;
        if chi_a.is_zero() {
            continue;
        }
        let bp = bernoulli_polynomial(
            n,
            &Rational::new(Integer::from(a), Integer::from(f)),
        );
        let term = chi_a.scale(&Qp::from_ratio(&bp, prime, work)?);
        acc = &acc + &term;
    }
    let scalar = acc.to_qp()?;
    let factor = Qp::from_integer(
        prime,
        work,
        Integer::from(f).pow(u32::try_from(n - 1).expect("degree fits u32")),
    );
    let value = &scalar * &factor;
    if value.is_zero() || value.precision() <= precision as i64 {
        Ok(value)
    } else {
        Ok(value.with_precision(precision as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iwasawa_characters::enumerate_primitive_characters;
    use iwasawa_padic::Zp;

    #[test]
    fn test_small_bernoulli_numbers() {
        assert_eq!(bernoulli(0), Rational::from_i64(1, 1));
        assert_eq!(bernoulli(1), Rational::from_i64(-1, 2));
        assert_eq!(bernoulli(2), Rational::from_i64(1, 6));
        assert_eq!(bernoulli(3), Rational::from_i64(0, 1));
        assert_eq!(bernoulli(4), Rational::from_i64(-1, 30));
        assert_eq!(bernoulli(12), Rational::from_i64(-691, 2730));
    }

    #[test]
    fn test_odd_bernoulli_vanish() {
        for k in 1..8 {
            assert!(bernoulli(2 * k + 1).is_zero(), "B_{} != 0", 2 * k + 1);
        }
    }

    #[test]
    fn test_bernoulli_polynomial() {
        // B_2(x) = x^2 - x + 1/6
        let x = Rational::from_i64(1, 3);
        let expected = Rational::from_i64(1, 9) - Rational::from_i64(1, 3)
            + Rational::from_i64(1, 6);
        assert_eq!(bernoulli_polynomial(2, &x), expected);
        // B_n(0) = B_n
        assert_eq!(bernoulli_polynomial(6, &Rational::zero()), bernoulli(6));
        // B_1(1) = 1/2
        assert_eq!(
            bernoulli_polynomial(1, &Rational::from_i64(1, 1)),
            Rational::from_i64(1, 2)
        );
    }

    #[test]
    fn test_principal_generalized_is_plain() {
        let chi = DirichletCharacter::principal(5, 5);
        let b = generalized_bernoulli(1, &chi, 12).unwrap();
        assert_eq!(b, Qp::from_rational(-1, 2, 5, 12).unwrap());
    }

    #[test]
    fn test_b1_chi_matches_character_sum() {
        // B_{1,chi} = (1/f) sum_a chi(a) a for non-principal chi
        let p = 5;
        let n = 12;
        for chi in enumerate_primitive_characters(p, p) {
            let b1 = generalized_bernoulli(1, &chi, n).unwrap();
            let mut sum = Qp::zero(p, n + 2);
            for a in 1..5i64 {
                let chi_a = Qp::from_zp(&chi.evaluate_zp(a, n + 2).unwrap());
                sum = &sum + &(&chi_a * &Qp::from_integer(p, n + 2, a));
            }
            let direct = sum
                .checked_div(&Qp::from_integer(p, n + 2, 5))
                .unwrap();
            assert_eq!(b1.with_precision(10), direct.with_precision(10));
        }
    }

    #[test]
    fn test_parity_vanishing() {
        // B_{n,chi} = 0 when n and chi have opposite parity
        let p = 7;
        let n = 10;
        for chi in enumerate_primitive_characters(p, p) {
            if chi.is_odd() {
                assert!(generalized_bernoulli(2, &chi, n).unwrap().is_zero());
            } else {
                assert!(generalized_bernoulli(1, &chi, n).unwrap().is_zero());
            }
        }
    }

    #[test]
    fn test_cache_clear_and_refill() {
        let before = bernoulli(10);
        clear_bernoulli_cache();
        assert_eq!(bernoulli(10), before);
    }
}
