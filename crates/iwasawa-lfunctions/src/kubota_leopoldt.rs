//! Kubota–Leopoldt p-adic L-functions.
//!
//! At non-positive integers the values are interpolation formulas in
//! generalized Bernoulli numbers:
//!
//! `L_p(1-n, chi) = -(1 - chi(p) p^{n-1}) * B_{n,chi} / n` for `n >= 1`,
//!
//! with `chi(p) = 0` when `p` divides the conductor and the parity
//! short-circuit `B_{n,chi} = 0` for mismatched `(n, chi)`.
//!
//! The derivative at zero follows the original implementation: for an
//! odd character of conductor p it returns the Gamma-log sum
//! `sum_a chi(a) log Gamma_p(a)`; for an even character the log sum
//! `sum_a chi(a) log(a/(f-1))` with the branch-extended logarithm.
//!
//! Values at positive integers are Euler-deflated partial sums of the
//! Dirichlet series. There is no p-adic convergence theory behind them;
//! they are kept for parity with the original and marked experimental.
//!
//! All values are memoized in process-wide maps keyed by
//! `(s, conductor, fingerprint(chi), p, N)`.

use std::sync::OnceLock;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use iwasawa_characters::DirichletCharacter;
use iwasawa_integers::Integer;
use iwasawa_padic::{PadicError, Qp, Zp};
use iwasawa_special_func::{digamma, generalized_bernoulli, iwasawa_log, log_gamma};

/// Cache key: everything the value depends on.
#[derive(Clone, PartialEq, Eq, Hash)]
struct LKey {
    s: i64,
    conductor: u64,
    fingerprint: (u64, Vec<u64>),
    prime: u64,
    precision: usize,
}

impl LKey {
    fn new(s: i64, chi: &DirichletCharacter, precision: usize) -> Self {
        Self {
            s,
            conductor: chi.conductor(),
            fingerprint: chi.fingerprint(),
            prime: chi.prime(),
            precision,
        }
    }
}

type LMap = RwLock<FxHashMap<LKey, Qp>>;

fn value_cache() -> &'static LMap {
    static CACHE: OnceLock<LMap> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(FxHashMap::default()))
}

fn derivative_cache() -> &'static LMap {
    static CACHE: OnceLock<LMap> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(FxHashMap::default()))
}

/// Empties both L-value caches. (The Bernoulli cache has its own
/// `clear_bernoulli_cache`.)
pub fn clear_cache() {
    value_cache().write().clear();
    derivative_cache().write().clear();
}

/// The Euler factor `1 - chi(p) p^{n-1}`; equal to 1 when `p` divides
/// the modulus (`chi(p) = 0` there).
///
/// # Errors
///
/// Propagates embedding errors from the character evaluation.
pub fn euler_factor(
    chi: &DirichletCharacter,
    n: usize,
    precision: usize,
) -> Result<Qp, PadicError> {
    let p = chi.prime();
    let one = Qp::one(p, precision);
    let chi_p = chi.evaluate_zp(i64::try_from(p).expect("prime fits i64"), precision)?;
    if chi_p.is_zero() {
        return Ok(one);
    }
    let p_power = Qp::from_integer(
        p,
        precision,
        Integer::from(p).pow(u32::try_from(n - 1).expect("exponent fits u32")),
    );
    Ok(&one - &(&Qp::from_zp(&chi_p) * &p_power))
}

/// Computes `L_p(s, chi)` at an integer point for a primitive (or
/// principal) character.
///
/// Values at `s <= 0` are exact interpolation formulas. Values at
/// `s > 0` are experimental truncated sums (see the module docs) and
/// should not be used to formulate invariants.
///
/// # Errors
///
/// `InvalidPrecision`, `Unsupported` for imprimitive non-principal
/// characters, and anything the Bernoulli/character layers surface.
pub fn kubota_leopoldt(
    s: i64,
    chi: &DirichletCharacter,
    precision: usize,
) -> Result<Qp, PadicError> {
    if precision < 1 {
        return Err(PadicError::InvalidPrecision(precision as i64));
    }
    if !chi.is_principal() && !chi.is_primitive() {
        return Err(PadicError::Unsupported(
            "L_p is defined here for primitive characters".into(),
        ));
    }
    let key = LKey::new(s, chi, precision);
    if let Some(hit) = value_cache().read().get(&key) {
        return Ok(hit.clone());
    }

    let result = if s <= 0 {
        value_at_non_positive(s, chi, precision)?
    } else {
        value_at_positive(s, chi, precision)?
    };

    value_cache().write().insert(key, result.clone());
    Ok(result)
}

fn value_at_non_positive(
    s: i64,
    chi: &DirichletCharacter,
    precision: usize,
) -> Result<Qp, PadicError> {
    let p = chi.prime();
    let n = usize::try_from(1 - s).expect("1 - s is positive");

    // B_{n,chi} = 0 on parity mismatch; the single exception is the
    // principal character at n = 1 (B_1 = -1/2).
    let mismatch = (n % 2 == 0 && chi.is_odd()) || (n % 2 == 1 && chi.is_even());
    if mismatch && !(chi.is_principal() && n == 1) {
        return Ok(Qp::zero(p, precision));
    }

    // guard digits for the division by n
    let mut vp_n = 0usize;
    let mut m = n;
    while m % (p as usize) == 0 {
        vp_n += 1;
        m /= p as usize;
    }
    let work = precision + vp_n + 1;

    let bn = generalized_bernoulli(n, chi, work)?;
    let euler = euler_factor(chi, n, work)?;
    let n_qp = Qp::from_integer(p, work, i64::try_from(n).expect("n fits i64"));
    let value = (-(&euler * &bn)).checked_div(&n_qp)?;
    Ok(value.with_precision(precision as i64))
}

/// Euler-deflated partial sum of `sum chi(m)/m^s` over `p` not
/// dividing `m`. Experimental: the truncation has no p-adic error
/// bound.
fn value_at_positive(
    s: i64,
    chi: &DirichletCharacter,
    precision: usize,
) -> Result<Qp, PadicError> {
    let p = chi.prime();
    let bits = 64 - u64::leading_zeros(p.max(2)) as usize;
    let terms = precision * bits + 10;
    let mut sum = Qp::zero(p, precision);
    for m in 1..=terms as u64 {
        if m % p == 0 {
            continue;
        }
        let chi_m = chi.evaluate_zp(i64::try_from(m).expect("term fits i64"), precision)?;
        if chi_m.is_zero() {
            continue;
        }
        let m_pow = Qp::from_integer(p, precision, i64::try_from(m).expect("term fits i64"))
            .pow(s)?;
        sum = &sum + &Qp::from_zp(&chi_m).checked_div(&m_pow)?;
    }
    let euler = euler_factor(chi, usize::try_from(s).expect("s is positive"), precision)?;
    Ok(&euler * &sum)
}

/// Computes `L'_p(0, chi)`, the derivative of the p-adic L-function at
/// zero.
///
/// Odd characters of conductor p get the Gamma-log sum
/// `sum_{a=1}^{p-1} chi(a) log Gamma_p(a)` (what the original library
/// computes and returns here); odd characters of conductor coprime to p
/// get the `-(1/f) sum chi(a) log Gamma_p(a/f)` form with the
/// first-order digamma fallback for the fractional arguments
/// (experimental). Even characters get the log prescription
/// `sum chi(a) log(a / (f-1))` with the branch-extended logarithm.
///
/// # Errors
///
/// `Unsupported` for `s != 0`, principal characters, or conductors
/// divisible by p other than p itself.
pub fn kubota_leopoldt_derivative(
    s: i64,
    chi: &DirichletCharacter,
    precision: usize,
) -> Result<Qp, PadicError> {
    if s != 0 {
        return Err(PadicError::Unsupported(
            "the derivative is implemented at s = 0 only".into(),
        ));
    }
    if precision < 1 {
        return Err(PadicError::InvalidPrecision(precision as i64));
    }
    if chi.is_principal() {
        return Err(PadicError::Unsupported(
            "the derivative formulas need a non-principal character".into(),
        ));
    }
    if !chi.is_primitive() {
        return Err(PadicError::Unsupported(
            "L'_p is defined here for primitive characters".into(),
        ));
    }
    let key = LKey::new(s, chi, precision);
    if let Some(hit) = derivative_cache().read().get(&key) {
        return Ok(hit.clone());
    }

    let result = if chi.is_odd() {
        derivative_at_zero_odd(chi, precision)?
    } else {
        derivative_at_zero_even(chi, precision)?
    };

    derivative_cache().write().insert(key, result.clone());
    Ok(result)
}

fn derivative_at_zero_odd(
    chi: &DirichletCharacter,
    precision: usize,
) -> Result<Qp, PadicError> {
    let p = chi.prime();
    let f = chi.conductor();
    let work = precision + 2;

    if f == p {
        // conductor p: the arguments a are integers and the value is
        // the Gamma-log sum itself
        let mut sum = Qp::zero(p, work);
        for a in 1..f {
            let chi_a = chi.evaluate_zp(i64::try_from(a).expect("conductor fits i64"), work)?;
            if chi_a.is_zero() {
                continue;
            }
            let lg = log_gamma(&Zp::new(p, work, Integer::from(a)))?;
            sum = &sum + &(&Qp::from_zp(&chi_a) * &lg);
        }
        return Ok(sum.with_precision(precision as i64));
    }

    if f % p == 0 {
        return Err(PadicError::Unsupported(format!(
            "conductor {f} divisible by p = {p} (other than p itself) is not supported"
        )));
    }

    // p does not divide f: -(1/f) sum chi(a) log Gamma_p(a/f), with the
    // fractional arguments approximated to first order
    let mut sum = Qp::zero(p, work);
    for a in 1..f {
        let chi_a = chi.evaluate_zp(i64::try_from(a).expect("conductor fits i64"), work)?;
        if chi_a.is_zero() {
            continue;
        }
        let lg = log_gamma_fractional(a, f, p, work)?;
        sum = &sum + &(&Qp::from_zp(&chi_a) * &lg);
    }
    let value = -(sum.checked_div(&Qp::from_integer(
        p,
        work,
        i64::try_from(f).expect("conductor fits i64"),
    ))?);
    Ok(value.with_precision(precision as i64))
}

fn derivative_at_zero_even(
    chi: &DirichletCharacter,
    precision: usize,
) -> Result<Qp, PadicError> {
    let p = chi.prime();
    let f = chi.conductor();
    let work = precision + 2;
    let mut sum = Qp::zero(p, work);
    for a in 1..f {
        let chi_a = chi.evaluate_zp(i64::try_from(a).expect("conductor fits i64"), work)?;
        if chi_a.is_zero() {
            continue;
        }
        let ratio = Qp::from_rational(
            i64::try_from(a).expect("conductor fits i64"),
            i64::try_from(f - 1).expect("conductor fits i64"),
            p,
            work,
        )?;
        let log_term = iwasawa_log(&ratio)?;
        sum = &sum + &(&Qp::from_zp(&chi_a) * &log_term);
    }
    Ok(sum.with_precision(precision as i64))
}

/// `log Gamma_p(a/f)` for `p` not dividing `f`, by a first-order Taylor
/// step around the nearest integer with the truncated digamma series.
/// The error grows with the distance of `a/f` from an integer;
/// conductors beyond p should eventually use the distribution relation
/// instead.
fn log_gamma_fractional(a: u64, f: u64, p: u64, precision: usize) -> Result<Qp, PadicError> {
    let nearest = ((a + f / 2) / f).max(1);
    let anchor = Zp::new(p, precision, Integer::from(nearest));
    let x = Qp::from_rational(
        i64::try_from(a).expect("numerator fits i64"),
        i64::try_from(f).expect("denominator fits i64"),
        p,
        precision,
    )?;
    let diff = &x - &Qp::from_integer(p, precision, i64::try_from(nearest).expect("fits i64"));
    let base = log_gamma(&anchor)?;
    let slope = digamma(&anchor)?;
    Ok(&base + &(&diff * &slope))
}

#[cfg(test)]
mod tests {
    use super::*;
    use iwasawa_characters::enumerate_primitive_characters;
    use iwasawa_special_func::bernoulli;

    #[test]
    fn test_zeta_at_minus_one() {
        // zeta_p(-1) = -(1 - p) B_2 / 2 = (p - 1)/12; for p = 7 that is 1/2
        let chi = DirichletCharacter::principal(1, 7);
        let v = kubota_leopoldt(-1, &chi, 12).unwrap();
        assert_eq!(v, Qp::from_rational(1, 2, 7, 12).unwrap());
    }

    #[test]
    fn test_value_at_zero_is_minus_b1() {
        // p | f makes the Euler factor 1, so L_p(0, chi) = -B_{1,chi}
        let p = 5;
        let n = 12;
        for chi in enumerate_primitive_characters(p, p) {
            let l = kubota_leopoldt(0, &chi, n).unwrap();
            let b1 = generalized_bernoulli(1, &chi, n + 2).unwrap();
            assert_eq!(l, -b1.with_precision(n as i64));
        }
    }

    #[test]
    fn test_parity_zeroes() {
        let p = 7;
        let n = 10;
        for chi in enumerate_primitive_characters(p, p) {
            if chi.is_odd() {
                // n = 2 even against odd chi
                assert!(kubota_leopoldt(-1, &chi, n).unwrap().is_zero());
            } else {
                // n = 1 odd against even chi
                assert!(kubota_leopoldt(0, &chi, n).unwrap().is_zero());
            }
        }
    }

    #[test]
    fn test_euler_factor_with_p_dividing_conductor() {
        let chi = enumerate_primitive_characters(5, 5).pop().unwrap();
        assert!(euler_factor(&chi, 3, 10).unwrap().is_one());
    }

    #[test]
    fn test_cache_returns_equal_values() {
        let p = 5;
        let chi = enumerate_primitive_characters(p, p)
            .into_iter()
            .find(DirichletCharacter::is_odd)
            .unwrap();
        clear_cache();
        let first = kubota_leopoldt(0, &chi, 14).unwrap();
        let second = kubota_leopoldt(0, &chi, 14).unwrap();
        assert_eq!(first, second);
        let d1 = kubota_leopoldt_derivative(0, &chi, 10).unwrap();
        let d2 = kubota_leopoldt_derivative(0, &chi, 10).unwrap();
        assert_eq!(d1, d2);
        clear_cache();
        assert_eq!(kubota_leopoldt(0, &chi, 14).unwrap(), first);
    }

    #[test]
    fn test_derivative_rejects_nonzero_s() {
        let chi = enumerate_primitive_characters(5, 5).pop().unwrap();
        assert!(matches!(
            kubota_leopoldt_derivative(1, &chi, 10).unwrap_err(),
            PadicError::Unsupported(_)
        ));
    }

    #[test]
    fn test_positive_values_are_experimental_but_computable() {
        let chi = DirichletCharacter::legendre(5, 5);
        let v = kubota_leopoldt(2, &chi, 6).unwrap();
        // no invariant beyond being a well-formed value
        assert_eq!(v.prime(), 5);
    }

    #[test]
    fn test_generalized_bernoulli_guard_digits() {
        // division by n = p must not silently lose the published digits
        let p = 5;
        let chi = enumerate_primitive_characters(p, p)
            .into_iter()
            .find(|c| c.is_odd())
            .unwrap();
        let l = kubota_leopoldt(1 - 5, &chi, 10).unwrap();
        assert!(l.precision() >= 10);
        // and the plain Bernoulli layer agrees with its own recursion
        assert_eq!(bernoulli(4), bernoulli(4));
    }
}
