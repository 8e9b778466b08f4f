//! Morita's p-adic Gamma function.
//!
//! For a positive integer n, `Gamma_p(n) = (-1)^n * prod k` over
//! `1 <= k < n` with `p` not dividing `k`. The functional equation
//! `Gamma_p(x+1) = h(x) Gamma_p(x)` with `h(x) = -x` for units and
//! `h(x) = -1` otherwise extends this to all of `Z_p` by continuity:
//! `x = y (mod p^k)` implies `Gamma_p(x) = Gamma_p(y) (mod p^k)`.
//!
//! Arguments whose canonical residue is small (or small-negative, i.e.
//! close to `p^N`) are computed exactly at full precision by the
//! product formula or by walking the functional equation downward.
//! Anything else falls back to a first-order expansion around the
//! nearest small integer using the truncated digamma series; the
//! reduced precision of that path is published in the result.

use iwasawa_integers::Integer;
use iwasawa_padic::{PadicError, Qp, Zp};

use crate::log::{exp_p, iwasawa_log};

/// Largest residue the exact product loop will walk.
const LOOP_LIMIT: u64 = 1 << 20;

/// Computes `Gamma_p(x)` for a p-adic integer argument.
///
/// # Errors
///
/// `Unsupported` when the prime alone exceeds the internal loop bound
/// (no exact or corrected path applies); errors from the fallback's
/// exponential are propagated.
pub fn gamma(x: &Zp) -> Result<Zp, PadicError> {
    let prime = x.prime();
    let precision = x.precision();

    if let Some(r) = x.to_integer().to_u64() {
        if r <= LOOP_LIMIT {
            return Ok(gamma_ascending(prime, precision, r));
        }
    }
    // x = -m for small m: walk the functional equation downward
    let modulus = Integer::from(prime).pow(u32::try_from(precision).expect("precision fits u32"));
    let negated = &modulus - x.to_integer();
    if let Some(m) = negated.to_u64() {
        if m <= LOOP_LIMIT {
            return gamma_descending(prime, precision, m);
        }
    }
    gamma_corrected(x)
}

/// `log Gamma_p = iwasawa_log(Gamma_p)`: Gamma values are units but
/// rarely `= 1 (mod p)`, so the branch-extended logarithm applies.
///
/// # Errors
///
/// Propagates errors of [`gamma`] and the logarithm.
pub fn log_gamma(x: &Zp) -> Result<Qp, PadicError> {
    let g = gamma(x)?;
    iwasawa_log(&Qp::from_zp(&g))
}

/// The truncated p-adic digamma series of the original implementation:
/// `psi_p(x) = -sum 1/(x + k - 1)` over `1 <= k <= 2N` with `p` not
/// dividing `k`.
///
/// This is a heuristic truncation, good only for the first-order
/// correction of the fallback path; derivative formulas built on it are
/// experimental.
///
/// # Errors
///
/// `DivisionByZero` when some shifted argument vanishes identically.
pub fn digamma(x: &Zp) -> Result<Qp, PadicError> {
    let prime = x.prime();
    let precision = x.precision();
    let mut sum = Qp::zero(prime, precision);
    for k in 1..=(2 * precision as u64) {
        if k % prime == 0 {
            continue;
        }
        let shifted = x + &Zp::new(prime, precision, Integer::from(k - 1));
        let term = Qp::from_zp(&shifted).inv()?;
        sum = &sum + &term;
    }
    Ok(-sum)
}

/// Exact product `(-1)^r prod_{1 <= k < r, p not | k} k (mod p^N)`.
fn gamma_ascending(prime: u64, precision: usize, r: u64) -> Zp {
    let modulus = Integer::from(prime).pow(u32::try_from(precision).expect("precision fits u32"));
    let mut acc = Integer::from(1u64);
    for k in 1..r {
        if k % prime != 0 {
            acc = (acc * Integer::from(k)).rem_euclid(&modulus);
        }
    }
    if r % 2 == 1 {
        acc = -acc;
    }
    Zp::new(prime, precision, acc)
}

/// Walks `Gamma_p(x) = Gamma_p(x+1) / h(x)` from `Gamma_p(1) = -1`
/// down to `Gamma_p(-m)`.
fn gamma_descending(prime: u64, precision: usize, m: u64) -> Result<Zp, PadicError> {
    let mut g = Zp::new(prime, precision, -1); // Gamma_p(1)
    for k in 0..=m {
        let x = -i64::try_from(k).expect("loop bound fits i64");
        let h = if k % prime == 0 {
            -Zp::one(prime, precision)
        } else {
            Zp::new(prime, precision, -x)
        };
        g = g.checked_div(&h)?;
    }
    Ok(g)
}

/// First-order correction around the nearest small integer:
/// `Gamma_p(x) = Gamma_p(n0) * exp(d * psi_p(n0))` with
/// `d = x - n0` of valuation >= t. Exact to roughly `2t` digits; the
/// result's precision says so.
fn gamma_corrected(x: &Zp) -> Result<Zp, PadicError> {
    let prime = x.prime();
    let precision = x.precision();

    let mut t = 0usize;
    let mut pt = 1u64;
    while t < precision && pt <= LOOP_LIMIT / prime.max(1) {
        pt *= prime;
        t += 1;
    }
    if t < 2 {
        return Err(PadicError::Unsupported(format!(
            "prime {prime} is too large for the Gamma correction path"
        )));
    }

    let n0 = x
        .to_integer()
        .rem_euclid(&Integer::from(pt))
        .to_u64()
        .expect("residue below the loop limit fits u64");
    let base = gamma_ascending(prime, precision, n0);
    let anchor = Zp::new(prime, precision, Integer::from(n0));
    let diff = Qp::from_zp(&(x - &anchor));
    let psi = digamma(&anchor)?;
    let correction = exp_p(&(&diff * &psi))?;
    let value = (&Qp::from_zp(&base) * &correction).to_zp()?;
    Ok(value.with_precision(precision.min(2 * t)))
}
