//! The p-adic logarithm and exponential.
//!
//! `log_p` is the Taylor series `log(1+u) = u - u^2/2 + u^3/3 - ...`
//! on its strict convergence domain: units with `v_p(x - 1) >= 1`
//! (`>= 2` for p = 2). Terms with `p | n` each cost a digit, so the
//! series runs at a working precision of `N + floor(log_p(2N)) + 5`
//! and the result is truncated back to `N`.
//!
//! [`iwasawa_log`] extends the logarithm to every unit through
//! `log(x) = log(x^{p-1}) / (p-1)`: raising to the `p-1` kills the
//! Teichmüller part, which is torsion and logless. Gamma values are
//! rarely `= 1 (mod p)`, so `log Gamma_p` is built on this branch.

use iwasawa_integers::Integer;
use iwasawa_padic::{PadicError, Qp};

/// Working precision for the series: `N + floor(log_p(2N)) + 5`.
fn working_precision(prime: u64, precision: usize) -> usize {
    let mut extra = 0usize;
    let mut pk = u128::from(prime);
    while pk <= 2 * precision as u128 {
        extra += 1;
        pk *= u128::from(prime);
    }
    precision + extra + 5
}

/// The valuation `v_p(x - 1)` must be at least this for `log_p` to
/// converge (and `v_p(x)` at least this for `exp_p`).
fn convergence_floor(prime: u64) -> i64 {
    if prime == 2 {
        2
    } else {
        1
    }
}

/// Computes the p-adic logarithm of a unit `x = 1 (mod p)`
/// (`mod 4` for p = 2).
///
/// # Errors
///
/// `LogDivergence` for zero, non-units, and units outside the
/// convergence congruence.
pub fn log_p(x: &Qp) -> Result<Qp, PadicError> {
    if x.is_zero() {
        return Err(PadicError::LogDivergence(
            "logarithm of zero is undefined".into(),
        ));
    }
    if x.valuation() != 0 {
        return Err(PadicError::LogDivergence(format!(
            "argument has valuation {}, expected 0",
            x.valuation()
        )));
    }
    let prime = x.prime();
    let precision = x.precision();
    let u_probe = x - &Qp::one(prime, precision.max(1) as usize);
    if u_probe.is_zero() {
        // x = 1 to full precision
        return Ok(Qp::zero(prime, precision.max(1) as usize));
    }
    if u_probe.valuation() < convergence_floor(prime) {
        return Err(PadicError::LogDivergence(format!(
            "v_p(x - 1) = {} is below the convergence floor {}",
            u_probe.valuation(),
            convergence_floor(prime)
        )));
    }

    let work = working_precision(prime, precision.max(1) as usize);
    let lifted = x.with_precision(work as i64);
    let u = &lifted - &Qp::one(prime, work);
    let u_val = u.valuation().max(1) as usize;
    let max_terms = work / u_val + 10;

    let mut result = u.clone();
    let mut u_power = &u * &u;
    for n in 2..=max_terms {
        let divisor = Qp::from_integer(prime, work, i64::try_from(n).expect("term index fits"));
        let term = u_power.checked_div(&divisor)?;
        if term.valuation() < work as i64 {
            if n % 2 == 1 {
                result = &result + &term;
            } else {
                result = &result - &term;
            }
        }
        u_power = &u_power * &u;
        if u_power.valuation() >= work as i64 {
            break;
        }
    }
    Ok(result.with_precision(precision))
}

/// Computes the p-adic exponential of `x` with `v_p(x) >= 1`
/// (`>= 2` for p = 2).
///
/// # Errors
///
/// `ExpDivergence` when the valuation is below the convergence floor.
pub fn exp_p(x: &Qp) -> Result<Qp, PadicError> {
    let prime = x.prime();
    let precision = x.precision().max(1) as usize;
    if x.is_zero() {
        return Ok(Qp::one(prime, precision));
    }
    if x.valuation() < convergence_floor(prime) {
        return Err(PadicError::ExpDivergence(format!(
            "v_p(x) = {} is below the convergence floor {}",
            x.valuation(),
            convergence_floor(prime)
        )));
    }

    let work = working_precision(prime, precision);
    let lifted = x.with_precision(work as i64);
    let mut result = Qp::one(prime, work);
    let mut x_power = lifted.clone();
    let mut factorial = Integer::from(1u64);
    for n in 1..=(2 * work + 10) {
        if n > 1 {
            factorial = factorial * Integer::from(n as u64);
            x_power = &x_power * &lifted;
        }
        let term = x_power.checked_div(&Qp::from_integer(prime, work, factorial.clone()))?;
        if term.valuation() >= work as i64 {
            break;
        }
        result = &result + &term;
    }
    Ok(result.with_precision(precision as i64))
}

/// The canonical branch of the logarithm on all units:
/// `log(x) = log_p(x^{p-1}) / (p-1)` (with exponent 2 for p = 2).
///
/// Agrees with [`log_p`] on its domain and vanishes on every root of
/// unity.
///
/// # Errors
///
/// `LogDivergence` for zero or non-units.
pub fn iwasawa_log(x: &Qp) -> Result<Qp, PadicError> {
    if x.is_zero() {
        return Err(PadicError::LogDivergence(
            "logarithm of zero is undefined".into(),
        ));
    }
    if x.valuation() != 0 {
        return Err(PadicError::LogDivergence(format!(
            "argument has valuation {}, expected 0",
            x.valuation()
        )));
    }
    let prime = x.prime();
    let exponent = if prime == 2 { 2 } else { prime - 1 };
    let power = x.pow(i64::try_from(exponent).expect("exponent fits i64"))?;
    let log = log_p(&power)?;
    let n = log.precision().max(1) as usize;
    log.checked_div(&Qp::from_integer(
        prime,
        n,
        i64::try_from(exponent).expect("exponent fits i64"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use iwasawa_padic::Zp;

    #[test]
    fn test_log_additivity() {
        // log(8) + log(8) = log(64) in Q_7 to precision >= 18
        let p = 7;
        let n = 20;
        let x = Qp::from_integer(p, n, 8);
        let lx = log_p(&x).unwrap();
        let sum = &lx + &lx;
        let lx2 = log_p(&(&x * &x)).unwrap();
        assert_eq!(sum.with_precision(18), lx2.with_precision(18));
    }

    #[test]
    fn test_log_of_one_is_zero() {
        assert!(log_p(&Qp::one(7, 10)).unwrap().is_zero());
    }

    #[test]
    fn test_log_domain() {
        // zero and non-units are rejected
        assert!(log_p(&Qp::zero(7, 10)).is_err());
        assert!(log_p(&Qp::from_integer(7, 10, 14)).is_err());
        // 3 is a unit but 3 != 1 (mod 7)
        assert!(matches!(
            log_p(&Qp::from_integer(7, 10, 3)).unwrap_err(),
            PadicError::LogDivergence(_)
        ));
    }

    #[test]
    fn test_log_at_two() {
        // log_2(2) fails (valuation 1), log_2(5) converges (5 = 1 mod 4)
        assert!(log_p(&Qp::from_integer(2, 12, 2)).is_err());
        let l5 = log_p(&Qp::from_integer(2, 12, 5)).unwrap();
        assert!(l5.valuation() >= 2);
        // log_2(3) diverges: 3 - 1 = 2 has valuation 1 < 2
        assert!(log_p(&Qp::from_integer(2, 12, 3)).is_err());
    }

    #[test]
    fn test_exp_log_round_trip() {
        let p = 7;
        let n = 16;
        let x = Qp::from_integer(p, n, 1 + 7);
        let lx = log_p(&x).unwrap();
        let back = exp_p(&lx).unwrap();
        assert_eq!(back.with_precision(14), x.with_precision(14));
    }

    #[test]
    fn test_exp_domain() {
        assert!(exp_p(&Qp::from_integer(7, 10, 3)).is_err());
        assert!(exp_p(&Qp::from_integer(2, 10, 2)).is_err());
        assert!(exp_p(&Qp::zero(7, 10)).unwrap().is_one());
    }

    #[test]
    fn test_iwasawa_log_extends_log_p() {
        let p = 7;
        let n = 14;
        let x = Qp::from_integer(p, n, 8);
        let strict = log_p(&x).unwrap();
        let branch = iwasawa_log(&x).unwrap();
        assert_eq!(strict.with_precision(12), branch.with_precision(12));
    }

    #[test]
    fn test_iwasawa_log_kills_teichmuller() {
        let p = 7;
        let n = 14;
        let omega = Zp::new(p, n, 3).teichmuller();
        let log = iwasawa_log(&Qp::from_zp(&omega)).unwrap();
        assert!(log.is_zero());
    }

    #[test]
    fn test_iwasawa_log_additive_on_units() {
        let p = 7;
        let n = 14;
        let a = Qp::from_integer(p, n, 3);
        let b = Qp::from_integer(p, n, 5);
        let sum = &iwasawa_log(&a).unwrap() + &iwasawa_log(&b).unwrap();
        let joint = iwasawa_log(&(&a * &b)).unwrap();
        assert_eq!(sum.with_precision(12), joint.with_precision(12));
    }
}
