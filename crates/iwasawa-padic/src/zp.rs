//! The ring of p-adic integers truncated at a finite precision.
//!
//! A [`Zp`] value is a residue modulo `p^N` together with the absolute
//! precision `N` it is known to. Precision is data: every operation
//! publishes the precision of its result (the minimum of its operands'
//! precisions for the ring operations), and equality only compares the
//! digits both sides actually know.

use num_traits::{One, Zero};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use iwasawa_integers::{modular, Integer};

use crate::error::PadicError;

/// A p-adic integer known modulo `p^N`.
#[derive(Clone)]
pub struct Zp {
    prime: u64,
    precision: usize,
    value: Integer,
}

impl Zp {
    /// Creates a p-adic integer from a value, canonicalized to its least
    /// non-negative residue modulo `p^N`.
    ///
    /// # Panics
    ///
    /// Panics if `p < 2` or `precision < 1`.
    #[must_use]
    pub fn new(prime: u64, precision: usize, value: impl Into<Integer>) -> Self {
        assert!(prime >= 2, "prime must be >= 2, got {prime}");
        assert!(precision >= 1, "precision must be >= 1, got {precision}");
        let modulus = power_of(prime, precision);
        Self {
            prime,
            precision,
            value: value.into().rem_euclid(&modulus),
        }
    }

    /// Creates the zero element at the given precision.
    ///
    /// # Panics
    ///
    /// Panics if `p < 2` or `precision < 1`.
    #[must_use]
    pub fn zero(prime: u64, precision: usize) -> Self {
        Self::new(prime, precision, Integer::zero())
    }

    /// Creates the one element at the given precision.
    ///
    /// # Panics
    ///
    /// Panics if `p < 2` or `precision < 1`.
    #[must_use]
    pub fn one(prime: u64, precision: usize) -> Self {
        Self::new(prime, precision, Integer::one())
    }

    /// Creates a p-adic integer from a rational `num/den`.
    ///
    /// The denominator must be a p-adic unit; the result is
    /// `num * den^{-1} (mod p^N)`.
    ///
    /// # Errors
    ///
    /// `ZeroDenominator` when `den = 0`, `NonUnitDenominator` when
    /// `p | den`.
    pub fn from_rational(
        num: impl Into<Integer>,
        den: impl Into<Integer>,
        prime: u64,
        precision: usize,
    ) -> Result<Self, PadicError> {
        let num = num.into();
        let den = den.into();
        if den.is_zero() {
            return Err(PadicError::ZeroDenominator);
        }
        let modulus = power_of(prime, precision);
        let inv = den
            .mod_inverse(&modulus)
            .ok_or_else(|| PadicError::NonUnitDenominator(den.to_string(), prime))?;
        Ok(Self::new(prime, precision, num * inv))
    }

    /// Returns the base prime.
    #[must_use]
    pub fn prime(&self) -> u64 {
        self.prime
    }

    /// Returns the absolute precision `N`.
    #[must_use]
    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Returns the canonical residue in `[0, p^N)`.
    #[must_use]
    pub fn to_integer(&self) -> &Integer {
        &self.value
    }

    /// Returns true if the residue is zero (the value is
    /// indistinguishable from zero at this precision).
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Returns true if the residue is one.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.value.is_one()
    }

    /// Returns true if this value is a unit of `Z_p` (not divisible by p).
    #[must_use]
    pub fn is_unit(&self) -> bool {
        !self.value.is_divisible_by(&Integer::from(self.prime))
    }

    /// Changes the precision: truncates downward, lifts upward.
    ///
    /// Lifting adds no information; the extra digits of the lifted value
    /// are simply those of the canonical residue.
    ///
    /// # Panics
    ///
    /// Panics if `new_precision < 1`.
    #[must_use]
    pub fn with_precision(&self, new_precision: usize) -> Self {
        Self::new(self.prime, new_precision, self.value.clone())
    }

    /// Returns the p-adic valuation, i.e. the largest `k` with
    /// `p^k | value`. For the zero residue this is `N` by convention:
    /// the value cannot be told apart from zero at this precision.
    #[must_use]
    pub fn valuation(&self) -> usize {
        if self.is_zero() {
            return self.precision;
        }
        let (v, _) = modular::int_valuation(&self.value, self.prime);
        v.min(self.precision)
    }

    /// Extracts the unit part `u` of `value = p^v * u`.
    ///
    /// The unit is returned at precision `N - v`, which is all the
    /// digits of `u` this value determines. Zero is returned unchanged.
    #[must_use]
    pub fn unit_part(&self) -> Self {
        if self.is_zero() {
            return self.clone();
        }
        let (v, u) = modular::int_valuation(&self.value, self.prime);
        if v == 0 {
            return self.clone();
        }
        Self::new(self.prime, self.precision - v, u)
    }

    /// Raises to an integer power.
    ///
    /// Negative exponents require a unit.
    ///
    /// # Errors
    ///
    /// `NonUnitDivisor` when `exp < 0` and the value is not a unit.
    pub fn pow(&self, exp: i64) -> Result<Self, PadicError> {
        let base = if exp < 0 { self.inverse()? } else { self.clone() };
        let modulus = power_of(self.prime, self.precision);
        let result = base
            .value
            .pow_mod(&Integer::from(exp.unsigned_abs()), &modulus);
        Ok(Self::new(self.prime, self.precision, result))
    }

    /// Computes the multiplicative inverse.
    ///
    /// # Errors
    ///
    /// `DivisionByZero` for zero, `NonUnitDivisor` for non-units.
    pub fn inverse(&self) -> Result<Self, PadicError> {
        if self.is_zero() {
            return Err(PadicError::DivisionByZero);
        }
        let modulus = power_of(self.prime, self.precision);
        let inv = self
            .value
            .mod_inverse(&modulus)
            .ok_or_else(|| PadicError::NonUnitDivisor(self.value.to_string()))?;
        Ok(Self::new(self.prime, self.precision, inv))
    }

    /// Divides by another p-adic integer, which must be a unit.
    ///
    /// The result has precision `min(N1, N2)`.
    ///
    /// # Errors
    ///
    /// `PrimeMismatch`, `DivisionByZero` or `NonUnitDivisor`.
    pub fn checked_div(&self, other: &Self) -> Result<Self, PadicError> {
        if self.prime != other.prime {
            return Err(PadicError::PrimeMismatch(self.prime, other.prime));
        }
        let precision = self.precision.min(other.precision);
        let inv = other.with_precision(precision).inverse()?;
        Ok(self.with_precision(precision) * inv)
    }

    /// Computes the Teichmüller representative: the unique `(p−1)`-th
    /// root of unity congruent to this value mod p (zero for non-units).
    #[must_use]
    pub fn teichmuller(&self) -> Self {
        let w = modular::teichmuller_lift(&self.value, self.prime, self.precision);
        Self::new(self.prime, self.precision, w)
    }

    /// Computes a square root by Tonelli–Shanks at precision 1 followed
    /// by Hensel lifting.
    ///
    /// The value must be a unit; for odd p it must be a quadratic
    /// residue mod p, for p = 2 it must be `1 (mod 8)`.
    ///
    /// # Errors
    ///
    /// `NoSquareRoot` when the preconditions fail; the failure is exact
    /// (no root exists in `Z_p`).
    pub fn sqrt(&self) -> Result<Self, PadicError> {
        if !self.is_unit() {
            return Err(PadicError::NoSquareRoot(format!(
                "{} is not a unit",
                self.value
            )));
        }
        if self.prime == 2 {
            if self.precision >= 3
                && self.value.rem_euclid(&Integer::from(8u64)) != Integer::one()
            {
                return Err(PadicError::NoSquareRoot(format!(
                    "{} is not 1 mod 8",
                    self.value
                )));
            }
        } else if modular::legendre_symbol(&self.value, self.prime) != 1 {
            return Err(PadicError::NoSquareRoot(format!(
                "{} is not a quadratic residue mod {}",
                self.value, self.prime
            )));
        }
        let root = modular::sqrt_mod_prime_power(&self.value, self.prime, self.precision)
            .ok_or_else(|| {
                PadicError::NoSquareRoot(format!("{} has no root in Z_{}", self.value, self.prime))
            })?;
        Ok(Self::new(self.prime, self.precision, root))
    }

    /// Returns the base-p digits of the residue, least significant first,
    /// of length `N`.
    #[must_use]
    pub fn to_digits(&self) -> Vec<u64> {
        let p = Integer::from(self.prime);
        let mut digits = Vec::with_capacity(self.precision);
        let mut rest = self.value.clone();
        for _ in 0..self.precision {
            let d = rest.rem_euclid(&p);
            digits.push(d.to_u64().expect("digit fits u64"));
            rest = rest / &p;
        }
        digits
    }

    fn assert_same_prime(&self, other: &Self) {
        assert!(
            self.prime == other.prime,
            "mismatched primes: {} and {}",
            self.prime,
            other.prime
        );
    }
}

/// Computes `p^n` as an [`Integer`].
pub(crate) fn power_of(prime: u64, n: usize) -> Integer {
    Integer::from(prime).pow(u32::try_from(n).expect("precision fits u32"))
}

impl PartialEq for Zp {
    /// Two values are equal when their primes match and their residues
    /// agree modulo `p^min(N1, N2)`.
    fn eq(&self, other: &Self) -> bool {
        if self.prime != other.prime {
            return false;
        }
        let modulus = power_of(self.prime, self.precision.min(other.precision));
        self.value.rem_euclid(&modulus) == other.value.rem_euclid(&modulus)
    }
}

impl Eq for Zp {}

impl fmt::Debug for Zp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zp({} mod {}^{})",
            self.value, self.prime, self.precision
        )
    }
}

impl fmt::Display for Zp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (mod {}^{})", self.value, self.prime, self.precision)
    }
}

impl Add for Zp {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        &self + &rhs
    }
}

impl Add for &Zp {
    type Output = Zp;

    fn add(self, rhs: Self) -> Self::Output {
        self.assert_same_prime(rhs);
        let precision = self.precision.min(rhs.precision);
        Zp::new(self.prime, precision, &self.value + &rhs.value)
    }
}

impl Sub for Zp {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        &self - &rhs
    }
}

impl Sub for &Zp {
    type Output = Zp;

    fn sub(self, rhs: Self) -> Self::Output {
        self.assert_same_prime(rhs);
        let precision = self.precision.min(rhs.precision);
        Zp::new(self.prime, precision, &self.value - &rhs.value)
    }
}

impl Mul for Zp {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        &self * &rhs
    }
}

impl Mul for &Zp {
    type Output = Zp;

    fn mul(self, rhs: Self) -> Self::Output {
        self.assert_same_prime(rhs);
        let precision = self.precision.min(rhs.precision);
        Zp::new(self.prime, precision, &self.value * &rhs.value)
    }
}

impl Div for Zp {
    type Output = Self;

    /// # Panics
    ///
    /// Panics when the divisor is not a unit; use
    /// [`Zp::checked_div`] to handle the error.
    fn div(self, rhs: Self) -> Self::Output {
        self.checked_div(&rhs).expect("division by non-unit in Zp")
    }
}

impl Div for &Zp {
    type Output = Zp;

    fn div(self, rhs: Self) -> Self::Output {
        self.checked_div(rhs).expect("division by non-unit in Zp")
    }
}

impl Neg for Zp {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Zp::new(self.prime, self.precision, -self.value)
    }
}

impl Neg for &Zp {
    type Output = Zp;

    fn neg(self) -> Self::Output {
        Zp::new(self.prime, self.precision, -&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_arithmetic_mod_p20() {
        let p = 7;
        let n = 20;
        let a = Zp::new(p, n, 15);
        let b = Zp::new(p, n, 8);
        let sum = &a + &b;
        assert_eq!(sum.to_integer(), &Integer::new(23));

        let mut expected = vec![0u64; n];
        expected[0] = 2;
        expected[1] = 3;
        assert_eq!(sum.to_digits(), expected);
    }

    #[test]
    fn test_precision_min_rule() {
        let a = Zp::new(5, 10, 123);
        let b = Zp::new(5, 4, 2);
        assert_eq!((&a + &b).precision(), 4);
        assert_eq!((&a * &b).precision(), 4);
        assert_eq!((&a - &b).precision(), 4);
    }

    #[test]
    fn test_equality_is_modulo_min_precision() {
        let a = Zp::new(7, 3, 10);
        let b = Zp::new(7, 10, 10 + 343);
        assert_eq!(a, b);
        let c = Zp::new(7, 10, 10 + 49);
        assert_ne!(a, c);
        assert_ne!(a, Zp::new(5, 3, 10));
    }

    #[test]
    fn test_valuation_and_unit_part() {
        let x = Zp::new(7, 10, 2 * 49);
        assert_eq!(x.valuation(), 2);
        let u = x.unit_part();
        assert_eq!(u.precision(), 8);
        assert_eq!(u.to_integer(), &Integer::new(2));

        assert_eq!(Zp::zero(7, 10).valuation(), 10);
        assert_eq!(Zp::new(7, 10, 3).valuation(), 0);
    }

    #[test]
    fn test_division_by_non_unit_fails() {
        let a = Zp::new(7, 10, 3);
        let b = Zp::new(7, 10, 14);
        let err = a.checked_div(&b).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainError);
    }

    #[test]
    fn test_from_rational() {
        // 1/2 in Z_7: 2 * x = 1 (mod 7^4)
        let x = Zp::from_rational(1, 2, 7, 4).unwrap();
        let two = Zp::new(7, 4, 2);
        assert!((x * two).is_one());

        assert_eq!(
            Zp::from_rational(1, 0, 7, 4).unwrap_err(),
            PadicError::ZeroDenominator
        );
        assert!(matches!(
            Zp::from_rational(1, 14, 7, 4).unwrap_err(),
            PadicError::NonUnitDenominator(..)
        ));
    }

    #[test]
    fn test_hensel_sqrt() {
        let p = 7;
        let n = 20;
        let x = Zp::new(p, n, 2);
        let r = x.sqrt().unwrap();
        assert_eq!(&r * &r, x);
        let r0 = r.to_digits()[0];
        assert!(r0 == 3 || r0 == 4);

        // 3 is not a QR mod 7
        assert!(matches!(
            Zp::new(p, n, 3).sqrt().unwrap_err(),
            PadicError::NoSquareRoot(_)
        ));
        // non-units have no sqrt
        assert!(Zp::new(p, n, 7).sqrt().is_err());
    }

    #[test]
    fn test_teichmuller() {
        let p = 7;
        let n = 15;
        for a in 1..7 {
            let w = Zp::new(p, n, a).teichmuller();
            assert!(w.pow(6).unwrap().is_one());
            assert_eq!(w.teichmuller(), w);
            assert_eq!(w.to_digits()[0], u64::try_from(a).unwrap());
        }
    }

    #[test]
    fn test_with_precision_round_trip() {
        let x = Zp::new(7, 10, 12345);
        let truncated = x.with_precision(3);
        assert_eq!(truncated.precision(), 3);
        // Lifting back cannot invent the lost digits but agrees mod 7^3
        let lifted = truncated.with_precision(10);
        assert_eq!(lifted.with_precision(3), x.with_precision(3));
    }

    #[test]
    fn test_pow_negative() {
        let x = Zp::new(7, 8, 3);
        let y = x.pow(-2).unwrap();
        let z = x.pow(2).unwrap();
        assert!((y * z).is_one());
        assert!(Zp::new(7, 8, 14).pow(-1).is_err());
    }
}
