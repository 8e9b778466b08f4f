//! The field of p-adic numbers.
//!
//! A [`Qp`] value is stored as `p^e * u` with an explicit valuation
//! `e` (possibly negative) and a unit part `u` held as a [`Zp`] whose
//! precision is the relative precision `N − e`. The absolute precision
//! `N` is derived, never stored, so it cannot drift from the data.
//!
//! Precision algebra:
//! - `v(xy) = v(x) + v(y)`, relative precision `min` of the operands'
//! - `v(x + y) >= min(v(x), v(y))`, absolute precision `min` of the
//!   operands' (cancellation raises the valuation and the relative
//!   precision drops accordingly)
//! - division additionally loses `min(e_result, 0)` digits of relative
//!   precision when the result acquires a negative valuation

use num_traits::Zero;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use iwasawa_integers::{modular, Integer, Rational};

use crate::error::PadicError;
use crate::zp::{power_of, Zp};

/// A p-adic number `p^e * u` with explicit valuation and precision.
#[derive(Clone)]
pub struct Qp {
    valuation: i64,
    unit: Zp,
}

impl Qp {
    /// Creates a p-adic number from an explicit valuation and unit part.
    ///
    /// # Errors
    ///
    /// `NonUnitDivisor` when `unit` is neither zero nor a unit (callers
    /// must normalize first); zero units must come with valuation 0.
    pub fn from_parts(valuation: i64, unit: Zp) -> Result<Self, PadicError> {
        if unit.is_zero() {
            return Ok(Self { valuation: 0, unit });
        }
        if !unit.is_unit() {
            return Err(PadicError::NonUnitDivisor(unit.to_integer().to_string()));
        }
        Ok(Self { valuation, unit })
    }

    /// Converts a p-adic integer, extracting its unit part.
    #[must_use]
    pub fn from_zp(x: &Zp) -> Self {
        if x.is_zero() {
            return Self {
                valuation: 0,
                unit: x.clone(),
            };
        }
        Self {
            valuation: x.valuation() as i64,
            unit: x.unit_part(),
        }
    }

    /// Creates a p-adic number from an integer value at absolute
    /// precision `N`.
    ///
    /// # Panics
    ///
    /// Panics if `p < 2` or `precision < 1`.
    #[must_use]
    pub fn from_integer(prime: u64, precision: usize, value: impl Into<Integer>) -> Self {
        Self::from_zp(&Zp::new(prime, precision, value))
    }

    /// The zero element at absolute precision `N`.
    ///
    /// # Panics
    ///
    /// Panics if `p < 2` or `precision < 1`.
    #[must_use]
    pub fn zero(prime: u64, precision: usize) -> Self {
        Self {
            valuation: 0,
            unit: Zp::zero(prime, precision),
        }
    }

    /// The one element at absolute precision `N`.
    ///
    /// # Panics
    ///
    /// Panics if `p < 2` or `precision < 1`.
    #[must_use]
    pub fn one(prime: u64, precision: usize) -> Self {
        Self {
            valuation: 0,
            unit: Zp::one(prime, precision),
        }
    }

    /// Creates a p-adic number from the rational `num/den` at absolute
    /// precision `N`, handling the valuations of numerator and
    /// denominator separately.
    ///
    /// # Errors
    ///
    /// `ZeroDenominator` when `den = 0`; `InvalidPrecision` when the
    /// valuation of the value leaves no significant digit below `N`.
    pub fn from_rational(
        num: i64,
        den: i64,
        prime: u64,
        precision: usize,
    ) -> Result<Self, PadicError> {
        Self::from_ratio_parts(&Integer::new(num), &Integer::new(den), prime, precision)
    }

    /// Creates a p-adic number from an exact [`Rational`].
    ///
    /// # Errors
    ///
    /// Same as [`Qp::from_rational`].
    pub fn from_ratio(r: &Rational, prime: u64, precision: usize) -> Result<Self, PadicError> {
        Self::from_ratio_parts(&r.numerator(), &r.denominator(), prime, precision)
    }

    fn from_ratio_parts(
        num: &Integer,
        den: &Integer,
        prime: u64,
        precision: usize,
    ) -> Result<Self, PadicError> {
        if den.is_zero() {
            return Err(PadicError::ZeroDenominator);
        }
        if num.is_zero() {
            return Ok(Self::zero(prime, precision));
        }
        let (vn, un) = modular::int_valuation(num, prime);
        let (vd, ud) = modular::int_valuation(den, prime);
        let valuation = vn as i64 - vd as i64;
        let rel = precision as i64 - valuation;
        if rel < 1 {
            return Err(PadicError::InvalidPrecision(rel));
        }
        let rel = rel as usize;
        let modulus = power_of(prime, rel);
        let inv = ud
            .mod_inverse(&modulus)
            .ok_or_else(|| PadicError::NonUnitDenominator(den.to_string(), prime))?;
        Ok(Self {
            valuation,
            unit: Zp::new(prime, rel, un * inv),
        })
    }

    /// Returns the base prime.
    #[must_use]
    pub fn prime(&self) -> u64 {
        self.unit.prime()
    }

    /// Returns the p-adic valuation. For the zero value this is the
    /// absolute precision, by the same convention as [`Zp::valuation`].
    #[must_use]
    pub fn valuation(&self) -> i64 {
        if self.is_zero() {
            self.precision()
        } else {
            self.valuation
        }
    }

    /// Returns the absolute precision `N`: the value is known up to
    /// `O(p^N)`.
    #[must_use]
    pub fn precision(&self) -> i64 {
        if self.is_zero() {
            self.unit.precision() as i64
        } else {
            self.valuation + self.unit.precision() as i64
        }
    }

    /// Returns the relative precision: the number of known digits of the
    /// unit part.
    #[must_use]
    pub fn relative_precision(&self) -> usize {
        self.unit.precision()
    }

    /// Returns the unit part `u` of `p^e * u`.
    #[must_use]
    pub fn unit_part(&self) -> &Zp {
        &self.unit
    }

    /// Returns true if the value is indistinguishable from zero at its
    /// precision.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.unit.is_zero()
    }

    /// Returns true if this is exactly the residue 1 at valuation 0.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.valuation == 0 && self.unit.is_one()
    }

    /// Changes the absolute precision: truncates downward, lifts upward
    /// without adding information. Requesting a precision at or below
    /// the valuation yields zero at that precision.
    ///
    /// # Panics
    ///
    /// Panics if `new_precision < 1`.
    #[must_use]
    pub fn with_precision(&self, new_precision: i64) -> Self {
        assert!(
            new_precision >= 1,
            "precision must be >= 1, got {new_precision}"
        );
        let n = new_precision as usize;
        if self.is_zero() {
            return Self::zero(self.prime(), n);
        }
        let rel = new_precision - self.valuation;
        if rel < 1 {
            return Self::zero(self.prime(), n);
        }
        Self {
            valuation: self.valuation,
            unit: self.unit.with_precision(rel as usize),
        }
    }

    /// Computes the multiplicative inverse.
    ///
    /// # Errors
    ///
    /// `DivisionByZero` for zero; `InvalidPrecision` when the inverse
    /// has no significant digit left.
    pub fn inv(&self) -> Result<Self, PadicError> {
        if self.is_zero() {
            return Err(PadicError::DivisionByZero);
        }
        let valuation = -self.valuation;
        let rel = self.unit.precision() as i64 + valuation.min(0);
        if rel < 1 {
            return Err(PadicError::InvalidPrecision(rel));
        }
        let unit = self.unit.with_precision(rel as usize).inverse()?;
        Ok(Self { valuation, unit })
    }

    /// Raises to an integer power. Negative exponents require a
    /// non-zero value.
    ///
    /// # Errors
    ///
    /// `DivisionByZero` when a negative power of zero is requested.
    pub fn pow(&self, exp: i64) -> Result<Self, PadicError> {
        if self.is_zero() {
            if exp < 0 {
                return Err(PadicError::DivisionByZero);
            }
            return Ok(self.clone());
        }
        let base = if exp < 0 { self.inv()? } else { self.clone() };
        let k = exp.unsigned_abs();
        let unit = base.unit.pow(i64::try_from(k).expect("exponent fits i64"))?;
        Ok(Self {
            valuation: base.valuation * i64::try_from(k).expect("exponent fits i64"),
            unit,
        })
    }

    /// Divides, surfacing the error instead of panicking.
    ///
    /// # Errors
    ///
    /// `PrimeMismatch`, `DivisionByZero`, or `InvalidPrecision` when no
    /// significant digits remain.
    pub fn checked_div(&self, rhs: &Self) -> Result<Self, PadicError> {
        if self.prime() != rhs.prime() {
            return Err(PadicError::PrimeMismatch(self.prime(), rhs.prime()));
        }
        if rhs.is_zero() {
            return Err(PadicError::DivisionByZero);
        }
        if self.is_zero() {
            let n = (self.precision() - rhs.valuation).max(1) as usize;
            return Ok(Self::zero(self.prime(), n));
        }
        let valuation = self.valuation - rhs.valuation;
        let rel = (self.unit.precision().min(rhs.unit.precision()) as i64) + valuation.min(0);
        if rel < 1 {
            return Err(PadicError::InvalidPrecision(rel));
        }
        let rel = rel as usize;
        let unit = self
            .unit
            .with_precision(rel)
            .checked_div(&rhs.unit.with_precision(rel))?;
        Ok(Self { valuation, unit })
    }

    /// Converts to a p-adic integer.
    ///
    /// # Errors
    ///
    /// `NegativeValuation` when the valuation is negative.
    pub fn to_zp(&self) -> Result<Zp, PadicError> {
        if self.is_zero() {
            return Ok(Zp::zero(self.prime(), self.unit.precision()));
        }
        if self.valuation < 0 {
            return Err(PadicError::NegativeValuation(self.valuation));
        }
        let n = self.precision() as usize;
        let shift = power_of(self.prime(), self.valuation as usize);
        Ok(Zp::new(self.prime(), n, self.unit.to_integer() * &shift))
    }

    /// Returns the valuation together with the base-p digits of the
    /// unit part, least significant first.
    #[must_use]
    pub fn to_digits(&self) -> (i64, Vec<u64>) {
        (self.valuation(), self.unit.to_digits())
    }

    fn assert_same_prime(&self, other: &Self) {
        assert!(
            self.prime() == other.prime(),
            "mismatched primes: {} and {}",
            self.prime(),
            other.prime()
        );
    }

    /// Renormalizes a raw residue at `(valuation, relative precision)`
    /// into the canonical `p^e * u` form.
    fn normalized(prime: u64, abs_precision: i64, valuation: i64, residue: Integer) -> Self {
        let rel = (abs_precision - valuation) as usize;
        let residue = residue.rem_euclid(&power_of(prime, rel));
        if residue.is_zero() {
            let n = abs_precision.max(1) as usize;
            return Self::zero(prime, n);
        }
        let (v, u) = modular::int_valuation(&residue, prime);
        Self {
            valuation: valuation + v as i64,
            unit: Zp::new(prime, rel - v, u),
        }
    }
}

impl From<Zp> for Qp {
    fn from(x: Zp) -> Self {
        Self::from_zp(&x)
    }
}

impl PartialEq for Qp {
    /// Equality to the smaller of the two absolute precisions.
    fn eq(&self, other: &Self) -> bool {
        if self.prime() != other.prime() {
            return false;
        }
        (self - other).is_zero()
    }
}

impl Eq for Qp {}

impl fmt::Debug for Qp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Qp({}^{} * {} + O({}^{}))",
            self.prime(),
            self.valuation,
            self.unit.to_integer(),
            self.prime(),
            self.precision()
        )
    }
}

impl fmt::Display for Qp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "O({}^{})", self.prime(), self.precision());
        }
        if self.valuation == 0 {
            write!(
                f,
                "{} + O({}^{})",
                self.unit.to_integer(),
                self.prime(),
                self.precision()
            )
        } else {
            write!(
                f,
                "{}^{} * {} + O({}^{})",
                self.prime(),
                self.valuation,
                self.unit.to_integer(),
                self.prime(),
                self.precision()
            )
        }
    }
}

impl Add for Qp {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        &self + &rhs
    }
}

impl Add for &Qp {
    type Output = Qp;

    fn add(self, rhs: Self) -> Self::Output {
        self.assert_same_prime(rhs);
        let abs = self.precision().min(rhs.precision());
        if self.is_zero() {
            return rhs.with_precision(abs.max(1));
        }
        if rhs.is_zero() {
            return self.with_precision(abs.max(1));
        }
        let prime = self.prime();
        let e = self.valuation.min(rhs.valuation);
        let rel = abs - e;
        assert!(rel >= 1, "no significant digits remain at this precision");
        let a = self.unit.to_integer() * &power_of(prime, (self.valuation - e) as usize);
        let b = rhs.unit.to_integer() * &power_of(prime, (rhs.valuation - e) as usize);
        Qp::normalized(prime, abs, e, a + b)
    }
}

impl Sub for Qp {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        &self - &rhs
    }
}

impl Sub for &Qp {
    type Output = Qp;

    fn sub(self, rhs: Self) -> Self::Output {
        self + &(-rhs)
    }
}

impl Mul for Qp {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        &self * &rhs
    }
}

impl Mul for &Qp {
    type Output = Qp;

    fn mul(self, rhs: Self) -> Self::Output {
        self.assert_same_prime(rhs);
        if self.is_zero() || rhs.is_zero() {
            let n = self.precision().min(rhs.precision()).max(1) as usize;
            return Qp::zero(self.prime(), n);
        }
        let unit = &self.unit * &rhs.unit;
        Qp {
            valuation: self.valuation + rhs.valuation,
            unit,
        }
    }
}

impl Div for Qp {
    type Output = Self;

    /// # Panics
    ///
    /// Panics on division by zero; use [`Qp::checked_div`] to handle
    /// the error.
    fn div(self, rhs: Self) -> Self::Output {
        self.checked_div(&rhs).expect("division by zero in Qp")
    }
}

impl Div for &Qp {
    type Output = Qp;

    fn div(self, rhs: Self) -> Self::Output {
        self.checked_div(rhs).expect("division by zero in Qp")
    }
}

impl Neg for Qp {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Qp {
            valuation: self.valuation,
            unit: -self.unit,
        }
    }
}

impl Neg for &Qp {
    type Output = Qp;

    fn neg(self) -> Self::Output {
        Qp {
            valuation: self.valuation,
            unit: -&self.unit,
        }
    }
}
