//! Arbitrary precision integers.
//!
//! This module provides a wrapper around `dashu::IBig` with the
//! operations the p-adic layers build on: ring arithmetic, gcd/lcm,
//! modular exponentiation and inversion, factorials and binomials.

use dashu::base::{Abs, BitTest, Gcd, Signed as DashuSigned};
use dashu::integer::IBig;
use num_traits::{One, Zero};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

/// An arbitrary precision signed integer.
///
/// This type wraps `dashu::IBig` and provides the operations needed for
/// exact arithmetic modulo prime powers.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Integer(IBig);

impl Integer {
    /// Creates a new integer from an i64.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(IBig::from(value))
    }

    /// Creates an integer from a string in the given base.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid integer.
    pub fn from_str_radix(s: &str, radix: u32) -> Result<Self, dashu::base::error::ParseError> {
        IBig::from_str_radix(s, radix).map(Self)
    }

    /// Returns the absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.clone().abs())
    }

    /// Returns true if this integer is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        DashuSigned::is_negative(&self.0)
    }

    /// Computes the greatest common divisor.
    #[must_use]
    pub fn gcd(&self, other: &Self) -> Self {
        Self(IBig::from(self.0.clone().gcd(other.0.clone())))
    }

    /// Computes the least common multiple.
    #[must_use]
    pub fn lcm(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let g = self.gcd(other);
        Self(&self.0 / &g.0 * &other.0).abs()
    }

    /// Returns true if `divisor` divides this integer exactly.
    ///
    /// # Panics
    ///
    /// Panics if `divisor` is zero.
    #[must_use]
    pub fn is_divisible_by(&self, divisor: &Self) -> bool {
        assert!(!divisor.is_zero(), "divisor cannot be zero");
        (&self.0 % &divisor.0) == IBig::ZERO
    }

    /// Returns the least non-negative residue of this integer modulo `modulus`.
    ///
    /// # Panics
    ///
    /// Panics if `modulus` is not positive.
    #[must_use]
    pub fn rem_euclid(&self, modulus: &Self) -> Self {
        assert!(
            !modulus.is_zero() && !modulus.is_negative(),
            "modulus must be positive"
        );
        let r = &self.0 % &modulus.0;
        if DashuSigned::is_negative(&r) {
            Self(r + &modulus.0)
        } else {
            Self(r)
        }
    }

    /// Computes self^exp for non-negative exp.
    #[must_use]
    pub fn pow(&self, exp: u32) -> Self {
        Self(self.0.pow(exp as usize))
    }

    /// Computes self^exp modulo `modulus` by binary exponentiation.
    ///
    /// # Panics
    ///
    /// Panics if `exp` is negative or `modulus` is not positive.
    #[must_use]
    pub fn pow_mod(&self, exp: &Self, modulus: &Self) -> Self {
        assert!(!exp.is_negative(), "exponent must be non-negative");
        let mut result = Self::one().rem_euclid(modulus);
        let mut base = self.rem_euclid(modulus);
        let bits = exp.0.bit_len();
        for i in 0..bits {
            if exp.0.bit(i) {
                result = Self(&result.0 * &base.0).rem_euclid(modulus);
            }
            if i + 1 < bits {
                base = Self(&base.0 * &base.0).rem_euclid(modulus);
            }
        }
        result
    }

    /// Computes the inverse of this integer modulo `modulus` by the
    /// extended Euclidean algorithm.
    ///
    /// Returns the unique `x` with `0 <= x < modulus` and
    /// `self * x = 1 (mod modulus)`, or `None` when
    /// `gcd(self, modulus) != 1`.
    #[must_use]
    pub fn mod_inverse(&self, modulus: &Self) -> Option<Self> {
        if modulus.is_zero() || modulus.is_negative() {
            return None;
        }
        let mut r0 = modulus.0.clone();
        let mut r1 = self.rem_euclid(modulus).0;
        let mut t0 = IBig::ZERO;
        let mut t1 = IBig::ONE;
        while r1 != IBig::ZERO {
            let q = &r0 / &r1;
            let r2 = &r0 - &q * &r1;
            r0 = std::mem::replace(&mut r1, r2);
            let t2 = &t0 - &q * &t1;
            t0 = std::mem::replace(&mut t1, t2);
        }
        if r0 != IBig::ONE {
            return None;
        }
        Some(Self(t0).rem_euclid(modulus))
    }

    /// Computes n! as an exact integer.
    #[must_use]
    pub fn factorial(n: u64) -> Self {
        let mut result = IBig::ONE;
        for k in 2..=n {
            result *= IBig::from(k);
        }
        Self(result)
    }

    /// Computes the binomial coefficient C(n, k) exactly.
    #[must_use]
    pub fn binomial(n: u64, k: u64) -> Self {
        if k > n {
            return Self::zero();
        }
        let k = k.min(n - k);
        let mut num = IBig::ONE;
        let mut den = IBig::ONE;
        for i in 0..k {
            num *= IBig::from(n - i);
            den *= IBig::from(i + 1);
        }
        Self(num / den)
    }

    /// Returns the inner `dashu::IBig`.
    #[must_use]
    pub fn into_inner(self) -> IBig {
        self.0
    }

    /// Returns a reference to the inner `dashu::IBig`.
    #[must_use]
    pub fn as_inner(&self) -> &IBig {
        &self.0
    }

    /// Attempts to convert to an i64.
    ///
    /// Returns `None` if the value doesn't fit in an i64.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        self.0.clone().try_into().ok()
    }

    /// Attempts to convert to a u64.
    ///
    /// Returns `None` if the value is negative or doesn't fit in a u64.
    #[must_use]
    pub fn to_u64(&self) -> Option<u64> {
        self.0.clone().try_into().ok()
    }
}

impl Zero for Integer {
    fn zero() -> Self {
        Self(IBig::ZERO)
    }

    fn is_zero(&self) -> bool {
        self.0 == IBig::ZERO
    }
}

impl One for Integer {
    fn one() -> Self {
        Self(IBig::ONE)
    }

    fn is_one(&self) -> bool {
        self.0 == IBig::ONE
    }
}

impl fmt::Debug for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Integer({})", self.0)
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Arithmetic operations
impl Add for Integer {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Add<&Integer> for Integer {
    type Output = Self;

    fn add(self, rhs: &Integer) -> Self::Output {
        Self(self.0 + &rhs.0)
    }
}

impl Add for &Integer {
    type Output = Integer;

    fn add(self, rhs: Self) -> Self::Output {
        Integer(&self.0 + &rhs.0)
    }
}

impl Sub for Integer {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sub<&Integer> for Integer {
    type Output = Self;

    fn sub(self, rhs: &Integer) -> Self::Output {
        Self(self.0 - &rhs.0)
    }
}

impl Sub for &Integer {
    type Output = Integer;

    fn sub(self, rhs: Self) -> Self::Output {
        Integer(&self.0 - &rhs.0)
    }
}

impl Mul for Integer {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl Mul<&Integer> for Integer {
    type Output = Self;

    fn mul(self, rhs: &Integer) -> Self::Output {
        Self(self.0 * &rhs.0)
    }
}

impl Mul for &Integer {
    type Output = Integer;

    fn mul(self, rhs: Self) -> Self::Output {
        Integer(&self.0 * &rhs.0)
    }
}

impl Div for Integer {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Self(self.0 / rhs.0)
    }
}

impl Div<&Integer> for Integer {
    type Output = Self;

    fn div(self, rhs: &Integer) -> Self::Output {
        Self(self.0 / &rhs.0)
    }
}

impl Div for &Integer {
    type Output = Integer;

    fn div(self, rhs: Self) -> Self::Output {
        Integer(&self.0 / &rhs.0)
    }
}

impl Rem for Integer {
    type Output = Self;

    fn rem(self, rhs: Self) -> Self::Output {
        Self(self.0 % rhs.0)
    }
}

impl Rem for &Integer {
    type Output = Integer;

    fn rem(self, rhs: Self) -> Self::Output {
        Integer(&self.0 % &rhs.0)
    }
}

impl Neg for Integer {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Neg for &Integer {
    type Output = Integer;

    fn neg(self) -> Self::Output {
        Integer(-&self.0)
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<i32> for Integer {
    fn from(value: i32) -> Self {
        Self::new(value as i64)
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Self(IBig::from(value))
    }
}

impl From<IBig> for Integer {
    fn from(value: IBig) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_ops() {
        let a = Integer::new(10);
        let b = Integer::new(3);

        assert_eq!((a.clone() + b.clone()).to_i64(), Some(13));
        assert_eq!((a.clone() - b.clone()).to_i64(), Some(7));
        assert_eq!((a.clone() * b.clone()).to_i64(), Some(30));
        assert_eq!((a.clone() / b.clone()).to_i64(), Some(3));
        assert_eq!((a % b).to_i64(), Some(1));
    }

    #[test]
    fn test_rem_euclid() {
        let m = Integer::new(7);
        assert_eq!(Integer::new(-3).rem_euclid(&m).to_i64(), Some(4));
        assert_eq!(Integer::new(10).rem_euclid(&m).to_i64(), Some(3));
        assert_eq!(Integer::new(-7).rem_euclid(&m).to_i64(), Some(0));
    }

    #[test]
    fn test_pow_mod() {
        let base = Integer::new(3);
        let exp = Integer::new(100);
        let m = Integer::new(7);
        // 3^6 = 1 (mod 7), 100 = 6*16 + 4, so 3^100 = 3^4 = 81 = 4 (mod 7)
        assert_eq!(base.pow_mod(&exp, &m).to_i64(), Some(4));
        assert_eq!(base.pow_mod(&Integer::zero(), &m).to_i64(), Some(1));
    }

    #[test]
    fn test_mod_inverse() {
        let a = Integer::new(3);
        let m = Integer::new(7);
        assert_eq!(a.mod_inverse(&m).and_then(|x| x.to_i64()), Some(5));

        // 6 and 9 are not coprime
        assert!(Integer::new(6).mod_inverse(&Integer::new(9)).is_none());
        // Negative values are reduced first: -4 = 3 (mod 7)
        assert_eq!(
            Integer::new(-4).mod_inverse(&m).and_then(|x| x.to_i64()),
            Some(5)
        );
    }

    #[test]
    fn test_factorial_binomial() {
        assert_eq!(Integer::factorial(0).to_i64(), Some(1));
        assert_eq!(Integer::factorial(6).to_i64(), Some(720));
        assert_eq!(Integer::binomial(10, 3).to_i64(), Some(120));
        assert_eq!(Integer::binomial(5, 0).to_i64(), Some(1));
        assert_eq!(Integer::binomial(3, 5).to_i64(), Some(0));
    }

    #[test]
    fn test_gcd() {
        let a = Integer::new(48);
        let b = Integer::new(18);
        assert_eq!(a.gcd(&b).to_i64(), Some(6));
        assert_eq!(a.lcm(&b).to_i64(), Some(144));
    }

    #[test]
    fn test_large_numbers() {
        let a = Integer::from_str_radix("123456789012345678901234567890", 10).unwrap();
        let b = Integer::from_str_radix("987654321098765432109876543210", 10).unwrap();
        let sum = a + b;
        assert_eq!(sum.to_string(), "1111111110111111111011111111100");
    }
}
