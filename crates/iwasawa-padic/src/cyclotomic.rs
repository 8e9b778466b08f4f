//! The cyclotomic extension `Q_p(zeta_p)`.
//!
//! Elements are coefficient vectors over [`Qp`] in the power basis
//! `1, zeta, ..., zeta^{p-2}`, reduced modulo the p-th cyclotomic
//! polynomial `Phi_p(x) = 1 + x + ... + x^{p-1}`, i.e. by the relation
//! `zeta^{p-1} = -(1 + zeta + ... + zeta^{p-2})`.
//!
//! This layer exists for character values and generalized-Bernoulli
//! intermediates only; results that are mathematically rational are
//! reduced back to `Qp` with [`Cyclotomic::to_qp`].

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use crate::error::PadicError;
use crate::qp::Qp;

/// An element of `Q_p(zeta_p)` in the power basis.
#[derive(Clone)]
pub struct Cyclotomic {
    prime: u64,
    coeffs: Vec<Qp>,
}

impl Cyclotomic {
    /// Degree of the extension, `p - 1`.
    fn degree(prime: u64) -> usize {
        (prime - 1) as usize
    }

    /// The zero element with every coefficient at precision `N`.
    ///
    /// # Panics
    ///
    /// Panics if `p < 2` or `precision < 1`.
    #[must_use]
    pub fn zero(prime: u64, precision: usize) -> Self {
        let d = Self::degree(prime).max(1);
        Self {
            prime,
            coeffs: vec![Qp::zero(prime, precision); d],
        }
    }

    /// Embeds a scalar as the constant coefficient.
    #[must_use]
    pub fn from_qp(x: Qp) -> Self {
        let prime = x.prime();
        let n = x.precision().max(1) as usize;
        let mut z = Self::zero(prime, n);
        z.coeffs[0] = x;
        z
    }

    /// The one element.
    ///
    /// # Panics
    ///
    /// Panics if `p < 2` or `precision < 1`.
    #[must_use]
    pub fn one(prime: u64, precision: usize) -> Self {
        Self::from_qp(Qp::one(prime, precision))
    }

    /// The primitive p-th root of unity `zeta`.
    ///
    /// For `p = 2` the extension is trivial and `zeta = -1`.
    ///
    /// # Panics
    ///
    /// Panics if `p < 2` or `precision < 1`.
    #[must_use]
    pub fn zeta(prime: u64, precision: usize) -> Self {
        Self::zeta_pow(prime, precision, 1)
    }

    /// The power `zeta^k` with `k` reduced modulo p.
    ///
    /// # Panics
    ///
    /// Panics if `p < 2` or `precision < 1`.
    #[must_use]
    pub fn zeta_pow(prime: u64, precision: usize, k: u64) -> Self {
        let e = (k % prime) as usize;
        let d = Self::degree(prime);
        let mut z = Self::zero(prime, precision);
        if e == 0 {
            z.coeffs[0] = Qp::one(prime, precision);
        } else if e < d {
            z.coeffs[e] = Qp::one(prime, precision);
        } else {
            // zeta^{p-1} = -(1 + zeta + ... + zeta^{p-2}); for p = 2
            // this degenerates to zeta = -1 in the constant slot
            for c in &mut z.coeffs {
                *c = -Qp::one(prime, precision);
            }
        }
        z
    }

    /// Builds an element from explicit coefficients (low degree first).
    ///
    /// Missing coefficients are zero; extra ones are reduced by the
    /// `Phi_p` relation.
    ///
    /// # Errors
    ///
    /// `PrimeMismatch` when a coefficient lives over a different prime.
    pub fn from_coeffs(prime: u64, precision: usize, coeffs: Vec<Qp>) -> Result<Self, PadicError> {
        let mut z = Self::zero(prime, precision);
        for (i, c) in coeffs.into_iter().enumerate() {
            if c.prime() != prime {
                return Err(PadicError::PrimeMismatch(prime, c.prime()));
            }
            let basis = Self::zeta_pow(prime, precision, (i as u64) % prime);
            z = &z + &basis.scale(&c);
        }
        Ok(z)
    }

    /// Returns the base prime.
    #[must_use]
    pub fn prime(&self) -> u64 {
        self.prime
    }

    /// Returns the coefficients in the power basis.
    #[must_use]
    pub fn coeffs(&self) -> &[Qp] {
        &self.coeffs
    }

    /// Returns true if every coefficient is (indistinguishable from)
    /// zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(Qp::is_zero)
    }

    /// Multiplies every coefficient by a scalar.
    #[must_use]
    pub fn scale(&self, s: &Qp) -> Self {
        Self {
            prime: self.prime,
            coeffs: self.coeffs.iter().map(|c| c * s).collect(),
        }
    }

    /// Evaluates the coefficient polynomial at a `Qp` argument by
    /// Horner's scheme.
    #[must_use]
    pub fn evaluate(&self, x: &Qp) -> Qp {
        let mut acc = Qp::zero(self.prime, x.precision().max(1) as usize);
        for c in self.coeffs.iter().rev() {
            acc = &(&acc * x) + c;
        }
        acc
    }

    /// Applies the Galois automorphism `zeta -> zeta^j`.
    ///
    /// # Panics
    ///
    /// Panics if `j` is divisible by p (not an automorphism).
    #[must_use]
    pub fn galois(&self, j: u64) -> Self {
        assert!(j % self.prime != 0, "zeta -> zeta^{j} is not a Galois map");
        let d = self.coeffs.len();
        let n = self.min_precision();
        let mut out = Self::zero(self.prime, n);
        for (i, c) in self.coeffs.iter().enumerate() {
            if c.is_zero() {
                continue;
            }
            let e = ((i as u64) * j % self.prime) as usize;
            if e < d {
                out.coeffs[e] = &out.coeffs[e] + c;
            } else {
                for k in 0..d {
                    out.coeffs[k] = &out.coeffs[k] - c;
                }
            }
        }
        out
    }

    /// Computes the field trace over `Q_p`:
    /// `Tr(c_0 + c_1 zeta + ...) = (p-1) c_0 - (c_1 + ... + c_{p-2})`.
    #[must_use]
    pub fn trace(&self) -> Qp {
        let n = self.min_precision();
        let deg = Qp::from_integer(self.prime, n, self.prime as i64 - 1);
        let mut t = &self.coeffs[0] * &deg;
        for c in &self.coeffs[1..] {
            t = &t - c;
        }
        t
    }

    /// Computes the field norm over `Q_p` as the product of all Galois
    /// conjugates.
    ///
    /// # Errors
    ///
    /// `NotScalar` if rounding noise leaves a non-zero coefficient of a
    /// positive power (the exact product is always a scalar).
    pub fn norm(&self) -> Result<Qp, PadicError> {
        let mut acc = self.clone();
        for j in 2..self.prime {
            acc = &acc * &self.galois(j);
        }
        acc.to_qp()
    }

    /// Reduces to a scalar.
    ///
    /// # Errors
    ///
    /// `NotScalar` when a coefficient of a positive power of `zeta` is
    /// non-zero at its precision.
    pub fn to_qp(&self) -> Result<Qp, PadicError> {
        for (i, c) in self.coeffs.iter().enumerate().skip(1) {
            if !c.is_zero() {
                return Err(PadicError::NotScalar(i));
            }
        }
        Ok(self.coeffs[0].clone())
    }

    /// The smallest absolute precision over all coefficients, clamped
    /// to 1.
    fn min_precision(&self) -> usize {
        self.coeffs
            .iter()
            .map(Qp::precision)
            .min()
            .unwrap_or(1)
            .max(1) as usize
    }

    /// The largest absolute precision over all coefficients, clamped
    /// to 1 (used to seed accumulators so they never clip an operand).
    fn max_precision(&self) -> usize {
        self.coeffs
            .iter()
            .map(Qp::precision)
            .max()
            .unwrap_or(1)
            .max(1) as usize
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

impl PartialEq for Cyclotomic {
    fn eq(&self, other: &Self) -> bool {
        self.prime == other.prime
            && self
                .coeffs
                .iter()
                .zip(other.coeffs.iter())
                .all(|(a, b)| a == b)
    }
}

impl Eq for Cyclotomic {}

impl fmt::Debug for Cyclotomic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cyclotomic(p = {}, {:?})", self.prime, self.coeffs)
    }
}

impl fmt::Display for Cyclotomic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;
        for (i, c) in self.coeffs.iter().enumerate() {
            if c.is_zero() {
                continue;
            }
            if wrote {
                write!(f, " + ")?;
            }
            match i {
                0 => write!(f, "({c})")?,
                1 => write!(f, "({c})*z")?,
                _ => write!(f, "({c})*z^{i}")?,
            }
            wrote = true;
        }
        if !wrote {
            write!(f, "0")?;
        }
        Ok(())
    }
}

impl Add for &Cyclotomic {
    type Output = Cyclotomic;

    fn add(self, rhs: Self) -> Self::Output {
        self.assert_same_prime(rhs);
        Cyclotomic {
            prime: self.prime,
            coeffs: self
                .coeffs
                .iter()
                .zip(rhs.coeffs.iter())
                .map(|(a, b)| a + b)
                .collect(),
        }
    }
}

impl Add for Cyclotomic {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        &self + &rhs
    }
}

impl Sub for &Cyclotomic {
    type Output = Cyclotomic;

    fn sub(self, rhs: Self) -> Self::Output {
        self + &(-rhs)
    }
}

impl Sub for Cyclotomic {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        &self - &rhs
    }
}

impl Neg for &Cyclotomic {
    type Output = Cyclotomic;

    fn neg(self) -> Self::Output {
        Cyclotomic {
            prime: self.prime,
            coeffs: self.coeffs.iter().map(|c| -c).collect(),
        }
    }
}

impl Neg for Cyclotomic {
    type Output = Self;

    fn neg(self) -> Self::Output {
        -&self
    }
}

impl Mul for &Cyclotomic {
    type Output = Cyclotomic;

    fn mul(self, rhs: Self) -> Self::Output {
        self.assert_same_prime(rhs);
        let prime = self.prime;
        let d = self.coeffs.len();
        let n = self.max_precision().max(rhs.max_precision());

        // Schoolbook product, then reduce degree by degree from the top
        // using zeta^{p-1} = -(1 + ... + zeta^{p-2}).
        let mut raw = vec![Qp::zero(prime, n); 2 * d - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in rhs.coeffs.iter().enumerate() {
                if b.is_zero() {
                    continue;
                }
                raw[i + j] = &raw[i + j] + &(a * b);
            }
        }
        for deg in (d..2 * d - 1).rev() {
            let c = raw[deg].clone();
            if c.is_zero() {
                continue;
            }
            raw[deg] = Qp::zero(prime, n);
            for k in 0..d {
                raw[deg - d + k] = &raw[deg - d + k] - &c;
            }
        }
        raw.truncate(d);
        Cyclotomic { prime, coeffs: raw }
    }
}

impl Mul for Cyclotomic {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        &self * &rhs
    }
}
