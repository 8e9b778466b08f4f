//! Error types shared by all p-adic layers.

use thiserror::Error;

/// The coarse classification of a [`PadicError`].
///
/// `InvalidArgument` marks a violated precondition on the *shape* of an
/// argument; `DomainError` marks an operation the mathematics itself
/// forbids. Precision loss is not an error: every `Zp`/`Qp` carries its
/// own precision and operations publish the honest value there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A structural precondition was violated.
    InvalidArgument,
    /// The operation is undefined for the given value.
    DomainError,
}

/// Errors produced by p-adic arithmetic and the layers above it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PadicError {
    /// A modulus or base prime was smaller than 2.
    #[error("prime must be >= 2, got {0}")]
    InvalidPrime(u64),

    /// A precision bound was smaller than 1.
    #[error("precision must be >= 1, got {0}")]
    InvalidPrecision(i64),

    /// A binary operation mixed values over different primes.
    #[error("mismatched primes: {0} and {1}")]
    PrimeMismatch(u64, u64),

    /// A rational constructor received a zero denominator.
    #[error("denominator cannot be zero")]
    ZeroDenominator,

    /// A character was built from the wrong number of generator values.
    #[error("expected {expected} generator values, got {got}")]
    WrongValueCount {
        /// Number of generators of the unit group.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },

    /// A generator exponent was not reduced modulo the generator order.
    #[error("generator value {value} exceeds the generator order {order}")]
    ValueOutOfRange {
        /// The offending exponent.
        value: u64,
        /// The order of the corresponding generator.
        order: u64,
    },

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Division by an element of positive valuation inside `Zp`.
    #[error("cannot divide by the non-unit {0} in Zp")]
    NonUnitDivisor(String),

    /// The denominator of a rational is not a p-adic unit.
    #[error("denominator {0} is not a unit modulo {1}")]
    NonUnitDenominator(String, u64),

    /// No square root exists for the given value.
    #[error("no square root exists: {0}")]
    NoSquareRoot(String),

    /// The p-adic logarithm was applied outside its convergence domain.
    #[error("p-adic logarithm does not converge: {0}")]
    LogDivergence(String),

    /// The p-adic exponential was applied outside its convergence domain.
    #[error("p-adic exponential does not converge: {0}")]
    ExpDivergence(String),

    /// A value with negative valuation was converted to `Zp`.
    #[error("value has valuation {0} < 0 and is not a p-adic integer")]
    NegativeValuation(i64),

    /// A root of unity does not embed into the requested ring.
    #[error("root of unity of order {order} does not embed: {reason}")]
    NotRepresentable {
        /// Order of the root of unity.
        order: u64,
        /// Why the embedding fails.
        reason: String,
    },

    /// A cyclotomic element with non-scalar coefficients was reduced to `Qp`.
    #[error("cyclotomic element is not a scalar (coefficient of zeta^{0} is non-zero)")]
    NotScalar(usize),

    /// Catch-all for operations the layer does not support.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl PadicError {
    /// Returns the coarse kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPrime(_)
            | Self::InvalidPrecision(_)
            | Self::PrimeMismatch(..)
            | Self::ZeroDenominator
            | Self::WrongValueCount { .. }
            | Self::ValueOutOfRange { .. }
            | Self::Unsupported(_) => ErrorKind::InvalidArgument,
            Self::DivisionByZero
            | Self::NonUnitDivisor(_)
            | Self::NonUnitDenominator(..)
            | Self::NoSquareRoot(_)
            | Self::LogDivergence(_)
            | Self::ExpDivergence(_)
            | Self::NegativeValuation(_)
            | Self::NotRepresentable { .. }
            | Self::NotScalar(_) => ErrorKind::DomainError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(PadicError::InvalidPrime(1).kind(), ErrorKind::InvalidArgument);
        assert_eq!(PadicError::DivisionByZero.kind(), ErrorKind::DomainError);
        assert_eq!(
            PadicError::LogDivergence("x".into()).kind(),
            ErrorKind::DomainError
        );
    }

    #[test]
    fn test_messages_name_the_argument() {
        let e = PadicError::NonUnitDenominator("14".into(), 7);
        assert_eq!(e.to_string(), "denominator 14 is not a unit modulo 7");
    }
}
