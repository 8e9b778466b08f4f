//! # iwasawa-padic
//!
//! Exact p-adic arithmetic with explicit precision tracking.
//!
//! This crate provides:
//! - `Zp`: the ring of p-adic integers modulo `p^N`
//! - `Qp`: the field of p-adic numbers as `p^e * u` with explicit
//!   valuation
//! - `Cyclotomic`: the extension `Q_p(zeta_p)` in the power basis
//! - `PadicError`: the error type shared by every layer above
//!
//! Precision is first-class data. Every value carries the absolute
//! precision it is known to, operations publish the honest precision of
//! their result, and equality compares only the digits both sides know.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cyclotomic;
pub mod error;
pub mod qp;
pub mod zp;

#[cfg(test)]
mod proptests;

pub use cyclotomic::Cyclotomic;
pub use error::{ErrorKind, PadicError};
pub use qp::Qp;
pub use zp::Zp;
