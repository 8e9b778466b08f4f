//! # iwasawa-lfunctions
//!
//! The Kubota–Leopoldt p-adic L-function `L_p(s, chi)` at integer
//! points, its derivative at zero, and the Reid–Li sums that tie the
//! whole stack together.
//!
//! Values are memoized in two process-wide caches (values and
//! derivatives), both cleared by [`clear_cache`]. Caching is pure
//! memoization behind locks: the observable results are deterministic
//! whether or not a computation hits the cache.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod kubota_leopoldt;
pub mod reid_li;

pub use kubota_leopoldt::{
    clear_cache, euler_factor, kubota_leopoldt, kubota_leopoldt_derivative,
};
pub use reid_li::{compute_phi_even, compute_phi_odd, verify_reid_li, ReidLiReport};
