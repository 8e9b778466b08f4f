//! # Iwasawa
//!
//! Exact arithmetic in the p-adic numbers and the special functions
//! needed to evaluate Kubota–Leopoldt L-values: Morita's Gamma
//! function, p-adic logarithms, (generalized) Bernoulli numbers and
//! Dirichlet characters with Teichmüller lifts.
//!
//! ## Layering
//!
//! - `integers`: arbitrary precision integers/rationals and modular
//!   arithmetic (Tonelli–Shanks, Hensel, Teichmüller, CRT)
//! - `padic`: `Zp`, `Qp` and `Q_p(zeta_p)` with precision as data
//! - `characters`: Dirichlet characters and their three evaluation
//!   modes
//! - `special_func`: `log_p`, `exp_p`, `Gamma_p`, Bernoulli numbers
//! - `lfunctions`: `L_p`, `L'_p(0, ·)` and the Reid–Li sums
//!
//! ## Quick Start
//!
//! ```rust
//! use iwasawa::prelude::*;
//!
//! // sqrt(2) in Z_7 at 20 digits
//! let r = Zp::new(7, 20, 2).sqrt().unwrap();
//! assert_eq!(&r * &r, Zp::new(7, 20, 2));
//!
//! // Gamma_7(5) = -24
//! let g = gamma(&Zp::new(7, 20, 5)).unwrap();
//! assert_eq!(g, Zp::new(7, 20, -24));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub use iwasawa_characters as characters;
pub use iwasawa_integers as integers;
pub use iwasawa_lfunctions as lfunctions;
pub use iwasawa_padic as padic;
pub use iwasawa_special_func as special_func;

/// Clears every process-wide memoization map: both L-value caches and
/// the Bernoulli cache.
pub fn clear_caches() {
    iwasawa_lfunctions::clear_cache();
    iwasawa_special_func::clear_bernoulli_cache();
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use iwasawa_characters::{
        enumerate_characters, enumerate_primitive_characters, DirichletCharacter,
    };
    pub use iwasawa_integers::{Integer, Rational};
    pub use iwasawa_lfunctions::{
        kubota_leopoldt, kubota_leopoldt_derivative, verify_reid_li,
    };
    pub use iwasawa_padic::{Cyclotomic, ErrorKind, PadicError, Qp, Zp};
    pub use iwasawa_special_func::{
        bernoulli, gamma, generalized_bernoulli, iwasawa_log, log_gamma, log_p,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_end_to_end_surface() {
        // one pass through every layer from the facade
        let p = 5;
        let n = 12;
        let odd = enumerate_primitive_characters(p, p)
            .into_iter()
            .find(DirichletCharacter::is_odd)
            .unwrap();
        let value = kubota_leopoldt(0, &odd, n).unwrap();
        let b1 = generalized_bernoulli(1, &odd, n).unwrap();
        assert_eq!(value, -b1.with_precision(n as i64));

        let report = verify_reid_li(&odd, n).unwrap();
        assert!(report.holds);

        super::clear_caches();
        assert_eq!(kubota_leopoldt(0, &odd, n).unwrap(), value);
    }
}
