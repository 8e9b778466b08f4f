//! # iwasawa-characters
//!
//! Dirichlet characters mod n, presented on generators of `(Z/nZ)*` and
//! evaluated three ways: as exact roots of unity, as Teichmüller lifts
//! in `Z_p`, and as elements of `Q_p(zeta_p)`.
//!
//! Primitivity, conductors, parity, character order, enumeration and
//! Gauss sums live here; everything an L-function needs to know about a
//! character and nothing about L-functions themselves.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod dirichlet;
pub mod unit_group;

pub use dirichlet::{
    enumerate_characters, enumerate_primitive_characters, DirichletCharacter, RootOfUnity,
};
pub use unit_group::UnitGroup;
