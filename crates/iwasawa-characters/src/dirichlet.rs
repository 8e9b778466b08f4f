//! Dirichlet characters targeted at p-adic computation.
//!
//! A character mod n is stored as its exponent vector on the generators
//! of `(Z/nZ)*`: `chi(g_i) = zeta_{o_i}^{v_i}`. Three evaluation modes
//! are exposed and deliberately kept apart:
//!
//! - [`DirichletCharacter::evaluate`] returns the exact root of unity
//!   as an exponent/order pair;
//! - [`DirichletCharacter::evaluate_zp`] lifts it into `Z_p` through the
//!   Teichmüller character (possible when the order divides `p - 1`);
//! - [`DirichletCharacter::evaluate_cyclotomic`] embeds it into
//!   `Q_p(zeta_p)` (additionally covering orders divisible by p once).
//!
//! The Teichmüller embedding fixes `zeta_L = omega(rho)^{(p-1)/L}` where
//! `rho` is the least primitive root mod p, so conjugate choices are
//! deterministic across runs.

use std::sync::Arc;

use iwasawa_integers::{modular, Integer};
use iwasawa_padic::{Cyclotomic, PadicError, Qp, Zp};

use crate::unit_group::UnitGroup;

/// An exact root of unity `e^{2 pi i * exponent / order}` in lowest
/// terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RootOfUnity {
    /// Numerator of the angle, reduced mod `order`.
    pub exponent: u64,
    /// Order of the root (1 for the value 1).
    pub order: u64,
}

impl RootOfUnity {
    fn new(exponent: u64, order: u64) -> Self {
        let e = exponent % order;
        let g = gcd(e, order);
        if e == 0 {
            Self {
                exponent: 0,
                order: 1,
            }
        } else {
            Self {
                exponent: e / g,
                order: order / g,
            }
        }
    }

    /// Returns true for the value 1.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.order == 1
    }

    /// Returns true for the value -1.
    #[must_use]
    pub fn is_minus_one(&self) -> bool {
        self.order == 2
    }
}

/// A Dirichlet character modulo n, evaluated p-adically.
#[derive(Clone, Debug)]
pub struct DirichletCharacter {
    modulus: u64,
    prime: u64,
    group: Arc<UnitGroup>,
    values: Vec<u64>,
    conductor: u64,
}

impl DirichletCharacter {
    /// Builds a character from its exponent vector on the generators of
    /// `(Z/nZ)*`.
    ///
    /// # Errors
    ///
    /// `InvalidPrime` for `p < 2`, `WrongValueCount` when the vector
    /// length differs from the number of generators, `ValueOutOfRange`
    /// when some `v_i >= o_i`.
    pub fn from_values(
        modulus: u64,
        prime: u64,
        values: Vec<u64>,
    ) -> Result<Self, PadicError> {
        if prime < 2 {
            return Err(PadicError::InvalidPrime(prime));
        }
        let group = Arc::new(UnitGroup::new(modulus));
        Self::with_group(group, prime, values)
    }

    fn with_group(
        group: Arc<UnitGroup>,
        prime: u64,
        values: Vec<u64>,
    ) -> Result<Self, PadicError> {
        if values.len() != group.num_generators() {
            return Err(PadicError::WrongValueCount {
                expected: group.num_generators(),
                got: values.len(),
            });
        }
        for (&v, &o) in values.iter().zip(group.orders()) {
            if v >= o {
                return Err(PadicError::ValueOutOfRange { value: v, order: o });
            }
        }
        let mut chi = Self {
            modulus: group.modulus(),
            prime,
            group,
            values,
            conductor: 0,
        };
        chi.conductor = chi.compute_conductor();
        Ok(chi)
    }

    /// The principal character mod n.
    ///
    /// # Panics
    ///
    /// Panics if `p < 2` (the values vector is always valid).
    #[must_use]
    pub fn principal(modulus: u64, prime: u64) -> Self {
        let group = Arc::new(UnitGroup::new(modulus));
        let values = vec![0; group.num_generators()];
        Self::with_group(group, prime, values).expect("principal character is well-formed")
    }

    /// The quadratic (Legendre symbol) character modulo an odd prime
    /// `q`.
    ///
    /// # Panics
    ///
    /// Panics if `q` is not an odd prime.
    #[must_use]
    pub fn legendre(q: u64, prime: u64) -> Self {
        assert!(q >= 3 && q % 2 == 1, "Legendre character needs an odd prime modulus");
        let group = Arc::new(UnitGroup::new(q));
        assert!(
            group.num_generators() == 1 && group.orders()[0] == q - 1,
            "modulus {q} is not prime"
        );
        let values = vec![(q - 1) / 2];
        Self::with_group(group, prime, values).expect("Legendre character is well-formed")
    }

    /// Returns the modulus n.
    #[must_use]
    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Returns the p-adic target prime.
    #[must_use]
    pub fn prime(&self) -> u64 {
        self.prime
    }

    /// Returns the conductor: the smallest modulus the character
    /// factors through.
    #[must_use]
    pub fn conductor(&self) -> u64 {
        self.conductor
    }

    /// Returns the exponent vector on the generators.
    #[must_use]
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Returns the underlying unit-group presentation.
    #[must_use]
    pub fn group(&self) -> &UnitGroup {
        &self.group
    }

    /// A stable cache key: the modulus together with the exponent
    /// vector.
    #[must_use]
    pub fn fingerprint(&self) -> (u64, Vec<u64>) {
        (self.modulus, self.values.clone())
    }

    /// Evaluates the character exactly as a root of unity.
    ///
    /// Returns `None` when `gcd(a, n) > 1` (the character value 0).
    #[must_use]
    pub fn evaluate(&self, a: i64) -> Option<RootOfUnity> {
        let r = canonical_residue(a, self.modulus);
        if self.modulus == 1 {
            return Some(RootOfUnity::new(0, 1));
        }
        let exps = self.group.express(r)?;
        let orders = self.group.orders();
        let l = orders.iter().fold(1u64, |acc, &o| lcm(acc, o));
        let mut t = 0u64;
        for ((&v, &e), &o) in self.values.iter().zip(&exps).zip(orders) {
            t = (t + v * e % l * (l / o)) % l;
        }
        Some(RootOfUnity::new(t, l))
    }

    /// Evaluates into `Z_p` through the Teichmüller lift.
    ///
    /// The root-of-unity order must divide `p - 1` (or be 2, which
    /// embeds as -1 for every p). Returns the zero of `Z_p` when
    /// `gcd(a, n) > 1`.
    ///
    /// # Errors
    ///
    /// `NotRepresentable` when no such root of unity exists in `Z_p`.
    pub fn evaluate_zp(&self, a: i64, precision: usize) -> Result<Zp, PadicError> {
        let Some(root) = self.evaluate(a) else {
            return Ok(Zp::zero(self.prime, precision));
        };
        self.embed_zp(root, precision)
    }

    fn embed_zp(&self, root: RootOfUnity, precision: usize) -> Result<Zp, PadicError> {
        if root.is_one() {
            return Ok(Zp::one(self.prime, precision));
        }
        if root.order == 2 {
            return Ok(-Zp::one(self.prime, precision));
        }
        if self.prime < 3 || (self.prime - 1) % root.order != 0 {
            return Err(PadicError::NotRepresentable {
                order: root.order,
                reason: format!("order does not divide p - 1 = {}", self.prime - 1),
            });
        }
        let rho = modular::primitive_root(self.prime);
        let omega = Zp::new(self.prime, precision, Integer::from(rho)).teichmuller();
        let exp = (self.prime - 1) / root.order * root.exponent;
        omega.pow(i64::try_from(exp).expect("exponent fits i64"))
    }

    /// Evaluates into `Q_p(zeta_p)`.
    ///
    /// Values of order dividing `p - 1` embed as scalars; orders
    /// divisible by p exactly once additionally use a power of
    /// `zeta_p`. Returns the zero element when `gcd(a, n) > 1`.
    ///
    /// # Errors
    ///
    /// `NotRepresentable` when the order divides neither `p - 1` nor
    /// `p (p - 1)`.
    pub fn evaluate_cyclotomic(
        &self,
        a: i64,
        precision: usize,
    ) -> Result<Cyclotomic, PadicError> {
        let Some(root) = self.evaluate(a) else {
            return Ok(Cyclotomic::zero(self.prime, precision));
        };
        if root.order <= 2 || (self.prime >= 3 && (self.prime - 1) % root.order == 0) {
            let scalar = self.embed_zp(root, precision)?;
            return Ok(Cyclotomic::from_qp(Qp::from_zp(&scalar)));
        }
        if root.order % self.prime == 0 && (self.prime - 1) % (root.order / self.prime) == 0 {
            // zeta_L = zeta_p * zeta_M with L = p * M and M | p - 1
            let m = root.order / self.prime;
            let tame = self.embed_zp(RootOfUnity::new(root.exponent % m, m), precision)?;
            let wild = Cyclotomic::zeta_pow(self.prime, precision, root.exponent % self.prime);
            return Ok(wild.scale(&Qp::from_zp(&tame)));
        }
        Err(PadicError::NotRepresentable {
            order: root.order,
            reason: format!("order divides neither p - 1 nor p(p - 1) for p = {}", self.prime),
        })
    }

    /// Returns true when `chi(-1) = 1`.
    #[must_use]
    pub fn is_even(&self) -> bool {
        self.evaluate(-1).is_some_and(|r| r.is_one())
    }

    /// Returns true when `chi(-1) = -1`.
    #[must_use]
    pub fn is_odd(&self) -> bool {
        self.evaluate(-1).is_some_and(|r| r.is_minus_one())
    }

    /// Returns true for the principal character (1 on every unit).
    #[must_use]
    pub fn is_principal(&self) -> bool {
        self.values.iter().all(|&v| v == 0)
    }

    /// Returns true when the conductor equals the modulus.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.conductor == self.modulus
    }

    /// The order of the character in the dual group: the lcm over
    /// components of the order of `v_i` in `Z/o_i Z`.
    #[must_use]
    pub fn order(&self) -> u64 {
        self.values
            .iter()
            .zip(self.group.orders())
            .fold(1u64, |acc, (&v, &o)| {
                if v == 0 {
                    acc
                } else {
                    lcm(acc, o / gcd(v, o))
                }
            })
    }

    /// The smallest divisor d of n such that the character is trivial
    /// on every unit congruent to 1 mod d.
    fn compute_conductor(&self) -> u64 {
        let n = self.modulus;
        let mut divisors: Vec<u64> = (1..=n).filter(|d| n % d == 0).collect();
        divisors.sort_unstable();
        'next_divisor: for d in divisors {
            for a in 1..=n {
                if a % d == 1 % d && gcd(a, n) == 1 {
                    if let Some(r) = self.evaluate(i64::try_from(a).expect("modulus fits i64")) {
                        if !r.is_one() {
                            continue 'next_divisor;
                        }
                    }
                }
            }
            return d;
        }
        n
    }

    /// The Gauss sum `tau(chi) = sum_a chi(a) zeta_p^a` for a character
    /// whose modulus is the target prime itself.
    ///
    /// # Errors
    ///
    /// `Unsupported` when the modulus differs from p (other conductors
    /// would need roots of unity this extension does not contain);
    /// `NotRepresentable` propagated from the character embedding.
    pub fn gauss_sum(&self, precision: usize) -> Result<Cyclotomic, PadicError> {
        if self.modulus != self.prime {
            return Err(PadicError::Unsupported(format!(
                "gauss sum needs modulus {} equal to the prime {}",
                self.modulus, self.prime
            )));
        }
        let mut sum = Cyclotomic::zero(self.prime, precision);
        for a in 1..self.modulus {
            let chi_a = self.evaluate_zp(i64::try_from(a).expect("modulus fits i64"), precision)?;
            if chi_a.is_zero() {
                continue;
            }
            let term = Cyclotomic::zeta_pow(self.prime, precision, a).scale(&Qp::from_zp(&chi_a));
            sum = &sum + &term;
        }
        Ok(sum)
    }
}

/// Enumerates every Dirichlet character mod n by iterating the exponent
/// vectors over the product of the generator orders.
#[must_use]
pub fn enumerate_characters(modulus: u64, prime: u64) -> Vec<DirichletCharacter> {
    let group = Arc::new(UnitGroup::new(modulus));
    let orders = group.orders().to_vec();
    let mut characters = Vec::new();
    let mut values = vec![0u64; orders.len()];
    loop {
        characters.push(
            DirichletCharacter::with_group(Arc::clone(&group), prime, values.clone())
                .expect("odometer values are in range"),
        );
        // odometer over prod Z/o_i Z
        let mut i = 0;
        loop {
            if i == values.len() {
                return characters;
            }
            values[i] += 1;
            if values[i] < orders[i] {
                break;
            }
            values[i] = 0;
            i += 1;
        }
    }
}

/// Enumerates the primitive characters mod n.
#[must_use]
pub fn enumerate_primitive_characters(modulus: u64, prime: u64) -> Vec<DirichletCharacter> {
    enumerate_characters(modulus, prime)
        .into_iter()
        .filter(DirichletCharacter::is_primitive)
        .collect()
}

fn canonical_residue(a: i64, modulus: u64) -> u64 {
    let m = i64::try_from(modulus).expect("modulus fits i64");
    if m == 0 {
        return 0;
    }
    u64::try_from(a.rem_euclid(m)).expect("canonical residue is non-negative")
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

fn lcm(a: u64, b: u64) -> u64 {
    if a == 0 || b == 0 {
        0
    } else {
        a / gcd(a, b) * b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_counts() {
        // (Z/5Z)* has 4 characters, 3 of them primitive
        let all = enumerate_characters(5, 5);
        assert_eq!(all.len(), 4);
        let primitive = enumerate_primitive_characters(5, 5);
        assert_eq!(primitive.len(), 3);
        // (Z/7Z)*: 6 characters, 5 primitive, 2 even primitive, 3 odd
        let primitive = enumerate_primitive_characters(7, 7);
        assert_eq!(primitive.len(), 5);
        assert_eq!(primitive.iter().filter(|c| c.is_even()).count(), 2);
        assert_eq!(primitive.iter().filter(|c| c.is_odd()).count(), 3);
    }

    #[test]
    fn test_principal_character() {
        let chi = DirichletCharacter::principal(7, 7);
        assert!(chi.is_principal());
        assert!(chi.is_even());
        assert_eq!(chi.conductor(), 1);
        assert!(!chi.is_primitive());
        assert_eq!(chi.order(), 1);
        for a in 1..7 {
            assert!(chi.evaluate(a).unwrap().is_one());
        }
    }

    #[test]
    fn test_character_is_multiplicative() {
        let chars = enumerate_characters(7, 7);
        for chi in &chars {
            for a in 1..7i64 {
                for b in 1..7i64 {
                    let ra = chi.evaluate(a).unwrap();
                    let rb = chi.evaluate(b).unwrap();
                    let rab = chi.evaluate(a * b).unwrap();
                    let l = lcm(ra.order, rb.order);
                    let sum = (ra.exponent * (l / ra.order) + rb.exponent * (l / rb.order)) % l;
                    assert_eq!(rab, RootOfUnity::new(sum, l));
                }
            }
        }
    }

    #[test]
    fn test_evaluate_at_non_unit_is_zero() {
        let chi = DirichletCharacter::legendre(7, 7);
        assert!(chi.evaluate(14).is_none());
        assert!(chi.evaluate_zp(14, 10).unwrap().is_zero());
        assert!(chi.evaluate_cyclotomic(14, 10).unwrap().is_zero());
    }

    #[test]
    fn test_legendre_matches_legendre_symbol() {
        let chi = DirichletCharacter::legendre(7, 7);
        assert!(chi.is_odd()); // (-1|7) = -1 since 7 = 3 (mod 4)
        assert_eq!(chi.order(), 2);
        for a in 1..7i64 {
            let expected = modular::legendre_symbol(&Integer::new(a), 7);
            let got = chi.evaluate(a).unwrap();
            if expected == 1 {
                assert!(got.is_one());
            } else {
                assert!(got.is_minus_one());
            }
        }
    }

    #[test]
    fn test_teichmuller_evaluation() {
        // For prime modulus p the characters are chi_v(a) = omega(a)^v
        let p = 5u64;
        let n = 12usize;
        let chars = enumerate_characters(p, p);
        for chi in &chars {
            let v = chi.values()[0];
            for a in 1..5i64 {
                let expected = Zp::new(p, n, a)
                    .teichmuller()
                    .pow(i64::try_from(v).unwrap())
                    .unwrap();
                assert_eq!(chi.evaluate_zp(a, n).unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_conductor_of_induced_character() {
        // The character mod 6 with chi(5) = -1 is induced from mod 3
        let chi = DirichletCharacter::from_values(6, 5, vec![1]).unwrap();
        assert_eq!(chi.conductor(), 3);
        assert!(!chi.is_primitive());
    }

    #[test]
    fn test_value_validation() {
        assert!(matches!(
            DirichletCharacter::from_values(7, 7, vec![1, 2]).unwrap_err(),
            PadicError::WrongValueCount { expected: 1, got: 2 }
        ));
        assert!(matches!(
            DirichletCharacter::from_values(7, 7, vec![6]).unwrap_err(),
            PadicError::ValueOutOfRange { value: 6, order: 6 }
        ));
    }

    #[test]
    fn test_order_divides_group_order() {
        for n in [5u64, 7, 8, 12, 15] {
            let phi = modular::euler_phi(n);
            for chi in enumerate_characters(n, 7) {
                assert_eq!(phi % chi.order(), 0, "order must divide phi({n})");
            }
        }
    }

    #[test]
    fn test_gauss_sum_square() {
        // tau(chi)^2 = chi(-1) p for the quadratic character mod p
        let p = 7u64;
        let n = 12usize;
        let chi = DirichletCharacter::legendre(p, p);
        let tau = chi.gauss_sum(n).unwrap();
        let square = (&tau * &tau).to_qp().unwrap();
        // chi(-1) = -1, so tau^2 = -7
        assert_eq!(square, Qp::from_integer(p, n, -7));
    }

    #[test]
    fn test_parity_partition() {
        // Every character is even or odd, never both
        for chi in enumerate_characters(5, 5) {
            assert_ne!(chi.is_even(), chi.is_odd());
        }
    }
}
