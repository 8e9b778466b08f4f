//! The structure of the unit group `(Z/nZ)*`.
//!
//! Generators are assembled through CRT: one primitive root per odd
//! prime power component, and the pair `(-1, 5)` for `2^k` with
//! `k >= 3`. Each raw component generator is lifted to an element of
//! `(Z/nZ)*` that is 1 on every other component, so the group is the
//! direct product of the cyclic subgroups the lifted generators span.
//!
//! Discrete logarithms are found by direct search over each component.
//! That is adequate for the target moduli (primes up to a few hundred);
//! composite moduli with large components would need Pohlig-Hellman
//! instead.

use iwasawa_integers::{modular, Integer};

/// One prime-power component of `(Z/nZ)*`.
#[derive(Clone, Debug)]
struct Component {
    prime_power: u64,
    /// Raw generators modulo `prime_power`.
    gens: Vec<u64>,
    /// Orders of the raw generators.
    orders: Vec<u64>,
}

/// The unit group `(Z/nZ)*` presented by an ordered list of independent
/// generators.
#[derive(Clone, Debug)]
pub struct UnitGroup {
    modulus: u64,
    components: Vec<Component>,
    /// CRT-lifted generators, flattened across components.
    generators: Vec<u64>,
    /// Orders of the lifted generators, in the same order.
    orders: Vec<u64>,
}

fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((u128::from(a) * u128::from(b)) % u128::from(m)) as u64
}

fn pow_mod(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut result = 1 % m;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    result
}

impl UnitGroup {
    /// Computes the generator presentation of `(Z/nZ)*`.
    ///
    /// # Panics
    ///
    /// Panics if `modulus` is zero.
    #[must_use]
    pub fn new(modulus: u64) -> Self {
        assert!(modulus >= 1, "modulus must be >= 1");
        let mut components = Vec::new();
        for (q, k) in modular::factorize(modulus) {
            let pk = q.pow(k);
            if q == 2 {
                match k {
                    1 => {} // (Z/2Z)* is trivial
                    2 => components.push(Component {
                        prime_power: pk,
                        gens: vec![pk - 1],
                        orders: vec![2],
                    }),
                    _ => components.push(Component {
                        prime_power: pk,
                        gens: vec![pk - 1, 5],
                        orders: vec![2, pk / 4],
                    }),
                }
            } else {
                let g = modular::primitive_root_mod_prime_power(q, k);
                components.push(Component {
                    prime_power: pk,
                    gens: vec![g % pk],
                    orders: vec![pk - pk / q],
                });
            }
        }

        let mut generators = Vec::new();
        let mut orders = Vec::new();
        for c in &components {
            let rest = modulus / c.prime_power;
            for (&g, &o) in c.gens.iter().zip(&c.orders) {
                let lifted = if rest == 1 {
                    g
                } else {
                    modular::crt(&[
                        (Integer::from(g), Integer::from(c.prime_power)),
                        (Integer::from(1u64), Integer::from(rest)),
                    ])
                    .expect("prime power components are coprime")
                    .to_u64()
                    .expect("lifted generator fits u64")
                };
                generators.push(lifted);
                orders.push(o);
            }
        }

        Self {
            modulus,
            components,
            generators,
            orders,
        }
    }

    /// Returns the modulus n.
    #[must_use]
    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Returns the CRT-lifted generators.
    #[must_use]
    pub fn generators(&self) -> &[u64] {
        &self.generators
    }

    /// Returns the generator orders.
    #[must_use]
    pub fn orders(&self) -> &[u64] {
        &self.orders
    }

    /// Returns the number of generators.
    #[must_use]
    pub fn num_generators(&self) -> usize {
        self.generators.len()
    }

    /// The order of the full group, `phi(n)`.
    #[must_use]
    pub fn order(&self) -> u64 {
        self.orders.iter().product()
    }

    /// Expresses `a` in terms of the generators:
    /// `a = prod g_i^{e_i} (mod n)` with `0 <= e_i < o_i`.
    ///
    /// Returns `None` when `gcd(a, n) != 1`. The search is per
    /// component and brute force over the component order.
    #[must_use]
    pub fn express(&self, a: u64) -> Option<Vec<u64>> {
        let a = a % self.modulus.max(1);
        if self.modulus <= 2 {
            return if a % self.modulus.max(1) == 1 % self.modulus.max(1) {
                Some(vec![])
            } else {
                None
            };
        }
        if gcd(a, self.modulus) != 1 {
            return None;
        }
        let mut exponents = Vec::with_capacity(self.generators.len());
        for c in &self.components {
            let target = a % c.prime_power;
            let found = Self::express_in_component(c, target)?;
            exponents.extend(found);
        }
        Some(exponents)
    }

    fn express_in_component(c: &Component, target: u64) -> Option<Vec<u64>> {
        match c.gens.len() {
            1 => {
                let g = c.gens[0];
                let mut x = 1 % c.prime_power;
                for e in 0..c.orders[0] {
                    if x == target {
                        return Some(vec![e]);
                    }
                    x = mul_mod(x, g, c.prime_power);
                }
                None
            }
            2 => {
                // (Z/2^k Z)* = <-1> x <5>
                for e0 in 0..c.orders[0] {
                    let base = pow_mod(c.gens[0], e0, c.prime_power);
                    let mut x = base;
                    for e1 in 0..c.orders[1] {
                        if x == target {
                            return Some(vec![e0, e1]);
                        }
                        x = mul_mod(x, c.gens[1], c.prime_power);
                    }
                }
                None
            }
            _ => unreachable!("components have one or two generators"),
        }
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prime_modulus() {
        let g = UnitGroup::new(7);
        assert_eq!(g.generators(), &[3]);
        assert_eq!(g.orders(), &[6]);
        assert_eq!(g.order(), 6);
    }

    #[test]
    fn test_express_round_trip() {
        for n in [5u64, 7, 8, 12, 15, 16, 21, 24, 36] {
            let g = UnitGroup::new(n);
            assert_eq!(g.order(), modular::euler_phi(n));
            for a in 1..n {
                if gcd(a, n) != 1 {
                    assert!(g.express(a).is_none());
                    continue;
                }
                let exps = g.express(a).expect("unit is expressible");
                // rebuild a from the exponents
                let mut x = 1u64;
                for (&gen, &e) in g.generators().iter().zip(&exps) {
                    x = mul_mod(x, pow_mod(gen, e, n), n);
                }
                assert_eq!(x, a, "round trip failed for {a} mod {n}");
            }
        }
    }

    #[test]
    fn test_power_of_two_components() {
        let g = UnitGroup::new(16);
        assert_eq!(g.orders(), &[2, 4]);
        let g = UnitGroup::new(4);
        assert_eq!(g.orders(), &[2]);
        let g = UnitGroup::new(2);
        assert_eq!(g.num_generators(), 0);
    }

    #[test]
    fn test_composite_lift_is_one_on_other_components() {
        let g = UnitGroup::new(15);
        for (&gen, _) in g.generators().iter().zip(g.orders()) {
            // each lifted generator is 1 mod one component
            assert!(gen % 3 == 1 || gen % 5 == 1);
        }
    }

    #[test]
    fn test_trivial_group() {
        let g = UnitGroup::new(1);
        assert_eq!(g.num_generators(), 0);
        assert_eq!(g.express(0), Some(vec![]));
    }
}
