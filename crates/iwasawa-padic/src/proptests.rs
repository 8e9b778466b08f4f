//! Property-based tests for the p-adic rings.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use iwasawa_integers::Integer;

    use crate::{Qp, Zp};

    fn small_prime() -> impl Strategy<Value = u64> {
        prop_oneof![Just(3u64), Just(5), Just(7), Just(11), Just(13)]
    }

    fn residue() -> impl Strategy<Value = i64> {
        -100_000i64..100_000i64
    }

    proptest! {
        // Closure mod p^N: residues stay canonical at min precision

        #[test]
        fn zp_closure(a in residue(), b in residue(), p in small_prime(),
                      n1 in 1usize..12, n2 in 1usize..12) {
            let x = Zp::new(p, n1, a);
            let y = Zp::new(p, n2, b);
            let n = n1.min(n2);
            let modulus = Integer::from(p).pow(u32::try_from(n).unwrap());
            for z in [&x + &y, &x - &y, &x * &y] {
                prop_assert_eq!(z.precision(), n);
                prop_assert!(!z.to_integer().is_negative());
                prop_assert!(z.to_integer() < &modulus);
            }
        }

        #[test]
        fn zp_ring_axioms(a in residue(), b in residue(), c in residue(), p in small_prime()) {
            let n = 10;
            let x = Zp::new(p, n, a);
            let y = Zp::new(p, n, b);
            let z = Zp::new(p, n, c);
            prop_assert_eq!(&x + &y, &y + &x);
            prop_assert_eq!(&(&x + &y) + &z, &x + &(&y + &z));
            prop_assert_eq!(&x * &(&y + &z), &(&x * &y) + &(&x * &z));
        }

        #[test]
        fn zp_unit_division_round_trip(a in residue(), b in residue(), p in small_prime()) {
            let n = 10;
            let x = Zp::new(p, n, a);
            let y = Zp::new(p, n, b);
            if y.is_unit() {
                let q = x.checked_div(&y).unwrap();
                prop_assert_eq!(&q * &y, x);
            } else {
                prop_assert!(x.checked_div(&y).is_err());
            }
        }

        // Fermat: teichmuller(a)^(p-1) = 1 exactly

        #[test]
        fn teichmuller_fermat(a in 1i64..100_000i64, p in small_prime()) {
            let n = 10;
            let x = Zp::new(p, n, a);
            if x.is_unit() {
                let w = x.teichmuller();
                prop_assert!(w.pow(i64::try_from(p).unwrap() - 1).unwrap().is_one());
                prop_assert_eq!(w.with_precision(1), x.with_precision(1));
            }
        }

        // Geometric series: (1 - u) * sum u^k = 1 - u^{K+1}

        #[test]
        fn geometric_series(a in 1i64..1000i64, p in small_prime()) {
            let n = 8usize;
            let u = Qp::from_integer(p, n, 1 + a * i64::try_from(p).unwrap());
            let one = Qp::one(p, n);
            let mut sum = Qp::zero(p, n);
            let mut power = one.clone();
            // u - 1 has valuation >= 1, so u^n vanishes at precision n
            for _ in 0..n {
                sum = &sum + &power;
                power = &power * &u;
            }
            let lhs = &(&one - &u) * &sum;
            let rhs = &one - &power;
            prop_assert_eq!(lhs, rhs);
        }

        // Qp valuation algebra

        #[test]
        fn qp_valuation_of_product(a in residue(), b in residue(), p in small_prime()) {
            prop_assume!(a != 0 && b != 0);
            let n = 12;
            let x = Qp::from_integer(p, n, a);
            let y = Qp::from_integer(p, n, b);
            if !x.is_zero() && !y.is_zero() {
                prop_assert_eq!((&x * &y).valuation(), x.valuation() + y.valuation());
                // division can exhaust the precision budget when the
                // result's valuation is very negative; only check when
                // digits remain
                if let Ok(q) = x.checked_div(&y) {
                    prop_assert_eq!(q.valuation(), x.valuation() - y.valuation());
                }
            }
        }

        #[test]
        fn qp_valuation_of_sum(a in residue(), b in residue(), p in small_prime()) {
            prop_assume!(a != 0 && b != 0 && a + b != 0);
            let n = 12;
            let x = Qp::from_integer(p, n, a);
            let y = Qp::from_integer(p, n, b);
            let s = &x + &y;
            if !s.is_zero() {
                prop_assert!(s.valuation() >= x.valuation().min(y.valuation()));
            }
        }

        // with_precision truncation keeps agreement at the lower precision

        #[test]
        fn zp_truncate_then_lift(a in residue(), p in small_prime(),
                                 hi in 2usize..12, lo in 1usize..12) {
            prop_assume!(lo < hi);
            let x = Zp::new(p, hi, a);
            let t = x.with_precision(lo);
            let lifted = t.with_precision(hi);
            prop_assert_eq!(lifted.with_precision(lo), x.with_precision(lo));
        }

        #[test]
        fn qp_round_trips_through_parts(a in residue(), p in small_prime()) {
            prop_assume!(a != 0);
            let n = 12;
            let x = Qp::from_integer(p, n, a);
            let rebuilt = Qp::from_parts(x.valuation(), x.unit_part().clone()).unwrap();
            prop_assert_eq!(rebuilt, x);
        }
    }
}
