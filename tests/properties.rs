//! Property-based tests over randomly generated PMFs.

use exactdie::{evaluate, lex, DropSolver, Pmf, Value};
use proptest::prelude::*;

const TOL: f64 = 1e-9;

/// Strategy: a normalized PMF with 1-8 strictly positive entries and a small
/// signed offset.
fn pmf_strategy() -> impl Strategy<Value = Pmf> {
    (-8i64..8, prop::collection::vec(0.01f64..1.0, 1..8)).prop_map(|(offset, weights)| {
        Pmf::from_weights(offset, weights).expect("positive weights normalize")
    })
}

/// Strategy: a PMF narrow enough to use as the left side of `@`.
fn small_pmf_strategy() -> impl Strategy<Value = Pmf> {
    (-3i64..4, prop::collection::vec(0.01f64..1.0, 1..4)).prop_map(|(offset, weights)| {
        Pmf::from_weights(offset, weights).expect("positive weights normalize")
    })
}

fn mean(pmf: &Pmf) -> f64 {
    pmf.iter().map(|(x, p)| x as f64 * p).sum()
}

proptest! {
    // Convolution conserves probability and commutes.
    #[test]
    fn convolution_commutes(x in pmf_strategy(), y in pmf_strategy()) {
        let xy = x.clone().convolve(y.clone());
        let yx = y.convolve(x);
        prop_assert!((xy.mass() - 1.0).abs() < TOL);
        prop_assert_eq!(xy.offset(), yx.offset());
        prop_assert_eq!(xy.len(), yx.len());
        for (a, b) in xy.probs().iter().zip(yx.probs()) {
            prop_assert!((a - b).abs() < TOL);
        }
    }

    #[test]
    fn self_convolution_conserves_mass(x in pmf_strategy(), n in -3i64..=3) {
        prop_assume!(n != 0);
        let out = x.self_convolve(n);
        prop_assert!((out.mass() - 1.0).abs() < TOL);
    }

    #[test]
    fn product_conserves_mass(x in pmf_strategy(), y in pmf_strategy()) {
        prop_assert!((x.product(y).mass() - 1.0).abs() < TOL);
    }

    #[test]
    fn roll_sum_conserves_mass_and_mean(x in small_pmf_strategy(), y in pmf_strategy()) {
        let expected = mean(&x) * mean(&y);
        let out = x.roll_sum(y);
        prop_assert!((out.mass() - 1.0).abs() < TOL);
        // E[X @ Y] = E[X] E[Y]
        prop_assert!((mean(&out) - expected).abs() < 1e-6);
    }

    #[test]
    fn growth_conserves_mass(x in pmf_strategy(), n in -4i64..=4) {
        prop_assume!(n != 0);
        let out = x.grow(n);
        prop_assert!((out.mass() - 1.0).abs() < TOL);
    }

    #[test]
    fn scalar_division_conserves_mass(x in pmf_strategy(), n in -5i64..=5) {
        prop_assume!(n != 0);
        prop_assert!((x.div_scalar(n).mass() - 1.0).abs() < TOL);
    }

    #[test]
    fn modulo_conserves_mass(x in pmf_strategy(), m in 2i64..6, flip in any::<bool>()) {
        let m = if flip { -m } else { m };
        prop_assert!((x.modulo(m).mass() - 1.0).abs() < TOL);
    }

    #[test]
    fn order_stat_conserves_mass(
        x in pmf_strategy(),
        (trials, position) in (1i64..5).prop_flat_map(|t| (Just(t), 1..=t)),
    ) {
        let out = x.order_stat(trials, position);
        prop_assert!((out.mass() - 1.0).abs() < TOL);
    }

    // Comparing distributions with provably disjoint supports always demotes
    // to a certain scalar.
    #[test]
    fn disjoint_comparison_demotes(gap in 6i64..20) {
        let gt = lex(&format!("1d6 + {gap} > 1d6")).and_then(|t| evaluate(&t));
        prop_assert_eq!(gt.expect("evaluate >"), Value::Scalar(1));
        let lt = lex(&format!("1d6 + {gap} < 1d6")).and_then(|t| evaluate(&t));
        prop_assert_eq!(lt.expect("evaluate <"), Value::Scalar(0));
        let eq = lex(&format!("1d6 + {gap} == 1d6")).and_then(|t| evaluate(&t));
        prop_assert_eq!(eq.expect("evaluate =="), Value::Scalar(0));
    }

    // A threshold check against one die has a closed form.
    #[test]
    fn die_threshold_is_exact(faces in 2i64..=20, threshold in 1i64..=19) {
        prop_assume!(threshold < faces);
        let out = lex(&format!("1d{faces} > {threshold}"))
            .and_then(|t| evaluate(&t))
            .expect("evaluate");
        prop_assert!(matches!(out, Value::Dist(_)), "expected a two-point distribution");
        let Value::Dist(pmf) = out else { unreachable!() };
        prop_assert_eq!(pmf.offset(), 0);
        let p = (faces - threshold) as f64 / faces as f64;
        prop_assert!((pmf.probs()[1] - p).abs() < TOL);
        prop_assert!((pmf.probs()[0] - (1.0 - p)).abs() < TOL);
    }

    // Keeping the worst K is the mirror image of keeping the best K.
    #[test]
    fn drop_solver_symmetry(
        faces in 2i64..=8,
        (n, keep) in (1i64..=5).prop_flat_map(|n| (Just(n), 1..=n)),
    ) {
        let mut solver = DropSolver::new();
        let best = solver.keep(faces, n, keep).expect("keep best");
        let worst = solver.keep(faces, n, -keep).expect("keep worst");
        prop_assert!((best.mass() - 1.0).abs() < TOL);
        prop_assert_eq!(best.offset(), worst.offset());
        prop_assert_eq!(best.len(), worst.len());
        for (a, b) in best.probs().iter().zip(worst.probs().iter().rev()) {
            prop_assert!((a - b).abs() < TOL);
        }
    }

    // Keeping every die is a plain sum.
    #[test]
    fn keeping_all_dice_matches_ndm(faces in 2i64..=6, n in 1i64..=4) {
        let mut solver = DropSolver::new();
        let kept = solver.keep(faces, n, n).expect("keep all");
        let plain = Pmf::ndm(n, faces);
        prop_assert_eq!(kept.offset(), plain.offset());
        prop_assert_eq!(kept.len(), plain.len());
        for (a, b) in kept.probs().iter().zip(plain.probs()) {
            prop_assert!((a - b).abs() < TOL);
        }
    }

    // Every dice literal materializes to a unit-mass PMF over the full
    // support.
    #[test]
    fn dice_literals_conserve_mass(count in 1i64..=5, faces in 2i64..=10) {
        let out = lex(&format!("{count}d{faces}"))
            .and_then(|t| evaluate(&t))
            .expect("evaluate");
        prop_assert!(matches!(out, Value::Dist(_)), "expected a distribution");
        let Value::Dist(pmf) = out else { unreachable!() };
        prop_assert_eq!(pmf.offset(), count);
        prop_assert_eq!(pmf.len(), (count * (faces - 1) + 1) as usize);
        prop_assert!((pmf.mass() - 1.0).abs() < TOL);
    }
}
