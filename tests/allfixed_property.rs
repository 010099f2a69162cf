#![allow(non_snake_case)]

use nalgebra::DMatrix;
use proptest::prelude::*;
use sdpi::{algebra::*, solver::*};

// a random symmetric block as dense row-major values plus its lower
// triangle, and a diagonal shift
fn arb_block() -> impl Strategy<Value = (usize, Vec<f64>, Triplets<f64>, f64)> {
    (1usize..=20)
        .prop_flat_map(|n| {
            let lower = prop::collection::vec(-4i32..=4, n * (n + 1) / 2);
            (Just(n), lower, 0i32..=24)
        })
        .prop_map(|(n, lower, shift)| {
            let mut dense = vec![0.0; n * n];
            let mut entries = vec![];
            let mut vals = lower.into_iter();
            for c in 0..n {
                for r in c..n {
                    let v = f64::from(vals.next().unwrap_or(0));
                    dense[r * n + c] = v;
                    dense[c * n + r] = v;
                    if v != 0.0 {
                        entries.push((r, c, v));
                    }
                }
            }
            (n, dense, Triplets::from_entries(&entries), f64::from(shift))
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn all_fixed_verdict_matches_eigenvalues((n, dense, C, shift) in arb_block()) {
        // the only variable carries I and is fixed at the shift
        let I: Vec<_> = (0..n).map(|i| (i, i, 1.0)).collect();
        let block = SdpBlock::new(n, C, vec![(0, Triplets::from_entries(&I))]).unwrap();
        let data = ProblemData::new(vec![1.0], vec![shift], vec![shift], vec![false], vec![block], vec![])
            .unwrap();

        let M = DMatrix::from_fn(n, n, |i, j| dense[i * n + j] + if i == j { shift } else { 0.0 });
        let λ = M.clone().symmetric_eigen().eigenvalues.min();
        prop_assume!(λ.abs() > 1e-4);

        let mut sdpi: Sdpi = Sdpi::new(NoSolver::new(), SdpiSettings::default());
        sdpi.load_sdp(data);
        sdpi.solve(None, false, f64::INFINITY).unwrap();

        prop_assert!(sdpi.was_solved());
        prop_assert_eq!(sdpi.statistics().nallfixed, 1);
        prop_assert_eq!(sdpi.is_dual_feasible(), λ > 0.0);
        prop_assert_eq!(sdpi.is_dual_infeasible(), λ < 0.0);

        if λ > 0.0 {
            prop_assert_eq!(sdpi.objval(), Some(shift));
        } else {
            // the certificate v v^T has unit trace and <M, v v^T> = λ
            let X = sdpi.primal_solution_matrix().unwrap();
            let mut trace = 0.0;
            let mut inner = 0.0;
            for i in 0..n {
                trace += X[0][(i, i)];
                for j in 0..n {
                    inner += M[(i, j)] * X[0][(i, j)];
                }
            }
            prop_assert!((trace - 1.0).abs() <= 1e-8);
            prop_assert!((inner - λ).abs() <= 1e-6 * (1.0 + λ.abs()));
        }
    }
}
