#![allow(non_snake_case)]

mod common;
use common::*;
use sdpi::{algebra::*, solver::*};

#[test]
fn test_one_var_worked_example() {
    // settled without calling the external solver
    let mut sdpi: Sdpi = Sdpi::new(NoSolver::new(), SdpiSettings::default());
    sdpi.load_sdp(worked_example());
    sdpi.solve(None, false, f64::INFINITY).unwrap();

    assert!(sdpi.was_solved());
    assert!(sdpi.solved_orig());
    assert!(sdpi.is_optimal());
    assert!(sdpi.is_acceptable());
    assert_eq!(sdpi.internal_status(), 0);
    assert!(f64::abs(sdpi.objval().unwrap() + 1.0) <= 1e-6);
    assert!(f64::abs(sdpi.lower_objbound() + 1.0) <= 1e-6);

    let y = sdpi.dual_sol().unwrap();
    assert!(f64::abs(y[0] + 1.0) <= 1e-6);

    assert_eq!(sdpi.statistics().nonevarsdp, 1);
    assert_eq!(sdpi.backend().counter(), 1);
    assert_eq!(sdpi.settings_used(), SolverSetting::Unsolved);
    assert_eq!(sdpi.slater_settings(), SlaterSetting::NoInfo);

    // the optimum sits at the lower end of the feasible interval, not at
    // the bound -5, so no bound multiplier is active
    let (lbvals, ubvals) = sdpi.primal_bound_vars().unwrap();
    assert_eq!((lbvals[0], ubvals[0]), (0.0, 0.0));

    // X = s v v^T with v = e1 (the constraint 1 + y >= 0 is active)
    let X = sdpi.primal_solution_matrix().unwrap();
    assert_eq!(X.len(), 1);
    assert!(f64::abs(X[0][(0, 0)] - 1.0) <= 1e-6);
    assert!(f64::abs(X[0][(1, 1)]) <= 1e-6);
}

#[test]
fn test_one_var_infeasible_bounds() {
    let mut sdpi: Sdpi = Sdpi::new(NoSolver::new(), SdpiSettings::default());
    sdpi.load_sdp(worked_example());
    sdpi.chg_bounds(&[0], &[2.0], &[5.0]).unwrap();
    sdpi.solve(None, false, f64::INFINITY).unwrap();

    assert!(sdpi.was_solved());
    assert!(!sdpi.is_optimal());
    assert!(sdpi.is_dual_infeasible());
    assert!(!sdpi.is_dual_feasible());
    assert!(sdpi.is_primal_unbounded());
    assert_eq!(sdpi.sol_feasibility(), Some((true, false)));
    assert!(sdpi.objval().unwrap() >= get_infinity());

    // the supergradient of λ_min at y = 2 is -1, pointing away from the
    // feasible interval, and lands on the lower bound multiplier
    let (lbvals, ubvals) = sdpi.primal_bound_vars().unwrap();
    assert!(f64::abs(lbvals[0] - 1.0) <= 1e-6);
    assert_eq!(ubvals[0], 0.0);
}

#[test]
fn test_all_fixed() {
    let mut sdpi: Sdpi = Sdpi::new(NoSolver::new(), SdpiSettings::default());
    sdpi.load_sdp(worked_example());

    // 0.5 diag(1,-1) + I is positive definite
    sdpi.chg_bounds(&[0], &[0.5], &[0.5]).unwrap();
    sdpi.solve(None, false, f64::INFINITY).unwrap();
    assert!(sdpi.was_solved());
    assert!(sdpi.is_optimal());
    assert!(sdpi.have_primal_sol());
    assert!(sdpi.is_primal_feasible());
    assert!(sdpi.is_dual_feasible());
    assert_eq!(sdpi.objval(), Some(0.5));
    assert_eq!(sdpi.dual_sol(), Some(vec![0.5]));
    assert_eq!(sdpi.statistics().nallfixed, 1);

    let X = sdpi.primal_solution_matrix().unwrap();
    assert_eq!(X[0].norm_inf(), 0.0);

    // 2 diag(1,-1) + I has eigenvalue -1 with eigenvector e2
    sdpi.chg_bounds(&[0], &[2.0], &[2.0]).unwrap();
    sdpi.solve(None, false, f64::INFINITY).unwrap();
    assert!(sdpi.was_solved());
    assert!(sdpi.is_dual_infeasible());
    assert!(sdpi.is_primal_feasible());
    assert!(sdpi.have_primal_sol());
    assert!(sdpi.objval().unwrap() >= get_infinity());
    assert!(sdpi.dual_sol().is_none());
    assert_eq!(sdpi.statistics().nallfixed, 2);

    let X = sdpi.primal_solution_matrix().unwrap();
    assert!(f64::abs(X[0][(1, 1)] - 1.0) <= 1e-8);
    assert!(f64::abs(X[0][(0, 0)]) <= 1e-8);
    assert_eq!(sdpi.backend().counter(), 2);
}

#[test]
fn test_conflicting_bounds() {
    let mut sdpi: Sdpi = Sdpi::new(NoSolver::new(), SdpiSettings::default());
    sdpi.load_sdp(three_var_problem());
    sdpi.chg_bounds(&[1], &[1.0], &[0.0]).unwrap();
    sdpi.solve(None, false, f64::INFINITY).unwrap();

    assert!(sdpi.was_solved());
    assert!(sdpi.is_dual_infeasible());
    assert!(!sdpi.is_primal_feasible());
    assert!(!sdpi.have_primal_sol());
    assert!(sdpi.feasibility_known());
    assert_eq!(sdpi.internal_status(), 0);
    assert!(sdpi.dual_sol().is_none());
    assert!(sdpi.primal_bound_vars().is_none());
    assert_eq!(sdpi.statistics().ninfeasible, 1);
    assert_eq!(sdpi.iterations(), 0);
}

#[test]
fn test_lp_row_fixes_variable() {
    // 2 y0 = 0 fixes y0, which leaves y1 as the only free variable
    let mut sdpi: Sdpi = Sdpi::new(NoSolver::new(), SdpiSettings::default());
    let mut data = three_var_problem();
    data.add_lp_rows(vec![LpRow::new(0.0, 0.0, &[(0, 2.0)])]).unwrap();
    sdpi.load_sdp(data);
    sdpi.solve(None, false, f64::INFINITY).unwrap();

    // y1 E22 + [[1, .5], [.5, 1]] ⪰ 0  <=>  y1 >= -0.75
    assert!(sdpi.was_solved());
    assert!(f64::abs(sdpi.objval().unwrap() + 0.75) <= 1e-5);
    let y = sdpi.dual_sol().unwrap();
    assert_eq!((y[0], y[2]), (0.0, 0.5));
    assert!(f64::abs(y[1] + 0.75) <= 1e-5);

    let (lhs, rhs) = sdpi.primal_lp_sides().unwrap();
    assert_eq!((lhs, rhs), (vec![0.0], vec![0.0]));
}

#[test]
fn test_backend_dispatch() {
    let backend = ScriptedSolver::new(vec![optimal(-2.0, &[-1.0, -1.0])]);
    let mut sdpi = Sdpi::new(backend, SdpiSettings::default());
    sdpi.load_sdp(three_var_problem());

    let warmstart = WarmStart {
        y: vec![0.1, 0.2, 0.5],
        Z: None,
        X: None,
    };
    sdpi.solve(Some(&warmstart), false, f64::INFINITY).unwrap();

    // the fixed variable is not handed to the solver
    assert_eq!(
        sdpi.backend().calls,
        vec![Call::Solve {
            nvars: 2,
            warmstart: Some(vec![0.1, 0.2])
        }]
    );
    let problem = &sdpi.backend().problems[0];
    assert_eq!(problem.varmap(), &[0, 1]);
    assert_eq!(problem.blocks[0].constant.get(1, 0), Some(0.5));

    assert!(sdpi.was_solved());
    assert!(sdpi.solved_orig());
    assert_eq!(sdpi.objval(), Some(-2.0));
    assert_eq!(sdpi.dual_sol(), Some(vec![-1.0, -1.0, 0.5]));
    assert_eq!(sdpi.settings_used(), SolverSetting::Fast);
    assert_eq!(sdpi.iterations(), 10);
    assert_eq!(sdpi.sdp_calls(), 1);
    assert_eq!(sdpi.backend().counter, 0);
}

#[test]
fn test_backend_primal_expansion() {
    let mut result = optimal(-2.0, &[-1.0, -1.0]).unwrap();
    result.primal_lb = Some(vec![0.0, 0.25]);
    result.primal_ub = Some(vec![0.0, 0.0]);
    result.primal_matrices = Some(vec![Matrix::new_from_slice((2, 2), &[1.0, 0.0, 0.0, 1.0])]);
    result.max_primal_entry = 1.0;

    let mut sdpi = Sdpi::new(ScriptedSolver::new(vec![Ok(result)]), SdpiSettings::default());
    sdpi.load_sdp(three_var_problem());
    sdpi.solve(None, false, f64::INFINITY).unwrap();

    let (lbvals, ubvals) = sdpi.primal_bound_vars().unwrap();
    assert_eq!(lbvals, vec![0.0, 0.25, 0.0]);
    assert_eq!(ubvals, vec![0.0; 3]);
    let X = sdpi.primal_solution_matrix().unwrap();
    assert_eq!(X[0][(1, 1)], 1.0);
    assert_eq!(sdpi.max_primal_entry(), 1.0);
}

#[test]
fn test_backend_error_propagates() {
    let mut sdpi: Sdpi = Sdpi::new(NoSolver::new(), SdpiSettings::default());
    sdpi.load_sdp(three_var_problem());

    let err = sdpi.solve(None, false, f64::INFINITY).unwrap_err();
    assert!(matches!(err, SdpiError::Backend(BackendError::NotAvailable(_))));
    assert!(!sdpi.was_solved());
    assert_eq!(sdpi.internal_status(), -1);
}

#[test]
fn test_time_limit() {
    let mut sdpi = Sdpi::new(ScriptedSolver::new(vec![]), SdpiSettings::default());
    sdpi.load_sdp(three_var_problem());

    sdpi.solve(None, false, 0.0).unwrap();
    assert!(sdpi.is_timelim_exc());
    assert!(!sdpi.was_solved());
    assert_eq!(sdpi.internal_status(), -1);
    assert!(sdpi.backend().calls.is_empty());

    // a solver hitting its time limit is not escalated
    sdpi.backend_mut().script.push_back(status(BackendStatus::TimeLimit, 0.0));
    sdpi.solve(None, false, 100.0).unwrap();
    assert!(sdpi.is_timelim_exc());
    assert_eq!(sdpi.internal_status(), 3);
    assert!(!sdpi.is_acceptable());
    assert_eq!(sdpi.backend().calls.len(), 1);
}

#[test]
fn test_clone_with_backend() {
    let mut sdpi: Sdpi = Sdpi::new(NoSolver::new(), SdpiSettings::default());
    sdpi.load_sdp(worked_example());
    sdpi.solve(None, false, f64::INFINITY).unwrap();

    let mut clone = sdpi.clone_with_backend(ScriptedSolver::new(vec![]));
    assert!(!clone.was_solved());
    assert_eq!(clone.data(), sdpi.data());

    // changes to the clone do not reach the original
    clone.chg_obj(&[0], &[-1.0]).unwrap();
    clone.solve(None, false, f64::INFINITY).unwrap();
    assert!(f64::abs(clone.objval().unwrap() + 1.0) <= 1e-6);
    assert!(f64::abs(clone.dual_sol().unwrap()[0] - 1.0) <= 1e-6);
    assert_eq!(sdpi.data().obj(0..=0).unwrap(), &[1.0]);
    assert!(sdpi.was_solved());
}
