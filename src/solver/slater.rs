// Slater condition checks on the reduced problem.  The results are
// diagnostics only: they never change the outcome of a solve, and a
// failing external solver just leaves them without information.

use crate::algebra::*;
use crate::solver::backend::*;
use crate::solver::core::*;
use crate::solver::data::LpRow;
use crate::solver::presolve::ReducedProblem;
use crate::solver::utils::infbounds::*;
use crate::solver::Sdpi;
use std::io::Write;

impl<T, B> Sdpi<T, B>
where
    T: FloatT,
    B: SdpSolverBackend<T>,
{
    /// Checks the Slater conditions of the reduced problem and reports
    /// the results.  `rootnodefailed` is set when the external solver
    /// could not solve the problem even in its penalty formulation.
    pub(crate) fn check_slater(
        &mut self,
        problem: &ReducedProblem<T>,
        time_limit: f64,
        rootnodefailed: bool,
    ) {
        self.state.dualslater = self.check_dual_slater(problem, time_limit);
        self.state.primalslater = self.check_primal_slater(problem, time_limit);

        let always = rootnodefailed || self.settings.slatercheck == SlaterCheck::Always;
        self.report_slater("dual", self.state.dualslater, rootnodefailed, always);
        self.report_slater("primal", self.state.primalslater, rootnodefailed, always);
    }

    fn report_slater(&mut self, which: &str, result: SdpSlater, rootnodefailed: bool, always: bool) {
        let message = match result {
            SdpSlater::Holds => format!("Slater condition holds for the {} problem", which),
            SdpSlater::Not => format!("Slater condition does not hold for the {} problem", which),
            SdpSlater::Inf => format!("the {} problem is infeasible, no Slater point exists", which),
            SdpSlater::NoInfo => format!("unable to check the Slater condition for the {} problem", which),
        };

        let print = match result {
            SdpSlater::Holds => rootnodefailed,
            _ => always,
        };
        if print {
            let _ = writeln!(self.stream, "{}", message);
        } else {
            tracing::debug!("{}", message);
        }
    }

    // Solves  min r  s.t.  A(y) + I r ⪰ 0 without bounding r.  A negative
    // optimum means there is a strictly feasible y.
    fn check_dual_slater(&mut self, problem: &ReducedProblem<T>, time_limit: f64) -> SdpSlater {
        let remaining = self.remaining_time(time_limit);
        if remaining <= 0.0 {
            return SdpSlater::NoInfo;
        }
        let feastol = self.settings.feastol;

        let result =
            match self
                .backend
                .load_and_solve_with_penalty(problem, T::one(), false, false, remaining)
            {
                Ok(result) => result,
                Err(e) => {
                    tracing::debug!("dual Slater check failed: {}", e);
                    return SdpSlater::NoInfo;
                }
            };

        match result.status {
            BackendStatus::Optimal if result.objval < -feastol => SdpSlater::Holds,
            BackendStatus::Optimal if result.objval < feastol => SdpSlater::Not,
            BackendStatus::Optimal => SdpSlater::Inf,
            BackendStatus::DualUnbounded => SdpSlater::Holds,
            BackendStatus::DualInfeasible => SdpSlater::Not,
            _ => SdpSlater::NoInfo,
        }
    }

    // The primal problem has a strictly feasible point iff the homogenized
    // dual problem with a normalizing trace row has no solution of
    // nonpositive value.
    fn check_primal_slater(&mut self, problem: &ReducedProblem<T>, time_limit: f64) -> SdpSlater {
        let Some(aux) = primal_slater_problem(problem, self.settings.epsilon) else {
            return SdpSlater::Holds;
        };

        let remaining = self.remaining_time(time_limit);
        if remaining <= 0.0 {
            return SdpSlater::NoInfo;
        }
        let feastol = self.settings.feastol;

        let result = match self.backend.load_and_solve(&aux, None, remaining) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!("primal Slater check failed: {}", e);
                return SdpSlater::NoInfo;
            }
        };

        match result.status {
            BackendStatus::Optimal if result.objval > -feastol => SdpSlater::Not,
            BackendStatus::Optimal => SdpSlater::Holds,
            BackendStatus::DualUnbounded => SdpSlater::Not,
            BackendStatus::PrimalUnbounded => SdpSlater::Holds,
            _ => SdpSlater::NoInfo,
        }
    }
}

// Auxiliary problem of the primal Slater check: all finite sides and
// bounds moved to zero, no constant matrices, and the row
// sum_j trace(A_j) y_j >= 1.  Returns None if every variable has two
// finite bounds, in which case the primal problem always has a Slater
// point.
pub(crate) fn primal_slater_problem<T: FloatT>(
    problem: &ReducedProblem<T>,
    epsilon: T,
) -> Option<ReducedProblem<T>> {
    let n = problem.nvars();
    let allbounded = (0..n).all(|j| !is_infinite(problem.lb[j]) && !is_infinite(problem.ub[j]));
    if allbounded {
        return None;
    }

    let mut aux = problem.clone();

    let zero_finite = |v: &mut T| {
        if !is_infinite(*v) {
            *v = T::zero();
        }
    };
    for row in aux.lprows.iter_mut() {
        zero_finite(&mut row.lhs);
        zero_finite(&mut row.rhs);
    }
    aux.lb.iter_mut().for_each(zero_finite);
    aux.ub.iter_mut().for_each(zero_finite);

    let mut trace = vec![T::zero(); n];
    for block in aux.blocks.iter_mut() {
        for (&j, A) in block.vars.iter().zip(&block.matrices) {
            trace[j] += A.iter().filter(|(r, c, _)| r == c).fold(T::zero(), |acc, (_, _, v)| acc + v);
        }
        block.constant = Triplets::new();
    }
    let entries: Vec<(usize, T)> = trace
        .into_iter()
        .enumerate()
        .filter(|(_, v)| v.abs() > epsilon)
        .collect();
    if !entries.is_empty() {
        aux.lprows.push(LpRow::new(T::one(), infinity(), &entries));
    }

    Some(aux)
}
