// Status and result queries of an SDP interface instance.
//
// The cases settled without the external solver take precedence, in the
// order: not solved, infeasible, all variables fixed, single variable.
// Everything else is answered from the last external result.

use crate::algebra::*;
use crate::io::ConfigurablePrintTarget;
use crate::solver::backend::*;
use crate::solver::core::*;
use crate::solver::oracle::OneVarSolution;
use crate::solver::utils::infbounds::*;
use crate::solver::Sdpi;
use std::fs::File;
use std::io::Write;

// what settled the last solve
enum Outcome<'a, T> {
    Unsolved,
    Infeasible,
    AllFixed,
    OneVar(&'a OneVarSolution<T>),
    Backend(BackendStatus),
}

impl<T, B> Sdpi<T, B>
where
    T: FloatT,
    B: SdpSolverBackend<T>,
{
    fn outcome(&self) -> Outcome<'_, T> {
        let state = &self.state;
        if !state.solved {
            Outcome::Unsolved
        } else if state.infeasible {
            Outcome::Infeasible
        } else if state.allfixed {
            Outcome::AllFixed
        } else if let Some(sol) = &state.onevar {
            Outcome::OneVar(sol)
        } else {
            Outcome::Backend(self.backend_status())
        }
    }

    // ---------------------------------
    // status queries
    // ---------------------------------

    /// true if the last solve produced a usable result
    pub fn was_solved(&self) -> bool {
        self.state.solved
    }

    /// true if the result belongs to the original problem rather than
    /// to its penalty formulation
    pub fn solved_orig(&self) -> bool {
        self.state.solved && !self.state.penalty
    }

    pub fn have_primal_sol(&self) -> bool {
        match self.outcome() {
            Outcome::Unsolved => false,
            // an infeasible fixing still carries its eigenvector certificate
            Outcome::Infeasible => self.state.allfixed,
            Outcome::AllFixed | Outcome::OneVar(_) => true,
            Outcome::Backend(status) => !status.is_primal_infeasible(),
        }
    }

    pub fn feasibility_known(&self) -> bool {
        match self.outcome() {
            Outcome::Unsolved => false,
            Outcome::Infeasible | Outcome::AllFixed | Outcome::OneVar(_) => true,
            Outcome::Backend(status) => status.feasibility_known(),
        }
    }

    /// Primal and dual feasibility of the last solve, if known
    pub fn sol_feasibility(&self) -> Option<(bool, bool)> {
        match self.outcome() {
            Outcome::Unsolved => None,
            Outcome::Infeasible => Some((self.state.allfixed, false)),
            Outcome::AllFixed => Some((true, true)),
            Outcome::OneVar(sol) => Some((true, sol.status == OneVarStatus::Optimal)),
            Outcome::Backend(status) => status
                .feasibility_known()
                .then(|| (status.is_primal_feasible(), status.is_dual_feasible())),
        }
    }

    pub fn is_primal_unbounded(&self) -> bool {
        match self.outcome() {
            Outcome::Unsolved => false,
            Outcome::Infeasible => self.state.allfixed,
            Outcome::AllFixed => false,
            Outcome::OneVar(sol) => sol.status == OneVarStatus::Infeasible,
            Outcome::Backend(status) => status.is_primal_unbounded(),
        }
    }

    pub fn is_primal_infeasible(&self) -> bool {
        match self.outcome() {
            Outcome::Backend(status) => status.is_primal_infeasible(),
            _ => false,
        }
    }

    pub fn is_primal_feasible(&self) -> bool {
        match self.outcome() {
            Outcome::Unsolved => false,
            Outcome::Infeasible => self.state.allfixed,
            Outcome::AllFixed | Outcome::OneVar(_) => true,
            Outcome::Backend(status) => status.is_primal_feasible(),
        }
    }

    pub fn is_dual_unbounded(&self) -> bool {
        match self.outcome() {
            Outcome::Backend(status) => status.is_dual_unbounded(),
            _ => false,
        }
    }

    pub fn is_dual_infeasible(&self) -> bool {
        match self.outcome() {
            Outcome::Unsolved | Outcome::AllFixed => false,
            Outcome::Infeasible => true,
            Outcome::OneVar(sol) => sol.status == OneVarStatus::Infeasible,
            Outcome::Backend(status) => status.is_dual_infeasible(),
        }
    }

    pub fn is_dual_feasible(&self) -> bool {
        match self.outcome() {
            Outcome::Unsolved | Outcome::Infeasible => false,
            Outcome::AllFixed => true,
            Outcome::OneVar(sol) => sol.status == OneVarStatus::Optimal,
            Outcome::Backend(status) => status.is_dual_feasible(),
        }
    }

    pub fn is_converged(&self) -> bool {
        match self.outcome() {
            Outcome::Unsolved => false,
            Outcome::Backend(status) => status.is_converged(),
            _ => true,
        }
    }

    pub fn is_objlim_exc(&self) -> bool {
        matches!(self.outcome(), Outcome::Backend(BackendStatus::ObjectiveLimit))
    }

    pub fn is_iterlim_exc(&self) -> bool {
        matches!(self.outcome(), Outcome::Backend(BackendStatus::IterationLimit))
    }

    /// true if the time budget ran out, either before the external solver
    /// was called or inside it
    pub fn is_timelim_exc(&self) -> bool {
        if self.state.infeasible || self.state.allfixed {
            return false;
        }
        if self.state.timelimit {
            return true;
        }
        matches!(self.outcome(), Outcome::Backend(BackendStatus::TimeLimit))
    }

    /// -1 if no solve finished, 0 if converged, 1 objective limit,
    /// 2 iteration limit, 3 time limit, 4 numerical trouble, 7 otherwise
    pub fn internal_status(&self) -> i32 {
        match self.outcome() {
            Outcome::Unsolved => -1,
            Outcome::Backend(status) => status.code(),
            _ => 0,
        }
    }

    pub fn is_optimal(&self) -> bool {
        match self.outcome() {
            Outcome::Unsolved | Outcome::Infeasible => false,
            Outcome::AllFixed => true,
            Outcome::OneVar(sol) => sol.status == OneVarStatus::Optimal,
            Outcome::Backend(status) => status.is_optimal(),
        }
    }

    /// true if the result can be trusted, even if it is not optimal
    pub fn is_acceptable(&self) -> bool {
        match self.outcome() {
            Outcome::Unsolved => false,
            Outcome::Infeasible | Outcome::AllFixed | Outcome::OneVar(_) => true,
            Outcome::Backend(_) => self.state.result.as_ref().is_some_and(|r| r.is_acceptable()),
        }
    }

    // ---------------------------------
    // result queries
    // ---------------------------------

    /// Objective value of the last solve, +infinity if infeasible
    pub fn objval(&self) -> Option<T> {
        match self.outcome() {
            Outcome::Unsolved => None,
            Outcome::Infeasible => Some(infinity()),
            Outcome::AllFixed => {
                let bounds = &self.state.bounds;
                Some(bounds.lb.iter().zip(&self.data.obj).fold(T::zero(), |acc, (&l, &c)| acc + l * c))
            }
            Outcome::OneVar(sol) => Some(sol.objval),
            Outcome::Backend(_) => self.state.result.as_ref().map(|r| r.objval),
        }
    }

    /// Best known lower bound on the objective.  Falls back to the best
    /// bound of the penalty formulation if the problem was not solved.
    pub fn lower_objbound(&self) -> T {
        if self.state.solved {
            self.objval().unwrap_or_else(|| -infinity::<T>())
        } else if self.state.penalty {
            self.state.bestbound
        } else {
            -infinity::<T>()
        }
    }

    /// Dual solution vector in the original numbering.  Fixed variables
    /// take their fixed value.
    pub fn dual_sol(&self) -> Option<Vec<T>> {
        let lb = &self.state.bounds.lb;
        match self.outcome() {
            Outcome::Unsolved | Outcome::Infeasible => None,
            Outcome::AllFixed => Some(lb.clone()),
            Outcome::OneVar(sol) => {
                let mut y = lb.clone();
                y[sol.idx] = sol.optval;
                Some(y)
            }
            Outcome::Backend(_) => {
                let problem = self.state.problem.as_ref()?;
                let y = self.state.result.as_ref()?.y.as_ref()?;
                Some(problem.expand_vars(y, lb))
            }
        }
    }

    /// Primal values belonging to the variable bounds, as
    /// `(lower, upper)`.  Removed variables get zero.
    pub fn primal_bound_vars(&self) -> Option<(Vec<T>, Vec<T>)> {
        let n = self.data.nvars();
        let zeros = vec![T::zero(); n];
        let feastol = self.settings.feastol;

        if self.state.solved && self.state.allfixed {
            return Some((zeros.clone(), zeros));
        }
        match self.outcome() {
            Outcome::Unsolved | Outcome::Infeasible => None,
            Outcome::AllFixed => Some((zeros.clone(), zeros)),
            Outcome::OneVar(sol) => {
                let (mut lbvals, mut ubvals) = (zeros.clone(), zeros);
                let j = sol.idx;
                let obj = self.data.obj[j];
                let bounds = &self.state.bounds;

                if sol.status == OneVarStatus::Infeasible {
                    // the supergradient separates the bound from the
                    // feasible interval
                    let certval = sol.certval.unwrap_or_else(T::zero);
                    if certval > feastol {
                        ubvals[j] = certval;
                    } else if certval < -feastol {
                        lbvals[j] = -certval;
                    }
                } else if (sol.optval - bounds.lb[j]).abs() < feastol {
                    lbvals[j] = obj;
                } else if (sol.optval - bounds.ub[j]).abs() < feastol && obj < T::zero() {
                    ubvals[j] = -obj;
                }
                Some((lbvals, ubvals))
            }
            Outcome::Backend(status) => {
                if status.is_primal_infeasible() {
                    return None;
                }
                let problem = self.state.problem.as_ref()?;
                let result = self.state.result.as_ref()?;
                let lbvals = problem.expand_vars(result.primal_lb.as_ref()?, &zeros);
                let ubvals = problem.expand_vars(result.primal_ub.as_ref()?, &zeros);
                Some((lbvals, ubvals))
            }
        }
    }

    /// Primal values belonging to the sides of the LP rows, as
    /// `(lhs, rhs)`.  Rows that presolving turned into variable bounds
    /// get the primal value of that bound.
    pub fn primal_lp_sides(&self) -> Option<(Vec<T>, Vec<T>)> {
        let nrows = self.data.nlprows();
        let zeros = vec![T::zero(); nrows];

        match self.outcome() {
            Outcome::Unsolved | Outcome::Infeasible => None,
            Outcome::AllFixed | Outcome::OneVar(_) => Some((zeros.clone(), zeros)),
            Outcome::Backend(status) => {
                if status.is_primal_infeasible() {
                    return None;
                }
                let (lbvals, ubvals) = self.primal_bound_vars()?;
                let (mut lhsvals, mut rhsvals) = (zeros.clone(), zeros);

                let bounds = &self.state.bounds;
                let fromrows = bounds
                    .lbrowidx
                    .iter()
                    .zip(&lbvals)
                    .chain(bounds.ubrowidx.iter().zip(&ubvals));
                for (&idx, &val) in fromrows {
                    if idx > 0 {
                        rhsvals[(idx - 1) as usize] = val;
                    } else if idx < 0 {
                        lhsvals[(-idx - 1) as usize] = val;
                    }
                }

                let problem = self.state.problem.as_ref()?;
                let result = self.state.result.as_ref()?;
                if let (Some(lhs), Some(rhs)) = (&result.primal_lhs, &result.primal_rhs) {
                    for (k, &i) in problem.rowmap().iter().enumerate() {
                        lhsvals[i] = lhs[k];
                        rhsvals[i] = rhs[k];
                    }
                }
                Some((lhsvals, rhsvals))
            }
        }
    }

    /// Primal solution matrix of every block, in the original dimensions.
    ///
    /// If all variables are fixed and a block is infeasible, the matrix of
    /// that block is the rank one certificate `v v^T` built from the
    /// eigenvector of its negative eigenvalue.
    pub fn primal_solution_matrix(&self) -> Option<Vec<Matrix<T>>> {
        let zero_blocks = || {
            self.data
                .block_sizes()
                .into_iter()
                .map(|n| Matrix::zeros((n, n)))
                .collect::<Vec<_>>()
        };

        if self.state.solved && self.state.allfixed {
            let mut mats = zero_blocks();
            if let Some((b, v)) = &self.state.allfixed_cert {
                mats[*b] = Matrix::rank_one(v, T::one());
            }
            return Some(mats);
        }

        match self.outcome() {
            Outcome::Unsolved | Outcome::Infeasible => None,
            Outcome::AllFixed => Some(zero_blocks()),
            Outcome::OneVar(sol) => {
                let Some(certval) = sol.certval else {
                    return Some(vec![]);
                };
                let obj = self.data.obj[sol.idx];
                let s = if sol.status == OneVarStatus::Optimal && certval > self.settings.feastol {
                    obj / certval
                } else {
                    T::one()
                };
                Some(vec![Matrix::rank_one(&sol.certvec, s)])
            }
            Outcome::Backend(_) => {
                let problem = self.state.problem.as_ref()?;
                let mats = self.state.result.as_ref()?.primal_matrices.as_ref()?;
                let mut out = zero_blocks();
                for ((block, &b), X) in problem.blocks.iter().zip(problem.blockmap()).zip(mats) {
                    out[b] = block.expand_matrix(X);
                }
                Some(out)
            }
        }
    }

    /// largest absolute entry of the primal matrices of the last external
    /// solve
    pub fn max_primal_entry(&self) -> T {
        self.state
            .result
            .as_ref()
            .map_or_else(T::zero, |r| r.max_primal_entry)
    }

    // ---------------------------------
    // bookkeeping
    // ---------------------------------

    /// time in seconds spent in the external solver during the last solve
    pub fn sdp_time(&self) -> f64 {
        self.state.opttime
    }

    /// iterations of the external solver during the last solve
    pub fn iterations(&self) -> u32 {
        self.state.niterations
    }

    /// number of external solves during the last solve
    pub fn sdp_calls(&self) -> u32 {
        self.state.nsdpcalls
    }

    /// Slater condition results of the last solve, as `(primal, dual)`
    pub fn slater(&self) -> (SdpSlater, SdpSlater) {
        (self.state.primalslater, self.state.dualslater)
    }

    /// parameter setting that produced the result of the last solve
    pub fn settings_used(&self) -> SolverSetting {
        let state = &self.state;
        if !state.solved || (state.infeasible && !state.penalty) || state.allfixed || state.onevar.is_some() {
            SolverSetting::Unsolved
        } else if state.penalty {
            SolverSetting::Penalty
        } else {
            state.result.as_ref().map_or(SolverSetting::Unsolved, |r| r.setting)
        }
    }

    /// Slater results of the last solve combined with the setting that
    /// solved it
    pub fn slater_settings(&self) -> SlaterSetting {
        let state = &self.state;
        let class = if !state.solved {
            if is_neg_infinite(state.bestbound) {
                SettingClass::Unsolved
            } else {
                SettingClass::Bounded
            }
        } else if (state.infeasible && !state.penalty) || state.allfixed || state.onevar.is_some() {
            return SlaterSetting::NoInfo;
        } else if state.penalty {
            SettingClass::Penalty
        } else {
            match self.settings_used() {
                SolverSetting::Fast => SettingClass::Stable,
                SolverSetting::Medium | SolverSetting::Stable => SettingClass::Unstable,
                _ => return SlaterSetting::NoInfo,
            }
        };
        SlaterSetting::combine(state.primalslater, state.dualslater, class)
    }

    // ---------------------------------
    // infinity
    // ---------------------------------

    /// value treated as infinite by this interface
    pub fn infinity(&self) -> T {
        infinity()
    }

    pub fn is_infinity(&self, val: T) -> bool {
        is_infinite(val)
    }
}

impl<T, B> ConfigurablePrintTarget for Sdpi<T, B>
where
    T: FloatT,
    B: SdpSolverBackend<T>,
{
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
}
