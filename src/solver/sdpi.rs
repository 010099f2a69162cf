use crate::algebra::*;
use crate::io::PrintTarget;
use crate::solver::backend::*;
use crate::solver::core::*;
use crate::solver::data::*;
use crate::solver::oracle::*;
use crate::solver::presolve::*;
use crate::solver::utils::infbounds::*;
use crate::timers::*;
use std::ops::RangeInclusive;
use thiserror::Error;

// smallest gap tolerance tried by the penalty escalation
const MIN_GAPTOL: f64 = 1e-10;

/// Error type returned by [`Sdpi::solve`].
///
/// Infeasibility, failure to converge and exhausted time limits are
/// reported through the status queries and never as errors.
#[derive(Error, Debug)]
pub enum SdpiError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("Eigenvalue computation failed: {0}")]
    Factorization(#[from] DenseFactorizationError),
}

// Outcome of the most recent solve.  Derived fresh from the persistent
// data at the start of every solve.
#[derive(Debug, Clone)]
pub(crate) struct SolveState<T> {
    pub solved: bool,
    pub penalty: bool,
    pub infeasible: bool,
    pub allfixed: bool,
    pub timelimit: bool,
    pub bestbound: T,

    pub onevar: Option<OneVarSolution<T>>,
    pub allfixed_cert: Option<(usize, Vec<T>)>,
    pub primalslater: SdpSlater,
    pub dualslater: SdpSlater,

    pub niterations: u32,
    pub nsdpcalls: u32,
    pub opttime: f64,

    pub bounds: WorkingBounds<T>,
    pub lpindchanges: Vec<isize>,
    pub problem: Option<ReducedProblem<T>>,
    pub result: Option<BackendResult<T>>,
}

impl<T> SolveState<T>
where
    T: FloatT,
{
    fn new(data: &ProblemData<T>) -> Self {
        Self {
            solved: false,
            penalty: false,
            infeasible: false,
            allfixed: false,
            timelimit: false,
            bestbound: -infinity::<T>(),
            onevar: None,
            allfixed_cert: None,
            primalslater: SdpSlater::NoInfo,
            dualslater: SdpSlater::NoInfo,
            niterations: 0,
            nsdpcalls: 0,
            opttime: 0.0,
            bounds: WorkingBounds::new(data),
            lpindchanges: vec![-1; data.nlprows()],
            problem: None,
            result: None,
        }
    }

    fn accumulate(&mut self, result: &BackendResult<T>) {
        self.niterations += result.iterations;
        self.nsdpcalls += result.sdpcalls;
        self.opttime += result.time;
    }
}

/// An SDP interface instance.
///
/// Holds the persistent problem data of one relaxation together with an
/// external solver `B`.  Every call to [`solve`](Sdpi::solve) presolves
/// the data, settles the degenerate cases itself and otherwise hands
/// the reduced problem to the external solver, escalating to the penalty
/// formulation if the solver fails.
pub struct Sdpi<T: FloatT = f64, B = NoSolver<T>> {
    pub(crate) data: ProblemData<T>,
    pub(crate) settings: SdpiSettings<T>,
    pub(crate) backend: B,
    pub(crate) state: SolveState<T>,
    pub(crate) statistics: SdpiStatistics,
    pub(crate) timers: Timers,
    pub(crate) stream: PrintTarget,
}

impl<T, B> Sdpi<T, B>
where
    T: FloatT,
    B: SdpSolverBackend<T>,
{
    pub fn new(backend: B, settings: SdpiSettings<T>) -> Self {
        let data = ProblemData::default();
        let mut sdpi = Self {
            state: SolveState::new(&data),
            data,
            settings,
            backend,
            statistics: SdpiStatistics::default(),
            timers: Timers::default(),
            stream: PrintTarget::default(),
        };
        sdpi.sync_backend_tolerances();
        sdpi
    }

    /// Deep copy of the problem data and settings with a fresh, unsolved
    /// external solver.
    pub fn clone_with_backend<B2: SdpSolverBackend<T>>(&self, backend: B2) -> Sdpi<T, B2> {
        let mut sdpi = Sdpi::new(backend, self.settings.clone());
        sdpi.data = self.data.clone();
        sdpi.state = SolveState::new(&sdpi.data);
        sdpi
    }

    // ---------------------------------
    // settings and solver access
    // ---------------------------------

    pub fn settings(&self) -> &SdpiSettings<T> {
        &self.settings
    }

    pub fn get_param(&self, param: SdpiParam) -> T {
        self.settings.get_param(param)
    }

    /// Sets a parameter by key.  Tolerances are forwarded to the external
    /// solver.
    pub fn set_param(&mut self, param: SdpiParam, value: T) -> Result<(), SettingsError> {
        self.settings.set_param(param, value)?;
        self.sync_backend_tolerances();
        Ok(())
    }

    fn sync_backend_tolerances(&mut self) {
        self.backend.set_gaptol(self.settings.gaptol);
        self.backend.set_feastol(self.settings.feastol);
        self.backend.set_epsilon(self.settings.epsilon);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn solver_name(&self) -> &'static str {
        self.backend.name()
    }
    pub fn solver_description(&self) -> &'static str {
        self.backend.description()
    }
    pub fn default_npenalty_increases(&self) -> u32 {
        self.backend.default_npenalty_increases()
    }
    pub fn warmstart_needs_primal(&self) -> bool {
        self.backend.warmstart_needs_primal()
    }

    // ---------------------------------
    // problem data
    // ---------------------------------

    pub fn data(&self) -> &ProblemData<T> {
        &self.data
    }

    /// Loads new problem data, replacing the old one.  Resets the
    /// statistics counters.
    pub fn load_sdp(&mut self, data: ProblemData<T>) {
        self.data = data;
        self.statistics.reset();
        self.backend.reset_counter();
        self.invalidate();
    }

    pub fn add_lp_rows(&mut self, rows: Vec<LpRow<T>>) -> Result<(), DataUpdateError> {
        self.data.add_lp_rows(rows)?;
        self.invalidate();
        Ok(())
    }

    pub fn del_lp_rows(&mut self, range: RangeInclusive<usize>) -> Result<(), DataUpdateError> {
        self.data.del_lp_rows(range)?;
        self.invalidate();
        Ok(())
    }

    /// Deletes the LP rows flagged in `mask` and returns the new
    /// position of every row (-1 if deleted).
    pub fn del_lp_rowset(&mut self, mask: &[bool]) -> Result<Vec<isize>, DataUpdateError> {
        let newpos = self.data.del_lp_rowset(mask)?;
        self.invalidate();
        Ok(newpos)
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.invalidate();
    }

    pub fn chg_obj(&mut self, ind: &[usize], obj: &[T]) -> Result<(), DataUpdateError> {
        self.data.chg_obj(ind, obj)?;
        self.invalidate();
        Ok(())
    }

    pub fn chg_bounds(&mut self, ind: &[usize], lb: &[T], ub: &[T]) -> Result<(), DataUpdateError> {
        self.data.chg_bounds(ind, lb, ub)?;
        self.invalidate();
        Ok(())
    }

    pub fn chg_lp_lhrhsides(
        &mut self,
        rows: &[usize],
        lhs: &[T],
        rhs: &[T],
    ) -> Result<(), DataUpdateError> {
        self.data.chg_lp_lhrhsides(rows, lhs, rhs)?;
        self.invalidate();
        Ok(())
    }

    fn invalidate(&mut self) {
        self.state = SolveState::new(&self.data);
    }

    /// counters of the degenerate cases over all solves since loading
    pub fn statistics(&self) -> &SdpiStatistics {
        &self.statistics
    }

    // ---------------------------------
    // solve
    // ---------------------------------

    /// Solves the current problem.
    ///
    /// `warmstart` is forwarded to the external solver on the first,
    /// unpenalized attempt.  If `enforce_slater_check` is set, the Slater
    /// conditions are checked and reported whenever the external solver
    /// fails for good.  `time_limit` is the budget in seconds for the
    /// whole call, including all penalty attempts.
    pub fn solve(
        &mut self,
        warmstart: Option<&WarmStart<T>>,
        enforce_slater_check: bool,
        time_limit: f64,
    ) -> Result<(), SdpiError> {
        self.state = SolveState::new(&self.data);
        self.timers.reset();
        self.sync_backend_tolerances();

        if time_limit <= 0.0 {
            tracing::debug!("time limit reached before solving");
            self.state.timelimit = true;
            return Ok(());
        }

        let status;
        timeit! {self.timers => "solve"; {
            status = self.solve_inner(warmstart, enforce_slater_check, time_limit);
        }}

        if self.settings.verbose {
            if let Err(e) = self.print_solve_summary() {
                tracing::warn!("failed to print the solve summary: {}", e);
            }
        }
        status
    }

    fn solve_inner(
        &mut self,
        warmstart: Option<&WarmStart<T>>,
        enforce_slater_check: bool,
        time_limit: f64,
    ) -> Result<(), SdpiError> {
        let eps = self.settings.epsilon;
        let feastol = self.settings.feastol;

        // conflicting bounds
        if let Some(j) = self.state.bounds.find_conflict(feastol) {
            tracing::debug!(
                "variable {} has conflicting bounds [{}, {}]",
                j,
                self.state.bounds.lb[j],
                self.state.bounds.ub[j]
            );
            self.finish_presolve_infeasible();
            return Ok(());
        }

        let lp;
        timeit! {self.timers => "presolve"; {
            let mut presolver = LpPresolver::new(&self.data.lprows, &self.data.isint, eps, feastol);
            lp = presolver.presolve(&mut self.state.bounds);
        }}
        let Some(lp) = lp else {
            self.finish_presolve_infeasible();
            return Ok(());
        };
        self.state.lpindchanges = lp.indchanges.clone();

        let bounds = &self.state.bounds;
        let nactive = bounds.nactive(eps);
        let fixedobj = bounds.fixed_objective(&self.data.obj, eps);
        let constants = constants_after_fixings(&self.data.blocks, bounds, eps);

        if nactive == 0 {
            let verdict;
            timeit! {self.timers => "oracle"; {
                verdict = check_fixed_feasibility(&self.data.block_sizes(), &constants, feastol);
            }}
            let verdict = verdict?;
            self.state.allfixed = true;
            self.state.infeasible = !verdict.feasible;
            self.state.allfixed_cert = verdict.certificate;
            self.state.solved = true;
            self.statistics.nallfixed += 1;
            self.backend.increase_counter();
            return Ok(());
        }

        if nactive == 1 && self.data.nblocks() <= 1 {
            let onevar;
            timeit! {self.timers => "oracle"; {
                onevar = self.solve_one_var(&constants);
            }}
            if let Some(mut sol) = onevar? {
                if sol.status == OneVarStatus::Optimal {
                    sol.objval += fixedobj;
                }
                self.state.onevar = Some(sol);
                self.state.solved = true;
                self.statistics.nonevarsdp += 1;
                self.backend.increase_counter();
                return Ok(());
            }
        }

        let problem = IndexCompactor::new(eps).compact(
            &self.data,
            &self.state.bounds,
            &constants,
            &lp,
        );

        let outcome = self.dispatch(&problem, warmstart, enforce_slater_check, time_limit);
        self.state.problem = Some(problem);
        outcome
    }

    fn finish_presolve_infeasible(&mut self) {
        self.state.infeasible = true;
        self.state.solved = true;
        self.state.primalslater = SdpSlater::NoInfo;
        self.state.dualslater = SdpSlater::NoInfo;
        self.statistics.ninfeasible += 1;
        self.backend.increase_counter();
    }

    fn solve_one_var(
        &self,
        constants: &[Triplets<T>],
    ) -> Result<Option<OneVarSolution<T>>, DenseFactorizationError> {
        let bounds = &self.state.bounds;
        let eps = self.settings.epsilon;
        let Some(j) = (0..bounds.nvars()).find(|&j| !bounds.is_fixed(j, eps)) else {
            return Ok(None);
        };
        let (c, lb, ub) = (self.data.obj[j], bounds.lb[j], bounds.ub[j]);

        match self.data.blocks.first() {
            None => Ok(solve_one_var_lp(j, c, lb, ub)),
            Some(block) => solve_one_var_sdp(
                j,
                c,
                lb,
                ub,
                block.size,
                &constants[0],
                block.matrix(j),
                self.settings.feastol,
            ),
        }
    }

    // seconds left of the budget of the current solve
    pub(crate) fn remaining_time(&self, time_limit: f64) -> f64 {
        time_limit - self.timers.total_time().as_secs_f64()
    }

    fn dispatch(
        &mut self,
        problem: &ReducedProblem<T>,
        warmstart: Option<&WarmStart<T>>,
        enforce_slater_check: bool,
        time_limit: f64,
    ) -> Result<(), SdpiError> {
        if self.settings.slatercheck != SlaterCheck::None {
            timeit! {self.timers => "slater"; {
                self.check_slater(problem, time_limit, false);
            }}
        }

        let remaining = self.remaining_time(time_limit);
        if remaining <= 0.0 {
            self.state.timelimit = true;
            return Ok(());
        }

        let warmstart = warmstart.map(|ws| problem.compact_warmstart(ws));
        let result;
        timeit! {self.timers => "backend"; {
            result = self.backend.load_and_solve(problem, warmstart.as_ref(), remaining);
        }}
        let result = result?;
        self.state.accumulate(&result);
        self.state.solved = true;

        let escalate = !result.is_acceptable() && result.status != BackendStatus::TimeLimit;
        self.state.result = Some(result);

        if escalate {
            tracing::debug!(
                "{} failed with status {}, switching to the penalty formulation",
                self.backend.name(),
                self.backend_status()
            );
            let outcome;
            timeit! {self.timers => "penalty"; {
                outcome = self.escalate(problem, enforce_slater_check, time_limit);
            }}
            outcome?;
        }
        Ok(())
    }

    // Solves the penalty formulation with increasing penalty weight and
    // decreasing gap tolerance until the solution is feasible for the
    // original problem.
    fn escalate(
        &mut self,
        problem: &ReducedProblem<T>,
        enforce_slater_check: bool,
        time_limit: f64,
    ) -> Result<(), SdpiError> {
        let settings = self.settings.clone();

        // the feasibility problem min r  s.t.  A(y) + I r ⪰ 0
        let remaining = self.remaining_time(time_limit);
        if remaining <= 0.0 {
            // the unacceptable first result does not settle the solve
            self.state.timelimit = true;
            self.state.solved = false;
            return Ok(());
        }
        let result =
            self.backend
                .load_and_solve_with_penalty(problem, T::one(), false, false, remaining)?;
        self.state.accumulate(&result);

        let threshold = settings.peninfeasadjust * T::max(settings.feastol, settings.gaptol);
        let certified = (result.status.is_optimal() && result.objval > threshold)
            || result.status.is_dual_infeasible();
        if certified {
            tracing::debug!("penalty feasibility problem certifies infeasibility");
            self.state.penalty = true;
            self.state.infeasible = true;
            self.state.result = Some(result);
            return Ok(());
        }
        self.state.result = Some(result);

        let mingaptol: T = MIN_GAPTOL.as_T();
        let maxpen = settings.maxpenaltyparam;
        let mut pen = settings.penaltyparam;
        let mut gaptol = settings.gaptol;

        let (penfact, gapfact) = if settings.npenaltyincr > 0 {
            let nincr: T = settings.npenaltyincr.as_T();
            let n = T::one() / nincr;
            ((maxpen / pen).powf(n), (mingaptol / gaptol).powf(n))
        } else {
            let (two, half): (T, T) = ((2.).as_T(), (0.5).as_T());
            (two * maxpen / pen, half * mingaptol / gaptol)
        };

        let mut acceptable = false;
        let mut feasorig = false;
        let mut gaptol_changed = false;

        let gapfloor = mingaptol * (0.99).as_T();
        while (!acceptable || !feasorig) && pen < maxpen + settings.epsilon && gaptol > gapfloor {
            let remaining = self.remaining_time(time_limit);
            if remaining <= 0.0 {
                self.state.timelimit = true;
                self.state.solved = false;
                break;
            }

            tracing::debug!("solving penalty formulation with Γ = {} and gaptol = {}", pen, gaptol);
            let result = match self
                .backend
                .load_and_solve_with_penalty(problem, pen, true, true, remaining)
            {
                Ok(result) => result,
                Err(e) => {
                    self.backend.set_gaptol(settings.gaptol);
                    return Err(e.into());
                }
            };
            self.state.accumulate(&result);

            if result.status == BackendStatus::TimeLimit {
                self.state.result = Some(result);
                self.state.solved = false;
                break;
            }

            acceptable = result.is_acceptable();
            if !acceptable {
                pen *= penfact;
                self.state.result = Some(result);
                continue;
            }

            feasorig = result.feasorig;
            if result.objval > self.state.bestbound + gaptol {
                self.state.bestbound = result.objval;
            }
            if !feasorig {
                if result.penaltybound {
                    pen *= penfact;
                } else {
                    gaptol *= gapfact;
                    self.backend.set_gaptol(gaptol);
                    gaptol_changed = true;
                }
            }
            self.state.result = Some(result);
        }

        if gaptol_changed {
            self.backend.set_gaptol(settings.gaptol);
        }

        self.state.penalty = true;
        self.state.solved = acceptable && feasorig;

        if !self.state.solved {
            if enforce_slater_check {
                timeit! {self.timers => "slater"; {
                    self.check_slater(problem, time_limit, true);
                }}
            } else {
                tracing::debug!(
                    "penalty formulation did not solve the problem, best bound {}",
                    self.state.bestbound
                );
            }
        }
        Ok(())
    }

    pub(crate) fn backend_status(&self) -> BackendStatus {
        self.state
            .result
            .as_ref()
            .map_or(BackendStatus::Unsolved, |r| r.status)
    }
}
