//! Interface to external SDP solvers.
//!
//! An external solver receives the [`ReducedProblem`] built by presolving
//! and answers with a [`BackendResult`] in the reduced numbering.  The
//! interface expands results back to the original problem.
//!
//! In the problem handed to a backend, the variables `y` belong to the
//! *dual* problem
//!
//! $$
//! \min\ b^T y \quad \text{s.t.} \quad \sum_j A_j y_j + C \succeq 0,\ \
//! \ell_{\text{lp}} \le D y \le u_{\text{lp}},\ \ \ell \le y \le u,
//! $$
//!
//! where each block stores its constant as `C = -A_0`.
//!
//! and the matrix variables `X` to the primal one.  Statuses are reported
//! from that point of view.

#![allow(non_snake_case)]

use crate::algebra::*;
use crate::solver::core::SolverSetting;
use crate::solver::presolve::{ReducedProblem, WarmStart};
use thiserror::Error;

mod none;
pub use none::*;

/// Error type returned by external solvers that fail internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("No SDP solver available ({0})")]
    NotAvailable(&'static str),
    #[error("SDP solver failed: {0}")]
    SolverFailure(String),
}

/// Termination status of an external solve
#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
pub enum BackendStatus {
    /// No solve took place
    #[default]
    Unsolved,
    /// Both problems solved to optimality
    Optimal,
    /// The primal problem is infeasible
    PrimalInfeasible,
    /// The primal problem is unbounded
    PrimalUnbounded,
    /// The dual problem is infeasible
    DualInfeasible,
    /// The dual problem is unbounded
    DualUnbounded,
    /// Objective limit reached
    ObjectiveLimit,
    /// Iteration limit reached
    IterationLimit,
    /// Time limit reached
    TimeLimit,
    /// Numerical trouble
    NumericalError,
    /// Terminated without any of the above
    Unknown,
}

impl BackendStatus {
    /// true if the solver could decide the feasibility of both problems
    pub fn feasibility_known(&self) -> bool {
        matches!(
            *self,
            BackendStatus::Optimal
                | BackendStatus::PrimalInfeasible
                | BackendStatus::PrimalUnbounded
                | BackendStatus::DualInfeasible
                | BackendStatus::DualUnbounded
        )
    }
    pub fn is_primal_feasible(&self) -> bool {
        matches!(*self, BackendStatus::Optimal | BackendStatus::PrimalUnbounded)
    }
    pub fn is_primal_infeasible(&self) -> bool {
        matches!(*self, BackendStatus::PrimalInfeasible | BackendStatus::DualUnbounded)
    }
    pub fn is_primal_unbounded(&self) -> bool {
        matches!(*self, BackendStatus::PrimalUnbounded)
    }
    pub fn is_dual_feasible(&self) -> bool {
        matches!(*self, BackendStatus::Optimal | BackendStatus::DualUnbounded)
    }
    pub fn is_dual_infeasible(&self) -> bool {
        matches!(*self, BackendStatus::DualInfeasible | BackendStatus::PrimalUnbounded)
    }
    pub fn is_dual_unbounded(&self) -> bool {
        matches!(*self, BackendStatus::DualUnbounded)
    }
    pub fn is_optimal(&self) -> bool {
        matches!(*self, BackendStatus::Optimal)
    }
    pub fn is_converged(&self) -> bool {
        self.feasibility_known()
    }

    /// Internal status code: 0 converged, 1 objective limit, 2 iteration
    /// limit, 3 time limit, 4 numerical error, 7 anything else.
    pub fn code(&self) -> i32 {
        match *self {
            s if s.is_converged() => 0,
            BackendStatus::ObjectiveLimit => 1,
            BackendStatus::IterationLimit => 2,
            BackendStatus::TimeLimit => 3,
            BackendStatus::NumericalError => 4,
            _ => 7,
        }
    }
}

impl std::fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Result of one external solve, in the numbering of the
/// [`ReducedProblem`] that was solved.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResult<T> {
    pub status: BackendStatus,
    /// objective value of the dual problem
    pub objval: T,
    /// dual solution vector
    pub y: Option<Vec<T>>,
    /// primal values belonging to the variable lower and upper bounds
    pub primal_lb: Option<Vec<T>>,
    pub primal_ub: Option<Vec<T>>,
    /// primal values belonging to the LP row sides
    pub primal_lhs: Option<Vec<T>>,
    pub primal_rhs: Option<Vec<T>>,
    /// primal solution matrix of each block
    pub primal_matrices: Option<Vec<Matrix<T>>>,
    /// largest absolute entry of the primal solution matrices
    pub max_primal_entry: T,
    /// whether the penalty solution is feasible for the unpenalized
    /// problem (penalty solves only)
    pub feasorig: bool,
    /// whether the bound on the penalty variable was active (penalty
    /// solves only)
    pub penaltybound: bool,
    pub iterations: u32,
    pub sdpcalls: u32,
    /// solve time in seconds
    pub time: f64,
    pub setting: SolverSetting,
}

impl<T> BackendResult<T>
where
    T: FloatT,
{
    /// A result with the given status and no solution data
    pub fn new(status: BackendStatus, objval: T) -> Self {
        Self {
            status,
            objval,
            y: None,
            primal_lb: None,
            primal_ub: None,
            primal_lhs: None,
            primal_rhs: None,
            primal_matrices: None,
            max_primal_entry: T::zero(),
            feasorig: false,
            penaltybound: false,
            iterations: 0,
            sdpcalls: 1,
            time: 0.0,
            setting: SolverSetting::Unsolved,
        }
    }

    pub fn is_acceptable(&self) -> bool {
        self.status.is_converged()
    }
}

/// An external SDP solver.
///
/// Backends solve the reduced problem either directly or in its penalty
/// formulation
///
/// $$
/// \min\ b^T y + \Gamma r \quad \text{s.t.} \quad
/// \sum_j A_j y_j + C + I r \succeq 0,\ \ldots,\ r \ge 0,
/// $$
///
/// where the objective term `b^T y` is dropped unless `withobj` is set,
/// and the bound `r >= 0` only enforced when `rbound` is set.
pub trait SdpSolverBackend<T: FloatT> {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// default number of penalty increases of the escalation loop
    fn default_npenalty_increases(&self) -> u32 {
        8
    }

    /// whether a warm start needs the primal matrices
    fn warmstart_needs_primal(&self) -> bool {
        false
    }

    fn load_and_solve(
        &mut self,
        problem: &ReducedProblem<T>,
        warmstart: Option<&WarmStart<T>>,
        time_limit: f64,
    ) -> Result<BackendResult<T>, BackendError>;

    fn load_and_solve_with_penalty(
        &mut self,
        problem: &ReducedProblem<T>,
        gamma: T,
        withobj: bool,
        rbound: bool,
        time_limit: f64,
    ) -> Result<BackendResult<T>, BackendError>;

    fn gaptol(&self) -> T;
    fn set_gaptol(&mut self, gaptol: T);
    fn set_feastol(&mut self, feastol: T);
    fn set_epsilon(&mut self, epsilon: T);

    /// called whenever a solve is finished without the backend
    fn increase_counter(&mut self) {}
    fn reset_counter(&mut self) {}
}
