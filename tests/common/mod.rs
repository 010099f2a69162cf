// Shared fixtures for the integration tests: small problems with known
// solutions and a scripted external solver.

#![allow(dead_code)]

use sdpi::{algebra::*, solver::*};
use std::collections::VecDeque;
use std::time::Duration;

/// One recorded call into the scripted solver
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Solve { nvars: usize, warmstart: Option<Vec<f64>> },
    Penalty { gamma: f64, withobj: bool, rbound: bool },
}

/// External solver that answers from a queue of canned results and
/// records every call.  An exhausted queue answers with a solver failure.
pub struct ScriptedSolver {
    pub script: VecDeque<Result<BackendResult<f64>, BackendError>>,
    pub calls: Vec<Call>,
    pub problems: Vec<ReducedProblem<f64>>,
    pub gaptols: Vec<f64>,
    pub counter: u64,
    /// time every call takes
    pub delay: Duration,
    gaptol: f64,
}

impl ScriptedSolver {
    pub fn new(script: Vec<Result<BackendResult<f64>, BackendError>>) -> Self {
        Self {
            script: script.into(),
            calls: vec![],
            problems: vec![],
            gaptols: vec![],
            counter: 0,
            delay: Duration::ZERO,
            gaptol: 1e-4,
        }
    }

    fn next(&mut self, problem: &ReducedProblem<f64>) -> Result<BackendResult<f64>, BackendError> {
        self.problems.push(problem.clone());
        std::thread::sleep(self.delay);
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::SolverFailure("script exhausted".to_string())))
    }
}

impl SdpSolverBackend<f64> for ScriptedSolver {
    fn name(&self) -> &'static str {
        "scripted"
    }
    fn description(&self) -> &'static str {
        "replays canned results"
    }

    fn load_and_solve(
        &mut self,
        problem: &ReducedProblem<f64>,
        warmstart: Option<&WarmStart<f64>>,
        _time_limit: f64,
    ) -> Result<BackendResult<f64>, BackendError> {
        self.calls.push(Call::Solve {
            nvars: problem.nvars(),
            warmstart: warmstart.map(|ws| ws.y.clone()),
        });
        self.next(problem)
    }

    fn load_and_solve_with_penalty(
        &mut self,
        problem: &ReducedProblem<f64>,
        gamma: f64,
        withobj: bool,
        rbound: bool,
        _time_limit: f64,
    ) -> Result<BackendResult<f64>, BackendError> {
        self.calls.push(Call::Penalty {
            gamma,
            withobj,
            rbound,
        });
        self.next(problem)
    }

    fn gaptol(&self) -> f64 {
        self.gaptol
    }
    fn set_gaptol(&mut self, gaptol: f64) {
        self.gaptol = gaptol;
        self.gaptols.push(gaptol);
    }
    fn set_feastol(&mut self, _feastol: f64) {}
    fn set_epsilon(&mut self, _epsilon: f64) {}

    fn increase_counter(&mut self) {
        self.counter += 1;
    }
    fn reset_counter(&mut self) {
        self.counter = 0;
    }
}

pub fn optimal(objval: f64, y: &[f64]) -> Result<BackendResult<f64>, BackendError> {
    let mut result = BackendResult::new(BackendStatus::Optimal, objval);
    result.y = Some(y.to_vec());
    result.setting = SolverSetting::Fast;
    result.iterations = 10;
    Ok(result)
}

pub fn status(status: BackendStatus, objval: f64) -> Result<BackendResult<f64>, BackendError> {
    Ok(BackendResult::new(status, objval))
}

/// Penalty solve result with the given flags
pub fn penalty_result(objval: f64, feasorig: bool, penaltybound: bool) -> Result<BackendResult<f64>, BackendError> {
    let mut result = BackendResult::new(BackendStatus::Optimal, objval);
    result.y = Some(vec![objval, 0.0]);
    result.feasorig = feasorig;
    result.penaltybound = penaltybound;
    Ok(result)
}

pub fn diag(d: &[f64]) -> Triplets<f64> {
    let entries: Vec<_> = d.iter().enumerate().map(|(i, &v)| (i, i, v)).collect();
    Triplets::from_entries(&entries)
}

/// min y  s.t.  y diag(1,-1) + I ⪰ 0,  -5 <= y <= 5.
/// The feasible set is [-1, 1], the optimum y = -1.
pub fn worked_example() -> ProblemData<f64> {
    let block = SdpBlock::new(2, diag(&[1.0, 1.0]), vec![(0, diag(&[1.0, -1.0]))]).unwrap();
    ProblemData::new(vec![1.0], vec![-5.0], vec![5.0], vec![false], vec![block], vec![]).unwrap()
}

/// Three variables in one 2x2 block, y2 fixed to 0.5:
/// y0 E11 + y1 E22 + y2 (E12 + E21) + I ⪰ 0
pub fn three_var_problem() -> ProblemData<f64> {
    let block = SdpBlock::new(
        2,
        diag(&[1.0, 1.0]),
        vec![
            (0, diag(&[1.0, 0.0])),
            (1, diag(&[0.0, 1.0])),
            (2, Triplets::from_entries(&[(1, 0, 1.0)])),
        ],
    )
    .unwrap();
    ProblemData::new(
        vec![1.0, 1.0, 0.0],
        vec![-10.0, -10.0, 0.5],
        vec![10.0, 10.0, 0.5],
        vec![false; 3],
        vec![block],
        vec![],
    )
    .unwrap()
}
