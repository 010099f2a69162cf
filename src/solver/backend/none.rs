use super::*;

/// Placeholder backend for builds without an SDP solver.
///
/// Problems that presolving settles completely are still solved.  Any
/// call to the external solver fails with
/// [`BackendError::NotAvailable`].
#[derive(Debug, Clone)]
pub struct NoSolver<T> {
    gaptol: T,
    counter: u64,
}

impl<T> NoSolver<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self {
            gaptol: (1e-4).as_T(),
            counter: 0,
        }
    }

    /// number of solves finished without calling a solver
    pub fn counter(&self) -> u64 {
        self.counter
    }
}

impl<T> Default for NoSolver<T>
where
    T: FloatT,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SdpSolverBackend<T> for NoSolver<T>
where
    T: FloatT,
{
    fn name(&self) -> &'static str {
        "none"
    }

    fn description(&self) -> &'static str {
        "no SDP solver linked"
    }

    fn load_and_solve(
        &mut self,
        _problem: &ReducedProblem<T>,
        _warmstart: Option<&WarmStart<T>>,
        _time_limit: f64,
    ) -> Result<BackendResult<T>, BackendError> {
        Err(BackendError::NotAvailable(self.name()))
    }

    fn load_and_solve_with_penalty(
        &mut self,
        _problem: &ReducedProblem<T>,
        _gamma: T,
        _withobj: bool,
        _rbound: bool,
        _time_limit: f64,
    ) -> Result<BackendResult<T>, BackendError> {
        Err(BackendError::NotAvailable(self.name()))
    }

    fn gaptol(&self) -> T {
        self.gaptol
    }
    fn set_gaptol(&mut self, gaptol: T) {
        self.gaptol = gaptol;
    }
    fn set_feastol(&mut self, _feastol: T) {}
    fn set_epsilon(&mut self, _epsilon: T) {}

    fn increase_counter(&mut self) {
        self.counter += 1;
    }
    fn reset_counter(&mut self) {
        self.counter = 0;
    }
}
