/// Counters of the degenerate cases handled by the interface itself.
///
/// The counters accumulate over all solves of an instance and are reset
/// when new problem data is loaded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SdpiStatistics {
    /// number of solves found infeasible while preparing the problem
    pub ninfeasible: u64,
    /// number of solves where all variables were fixed
    pub nallfixed: u64,
    /// number of solves handled by the single variable solver
    pub nonevarsdp: u64,
}

impl SdpiStatistics {
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
