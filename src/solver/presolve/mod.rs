//! Per-solve presolving of the persistent problem data.
//!
//! Every solve starts from fresh working copies of the variable bounds.
//! The LP presolver tightens them until no further fixings are found, the
//! constant matrix builder folds the fixed variables into each block and
//! the index compactor produces the reduced problem handed to the external
//! solver.  None of these touch the persistent data.

use crate::algebra::*;
use crate::solver::data::ProblemData;

mod compact;
mod constmat;
mod lp;

pub use compact::*;
pub(crate) use constmat::*;
pub(crate) use lp::*;

/// Working copy of the variable bounds of one solve.
///
/// `lbrowidx[j]` and `ubrowidx[j]` record the LP row that produced the
/// current bound of variable `j`, if any: `k + 1` if it came from the
/// right hand side of row `k`, `-(k + 1)` if it came from its left hand
/// side and 0 if the bound is the original one.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WorkingBounds<T> {
    pub lb: Vec<T>,
    pub ub: Vec<T>,
    pub lbrowidx: Vec<isize>,
    pub ubrowidx: Vec<isize>,
}

impl<T> WorkingBounds<T>
where
    T: FloatT,
{
    pub fn new(data: &ProblemData<T>) -> Self {
        let n = data.nvars();
        Self {
            lb: data.lb.clone(),
            ub: data.ub.clone(),
            lbrowidx: vec![0; n],
            ubrowidx: vec![0; n],
        }
    }

    pub fn nvars(&self) -> usize {
        self.lb.len()
    }

    pub fn is_fixed(&self, j: usize, epsilon: T) -> bool {
        (self.ub[j] - self.lb[j]).abs() <= epsilon
    }

    /// first variable whose upper bound is below its lower bound
    pub fn find_conflict(&self, tol: T) -> Option<usize> {
        (0..self.nvars()).find(|&j| self.ub[j] < self.lb[j] - tol)
    }

    /// number of variables that are not fixed
    pub fn nactive(&self, epsilon: T) -> usize {
        (0..self.nvars()).filter(|&j| !self.is_fixed(j, epsilon)).count()
    }

    /// objective contribution `sum obj[j] * lb[j]` of the fixed variables
    pub fn fixed_objective(&self, obj: &[T], epsilon: T) -> T {
        (0..self.nvars())
            .filter(|&j| self.is_fixed(j, epsilon))
            .fold(T::zero(), |acc, j| acc + obj[j] * self.lb[j])
    }
}

#[test]
fn test_working_bounds() {
    let data = ProblemData::new(
        vec![1.0, 2.0, 3.0],
        vec![0.0, 1.0, 2.0],
        vec![1.0, 1.0, 1.0],
        vec![false; 3],
        vec![],
        vec![],
    )
    .unwrap();

    let bounds = WorkingBounds::new(&data);
    assert!(bounds.is_fixed(1, 1e-9));
    assert_eq!(bounds.nactive(1e-9), 2);
    assert_eq!(bounds.find_conflict(1e-6), Some(2));
    assert_eq!(bounds.fixed_objective(&data.obj, 1e-9), 2.0);
}
