use super::WorkingBounds;
use crate::algebra::*;
use crate::solver::data::LpRow;
use crate::solver::utils::infbounds::*;
use crate::solver::utils::index_changes;

// passes over the LP rows before giving up on reaching a fixpoint
const MAX_PASSES: usize = 50;

/// LP rows that remain after presolving, restricted to the unfixed
/// variables.  Variable indices still refer to the original problem.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PresolvedLp<T> {
    pub rows: Vec<LpRow<T>>,
    /// original index of each kept row
    pub rowmap: Vec<usize>,
    /// position of each original row among the kept rows, or -1
    pub indchanges: Vec<isize>,
}

impl<T> PresolvedLp<T> {
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LpPresolveStatus {
    Feasible,
    Infeasible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowOutcome {
    Keep,
    Redundant,
}

/// Presolver for the LP rows of one solve.
///
/// Each pass folds the currently fixed variables into the row sides,
/// tightens the coefficients of integral variables, turns rows with a
/// single unfixed variable into bounds and checks rows without unfixed
/// variables for feasibility.  Passes repeat until the bounds stop
/// changing, since a new bound may fix a variable and expose further
/// reducible rows.
pub(crate) struct LpPresolver<'a, T> {
    rows: &'a [LpRow<T>],
    isint: &'a [bool],
    epsilon: T,
    feastol: T,
    infbound: T,

    /// number of coefficients changed in the rows of the last pass
    pub nchgcoefs: usize,
    /// number of passes performed
    pub npasses: usize,
}

impl<'a, T> LpPresolver<'a, T>
where
    T: FloatT,
{
    pub fn new(rows: &'a [LpRow<T>], isint: &'a [bool], epsilon: T, feastol: T) -> Self {
        Self {
            rows,
            isint,
            epsilon,
            feastol,
            infbound: infinity(),
            nchgcoefs: 0,
            npasses: 0,
        }
    }

    /// Runs presolving passes to a fixpoint, tightening `bounds` in place.
    /// Returns `None` if the rows are infeasible for the bounds.
    pub fn presolve(&mut self, bounds: &mut WorkingBounds<T>) -> Option<PresolvedLp<T>> {
        loop {
            self.npasses += 1;
            let (status, changed, presolved) = self.pass(bounds);

            if status == LpPresolveStatus::Infeasible {
                tracing::debug!("LP rows infeasible after {} presolve passes", self.npasses);
                return None;
            }
            if !changed || self.npasses >= MAX_PASSES {
                return Some(presolved);
            }
        }
    }

    // One pass over all rows.  Returns whether any bound changed.  Every
    // pass starts again from the original rows, so it counts its own
    // coefficient changes.
    fn pass(&mut self, bounds: &mut WorkingBounds<T>) -> (LpPresolveStatus, bool, PresolvedLp<T>) {
        self.nchgcoefs = 0;
        let mut changed = false;
        let mut keep = vec![false; self.rows.len()];
        let mut rows = Vec::new();

        for (i, orig) in self.rows.iter().enumerate() {
            let mut row = self.fold_fixed(orig, bounds);

            if row.len() >= 2 && self.tighten_row(&mut row, bounds) == RowOutcome::Redundant {
                tracing::trace!("LP row {} is redundant", i);
                continue;
            }

            match row.len() {
                0 => {
                    if row.lhs > self.feastol || row.rhs < -self.feastol {
                        tracing::debug!("empty LP row {} violates its sides", i);
                        return (LpPresolveStatus::Infeasible, changed, self.empty());
                    }
                }
                1 => {
                    let (status, tightened) = self.row_to_bound(i, &row, bounds);
                    changed |= tightened;
                    if status == LpPresolveStatus::Infeasible {
                        return (status, changed, self.empty());
                    }
                }
                _ => {
                    keep[i] = true;
                    rows.push(row);
                }
            }
        }

        let rowmap = keep
            .iter()
            .enumerate()
            .filter(|(_, &k)| k)
            .map(|(i, _)| i)
            .collect();
        let presolved = PresolvedLp {
            rows,
            rowmap,
            indchanges: index_changes(&keep),
        };
        (LpPresolveStatus::Feasible, changed, presolved)
    }

    fn empty(&self) -> PresolvedLp<T> {
        PresolvedLp {
            rows: vec![],
            rowmap: vec![],
            indchanges: vec![-1; self.rows.len()],
        }
    }

    // copy of the row without its fixed variables, whose contribution
    // shifts the finite sides, and without coefficients below epsilon
    fn fold_fixed(&self, orig: &LpRow<T>, bounds: &WorkingBounds<T>) -> LpRow<T> {
        let mut rowconst = T::zero();
        let mut row = LpRow {
            lhs: orig.lhs,
            rhs: orig.rhs,
            ind: Vec::with_capacity(orig.len()),
            val: Vec::with_capacity(orig.len()),
        };
        for (j, a) in orig.iter() {
            if bounds.is_fixed(j, self.epsilon) {
                rowconst += a * bounds.lb[j];
            } else if a.abs() > self.epsilon {
                row.ind.push(j);
                row.val.push(a);
            }
        }
        row.lhs = if is_neg_infinite(orig.lhs) {
            -self.infbound
        } else {
            orig.lhs - rowconst
        };
        row.rhs = if is_pos_infinite(orig.rhs) {
            self.infbound
        } else {
            orig.rhs - rowconst
        };
        row
    }

    // Converts a row with a single variable into bounds on that variable
    fn row_to_bound(
        &self,
        i: usize,
        row: &LpRow<T>,
        bounds: &mut WorkingBounds<T>,
    ) -> (LpPresolveStatus, bool) {
        let (j, a) = (row.ind[0], row.val[0]);
        let tag = (i + 1) as isize;
        let inf = self.infbound;

        let from_lhs = if is_neg_infinite(row.lhs) { None } else { Some(row.lhs / a) };
        let from_rhs = if is_pos_infinite(row.rhs) { None } else { Some(row.rhs / a) };

        // dividing by a negative coefficient swaps the sides
        let ((lb, lbtag), (ub, ubtag)) = if a > T::zero() {
            ((from_lhs.unwrap_or(-inf), -tag), (from_rhs.unwrap_or(inf), tag))
        } else {
            ((from_rhs.unwrap_or(-inf), tag), (from_lhs.unwrap_or(inf), -tag))
        };

        let mut changed = false;
        if lb > bounds.lb[j] + self.epsilon {
            tracing::trace!("LP row {} raises lower bound of {} to {}", i, j, lb);
            bounds.lb[j] = lb;
            bounds.lbrowidx[j] = lbtag;
            changed = true;
        }
        if ub < bounds.ub[j] - self.epsilon {
            tracing::trace!("LP row {} lowers upper bound of {} to {}", i, j, ub);
            bounds.ub[j] = ub;
            bounds.ubrowidx[j] = ubtag;
            changed = true;
        }

        if bounds.ub[j] < bounds.lb[j] - self.epsilon {
            tracing::debug!("LP row {} gives conflicting bounds for variable {}", i, j);
            return (LpPresolveStatus::Infeasible, changed);
        }
        (LpPresolveStatus::Feasible, changed)
    }

    // Tightens the coefficients of integral variables in a row with at
    // least two entries, repeating until no coefficient changes.
    fn tighten_row(&mut self, row: &mut LpRow<T>, bounds: &WorkingBounds<T>) -> RowOutcome {
        let eps = self.epsilon;

        while row.len() >= 2 {
            let act = Activity::compute(row, bounds, self.isint, self.infbound);

            let lhsinf = is_neg_infinite(row.lhs);
            let rhsinf = is_pos_infinite(row.rhs);
            let lhsredundant = lhsinf || (!act.mininf && act.min >= row.lhs - eps);
            let rhsredundant = rhsinf || (!act.maxinf && act.max <= row.rhs + eps);
            if lhsredundant && rhsredundant {
                return RowOutcome::Redundant;
            }

            // equations are not expected to be tightened
            if (row.lhs - row.rhs).abs() < eps || !act.hasint || (act.mininf && act.maxinf) {
                break;
            }
            let minact = if act.mininf { -self.infbound } else { act.min };
            let maxact = if act.maxinf { self.infbound } else { act.max };
            if minact + act.maxintabs < row.lhs - eps || maxact - act.maxintabs > row.rhs + eps {
                break;
            }

            let candidate = row.iter().enumerate().find_map(|(k, (j, a))| {
                if !self.isint[j] {
                    return None;
                }
                let lhs_ok = lhsinf || (!act.mininf && act.min + a.abs() >= row.lhs - eps);
                let rhs_ok = rhsinf || (!act.maxinf && act.max - a.abs() <= row.rhs + eps);
                if !(lhs_ok && rhs_ok) {
                    return None;
                }
                let fromlhs = (!lhsinf).then(|| row.lhs - act.min);
                let fromrhs = (!rhsinf).then(|| act.max - row.rhs);
                let newabs = match (fromlhs, fromrhs) {
                    (Some(l), Some(r)) => T::max(l, r),
                    (Some(l), None) => l,
                    (None, Some(r)) => r,
                    (None, None) => return None,
                };
                let newval = if a > T::zero() { newabs } else { -newabs };
                ((newval - a).abs() > eps).then_some((k, j, a, newval))
            });

            let Some((k, j, a, newval)) = candidate else {
                break;
            };

            // a > 0 moves the lhs with the lower bound and the rhs with the
            // upper bound, a < 0 the other way round
            let (lhsbound, rhsbound) = if a > T::zero() {
                (bounds.lb[j], bounds.ub[j])
            } else {
                (bounds.ub[j], bounds.lb[j])
            };
            if !lhsinf {
                row.lhs += (newval - a) * lhsbound;
            }
            if !rhsinf {
                row.rhs += (newval - a) * rhsbound;
            }
            self.nchgcoefs += 1;
            tracing::trace!("tightened coefficient of {} from {} to {}", j, a, newval);

            let vanished = if a > T::zero() { newval <= eps } else { newval >= -eps };
            if vanished {
                row.ind.remove(k);
                row.val.remove(k);
            } else {
                row.val[k] = newval;
            }
        }
        RowOutcome::Keep
    }
}

// minimal and maximal activity of a row over the working bounds
struct Activity<T> {
    min: T,
    max: T,
    mininf: bool,
    maxinf: bool,
    maxintabs: T,
    hasint: bool,
}

impl<T> Activity<T>
where
    T: FloatT,
{
    fn compute(row: &LpRow<T>, bounds: &WorkingBounds<T>, isint: &[bool], infbound: T) -> Self {
        let mut act = Self {
            min: T::zero(),
            max: T::zero(),
            mininf: false,
            maxinf: false,
            maxintabs: T::zero(),
            hasint: false,
        };
        for (j, a) in row.iter() {
            let (lb, ub) = (bounds.lb[j], bounds.ub[j]);
            if isint[j] {
                act.maxintabs = T::max(act.maxintabs, a.abs());
                act.hasint = true;
            }
            let (minbound, maxbound) = if a > T::zero() { (lb, ub) } else { (ub, lb) };
            if minbound.abs() < infbound {
                act.min += a * minbound;
            } else {
                act.mininf = true;
            }
            if maxbound.abs() < infbound {
                act.max += a * maxbound;
            } else {
                act.maxinf = true;
            }
        }
        act
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::data::ProblemData;
    use proptest::prelude::*;

    fn setup(lb: Vec<f64>, ub: Vec<f64>, isint: Vec<bool>, rows: Vec<LpRow<f64>>) -> ProblemData<f64> {
        let n = lb.len();
        ProblemData::new(vec![0.0; n], lb, ub, isint, vec![], rows).unwrap()
    }

    #[test]
    fn test_single_entry_equation_fixes_variable() {
        let data = setup(
            vec![-5.0],
            vec![5.0],
            vec![false],
            vec![LpRow::new(0.0, 0.0, &[(0, 2.0)])],
        );
        let mut bounds = WorkingBounds::new(&data);
        let mut presolver = LpPresolver::new(&data.lprows, &data.isint, 1e-9, 1e-6);
        let lp = presolver.presolve(&mut bounds).unwrap();

        assert_eq!(lp.nrows(), 0);
        assert_eq!(lp.indchanges, vec![-1]);
        assert_eq!((bounds.lb[0], bounds.ub[0]), (0.0, 0.0));
        assert!(bounds.is_fixed(0, 1e-9));
        assert_eq!((bounds.lbrowidx[0], bounds.ubrowidx[0]), (-1, 1));
    }

    #[test]
    fn test_negative_coefficient_swaps_sides() {
        // 1 <= -2 y <= 4  =>  -2 <= y <= -0.5
        let data = setup(
            vec![-10.0],
            vec![10.0],
            vec![false],
            vec![LpRow::new(1.0, 4.0, &[(0, -2.0)])],
        );
        let mut bounds = WorkingBounds::new(&data);
        LpPresolver::new(&data.lprows, &data.isint, 1e-9, 1e-6)
            .presolve(&mut bounds)
            .unwrap();

        assert_eq!((bounds.lb[0], bounds.ub[0]), (-2.0, -0.5));
        assert_eq!((bounds.lbrowidx[0], bounds.ubrowidx[0]), (1, -1));
    }

    #[test]
    fn test_fixings_cascade() {
        // the second row fixes y0 = 1, which turns the first row into y1 = 1
        let data = setup(
            vec![0.0, 0.0, 0.0],
            vec![3.0, 3.0, 3.0],
            vec![false; 3],
            vec![
                LpRow::new(2.0, 2.0, &[(0, 1.0), (1, 1.0)]),
                LpRow::new(1.0, 1.0, &[(0, 1.0)]),
                LpRow::new(-1.0, 10.0, &[(1, 1.0), (2, 1.0)]),
            ],
        );
        let mut bounds = WorkingBounds::new(&data);
        let mut presolver = LpPresolver::new(&data.lprows, &data.isint, 1e-9, 1e-6);
        let lp = presolver.presolve(&mut bounds).unwrap();

        assert!(bounds.is_fixed(0, 1e-9) && bounds.is_fixed(1, 1e-9));
        assert_eq!(bounds.lb[1], 1.0);
        // the last row is redundant for y2 in [0,3] after fixing y1
        assert_eq!(lp.nrows(), 0);
        assert!(presolver.npasses >= 2);
    }

    #[test]
    fn test_empty_row_infeasible() {
        let data = setup(
            vec![1.0],
            vec![1.0],
            vec![false],
            vec![LpRow::new(2.0, 3.0, &[(0, 1.0)])],
        );
        let mut bounds = WorkingBounds::new(&data);
        let lp = LpPresolver::new(&data.lprows, &data.isint, 1e-9, 1e-6).presolve(&mut bounds);
        assert!(lp.is_none());
    }

    #[test]
    fn test_conflicting_row_bounds() {
        let data = setup(
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            vec![false; 2],
            vec![LpRow::new(2.0, 5.0, &[(0, 1.0)])],
        );
        let mut bounds = WorkingBounds::new(&data);
        let lp = LpPresolver::new(&data.lprows, &data.isint, 1e-9, 1e-6).presolve(&mut bounds);
        assert!(lp.is_none());
    }

    #[test]
    fn test_coefficient_tightening() {
        // 3 x0 + y1 >= 1 with x0 binary, y1 in [0, 1]: the coefficient of
        // x0 shrinks to 1 - 0 = 1 and the lhs is unchanged since lb = 0
        let data = setup(
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            vec![true, false],
            vec![LpRow::new(1.0, f64::INFINITY, &[(0, 3.0), (1, 1.0)])],
        );
        let mut bounds = WorkingBounds::new(&data);
        let mut presolver = LpPresolver::new(&data.lprows, &data.isint, 1e-9, 1e-6);
        let lp = presolver.presolve(&mut bounds).unwrap();

        assert_eq!(lp.nrows(), 1);
        assert_eq!(lp.rows[0].val, vec![1.0, 1.0]);
        assert_eq!(lp.rows[0].lhs, 1.0);
        assert_eq!(presolver.nchgcoefs, 1);
        assert_eq!(lp.rowmap, vec![0]);
    }

    #[test]
    fn test_tightening_counted_once_over_passes() {
        // the second row fixes y2 and forces another pass, which tightens
        // the first row again from scratch
        let data = setup(
            vec![0.0, 0.0, 0.0],
            vec![1.0, 1.0, 2.0],
            vec![true, false, false],
            vec![
                LpRow::new(1.0, f64::INFINITY, &[(0, 3.0), (1, 1.0)]),
                LpRow::new(1.0, 1.0, &[(2, 1.0)]),
            ],
        );
        let mut bounds = WorkingBounds::new(&data);
        let mut presolver = LpPresolver::new(&data.lprows, &data.isint, 1e-9, 1e-6);
        let lp = presolver.presolve(&mut bounds).unwrap();

        assert_eq!(presolver.npasses, 2);
        assert_eq!(presolver.nchgcoefs, 1);
        assert_eq!(lp.rows[0].val, vec![1.0, 1.0]);
        assert!(bounds.is_fixed(2, 1e-9));
    }

    #[test]
    fn test_redundant_row_removed() {
        let data = setup(
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            vec![false; 2],
            vec![
                LpRow::new(-1.0, 3.0, &[(0, 1.0), (1, 1.0)]),
                LpRow::new(0.5, 3.0, &[(0, 1.0), (1, 1.0)]),
            ],
        );
        let mut bounds = WorkingBounds::new(&data);
        let lp = LpPresolver::new(&data.lprows, &data.isint, 1e-9, 1e-6)
            .presolve(&mut bounds)
            .unwrap();

        assert_eq!(lp.indchanges, vec![-1, 0]);
        assert_eq!(lp.rowmap, vec![1]);
    }

    #[test]
    fn test_presolve_is_idempotent() {
        let data = setup(
            vec![0.0, 0.0, -1.0],
            vec![1.0, 4.0, 1.0],
            vec![true, true, false],
            vec![
                LpRow::new(1.0, f64::INFINITY, &[(0, 5.0), (1, 1.0), (2, 1.0)]),
                LpRow::new(-f64::INFINITY, 3.0, &[(1, 2.0), (2, -1.0)]),
            ],
        );
        let mut bounds = WorkingBounds::new(&data);
        let lp = LpPresolver::new(&data.lprows, &data.isint, 1e-9, 1e-6)
            .presolve(&mut bounds)
            .unwrap();

        let mut again = bounds.clone();
        let mut presolver = LpPresolver::new(&lp.rows, &data.isint, 1e-9, 1e-6);
        let lp2 = presolver.presolve(&mut again).unwrap();

        assert_eq!(lp2.rows, lp.rows);
        assert_eq!(again.lb, bounds.lb);
        assert_eq!(again.ub, bounds.ub);
        assert_eq!(presolver.nchgcoefs, 0);
    }

    fn arb_row(nvars: usize) -> impl Strategy<Value = LpRow<f64>> {
        let entries = prop::collection::vec((0..nvars, -3i32..=3), 1..=nvars);
        let lhs = prop_oneof![Just(None), (-5i32..=5).prop_map(Some)];
        let width = prop_oneof![Just(None), (0i32..=6).prop_map(Some)];
        (entries, lhs, width).prop_map(|(entries, lhs, width)| {
            let entries: Vec<(usize, f64)> = entries.into_iter().map(|(j, a)| (j, a as f64)).collect();
            let lo = lhs.map_or(-f64::INFINITY, |l| l as f64);
            let hi = match (lhs, width) {
                (Some(l), Some(w)) => (l + w) as f64,
                (None, Some(w)) => w as f64,
                (_, None) => f64::INFINITY,
            };
            LpRow::new(lo, hi, &entries)
        })
    }

    proptest! {
        #[test]
        fn test_presolve_fixpoint(
            lbs in prop::collection::vec(-3i32..=0, 3),
            widths in prop::collection::vec(0i32..=4, 3),
            isint in prop::collection::vec(any::<bool>(), 3),
            rows in prop::collection::vec(arb_row(3), 1..=3),
        ) {
            let lb: Vec<f64> = lbs.iter().map(|&l| l as f64).collect();
            let ub: Vec<f64> = lbs.iter().zip(&widths).map(|(&l, &w)| (l + w) as f64).collect();
            let data = setup(lb, ub, isint, rows);

            let mut bounds = WorkingBounds::new(&data);
            let lp = LpPresolver::new(&data.lprows, &data.isint, 1e-9, 1e-6).presolve(&mut bounds);
            prop_assume!(lp.is_some());
            let lp = lp.unwrap();

            // presolving the presolved rows again changes nothing
            let mut again = bounds.clone();
            let lp2 = LpPresolver::new(&lp.rows, &data.isint, 1e-9, 1e-6)
                .presolve(&mut again)
                .unwrap();
            prop_assert_eq!(lp2.rows, lp.rows);
            prop_assert_eq!(again.lb, bounds.lb);
            prop_assert_eq!(again.ub, bounds.ub);
        }
    }
}
