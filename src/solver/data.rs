#![allow(non_snake_case)]

use crate::algebra::*;
use crate::solver::utils::index_changes;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Error type returned by problem loading and data updates.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DataUpdateError {
    #[error("Data has incompatible dimensions")]
    BadDimension,
    #[error("Index {0} out of range")]
    IndexOutOfRange(usize),
    #[error("Invalid index range")]
    BadRange,
    #[error("Entry ({0},{1}) is not in the lower triangle")]
    NotSymmetricStorage(usize, usize),
    #[error("Block data is inconsistent")]
    BadBlock,
    #[error("LP coefficient of variable {0} is too close to zero")]
    SmallCoefficient(usize),
}

// LP coefficients of at most this magnitude are treated as zero
const LP_ZERO_TOL: f64 = 1e-9;

// ---------------------------------
// LP rows
// ---------------------------------

/// Linear constraint `lhs <= sum_j val[j] * y[ind[j]] <= rhs`.
///
/// Either side may be infinite, see [`get_infinity`](crate::solver::get_infinity).
#[derive(Debug, Clone, PartialEq)]
pub struct LpRow<T> {
    pub lhs: T,
    pub rhs: T,
    /// variable indices, strictly increasing
    pub ind: Vec<usize>,
    /// coefficients, larger than 1e-9 in magnitude
    pub val: Vec<T>,
}

impl<T> LpRow<T>
where
    T: FloatT,
{
    /// Creates a row from (variable, coefficient) pairs.  Entries on the
    /// same variable are summed and coefficients of magnitude at most
    /// 1e-9 dropped.
    pub fn new(lhs: T, rhs: T, entries: &[(usize, T)]) -> Self {
        let mut entries = entries.to_vec();
        entries.sort_by_key(|&(j, _)| j);

        let mut row = Self {
            lhs,
            rhs,
            ind: Vec::with_capacity(entries.len()),
            val: Vec::with_capacity(entries.len()),
        };
        for (j, v) in entries {
            match row.ind.last() {
                Some(&last) if last == j => {
                    if let Some(prev) = row.val.last_mut() {
                        *prev += v;
                    }
                }
                _ => {
                    row.ind.push(j);
                    row.val.push(v);
                }
            }
        }
        let tol: T = LP_ZERO_TOL.as_T();
        let keep: Vec<bool> = row.val.iter().map(|v| v.abs() > tol).collect();
        if keep.iter().any(|k| !k) {
            row.ind = row.ind.iter().zip(&keep).filter(|p| *p.1).map(|p| *p.0).collect();
            row.val = row.val.iter().zip(&keep).filter(|p| *p.1).map(|p| *p.0).collect();
        }
        row
    }

    pub fn len(&self) -> usize {
        self.ind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ind.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        self.ind.iter().copied().zip(self.val.iter().copied())
    }
}

// ---------------------------------
// SDP blocks
// ---------------------------------

/// One semidefinite constraint `sum_j A_j y_j - A_0 ⪰ 0` of dimension
/// `size`.
///
/// Each participating variable owns a canonical lower triangular triplet
/// list for its matrix `A_j`.  The constant list holds `C = -A_0` in the
/// same form, so the constraint reads `sum_j A_j y_j + C ⪰ 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct SdpBlock<T> {
    pub(crate) size: usize,
    pub(crate) vars: Vec<usize>,
    pub(crate) matrices: Vec<Triplets<T>>,
    pub(crate) constant: Triplets<T>,
}

impl<T> SdpBlock<T>
where
    T: FloatT,
{
    /// Creates a block of dimension `size` from its constant matrix and
    /// a list of (variable, matrix) pairs.
    ///
    /// All triplets must lie in the lower triangle.  Duplicate entries are
    /// summed and zeros dropped; matrices given twice for the same variable
    /// are summed as well.  Variables whose matrix ends up empty are
    /// not recorded as part of the block.
    pub fn new(
        size: usize,
        constant: Triplets<T>,
        matrices: Vec<(usize, Triplets<T>)>,
    ) -> Result<Self, DataUpdateError> {
        check_triplets(size, &constant)?;
        let constant = merge_into_new(None, Some(&constant), T::zero());

        let mut matrices = matrices;
        matrices.sort_by_key(|(v, _)| *v);

        let mut vars: Vec<usize> = Vec::with_capacity(matrices.len());
        let mut mats: Vec<Triplets<T>> = Vec::with_capacity(matrices.len());
        for (v, M) in matrices {
            check_triplets(size, &M)?;
            match (vars.last(), mats.last_mut()) {
                (Some(&last), Some(prev)) if last == v => {
                    *prev = merge_into_new(Some(&*prev), Some(&M), T::zero());
                }
                _ => {
                    vars.push(v);
                    mats.push(merge_into_new(None, Some(&M), T::zero()));
                }
            }
        }

        // drop variables with empty matrices
        let keep: Vec<bool> = mats.iter().map(|M| !M.is_empty()).collect();
        let vars = vars.into_iter().zip(&keep).filter(|p| *p.1).map(|p| p.0).collect();
        let matrices = mats.into_iter().zip(&keep).filter(|p| *p.1).map(|p| p.0).collect();

        Ok(Self {
            size,
            vars,
            matrices,
            constant,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// variables with a nonzero matrix in this block, increasing
    pub fn vars(&self) -> &[usize] {
        &self.vars
    }

    /// matrix of variable `var`, if it appears in the block
    pub fn matrix(&self, var: usize) -> Option<&Triplets<T>> {
        self.vars
            .binary_search(&var)
            .ok()
            .map(|k| &self.matrices[k])
    }

    pub fn constant(&self) -> &Triplets<T> {
        &self.constant
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &Triplets<T>)> + '_ {
        self.vars.iter().copied().zip(self.matrices.iter())
    }

    /// number of nonzeros over all variable matrices
    pub fn nnonz(&self) -> usize {
        self.matrices.iter().map(|M| M.len()).sum()
    }
}

fn check_triplets<T: FloatT>(size: usize, M: &Triplets<T>) -> Result<(), DataUpdateError> {
    if M.row.len() != M.val.len() || M.col.len() != M.val.len() {
        return Err(DataUpdateError::BadBlock);
    }
    for (r, c, _) in M.iter() {
        if r < c {
            return Err(DataUpdateError::NotSymmetricStorage(r, c));
        }
        if r >= size {
            return Err(DataUpdateError::IndexOutOfRange(r));
        }
    }
    Ok(())
}

// ---------------------------------
// problem data
// ---------------------------------

/// Persistent problem data of an SDP interface: objective, variable bounds
/// and integrality, SDP blocks and LP rows.
///
/// The data is only ever read by a solve.  Presolving works on scratch
/// copies that are discarded afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProblemData<T> {
    pub(crate) obj: Vec<T>,
    pub(crate) lb: Vec<T>,
    pub(crate) ub: Vec<T>,
    pub(crate) isint: Vec<bool>,
    pub(crate) blocks: Vec<SdpBlock<T>>,
    pub(crate) lprows: Vec<LpRow<T>>,
}

impl<T> ProblemData<T>
where
    T: FloatT,
{
    /// Bulk problem load.  `obj`, `lb`, `ub` and `isint` are indexed by
    /// variable and must have the same length.
    pub fn new(
        obj: Vec<T>,
        lb: Vec<T>,
        ub: Vec<T>,
        isint: Vec<bool>,
        blocks: Vec<SdpBlock<T>>,
        lprows: Vec<LpRow<T>>,
    ) -> Result<Self, DataUpdateError> {
        let n = obj.len();
        if lb.len() != n || ub.len() != n || isint.len() != n {
            return Err(DataUpdateError::BadDimension);
        }
        for block in &blocks {
            if let Some(&v) = block.vars.iter().find(|&&v| v >= n) {
                return Err(DataUpdateError::IndexOutOfRange(v));
            }
        }
        check_lp_rows(n, &lprows)?;

        Ok(Self {
            obj,
            lb,
            ub,
            isint,
            blocks,
            lprows,
        })
    }

    // ---------------------------------
    // getters
    // ---------------------------------

    pub fn nvars(&self) -> usize {
        self.obj.len()
    }
    pub fn nblocks(&self) -> usize {
        self.blocks.len()
    }
    pub fn nlprows(&self) -> usize {
        self.lprows.len()
    }

    /// number of nonzeros in all variable matrices of all blocks
    pub fn sdp_nnonz(&self) -> usize {
        self.blocks.iter().map(|b| b.nnonz()).sum()
    }
    /// number of nonzeros in all constant matrices
    pub fn const_nnonz(&self) -> usize {
        self.blocks.iter().map(|b| b.constant.len()).sum()
    }
    /// number of nonzeros in the LP rows
    pub fn lp_nnonz(&self) -> usize {
        self.lprows.iter().map(|r| r.len()).sum()
    }

    pub fn block_sizes(&self) -> Vec<usize> {
        self.blocks.iter().map(|b| b.size).collect()
    }
    pub fn blocks(&self) -> &[SdpBlock<T>] {
        &self.blocks
    }
    pub fn lp_rows(&self) -> &[LpRow<T>] {
        &self.lprows
    }
    pub fn isint(&self) -> &[bool] {
        &self.isint
    }

    /// objective coefficients of the variables in `range`
    pub fn obj(&self, range: RangeInclusive<usize>) -> Result<&[T], DataUpdateError> {
        check_range(&range, self.nvars())?;
        Ok(&self.obj[range])
    }

    /// lower and upper bounds of the variables in `range`
    pub fn bounds(&self, range: RangeInclusive<usize>) -> Result<(&[T], &[T]), DataUpdateError> {
        check_range(&range, self.nvars())?;
        Ok((&self.lb[range.clone()], &self.ub[range]))
    }

    /// left hand sides of the LP rows in `range`
    pub fn lhs(&self, range: RangeInclusive<usize>) -> Result<Vec<T>, DataUpdateError> {
        check_range(&range, self.nlprows())?;
        Ok(self.lprows[range].iter().map(|r| r.lhs).collect())
    }

    /// right hand sides of the LP rows in `range`
    pub fn rhs(&self, range: RangeInclusive<usize>) -> Result<Vec<T>, DataUpdateError> {
        check_range(&range, self.nlprows())?;
        Ok(self.lprows[range].iter().map(|r| r.rhs).collect())
    }

    // ---------------------------------
    // mutators
    // ---------------------------------

    pub fn add_lp_rows(&mut self, rows: Vec<LpRow<T>>) -> Result<(), DataUpdateError> {
        check_lp_rows(self.nvars(), &rows)?;
        self.lprows.extend(rows);
        Ok(())
    }

    /// deletes the LP rows `first..=last`
    pub fn del_lp_rows(&mut self, range: RangeInclusive<usize>) -> Result<(), DataUpdateError> {
        check_range(&range, self.nlprows())?;
        self.lprows.drain(range);
        Ok(())
    }

    /// Deletes every LP row `i` with `mask[i] == true`.  Returns the new
    /// position of each row, or -1 for deleted rows.
    pub fn del_lp_rowset(&mut self, mask: &[bool]) -> Result<Vec<isize>, DataUpdateError> {
        if mask.len() != self.nlprows() {
            return Err(DataUpdateError::BadDimension);
        }
        let keep: Vec<bool> = mask.iter().map(|&m| !m).collect();
        let mut it = keep.iter();
        self.lprows.retain(|_| it.next().copied().unwrap_or(true));
        Ok(index_changes(&keep))
    }

    /// removes all problem data
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn chg_obj(&mut self, ind: &[usize], obj: &[T]) -> Result<(), DataUpdateError> {
        if ind.len() != obj.len() {
            return Err(DataUpdateError::BadDimension);
        }
        check_indices(ind, self.nvars())?;
        for (&j, &c) in ind.iter().zip(obj) {
            self.obj[j] = c;
        }
        Ok(())
    }

    pub fn chg_bounds(&mut self, ind: &[usize], lb: &[T], ub: &[T]) -> Result<(), DataUpdateError> {
        if ind.len() != lb.len() || ind.len() != ub.len() {
            return Err(DataUpdateError::BadDimension);
        }
        check_indices(ind, self.nvars())?;
        for (k, &j) in ind.iter().enumerate() {
            self.lb[j] = lb[k];
            self.ub[j] = ub[k];
        }
        Ok(())
    }

    pub fn chg_lp_lhrhsides(
        &mut self,
        rows: &[usize],
        lhs: &[T],
        rhs: &[T],
    ) -> Result<(), DataUpdateError> {
        if rows.len() != lhs.len() || rows.len() != rhs.len() {
            return Err(DataUpdateError::BadDimension);
        }
        check_indices(rows, self.nlprows())?;
        for (k, &i) in rows.iter().enumerate() {
            self.lprows[i].lhs = lhs[k];
            self.lprows[i].rhs = rhs[k];
        }
        Ok(())
    }
}

fn check_range(range: &RangeInclusive<usize>, len: usize) -> Result<(), DataUpdateError> {
    if range.start() > range.end() || *range.end() >= len {
        return Err(DataUpdateError::BadRange);
    }
    Ok(())
}

fn check_indices(ind: &[usize], len: usize) -> Result<(), DataUpdateError> {
    match ind.iter().find(|&&j| j >= len) {
        Some(&j) => Err(DataUpdateError::IndexOutOfRange(j)),
        None => Ok(()),
    }
}

fn check_lp_rows<T: FloatT>(nvars: usize, rows: &[LpRow<T>]) -> Result<(), DataUpdateError> {
    for row in rows {
        if row.ind.len() != row.val.len() {
            return Err(DataUpdateError::BadDimension);
        }
        check_indices(&row.ind, nvars)?;

        let tol: T = LP_ZERO_TOL.as_T();
        if let Some((&j, _)) = row.ind.iter().zip(&row.val).find(|(_, v)| v.abs() <= tol) {
            return Err(DataUpdateError::SmallCoefficient(j));
        }
    }
    Ok(())
}
