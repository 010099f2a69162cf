#![allow(non_snake_case)]

use super::{PresolvedLp, WorkingBounds};
use crate::algebra::*;
use crate::solver::data::{LpRow, ProblemData};
use crate::solver::utils::{index_changes, PositionAll};

/// One SDP block of a [`ReducedProblem`].
///
/// Rows and columns that no unfixed variable and no constant entry
/// touches are removed, and the remaining indices renumbered.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedBlock<T> {
    /// dimension after removing empty rows and columns
    pub size: usize,
    /// variables (in reduced numbering) with a matrix in this block
    pub vars: Vec<usize>,
    /// matrix of each variable in `vars`
    pub matrices: Vec<Triplets<T>>,
    /// constant matrix `C = -A_0` with all fixed variables folded in
    pub constant: Triplets<T>,

    // original index of each reduced row/column
    pub(crate) indmap: Vec<usize>,
    pub(crate) origsize: usize,
}

impl<T> ReducedBlock<T>
where
    T: FloatT,
{
    pub fn matrix(&self, var: usize) -> Option<&Triplets<T>> {
        self.vars
            .binary_search(&var)
            .ok()
            .map(|k| &self.matrices[k])
    }

    /// original index of each row and column of the block
    pub fn indmap(&self) -> &[usize] {
        &self.indmap
    }

    /// Embeds a matrix of the reduced dimension into a zero matrix of
    /// the original block dimension.
    pub fn expand_matrix(&self, X: &Matrix<T>) -> Matrix<T> {
        let mut out = Matrix::zeros((self.origsize, self.origsize));
        for (c, &oc) in self.indmap.iter().enumerate() {
            for (r, &or) in self.indmap.iter().enumerate() {
                out[(or, oc)] = X[(r, c)];
            }
        }
        out
    }
}

/// The problem handed to an external solver.
///
/// Only unfixed variables and non-empty blocks survive.  LP rows are
/// the ones left by presolving, restricted to the unfixed variables.  All
/// indices are renumbered consecutively, and the maps back to the
/// original numbering are kept for expanding results.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReducedProblem<T> {
    pub obj: Vec<T>,
    pub lb: Vec<T>,
    pub ub: Vec<T>,
    pub isint: Vec<bool>,
    pub blocks: Vec<ReducedBlock<T>>,
    pub lprows: Vec<LpRow<T>>,

    pub(crate) varmap: Vec<usize>,
    pub(crate) blockmap: Vec<usize>,
    pub(crate) rowmap: Vec<usize>,
    pub(crate) norigrows: usize,
}

impl<T> ReducedProblem<T>
where
    T: FloatT,
{
    pub fn nvars(&self) -> usize {
        self.obj.len()
    }
    pub fn nblocks(&self) -> usize {
        self.blocks.len()
    }
    pub fn nlprows(&self) -> usize {
        self.lprows.len()
    }

    /// original index of each reduced variable
    pub fn varmap(&self) -> &[usize] {
        &self.varmap
    }
    /// original index of each reduced block
    pub fn blockmap(&self) -> &[usize] {
        &self.blockmap
    }
    /// original index of each reduced LP row
    pub fn rowmap(&self) -> &[usize] {
        &self.rowmap
    }

    /// Expands values of the reduced variables to all variables, taking
    /// the entries of `fill` for the variables that were removed.
    pub fn expand_vars(&self, x: &[T], fill: &[T]) -> Vec<T> {
        let mut out = fill.to_vec();
        for (&j, &v) in self.varmap.iter().zip(x) {
            out[j] = v;
        }
        out
    }

    /// Expands values of the reduced LP rows to all original rows, with
    /// zero for rows removed by presolving.
    pub fn expand_rows(&self, x: &[T]) -> Vec<T> {
        let mut out = vec![T::zero(); self.norigrows];
        for (&i, &v) in self.rowmap.iter().zip(x) {
            out[i] = v;
        }
        out
    }

    /// Restricts a warm start point given in the original numbering to
    /// this problem.  Missing entries are taken as zero.
    pub fn compact_warmstart(&self, ws: &WarmStart<T>) -> WarmStart<T> {
        let y = self
            .varmap
            .iter()
            .map(|&j| ws.y.get(j).copied().unwrap_or_else(T::zero))
            .collect();
        let compact_mats = |mats: &Vec<Triplets<T>>| {
            self.blocks
                .iter()
                .zip(&self.blockmap)
                .map(|(block, &b)| {
                    mats.get(b)
                        .map(|M| restrict_triplets(M, block))
                        .unwrap_or_default()
                })
                .collect()
        };
        WarmStart {
            y,
            Z: ws.Z.as_ref().map(compact_mats),
            X: ws.X.as_ref().map(compact_mats),
        }
    }
}

// entries of M on kept rows and columns, renumbered
fn restrict_triplets<T: FloatT>(M: &Triplets<T>, block: &ReducedBlock<T>) -> Triplets<T> {
    let mut newind = vec![-1_isize; block.origsize];
    for (k, &i) in block.indmap.iter().enumerate() {
        newind[i] = k as isize;
    }
    let mut out = Triplets::new();
    for (r, c, v) in M.iter() {
        let (nr, nc) = (
            newind.get(r).copied().unwrap_or(-1),
            newind.get(c).copied().unwrap_or(-1),
        );
        if nr >= 0 && nc >= 0 {
            out.push(nr as usize, nc as usize, v);
        }
    }
    out
}

/// Starting point for the external solver, in the original numbering.
///
/// `Z` and `X` hold the dual slack and primal matrices of each block
/// as lower triangular triplets.
#[derive(Debug, Clone, PartialEq)]
pub struct WarmStart<T> {
    pub y: Vec<T>,
    pub Z: Option<Vec<Triplets<T>>>,
    pub X: Option<Vec<Triplets<T>>>,
}

/// Builds the [`ReducedProblem`] of a presolved problem.
pub(crate) struct IndexCompactor<T> {
    epsilon: T,
}

impl<T> IndexCompactor<T>
where
    T: FloatT,
{
    pub fn new(epsilon: T) -> Self {
        Self { epsilon }
    }

    /// Marks the rows and columns of a block touched by an unfixed
    /// variable or by the folded constant.  Returns the renumbering
    /// table of the block (new index or -1).
    pub fn block_indchanges(
        &self,
        data: &ProblemData<T>,
        b: usize,
        bounds: &WorkingBounds<T>,
        constant: &Triplets<T>,
    ) -> Vec<isize> {
        let block = &data.blocks[b];
        let mut touched = vec![false; block.size];

        let active = block
            .iter()
            .filter(|&(j, _)| !bounds.is_fixed(j, self.epsilon))
            .map(|(_, M)| M);
        for M in active.chain(std::iter::once(constant)) {
            for (r, c, _) in M.iter() {
                touched[r] = true;
                touched[c] = true;
            }
        }
        index_changes(&touched)
    }

    pub fn compact(
        &self,
        data: &ProblemData<T>,
        bounds: &WorkingBounds<T>,
        constants: &[Triplets<T>],
        lp: &PresolvedLp<T>,
    ) -> ReducedProblem<T> {
        let active: Vec<bool> = (0..data.nvars())
            .map(|j| !bounds.is_fixed(j, self.epsilon))
            .collect();
        let varmap = active.iter().position_all(|&&a| a);
        let varpos = index_changes(&active);

        let mut blocks = Vec::with_capacity(data.nblocks());
        let mut blockmap = Vec::with_capacity(data.nblocks());

        for (b, block) in data.blocks.iter().enumerate() {
            let indchanges = self.block_indchanges(data, b, bounds, &constants[b]);
            let indmap = indchanges.iter().position_all(|&&k| k >= 0);
            if indmap.is_empty() {
                tracing::debug!("block {} is empty and not given to the solver", b);
                continue;
            }
            if indmap.len() < block.size {
                tracing::trace!(
                    "removed {} empty rows and columns from block {}",
                    block.size - indmap.len(),
                    b
                );
            }

            let renumber = |M: &Triplets<T>| {
                let mut out = Triplets::with_capacity(M.len());
                for (r, c, v) in M.iter() {
                    out.push(indchanges[r] as usize, indchanges[c] as usize, v);
                }
                out
            };

            let (vars, matrices) = block
                .iter()
                .filter(|&(j, _)| active[j])
                .map(|(j, M)| (varpos[j] as usize, renumber(M)))
                .unzip();

            blocks.push(ReducedBlock {
                size: indmap.len(),
                vars,
                matrices,
                constant: renumber(&constants[b]),
                indmap,
                origsize: block.size,
            });
            blockmap.push(b);
        }

        let lprows = lp
            .rows
            .iter()
            .map(|row| LpRow {
                lhs: row.lhs,
                rhs: row.rhs,
                ind: row.ind.iter().map(|&j| varpos[j] as usize).collect(),
                val: row.val.clone(),
            })
            .collect();

        ReducedProblem {
            obj: varmap.iter().map(|&j| data.obj[j]).collect(),
            lb: varmap.iter().map(|&j| bounds.lb[j]).collect(),
            ub: varmap.iter().map(|&j| bounds.ub[j]).collect(),
            isint: varmap.iter().map(|&j| data.isint[j]).collect(),
            blocks,
            lprows,
            varmap,
            blockmap,
            rowmap: lp.rowmap.clone(),
            norigrows: data.nlprows(),
        }
    }
}
