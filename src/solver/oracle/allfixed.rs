#![allow(non_snake_case)]

use crate::algebra::*;

/// Outcome of the eigenvalue test of a problem with all variables fixed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AllFixedVerdict<T> {
    pub feasible: bool,
    /// first block with a negative eigenvalue, and a unit eigenvector
    /// for its smallest eigenvalue
    pub certificate: Option<(usize, Vec<T>)>,
}

/// Checks whether the constant matrices `C_k` of a problem without free
/// variables are all positive semidefinite up to `feastol`.
///
/// `constants` are the folded constant matrices of the blocks (see
/// [`constants_after_fixings`](crate::solver::presolve)) and `sizes`
/// their dimensions.  The LP rows are checked by the LP presolver.
pub(crate) fn check_fixed_feasibility<T: FloatT>(
    sizes: &[usize],
    constants: &[Triplets<T>],
    feastol: T,
) -> Result<AllFixedVerdict<T>, DenseFactorizationError> {
    for (b, (&n, C)) in sizes.iter().zip(constants).enumerate() {
        if n == 0 {
            continue;
        }
        let A = Matrix::from_symmetric_triplets(n, C, T::one());
        let (λ, v) = compute_ith_eigenvalue(&A, 0, true)?;

        if λ < -feastol {
            tracing::debug!(
                "all variables fixed, block {} infeasible with minimal eigenvalue {}",
                b,
                λ
            );
            return Ok(AllFixedVerdict {
                feasible: false,
                certificate: v.map(|v| (b, v)),
            });
        }
    }
    Ok(AllFixedVerdict {
        feasible: true,
        certificate: None,
    })
}
