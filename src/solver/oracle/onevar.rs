#![allow(non_snake_case)]

use crate::algebra::*;
use crate::solver::core::OneVarStatus;
use crate::solver::utils::infbounds::*;

const MAX_NEWTON_ITER: usize = 100;

/// Solution of a problem with a single free variable.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OneVarSolution<T> {
    pub status: OneVarStatus,
    /// index of the free variable
    pub idx: usize,
    /// objective value, +infinity if infeasible
    pub objval: T,
    /// value of the free variable
    pub optval: T,
    /// supergradient of the minimal eigenvalue function at `optval`,
    /// None if no SDP block was involved
    pub certval: Option<T>,
    /// unit eigenvector belonging to the minimal eigenvalue at `optval`
    pub certvec: Vec<T>,
}

/// Solves `min c y` subject to `lb <= y <= ub` for a problem without SDP
/// blocks.  Returns `None` if the optimum is not attained at a finite
/// bound.
pub(crate) fn solve_one_var_lp<T: FloatT>(idx: usize, c: T, lb: T, ub: T) -> Option<OneVarSolution<T>> {
    if is_infinite(lb) || is_infinite(ub) {
        return None;
    }
    let optval = if c >= T::zero() { lb } else { ub };
    Some(OneVarSolution {
        status: OneVarStatus::Optimal,
        idx,
        objval: c * optval,
        optval,
        certval: None,
        certvec: vec![],
    })
}

/// Solves `min c y` subject to `y A + C ⪰ 0` and `lb <= y <= ub` with a
/// semismooth Newton method on the minimal eigenvalue function
/// `f(y) = λ_min(y A + C)`.
///
/// `f` is concave, so starting from the bound that is best for the
/// objective and following the supergradient towards the other bound
/// reaches the first feasible point without overshooting it.  A missing
/// matrix `A` is treated as zero.
///
/// Returns `None` if the starting bound is infinite or Newton does not
/// converge, in which case the general solver has to be used.
#[allow(clippy::too_many_arguments)]
pub(crate) fn solve_one_var_sdp<T: FloatT>(
    idx: usize,
    c: T,
    lb: T,
    ub: T,
    size: usize,
    C: &Triplets<T>,
    A: Option<&Triplets<T>>,
    feastol: T,
) -> Result<Option<OneVarSolution<T>>, DenseFactorizationError> {
    // minimize from the lower bound, maximize from the upper bound
    let (start, other, dir) = if c >= T::zero() {
        (lb, ub, T::one())
    } else {
        (ub, lb, -T::one())
    };
    if is_infinite(start) {
        return Ok(None);
    }
    let otherinf = is_infinite(other);

    let Cd = Matrix::from_symmetric_triplets(size, C, T::one());
    let Ad = match A {
        Some(A) => Matrix::from_symmetric_triplets(size, A, T::one()),
        None => Matrix::zeros((size, size)),
    };

    let mut y = start;
    for _ in 0..MAX_NEWTON_ITER {
        let mut M = Cd.clone();
        for (m, &a) in M.data_mut().iter_mut().zip(Ad.data()) {
            *m += y * a;
        }
        let (λ, v) = compute_ith_eigenvalue(&M, 0, true)?;
        let v = v.ok_or(DenseFactorizationError::Eigen)?;
        let g = Ad.quad_form(&v);

        let solution = |status, objval| OneVarSolution {
            status,
            idx,
            objval,
            optval: y,
            certval: Some(g),
            certvec: v.clone(),
        };

        if λ >= -feastol {
            return Ok(Some(solution(OneVarStatus::Optimal, c * y)));
        }

        // f only decreases in the search direction
        let slope = dir * g;
        if slope <= T::zero() {
            return Ok(Some(solution(OneVarStatus::Infeasible, infinity())));
        }

        // the tangent overestimates f, so its root is a lower bound on
        // the distance to the first feasible point
        let next = y - dir * λ / slope;
        if !otherinf && dir * (next - other) > feastol {
            return Ok(Some(solution(OneVarStatus::Infeasible, infinity())));
        }
        y = next;
    }

    tracing::debug!("one variable Newton iteration did not converge");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(d: &[f64]) -> Triplets<f64> {
        let e: Vec<_> = d.iter().enumerate().map(|(i, &v)| (i, i, v)).collect();
        Triplets::from_entries(&e)
    }

    #[test]
    fn test_one_var_interval() {
        // y diag(1,-1) + I ⪰ 0  <=>  -1 <= y <= 1
        let C = diag(&[1.0, 1.0]);
        let A = diag(&[1.0, -1.0]);

        let sol = solve_one_var_sdp(0, 1.0, -5.0, 5.0, 2, &C, Some(&A), 1e-6)
            .unwrap()
            .unwrap();
        assert_eq!(sol.status, OneVarStatus::Optimal);
        assert!((sol.optval + 1.0).abs() < 1e-6);
        assert!((sol.objval + 1.0).abs() < 1e-6);
        assert!((sol.certval.unwrap() - 1.0).abs() < 1e-8);

        // maximize y instead
        let sol = solve_one_var_sdp(0, -2.0, -5.0, 5.0, 2, &C, Some(&A), 1e-6)
            .unwrap()
            .unwrap();
        assert!((sol.optval - 1.0).abs() < 1e-6);
        assert!((sol.objval + 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_one_var_infeasible() {
        let C = diag(&[1.0, 1.0]);
        let A = diag(&[1.0, -1.0]);

        // the feasible interval [-1,1] lies below the bounds
        let sol = solve_one_var_sdp(0, 1.0, 2.0, 5.0, 2, &C, Some(&A), 1e-6)
            .unwrap()
            .unwrap();
        assert_eq!(sol.status, OneVarStatus::Infeasible);
        assert!(is_infinite(sol.objval));

        // the feasible interval lies above the upper bound
        let sol = solve_one_var_sdp(0, 1.0, -5.0, -3.0, 2, &C, Some(&A), 1e-6)
            .unwrap()
            .unwrap();
        assert_eq!(sol.status, OneVarStatus::Infeasible);
    }

    #[test]
    fn test_one_var_without_matrix() {
        let C = diag(&[-1.0]);
        let sol = solve_one_var_sdp(0, 1.0, 0.0, 1.0, 1, &C, None, 1e-6)
            .unwrap()
            .unwrap();
        assert_eq!(sol.status, OneVarStatus::Infeasible);

        let C = diag(&[1.0]);
        let sol = solve_one_var_sdp(0, 1.0, 0.0, 1.0, 1, &C, None, 1e-6)
            .unwrap()
            .unwrap();
        assert_eq!(sol.status, OneVarStatus::Optimal);
        assert_eq!(sol.optval, 0.0);
    }

    #[test]
    fn test_one_var_infinite_start() {
        let C = diag(&[1.0]);
        let sol = solve_one_var_sdp(0, 1.0, -1e20, 1.0, 1, &C, None, 1e-6).unwrap();
        assert!(sol.is_none());
        assert!(solve_one_var_lp(0, 1.0, -1e20, 1.0).is_none());

        let sol = solve_one_var_lp(3, -1.0, 0.0, 2.0).unwrap();
        assert_eq!((sol.idx, sol.optval, sol.objval), (3, 2.0, -2.0));
    }
}
