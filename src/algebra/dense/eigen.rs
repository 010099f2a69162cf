#![allow(non_snake_case)]

use crate::algebra::{DenseFactorizationError, FloatT, Matrix};
use nalgebra::{linalg::SymmetricEigen, DMatrix};

/// Scalar types with a dense symmetric eigensolver.
///
/// Implemented for f32 and f64 on top of nalgebra's symmetric QR
/// algorithm.  Eigenvalues are returned in ascending order, with the
/// eigenvectors (if requested) as the matching columns of a column
/// major n x n array.
pub trait EigenFloatT: Sized {
    #[allow(clippy::type_complexity)]
    fn xsyev(
        n: usize,
        A: &[Self],
        vectors: bool,
    ) -> Result<(Vec<Self>, Option<Vec<Self>>), DenseFactorizationError>;
}

macro_rules! impl_nalgebra_syev {
    ($T:ty) => {
        impl EigenFloatT for $T {
            fn xsyev(
                n: usize,
                A: &[$T],
                vectors: bool,
            ) -> Result<(Vec<$T>, Option<Vec<$T>>), DenseFactorizationError> {
                if A.len() != n * n {
                    return Err(DenseFactorizationError::IncompatibleDimension);
                }
                let M = DMatrix::<$T>::from_column_slice(n, n, A);

                // niter = 0 => iterate to convergence
                let eig = SymmetricEigen::try_new(M, <$T>::EPSILON, 0)
                    .ok_or(DenseFactorizationError::Eigen)?;

                // nalgebra does not order its eigenvalues
                let mut p: Vec<usize> = (0..n).collect();
                p.sort_by(|&i, &j| eig.eigenvalues[i].total_cmp(&eig.eigenvalues[j]));

                let λ = p.iter().map(|&i| eig.eigenvalues[i]).collect();
                let V = vectors.then(|| {
                    p.iter()
                        .flat_map(|&i| eig.eigenvectors.column(i).iter().copied().collect::<Vec<_>>())
                        .collect()
                });
                Ok((λ, V))
            }
        }
    };
}

impl_nalgebra_syev!(f32);
impl_nalgebra_syev!(f64);

pub(crate) trait FactorEigen {
    type T;
    // computes eigenvalues only (full set)
    fn eigvals(&mut self, A: &Matrix<Self::T>) -> Result<(), DenseFactorizationError>;
    // computes eigenvalues and vectors (full set)
    fn eigen(&mut self, A: &Matrix<Self::T>) -> Result<(), DenseFactorizationError>;
}

pub struct EigEngine<T> {
    /// Computed eigenvalues in ascending order
    pub λ: Vec<T>,

    /// Computed eigenvectors (optional)
    pub V: Option<Matrix<T>>,
}

impl<T> EigEngine<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        Self {
            λ: vec![T::zero(); n],
            V: None,
        }
    }

    fn syev(&mut self, A: &Matrix<T>, vectors: bool) -> Result<(), DenseFactorizationError> {
        let n = self.λ.len();
        if !A.is_square() || A.nrows() != n {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }
        let (λ, V) = T::xsyev(n, A.data(), vectors)?;
        self.λ = λ;
        self.V = V.map(|data| Matrix { size: (n, n), data });
        Ok(())
    }
}

impl<T> FactorEigen for EigEngine<T>
where
    T: FloatT,
{
    type T = T;
    fn eigvals(&mut self, A: &Matrix<T>) -> Result<(), DenseFactorizationError> {
        self.syev(A, false)
    }
    fn eigen(&mut self, A: &Matrix<T>) -> Result<(), DenseFactorizationError> {
        self.syev(A, true)
    }
}

/// Computes the `i`-th smallest eigenvalue (zero based) of the dense
/// symmetric matrix `A`, together with a unit eigenvector if requested.
pub fn compute_ith_eigenvalue<T: FloatT>(
    A: &Matrix<T>,
    i: usize,
    vector: bool,
) -> Result<(T, Option<Vec<T>>), DenseFactorizationError> {
    if i >= A.nrows() {
        return Err(DenseFactorizationError::IncompatibleDimension);
    }
    let mut eng = EigEngine::<T>::new(A.nrows());
    if vector {
        eng.eigen(A)?;
    } else {
        eng.eigvals(A)?;
    }
    let v = eng.V.as_ref().map(|V| V.col_slice(i).to_vec());
    Ok((eng.λ[i], v))
}

#[test]
fn test_eigen() {
    let S = Matrix::new_from_slice((3, 3), &[3., 2., 4., 2., 0., 2., 4., 2., 3.]);

    let mut eng = EigEngine::<f64>::new(3);
    assert!(eng.eigvals(&S).is_ok());
    let sol = [-1.0, -1.0, 8.];
    assert!(eng.λ.iter().zip(sol).all(|(a, b)| (a - b).abs() < 1e-6));

    assert!(eng.eigen(&S).is_ok());
    let V = eng.V.as_ref().unwrap();

    // S v = λ v for each computed pair
    for c in 0..3 {
        let v = V.col_slice(c);
        let q = S.quad_form(v);
        assert!((q - eng.λ[c]).abs() < 1e-8);
    }
}

#[test]
fn test_ith_eigenvalue() {
    let S = Matrix::<f64>::new_from_slice((2, 2), &[2.0, 0.0, 0.0, -3.0]);

    let (λ, v) = compute_ith_eigenvalue(&S, 0, true).unwrap();
    assert!((λ + 3.0).abs() < 1e-12);
    let v = v.unwrap();
    assert!(v[0].abs() < 1e-12 && (v[1].abs() - 1.0).abs() < 1e-12);

    let (λ, v) = compute_ith_eigenvalue(&S, 1, false).unwrap();
    assert!((λ - 2.0).abs() < 1e-12);
    assert!(v.is_none());

    assert!(compute_ith_eigenvalue(&S, 2, false).is_err());
}
