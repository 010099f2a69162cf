#![allow(non_snake_case)]

use crate::algebra::{FloatT, Triplets};
use std::ops::{Index, IndexMut};

/// Dense matrix in column major format
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    /// dimensions
    pub size: (usize, usize),
    /// vector of data in column major format
    pub data: Vec<T>,
}

impl<T> Matrix<T>
where
    T: FloatT,
{
    pub fn zeros(size: (usize, usize)) -> Self {
        Self {
            size,
            data: vec![T::zero(); size.0 * size.1],
        }
    }

    pub fn new_from_slice(size: (usize, usize), src: &[T]) -> Self {
        assert_eq!(size.0 * size.1, src.len());
        Self {
            size,
            data: src.to_vec(),
        }
    }

    /// Dense n x n symmetric matrix `scale * M`, where M is given
    /// by its lower triangular triplets.
    pub fn from_symmetric_triplets(n: usize, M: &Triplets<T>, scale: T) -> Self {
        let mut A = Self::zeros((n, n));
        A.add_symmetric_triplets(M, scale);
        A
    }

    /// self += scale * M, where M is a symmetric matrix given by its
    /// lower triangular triplets.  Off diagonal entries are mirrored.
    pub fn add_symmetric_triplets(&mut self, M: &Triplets<T>, scale: T) {
        for (r, c, v) in M.iter() {
            self[(r, c)] += scale * v;
            if r != c {
                self[(c, r)] += scale * v;
            }
        }
    }

    /// Rank one matrix `s * v * v^T`
    pub fn rank_one(v: &[T], s: T) -> Self {
        let n = v.len();
        let mut A = Self::zeros((n, n));
        for c in 0..n {
            for r in 0..n {
                A[(r, c)] = s * v[r] * v[c];
            }
        }
        A
    }

    /// computes v^T * self * v
    pub fn quad_form(&self, v: &[T]) -> T {
        assert!(self.is_square() && v.len() == self.nrows());
        let mut out = T::zero();
        for c in 0..self.ncols() {
            let colsum = self
                .col_slice(c)
                .iter()
                .zip(v)
                .fold(T::zero(), |acc, (&a, &x)| acc + a * x);
            out += colsum * v[c];
        }
        out
    }

    pub fn nrows(&self) -> usize {
        self.size.0
    }
    pub fn ncols(&self) -> usize {
        self.size.1
    }
    pub fn is_square(&self) -> bool {
        self.size.0 == self.size.1
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn col_slice(&self, col: usize) -> &[T] {
        let (m, n) = self.size;
        assert!(col < n);
        &self.data[(col * m)..(col + 1) * m]
    }

    /// largest absolute entry (zero if empty)
    pub fn norm_inf(&self) -> T {
        self.data
            .iter()
            .fold(T::zero(), |acc, &x| T::max(acc, x.abs()))
    }

    fn index_linear(&self, idx: (usize, usize)) -> usize {
        idx.0 + self.nrows() * idx.1
    }
}

impl<T: FloatT> Index<(usize, usize)> for Matrix<T> {
    type Output = T;
    fn index(&self, idx: (usize, usize)) -> &T {
        let lidx = self.index_linear(idx);
        &self.data[lidx]
    }
}

impl<T: FloatT> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, idx: (usize, usize)) -> &mut T {
        let lidx = self.index_linear(idx);
        &mut self.data[lidx]
    }
}

#[test]
fn test_symmetric_triplets_and_quad_form() {
    let M = Triplets::from_entries(&[(0, 0, 2.0), (1, 0, -1.0), (1, 1, 3.0)]);
    let A = Matrix::from_symmetric_triplets(2, &M, 2.0);

    assert_eq!(A.data(), &[4.0, -2.0, -2.0, 6.0]);
    // [1,1] * A * [1,1]^T
    assert_eq!(A.quad_form(&[1.0, 1.0]), 6.0);
    assert_eq!(A.norm_inf(), 6.0);

    let R = Matrix::rank_one(&[1.0, 2.0], 0.5);
    assert_eq!(R.data(), &[0.5, 1.0, 1.0, 2.0]);
}
