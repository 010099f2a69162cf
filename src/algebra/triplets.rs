//! Sparse symmetric matrices in (row, col, value) triplet form.
//!
//! Symmetric matrices are stored by their lower triangle only (row >= col).
//! A triplet list is *canonical* when it is sorted by row and then by column,
//! contains no duplicate (row, col) pairs and no entries of magnitude at or
//! below the merging epsilon.  Lists produced by [`merge_into`] and
//! [`merge_into_new`] are always canonical.

use crate::algebra::{FloatT, TripletMergeError};
use itertools::Itertools;

/// Sparse triplet list for one symmetric matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Triplets<T> {
    /// row indices
    pub row: Vec<usize>,
    /// column indices
    pub col: Vec<usize>,
    /// nonzero values
    pub val: Vec<T>,
}

impl<T> Default for Triplets<T> {
    fn default() -> Self {
        Self {
            row: Vec::new(),
            col: Vec::new(),
            val: Vec::new(),
        }
    }
}

impl<T> Triplets<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            row: Vec::with_capacity(n),
            col: Vec::with_capacity(n),
            val: Vec::with_capacity(n),
        }
    }

    /// Builds a triplet list from parallel arrays.
    pub fn from_parts(
        row: Vec<usize>,
        col: Vec<usize>,
        val: Vec<T>,
    ) -> Result<Self, TripletMergeError> {
        if row.len() != col.len() || row.len() != val.len() {
            return Err(TripletMergeError::IncompatibleDimension);
        }
        Ok(Self { row, col, val })
    }

    /// Builds a lower-triangular triplet list from (row, col, value) tuples.
    /// Entries given in the upper triangle are mirrored.
    pub fn from_entries(entries: &[(usize, usize, T)]) -> Self {
        let mut t = Self::with_capacity(entries.len());
        for &(r, c, v) in entries {
            t.push(r, c, v);
        }
        t
    }

    pub fn len(&self) -> usize {
        self.val.len()
    }

    pub fn is_empty(&self) -> bool {
        self.val.is_empty()
    }

    /// Appends an entry, mirroring it into the lower triangle.
    pub fn push(&mut self, row: usize, col: usize, val: T) {
        self.row.push(row.max(col));
        self.col.push(row.min(col));
        self.val.push(val);
    }

    pub fn clear(&mut self) {
        self.row.clear();
        self.col.clear();
        self.val.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.row
            .iter()
            .zip(self.col.iter())
            .zip(self.val.iter())
            .map(|((&r, &c), &v)| (r, c, v))
    }

    /// Largest row or column index appearing in the list, if any.
    pub fn max_index(&self) -> Option<usize> {
        self.row.iter().chain(self.col.iter()).copied().max()
    }

    /// Sorts the entries by row and then by column.   Duplicates are
    /// kept in their relative input order.
    pub fn sort_row_col(&mut self) {
        let p: Vec<usize> = (0..self.len())
            .sorted_by_key(|&i| (self.row[i], self.col[i]))
            .collect();
        self.row = p.iter().map(|&i| self.row[i]).collect();
        self.col = p.iter().map(|&i| self.col[i]).collect();
        self.val = p.iter().map(|&i| self.val[i]).collect();
    }

    /// True if sorted by (row, col), duplicate free, lower triangular
    /// and free of entries with magnitude at or below `epsilon`.
    pub fn is_canonical(&self, epsilon: T) -> bool {
        let sorted = self
            .row
            .iter()
            .zip(self.col.iter())
            .tuple_windows()
            .all(|(a, b)| a < b);
        let lower = self.iter().all(|(r, c, _)| r >= c);
        let nonzero = self.val.iter().all(|v| v.abs() > epsilon);
        sorted && lower && nonzero
    }

    /// Returns the value stored at (row, col) of a canonical list.
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        let key = (row.max(col), row.min(col));
        let mut lo = 0;
        let mut hi = self.len();
        while lo < hi {
            let mid = (lo + hi) / 2;
            match (self.row[mid], self.col[mid]).cmp(&key) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
                std::cmp::Ordering::Equal => return Some(self.val[mid]),
            }
        }
        None
    }
}

// Sorts the entries, sums duplicates and drops everything that ends
// up at or below epsilon in magnitude.
fn canonicalize<T: FloatT>(mut entries: Vec<(usize, usize, T)>, epsilon: T) -> Triplets<T> {
    entries.sort_by_key(|&(r, c, _)| (r, c));

    let mut out = Triplets::with_capacity(entries.len());
    entries
        .into_iter()
        .coalesce(|a, b| {
            if a.0 == b.0 && a.1 == b.1 {
                Ok((a.0, a.1, a.2 + b.2))
            } else {
                Err((a, b))
            }
        })
        .filter(|&(_, _, v)| v.abs() > epsilon)
        .for_each(|(r, c, v)| {
            out.row.push(r);
            out.col.push(c);
            out.val.push(v);
        });
    out
}

/// Computes `target + scale * origin` in place.
///
/// `target` must be canonical; `origin` may be unsorted and may contain
/// duplicate entries.  Entries whose combined value has magnitude at or
/// below `epsilon` are removed.  If the merged list would exceed
/// `capacity` entries, the target is left untouched and the required
/// length is returned in the error.  A missing origin, or a zero scale,
/// leaves the target unchanged.
///
/// Returns the new length of the target.
pub fn merge_into<T: FloatT>(
    origin: Option<&Triplets<T>>,
    scale: T,
    target: &mut Triplets<T>,
    capacity: usize,
    epsilon: T,
) -> Result<usize, TripletMergeError> {
    let origin = match origin {
        Some(o) if !o.is_empty() && scale != T::zero() => o,
        _ => return Ok(target.len()),
    };

    let entries = target
        .iter()
        .chain(origin.iter().map(|(r, c, v)| (r, c, scale * v)))
        .collect();
    let merged = canonicalize(entries, epsilon);

    if merged.len() > capacity {
        return Err(TripletMergeError::InsufficientCapacity {
            required: merged.len(),
        });
    }
    *target = merged;
    Ok(target.len())
}

/// Computes `first + second` into a freshly allocated list.
///
/// `first` must be duplicate free; `second` may contain duplicates and
/// need not be sorted.  Either input may be absent and is then treated
/// as empty.
pub fn merge_into_new<T: FloatT>(
    first: Option<&Triplets<T>>,
    second: Option<&Triplets<T>>,
    epsilon: T,
) -> Triplets<T> {
    let entries = first
        .into_iter()
        .flat_map(|t| t.iter())
        .chain(second.into_iter().flat_map(|t| t.iter()))
        .collect();
    canonicalize(entries, epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Triplets<f64> {
        Triplets::from_entries(&[(0, 0, 1.0), (1, 0, 2.0), (2, 2, 3.0)])
    }

    #[test]
    fn test_sort_row_col() {
        let mut t = Triplets::from_entries(&[(2, 1, 1.0), (0, 0, 2.0), (2, 0, 3.0), (1, 1, 4.0)]);
        t.sort_row_col();
        assert_eq!(t.row, vec![0, 1, 2, 2]);
        assert_eq!(t.col, vec![0, 1, 0, 1]);
        assert_eq!(t.val, vec![2.0, 4.0, 3.0, 1.0]);
    }

    #[test]
    fn test_push_mirrors_upper_entries() {
        let t = Triplets::from_entries(&[(0, 3, 1.5)]);
        assert_eq!((t.row[0], t.col[0]), (3, 0));
    }

    #[test]
    fn test_merge_into_combines_and_cancels() {
        let mut target = sample();
        // origin duplicates (1,0) and cancels (2,2) exactly after scaling
        let origin = Triplets::from_entries(&[(1, 0, 0.5), (2, 2, -1.5), (1, 0, 0.5), (3, 1, 1.0)]);

        let len = merge_into(Some(&origin), 2.0, &mut target, 10, 1e-9).unwrap();

        assert_eq!(len, 3);
        assert_eq!(target.row, vec![0, 1, 3]);
        assert_eq!(target.col, vec![0, 0, 1]);
        assert_eq!(target.val, vec![1.0, 4.0, 2.0]);
        assert!(target.is_canonical(1e-9));
    }

    #[test]
    fn test_merge_into_insufficient_capacity() {
        let mut target = sample();
        let before = target.clone();
        let origin = Triplets::from_entries(&[(3, 3, 1.0), (4, 4, 1.0)]);

        let err = merge_into(Some(&origin), 1.0, &mut target, 4, 1e-9).unwrap_err();

        assert_eq!(err, TripletMergeError::InsufficientCapacity { required: 5 });
        assert_eq!(target, before);
    }

    #[test]
    fn test_merge_into_zero_scale_or_absent_origin() {
        let mut target = sample();
        let origin = Triplets::from_entries(&[(3, 3, 1.0)]);

        assert_eq!(merge_into(Some(&origin), 0.0, &mut target, 0, 1e-9), Ok(3));
        assert_eq!(merge_into(None, 1.0, &mut target, 0, 1e-9), Ok(3));
        assert_eq!(target, sample());
    }

    #[test]
    fn test_merge_into_new() {
        let second = Triplets::from_entries(&[(2, 2, -3.0), (3, 3, 1e-12), (1, 1, 1.0), (1, 1, 1.0)]);

        let merged = merge_into_new(Some(&sample()), Some(&second), 1e-9);
        assert_eq!(merged.row, vec![0, 1, 1]);
        assert_eq!(merged.col, vec![0, 0, 1]);
        assert_eq!(merged.val, vec![1.0, 2.0, 2.0]);

        let merged = merge_into_new::<f64>(None, None, 1e-9);
        assert!(merged.is_empty());

        let merged = merge_into_new(None, Some(&second), 1e-9);
        assert_eq!(merged.get(1, 1), Some(2.0));
        assert_eq!(merged.get(0, 0), None);
    }

    #[test]
    fn test_get_mirrors_indices() {
        let t = sample();
        assert_eq!(t.get(0, 1), Some(2.0));
        assert_eq!(t.get(1, 0), Some(2.0));
        assert_eq!(t.get(2, 1), None);
    }
}
