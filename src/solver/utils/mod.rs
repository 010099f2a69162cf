//! Internal utility functions and helpers.

pub(crate) mod atomic;
pub(crate) mod infbounds;

// assorted other functionality missing from std

// a vectorized version of std::iter::position, returning the
// indices of *all* elements satisfying a predicate

pub(crate) trait PositionAll<T>: Iterator<Item = T> {
    fn position_all<F>(&mut self, predicate: F) -> Vec<usize>
    where
        F: FnMut(&T) -> bool;
}

impl<T, I> PositionAll<T> for I
where
    I: Iterator<Item = T>,
{
    fn position_all<F>(&mut self, mut f: F) -> Vec<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.enumerate()
            .filter(|(_, item)| f(item))
            .map(|(index, _)| index)
            .collect::<Vec<_>>()
    }
}

// Renumbering table for a set of kept positions: entry i is the new
// position of i, or -1 if i was removed.

pub(crate) fn index_changes(keep: &[bool]) -> Vec<isize> {
    let mut nremoved = 0;
    keep.iter()
        .enumerate()
        .map(|(i, &k)| {
            if k {
                (i - nremoved) as isize
            } else {
                nremoved += 1;
                -1
            }
        })
        .collect()
}

// -------------
// testing

#[test]
fn test_position_all() {
    let test = [3, 1, 0, 5, 9];
    let idx = test.iter().position_all(|&v| *v > 2);
    assert_eq!(idx, vec![0, 3, 4]);

    let idx = test.iter().position_all(|&v| *v == 2);
    assert_eq!(idx, vec![]);
}

#[test]
fn test_index_changes() {
    let keep = [true, false, false, true, true, false];
    assert_eq!(index_changes(&keep), vec![0, -1, -1, 1, 2, -1]);
}
