use super::WorkingBounds;
use crate::algebra::*;
use crate::solver::data::SdpBlock;

/// Constant matrix of `block` after fixing variables.
///
/// Fixing `y_j = v` turns `A_j y_j` into a constant, so the block
/// constraint `sum A_j y_j + C ⪰ 0` keeps its form with the constant
/// `C + v A_j`.  Variables fixed to (numerically) zero do not
/// contribute.
pub(crate) fn constant_after_fixings<T: FloatT>(
    block: &SdpBlock<T>,
    bounds: &WorkingBounds<T>,
    epsilon: T,
) -> Triplets<T> {
    let fixed = block
        .iter()
        .filter(|&(j, _)| bounds.is_fixed(j, epsilon) && bounds.lb[j].abs() > epsilon);

    let mut contributions = Triplets::new();
    for (j, M) in fixed {
        let v = bounds.lb[j];
        for (r, c, a) in M.iter() {
            contributions.push(r, c, v * a);
        }
    }

    merge_into_new(Some(&block.constant), Some(&contributions), epsilon)
}

/// [`constant_after_fixings`] for every block
pub(crate) fn constants_after_fixings<T: FloatT>(
    blocks: &[SdpBlock<T>],
    bounds: &WorkingBounds<T>,
    epsilon: T,
) -> Vec<Triplets<T>> {
    blocks
        .iter()
        .map(|block| constant_after_fixings(block, bounds, epsilon))
        .collect()
}
