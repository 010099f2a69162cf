use thiserror::Error;

/// Error type returned by in-place sparse triplet merges.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TripletMergeError {
    /// The merged result would not fit the capacity supplied by the caller.
    /// The target is left untouched and the required length is reported.
    #[error("Insufficient capacity for merged triplets: {required} entries required")]
    InsufficientCapacity { required: usize },
    /// Row, column and value arrays have different lengths
    #[error("Triplet row, column and value arrays have incompatible lengths")]
    IncompatibleDimension,
}

/// Error type returned by dense factorization routines.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DenseFactorizationError {
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    #[error("Eigendecomposition did not converge")]
    Eigen,
}
