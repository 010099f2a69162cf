//! Sdpi algebra module.
//!
//! __NB__: Users will not ordinarily need to interact with this crate other
//! than for the [`FloatT`] trait, the [`Triplets`] type used to pass
//! symmetric matrix data and the dense [`Matrix`] type returned by the
//! primal matrix queries.

mod error_types;
mod floats;
pub use error_types::*;
pub use floats::*;

mod triplets;
pub use triplets::*;

pub mod dense;
pub use dense::{compute_ith_eigenvalue, EigEngine, EigenFloatT, Matrix};
