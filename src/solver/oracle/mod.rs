//! Exact solvers for the degenerate cases that are never handed to the
//! external solver: problems where every variable is fixed, and
//! problems with a single unfixed variable and at most one SDP block.

mod allfixed;
mod onevar;

pub(crate) use allfixed::*;
pub(crate) use onevar::*;
