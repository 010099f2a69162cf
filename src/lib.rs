//! __sdpi__ is the presolving and orchestration layer that sits between a
//! branch-and-bound driver for mixed-integer semidefinite programs and a
//! pluggable conic (SDP) solver.  It handles problems of the form
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & b^T y\\\\\[2ex\]
//!  \text{subject to} & \sum_j A_j^{(k)} y_j - A_0^{(k)} \succeq 0 \quad \forall k \\\\\[1ex\]
//!         & \ell_{\text{lp}} \le D y \le u_{\text{lp}} \\\\\[1ex\]
//!         & \ell \le y \le u
//!  \end{array}
//! $$
//!
//! where each $A_j^{(k)}$ is a sparse symmetric matrix stored as a
//! lower-triangular triplet list.  The constant of each block is stored
//! as $C^{(k)} = -A_0^{(k)}$.
//!
//! On every [`solve`](crate::solver::Sdpi::solve) call the interface
//!
//! * fixes variables whose bounds coincide and folds their matrices into the
//!   constant part of each block,
//! * presolves the LP rows (bound conversion, coefficient tightening,
//!   redundancy and infeasibility detection),
//! * removes empty rows, columns and blocks before handing the reduced
//!   problem to the external solver,
//! * solves the degenerate all-fixed and single-variable cases itself, and
//! * drives the external solver through a penalty / gap tolerance
//!   escalation when it fails, reporting Slater condition diagnostics.
//!
//! The external solver is supplied through the
//! [`SdpSolverBackend`](crate::solver::backend::SdpSolverBackend) trait.
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

//Rust hates greek characters
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod io;
pub mod solver;
pub(crate) mod timers;

/// Returns the version of the interface crate.
pub fn version() -> &'static str {
    VERSION
}
