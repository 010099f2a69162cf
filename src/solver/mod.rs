//! SDP interface main module.
//!
//! This module contains the [`Sdpi`] instance together with the problem
//! data it holds, the presolving stages it runs and the
//! [backend](crate::solver::backend) trait through which it calls an
//! external SDP solver.
//!
//! A typical use loads the problem once with [`Sdpi::load_sdp`], then
//! alternates bound changes and calls to [`Sdpi::solve`], reading the
//! results back through the status and result queries.

pub(crate) const _INFINITY_DEFAULT: f64 = 1e20;
// internal module structure
pub(crate) mod core;
pub(crate) mod oracle;
pub(crate) mod utils;

pub mod backend;
pub mod data;
pub mod presolve;

mod info_print;
mod query;
mod sdpi;
mod slater;

//Here we expose only part of the interface internals
//and rearrange public modules a bit to give a more
//user friendly API

pub use crate::solver::utils::infbounds::*;

//user settings, status enums and statistics
pub use crate::solver::core::*;

pub use crate::solver::backend::{
    BackendError, BackendResult, BackendStatus, NoSolver, SdpSolverBackend,
};
pub use crate::solver::data::{DataUpdateError, LpRow, ProblemData, SdpBlock};
pub use crate::solver::presolve::{ReducedBlock, ReducedProblem, WarmStart};
pub use crate::solver::sdpi::{Sdpi, SdpiError};
