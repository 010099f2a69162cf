use crate::algebra::*;
use crate::io::PrintTarget;
use crate::solver::backend::*;
use crate::solver::core::*;
use crate::solver::Sdpi;
use std::io::Write;

impl<T, B> Sdpi<T, B>
where
    T: FloatT,
    B: SdpSolverBackend<T>,
{
    pub(crate) fn print_solve_summary(&mut self) -> std::io::Result<()> {
        self.print_settings()?;
        self.print_problem()?;
        self.print_outcome()?;
        self.stream.flush()?;
        std::io::Result::Ok(())
    }

    fn print_settings(&mut self) -> std::io::Result<()> {
        let out = &mut self.stream;
        let set = &self.settings;

        writeln!(out, "\nsdpi v{}  -  solver: {}", crate::version(), self.backend.name())?;
        writeln!(out, "settings:")?;
        writeln!(
            out,
            "  epsilon = {:.1e}, gaptol = {:.1e}, feastol = {:.1e}, precision: {} bit",
            set.epsilon,
            set.gaptol,
            set.feastol,
            _get_precision_string::<T>()
        )?;
        writeln!(
            out,
            "  penalty = {:.1e}, max penalty = {:.1e}, increases = {}, slater check = {:?}",
            set.penaltyparam, set.maxpenaltyparam, set.npenaltyincr, set.slatercheck
        )?;
        std::io::Result::Ok(())
    }

    fn print_problem(&mut self) -> std::io::Result<()> {
        let out = &mut self.stream;
        let data = &self.data;

        writeln!(out, "\nproblem:")?;
        writeln!(out, "  variables     = {}", data.nvars())?;
        writeln!(out, "  SDP blocks    = {}", data.nblocks())?;
        writeln!(out, "  LP rows       = {}", data.nlprows())?;
        writeln!(out, "  nnz(SDP)      = {}", data.sdp_nnonz())?;
        writeln!(out, "  nnz(const)    = {}", data.const_nnonz())?;
        writeln!(out, "  nnz(LP)       = {}", data.lp_nnonz())?;

        if let Some(problem) = &self.state.problem {
            writeln!(
                out,
                "\npresolve: {} of {} variables, {} of {} blocks, {} of {} LP rows remain",
                problem.nvars(),
                data.nvars(),
                problem.nblocks(),
                data.nblocks(),
                problem.nlprows(),
                data.nlprows()
            )?;
            _print_block_sizes(out, problem.blocks.iter().map(|b| b.size))?;
        }
        std::io::Result::Ok(())
    }

    fn print_outcome(&mut self) -> std::io::Result<()> {
        let outcome = if !self.state.solved {
            if self.state.timelimit {
                "time limit reached".to_string()
            } else {
                "not solved".to_string()
            }
        } else if self.state.infeasible {
            "infeasible".to_string()
        } else if self.state.allfixed {
            "all variables fixed".to_string()
        } else if let Some(sol) = &self.state.onevar {
            format!("single variable {}", sol.status)
        } else {
            format!("{} ({})", self.backend_status(), self.settings_used())
        };
        let objval = self.objval();
        let lowerbound = self.lower_objbound();

        let out = &mut self.stream;
        writeln!(out, "\nTerminated with status = {}", outcome)?;
        if let Some(objval) = objval {
            writeln!(out, "objective = {:+.6e}", objval)?;
        } else {
            writeln!(out, "lower bound = {:+.6e}", lowerbound)?;
        }
        writeln!(
            out,
            "solver calls = {}, iterations = {}, solver time = {:.3e}s",
            self.state.nsdpcalls, self.state.niterations, self.state.opttime
        )?;
        if self.state.primalslater != SdpSlater::NoInfo || self.state.dualslater != SdpSlater::NoInfo {
            writeln!(
                out,
                "slater: primal = {}, dual = {}",
                self.state.primalslater, self.state.dualslater
            )?;
        }

        writeln!(out, "timers:")?;
        self.timers.print(out)?;
        std::io::Result::Ok(())
    }
}

fn _get_precision_string<T: FloatT>() -> String {
    (::std::mem::size_of::<T>() * 8).to_string()
}

fn _print_block_sizes(out: &mut PrintTarget, sizes: impl Iterator<Item = usize>) -> std::io::Result<()> {
    let maxlistlen = 5;
    let sizes: Vec<usize> = sizes.collect();

    if sizes.is_empty() {
        return std::io::Result::Ok(());
    }
    write!(out, "  block sizes = (")?;
    if sizes.len() <= maxlistlen {
        let list: Vec<String> = sizes.iter().map(|n| n.to_string()).collect();
        write!(out, "{}", list.join(","))?;
    } else {
        // print first (maxlistlen-1) and the final one
        for n in sizes.iter().take(maxlistlen - 1) {
            write!(out, "{n},")?;
        }
        write!(out, "...,{}", sizes[sizes.len() - 1])?;
    }
    writeln!(out, ")")?;
    std::io::Result::Ok(())
}
