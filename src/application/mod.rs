//! Application layer containing the orchestration core.
//!
//! `Orchestrator` sequences the phases of a run, `PhaseRunner` applies the
//! per-tier retry budgets to each phase, and `Terminator` cleans up whatever
//! the run started. Phases run strictly one after another on the caller's task.

pub mod orchestrator;
pub mod runner;
pub mod terminator;
