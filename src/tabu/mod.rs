//! Tabu Search (TS) for facility siting.
//!
//! A single-solution trajectory search over placements. Two per-cell
//! memories steer it: a short-term memory forbids returning to recently
//! vacated cells, and a long-term memory keeps freshly occupied cells from
//! being abandoned too soon. A tabu move is still taken when it beats the
//! best placement seen so far (aspiration).
//!
//! # References
//!
//! - Glover, F. (1989). "Tabu Search—Part I", *ORSA Journal on Computing* 1(3), 190-206.
//! - Glover, F. (1990). "Tabu Search—Part II", *ORSA Journal on Computing* 2(1), 4-32.

mod config;
mod memory;
mod runner;
mod telemetry;
mod types;

pub use config::SolverConfig;
pub use memory::TabuMemory;
pub use runner::TabuSearchSolver;
pub use telemetry::{IterationRecord, Phase, Telemetry};
pub use types::{SitingProblem, SolveResult, StopReason};
