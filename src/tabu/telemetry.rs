//! Per-solve telemetry.
//!
//! A [`Telemetry`] value is owned by the caller and passed to
//! [`TabuSearchSolver::solve_with_telemetry`](super::TabuSearchSolver::solve_with_telemetry)
//! by mutable reference. It collects one [`IterationRecord`] per search
//! iteration and the wall time spent in each [`Phase`]. Nothing is global:
//! aggregating several runs is an explicit [`merge`](Telemetry::merge).
//! [`Telemetry::disabled`] records nothing and skips the clock reads; it is
//! what [`TabuSearchSolver::solve`](super::TabuSearchSolver::solve) uses.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::info;

use crate::grid::{Grid, Placement};

/// Timed stages of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    /// Building or validating the starting placement.
    Start,
    /// Enumerating relocations.
    Neighborhood,
    /// Checking candidates against the ban matrix.
    Feasibility,
    /// Evaluating candidate costs.
    Cost,
    /// Tabu classification.
    Classification,
    /// Decrementing and refreshing the memories.
    MemoryUpdate,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Start,
        Phase::Neighborhood,
        Phase::Feasibility,
        Phase::Cost,
        Phase::Classification,
        Phase::MemoryUpdate,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Start => "start",
            Phase::Neighborhood => "neighborhood",
            Phase::Feasibility => "feasibility",
            Phase::Cost => "cost",
            Phase::Classification => "classification",
            Phase::MemoryUpdate => "memory_update",
        }
    }
}

/// State of the search after one iteration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IterationRecord {
    /// 0 for the starting placement, then 1, 2, ...
    pub iteration: usize,
    /// Cost of the current placement.
    pub current_cost: f64,
    /// Cost of the incumbent.
    pub best_cost: f64,
    /// Neighbors enumerated (feasible or not) before the scan ended.
    pub neighbors_scanned: usize,
    /// Feasible candidates rejected by the short-term memory only.
    pub short_tabu_count: usize,
    /// Feasible candidates rejected by the long-term memory.
    pub long_tabu_count: usize,
    /// Short-term tenure minus the mean remaining cooldown over short-tabu
    /// candidates; 0 when there were none.
    pub short_cadence: f64,
    /// Long-term tenure minus the mean remaining freeze over long-tabu
    /// candidates; 0 when there were none.
    pub long_cadence: f64,
    /// Whether the adopted move was tabu and accepted by aspiration.
    pub aspiration: bool,
    /// Current placement, if snapshots are enabled.
    pub placement: Option<Placement>,
    /// Short-term memory, if snapshots are enabled.
    pub short_term: Option<Grid<u32>>,
    /// Long-term memory, if snapshots are enabled.
    pub long_term: Option<Grid<u32>>,
}

/// Accumulator for iteration records and phase timings.
#[derive(Debug, Clone, Default)]
pub struct Telemetry {
    disabled: bool,
    snapshots: bool,
    records: Vec<IterationRecord>,
    timings: [Duration; 6],
    solves: usize,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// An accumulator that keeps no records and measures no phases.
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// Keeps placement and memory snapshots in every record.
    pub fn with_snapshots(mut self, enabled: bool) -> Self {
        self.snapshots = enabled;
        self
    }

    pub fn snapshots_enabled(&self) -> bool {
        self.snapshots && !self.disabled
    }

    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    /// Number of solves recorded into this accumulator.
    pub fn solves(&self) -> usize {
        self.solves
    }

    pub(crate) fn begin_solve(&mut self) {
        self.solves += 1;
    }

    pub(crate) fn push(&mut self, record: IterationRecord) {
        if self.disabled {
            return;
        }
        self.records.push(record);
    }

    /// Runs `f`, charging its wall time to `phase`.
    #[inline]
    pub fn time<T>(&mut self, phase: Phase, f: impl FnOnce() -> T) -> T {
        if self.disabled {
            return f();
        }
        let start = Instant::now();
        let out = f();
        self.add(phase, start.elapsed());
        out
    }

    pub fn add(&mut self, phase: Phase, elapsed: Duration) {
        self.timings[phase.slot()] += elapsed;
    }

    pub fn phase_total(&self, phase: Phase) -> Duration {
        self.timings[phase.slot()]
    }

    /// Sum over all phases.
    pub fn total(&self) -> Duration {
        self.timings.iter().sum()
    }

    /// Folds another run's records and timings into this one.
    pub fn merge(&mut self, other: &Telemetry) {
        self.records.extend(other.records.iter().cloned());
        for (mine, theirs) in self.timings.iter_mut().zip(other.timings) {
            *mine += theirs;
        }
        self.solves += other.solves;
    }

    /// Fixed-width table of phase timings.
    pub fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:<20} {:>12}", "phase", "time [s]");
        for phase in Phase::ALL {
            let _ = writeln!(
                out,
                "{:<20} {:>12.3}",
                phase.name(),
                self.phase_total(phase).as_secs_f64()
            );
        }
        let _ = writeln!(out, "{:<20} {:>12.3}", "total", self.total().as_secs_f64());
        out
    }

    /// Emits one `info` event per phase.
    pub fn log_summary(&self) {
        for phase in Phase::ALL {
            info!(
                event = "telemetry",
                phase = phase.name(),
                seconds = self.phase_total(phase).as_secs_f64(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(iteration: usize) -> IterationRecord {
        IterationRecord {
            iteration,
            current_cost: 1.0,
            best_cost: 1.0,
            neighbors_scanned: 0,
            short_tabu_count: 0,
            long_tabu_count: 0,
            short_cadence: 0.0,
            long_cadence: 0.0,
            aspiration: false,
            placement: None,
            short_term: None,
            long_term: None,
        }
    }

    #[test]
    fn test_time_accumulates() {
        let mut t = Telemetry::new();
        let v = t.time(Phase::Cost, || 41 + 1);
        assert_eq!(v, 42);
        t.add(Phase::Cost, Duration::from_millis(5));
        assert!(t.phase_total(Phase::Cost) >= Duration::from_millis(5));
        assert_eq!(t.phase_total(Phase::Start), Duration::ZERO);
    }

    #[test]
    fn test_disabled_keeps_nothing() {
        let mut t = Telemetry::disabled().with_snapshots(true);
        assert!(!t.is_enabled());
        assert!(!t.snapshots_enabled());
        assert_eq!(t.time(Phase::Cost, || 7), 7);
        t.begin_solve();
        t.push(record(0));
        assert!(t.records().is_empty());
        assert_eq!(t.total(), Duration::ZERO);
        assert_eq!(t.solves(), 1);
        assert!(Telemetry::new().is_enabled());
    }

    #[test]
    fn test_merge() {
        let mut a = Telemetry::new();
        a.begin_solve();
        a.push(record(0));
        a.add(Phase::Neighborhood, Duration::from_millis(2));

        let mut b = Telemetry::new();
        b.begin_solve();
        b.push(record(0));
        b.push(record(1));
        b.add(Phase::Neighborhood, Duration::from_millis(3));

        a.merge(&b);
        assert_eq!(a.records().len(), 3);
        assert_eq!(a.solves(), 2);
        assert_eq!(a.phase_total(Phase::Neighborhood), Duration::from_millis(5));
    }

    #[test]
    fn test_report_lists_all_phases() {
        let t = Telemetry::new();
        let report = t.report();
        for phase in Phase::ALL {
            assert!(report.contains(phase.name()));
        }
        assert!(report.contains("total"));
    }

    #[test]
    fn test_phase_slots_distinct() {
        let mut t = Telemetry::new();
        for (i, phase) in Phase::ALL.into_iter().enumerate() {
            t.add(phase, Duration::from_millis(i as u64 + 1));
        }
        for (i, phase) in Phase::ALL.into_iter().enumerate() {
            assert_eq!(t.phase_total(phase), Duration::from_millis(i as u64 + 1));
        }
    }
}
