//! Tabu Search execution engine.
//!
//! # Algorithm
//!
//! 1. Take the caller's starting placement if it is valid, otherwise build
//!    one greedily
//! 2. At each iteration:
//!    a. Enumerate single-facility relocations of the current placement and
//!    drop infeasible ones
//!    b. Classify each candidate: long-term tabu (abandons a frozen cell),
//!    short-term tabu (reoccupies a cooling cell) or admissible, keeping the
//!    cheapest admissible and the cheapest tabu candidate
//!    c. Adopt the cheapest admissible candidate, or the cheapest tabu one
//!    if it beats the incumbent (aspiration), forgiving the memory entries
//!    that blocked it
//!    d. Update the incumbent on strict improvement
//!    e. Decrement both memories, then start a cooldown on the vacated cell
//!    and a freeze on the newly occupied cell
//! 3. Terminate on the time or iteration budget, or when no move is left
//!
//! # Reference
//!
//! Glover, F. (1989). "Tabu Search—Part I", *ORSA Journal on Computing* 1(3), 190-206.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use super::config::SolverConfig;
use super::memory::TabuMemory;
use super::telemetry::{IterationRecord, Phase, Telemetry};
use super::types::{SitingProblem, SolveResult, StopReason};
use crate::cost::CostModel;
use crate::error::Result;
use crate::feasibility::ConditionTester;
use crate::grid::Placement;
use crate::masks::DistanceMasks;
use crate::neighborhood::{Neighbor, NeighborhoodGenerator};
use crate::start::StartingSolutionGenerator;

/// Mutable state of one solve.
#[derive(Debug, Clone)]
pub(crate) struct SearchState {
    current: Placement,
    current_cost: f64,
    best: Placement,
    best_cost: f64,
    best_iteration: usize,
    short_term: TabuMemory,
    long_term: TabuMemory,
    iteration: usize,
}

impl SearchState {
    fn new(start: Placement, cost: f64) -> Self {
        let (height, width) = start.shape();
        Self {
            best: start.clone(),
            current: start,
            current_cost: cost,
            best_cost: cost,
            best_iteration: 0,
            short_term: TabuMemory::new(height, width),
            long_term: TabuMemory::new(height, width),
            iteration: 0,
        }
    }
}

struct Scored {
    neighbor: Neighbor,
    cost: f64,
}

enum Verdict {
    Admissible,
    ShortTerm(u32),
    LongTerm(u32),
}

#[derive(Default)]
struct ScanStats {
    scanned: usize,
    short_count: usize,
    long_count: usize,
    short_sum: u64,
    long_sum: u64,
}

fn offer(slot: &mut Option<Scored>, neighbor: Neighbor, cost: f64) {
    if slot.as_ref().map_or(true, |s| cost < s.cost) {
        *slot = Some(Scored { neighbor, cost });
    }
}

fn cadence(tenure: u32, sum: u64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        f64::from(tenure) - sum as f64 / count as f64
    }
}

/// Tabu Search over facility placements.
///
/// The solver owns everything derived from the problem (ban matrix,
/// distance masks); each call to [`solve`](Self::solve) owns its own
/// placement and memories, so one solver can be solved repeatedly.
pub struct TabuSearchSolver<'a> {
    problem: &'a SitingProblem,
    config: SolverConfig,
    masks: Arc<DistanceMasks>,
    tester: ConditionTester,
    starting_solution: Option<Placement>,
}

impl<'a> TabuSearchSolver<'a> {
    /// Validates `config` and precomputes the ban matrix and masks.
    ///
    /// # Errors
    ///
    /// [`SitingError::Configuration`](crate::SitingError::Configuration) for
    /// an invalid config, [`SitingError::Shape`](crate::SitingError::Shape)
    /// for mismatched maps.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_siting::tabu::{SitingProblem, SolverConfig, TabuSearchSolver};
    /// use u_siting::Grid;
    ///
    /// let demand = Grid::from_rows(vec![
    ///     vec![0, 0, 0, 0, 4],
    ///     vec![0, 2, 0, 0, 0],
    ///     vec![0, 0, 0, 0, 0],
    ///     vec![3, 0, 0, 0, 1],
    /// ]).unwrap();
    /// let problem = SitingProblem::new(demand);
    /// let config = SolverConfig::default()
    ///     .with_facilities(2)
    ///     .with_capacity(20)
    ///     .with_service_radius(2)
    ///     .with_short_term_tenure(3)
    ///     .with_long_term_tenure(2)
    ///     .with_iteration_limit(10);
    ///
    /// let solver = TabuSearchSolver::new(&problem, config).unwrap();
    /// let result = solver.solve().unwrap();
    /// assert_eq!(result.best.facility_count(), 2);
    /// ```
    pub fn new(problem: &'a SitingProblem, config: SolverConfig) -> Result<Self> {
        let (height, width) = problem.shape();
        Self::with_masks(problem, config, Arc::new(DistanceMasks::new(height, width)))
    }

    /// Like [`new`](Self::new), reusing masks built for the same grid shape.
    pub fn with_masks(
        problem: &'a SitingProblem,
        config: SolverConfig,
        masks: Arc<DistanceMasks>,
    ) -> Result<Self> {
        config.validate()?;
        let tester = ConditionTester::new(
            problem.demand(),
            config.capacity,
            config.service_radius,
            problem.exclusion(),
            config.frame,
            &masks,
        )?;
        Ok(Self {
            problem,
            config,
            masks,
            tester,
            starting_solution: None,
        })
    }

    /// Supplies a starting placement.
    ///
    /// A placement with the wrong shape, the wrong number of facilities, or
    /// a banned site is discarded and the greedy constructor is used instead.
    pub fn with_starting_solution(mut self, placement: Placement) -> Self {
        let shape_ok = placement.shape() == self.problem.shape();
        let count_ok = placement.facility_count() == self.config.facilities;
        if shape_ok && count_ok && self.tester.is_allowed(&placement) {
            self.starting_solution = Some(placement);
        } else {
            warn!(
                event = "starting_solution_rejected",
                shape_ok,
                count_ok,
                facilities = placement.facility_count(),
                "starting solution violates constraints; the greedy generator will be used"
            );
            self.starting_solution = None;
        }
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn tester(&self) -> &ConditionTester {
        &self.tester
    }

    pub fn masks(&self) -> &Arc<DistanceMasks> {
        &self.masks
    }

    pub fn cost_model(&self) -> CostModel<'_> {
        CostModel::from_parts(self.problem.demand(), self.config.service_radius, &self.masks)
    }

    /// The caller's starting placement, or a greedily generated one.
    ///
    /// # Errors
    ///
    /// [`SitingError::InfeasibleStart`](crate::SitingError::InfeasibleStart)
    /// if the greedy constructor fails.
    pub fn starting_solution(&self) -> Result<Placement> {
        if let Some(placement) = &self.starting_solution {
            info!(event = "starting_solution", source = "provided");
            return Ok(placement.clone());
        }
        info!(event = "starting_solution", source = "greedy");
        StartingSolutionGenerator::new(
            self.problem.demand(),
            self.config.facilities,
            self.config.service_radius,
            &self.tester,
            &self.masks,
        )
        .generate()
    }

    /// Runs the search without collecting telemetry.
    pub fn solve(&self) -> Result<SolveResult> {
        let mut telemetry = Telemetry::disabled();
        self.solve_with_telemetry(&mut telemetry)
    }

    /// Runs the search, recording iterations and timings into `telemetry`.
    pub fn solve_with_telemetry(&self, telemetry: &mut Telemetry) -> Result<SolveResult> {
        let started = Instant::now();
        telemetry.begin_solve();
        let (height, width) = self.problem.shape();
        info!(
            event = "solve_start",
            height,
            width,
            facilities = self.config.facilities,
            capacity = self.config.capacity,
            service_radius = self.config.service_radius,
            move_radius = self.config.move_radius,
        );

        let start = telemetry.time(Phase::Start, || self.starting_solution())?;
        let cost = telemetry.time(Phase::Cost, || self.cost_model().cost(&start));
        info!(event = "starting_cost", cost);

        let mut state = SearchState::new(start, cost);
        let initial = self.record(&state, &ScanStats::default(), false, telemetry);
        telemetry.push(initial);
        let mut cost_history = vec![state.best_cost];

        let stop_reason = loop {
            if let Some(reason) = self.budget_exhausted(&state, started.elapsed()) {
                break reason;
            }
            match self.step(&mut state, telemetry) {
                Some(record) => {
                    debug!(
                        event = "iteration",
                        iteration = record.iteration,
                        current_cost = record.current_cost,
                        best_cost = record.best_cost,
                        scanned = record.neighbors_scanned,
                        short_tabu = record.short_tabu_count,
                        long_tabu = record.long_tabu_count,
                        aspiration = record.aspiration,
                    );
                    telemetry.push(record);
                    cost_history.push(state.best_cost);
                }
                None => {
                    debug!(event = "no_admissible_move", iteration = state.iteration + 1);
                    break StopReason::NoAdmissibleMove;
                }
            }
        };

        info!(
            event = "solve_end",
            best_cost = state.best_cost,
            iterations = state.iteration,
            best_iteration = state.best_iteration,
            stop_reason = ?stop_reason,
            duration_ms = started.elapsed().as_millis() as u64,
        );

        Ok(SolveResult {
            best: state.best,
            best_cost: state.best_cost,
            iterations: state.iteration,
            best_iteration: state.best_iteration,
            cost_history,
            stop_reason,
        })
    }

    fn budget_exhausted(&self, state: &SearchState, elapsed: Duration) -> Option<StopReason> {
        if let Some(limit) = self.config.iteration_limit {
            if state.iteration >= limit {
                return Some(StopReason::IterationLimit);
            }
        }
        if let Some(limit) = self.config.time_limit {
            if elapsed >= limit {
                return Some(StopReason::TimeLimit);
            }
        }
        None
    }

    fn classify(&self, state: &SearchState, candidate: &Placement) -> Verdict {
        if let Some(freeze) = state.long_term.blocks_removal(candidate) {
            return Verdict::LongTerm(freeze);
        }
        match state
            .short_term
            .blocks_occupation(candidate, self.config.facilities)
        {
            Some(cooldown) => Verdict::ShortTerm(cooldown),
            None => Verdict::Admissible,
        }
    }

    /// One iteration. Returns `None`, leaving `state` untouched, when there
    /// is nothing to move to.
    fn step(&self, state: &mut SearchState, telemetry: &mut Telemetry) -> Option<IterationRecord> {
        let cost_model = self.cost_model();
        let threshold = self.config.early_exit_factor * (state.best_cost + state.current_cost);

        let mut stats = ScanStats::default();
        let mut best_admissible: Option<Scored> = None;
        let mut best_tabu: Option<Scored> = None;

        let mut neighbors = NeighborhoodGenerator::new(&state.current, self.config.move_radius);
        while let Some(neighbor) = telemetry.time(Phase::Neighborhood, || neighbors.next()) {
            stats.scanned += 1;
            let feasible = telemetry.time(Phase::Feasibility, || {
                self.tester.is_allowed(&neighbor.placement)
            });
            if feasible {
                let cost = telemetry.time(Phase::Cost, || cost_model.cost(&neighbor.placement));
                let verdict = telemetry.time(Phase::Classification, || {
                    self.classify(state, &neighbor.placement)
                });
                match verdict {
                    Verdict::LongTerm(freeze) => {
                        stats.long_count += 1;
                        stats.long_sum += u64::from(freeze);
                        offer(&mut best_tabu, neighbor, cost);
                    }
                    Verdict::ShortTerm(cooldown) => {
                        stats.short_count += 1;
                        stats.short_sum += u64::from(cooldown);
                        offer(&mut best_tabu, neighbor, cost);
                    }
                    Verdict::Admissible => offer(&mut best_admissible, neighbor, cost),
                }
            }

            if self.config.dynamic_neighborhood
                && best_admissible.as_ref().is_some_and(|b| b.cost < threshold)
            {
                trace!(event = "early_exit", scanned = stats.scanned, threshold);
                break;
            }
        }

        let (adopted, aspiration) = match best_tabu {
            Some(tabu) if self.config.aspiration && tabu.cost < state.best_cost => (tabu, true),
            _ => (best_admissible?, false),
        };

        telemetry.time(Phase::MemoryUpdate, || {
            if aspiration {
                self.forgive(state, &adopted.neighbor.placement);
            }
            state.short_term.decrement();
            state.long_term.decrement();
            state
                .short_term
                .set(adopted.neighbor.vacated, self.config.short_term_tenure);
            state
                .long_term
                .set(adopted.neighbor.occupied, self.config.long_term_tenure);
        });

        state.iteration += 1;
        state.current = adopted.neighbor.placement;
        state.current_cost = adopted.cost;
        if state.current_cost < state.best_cost {
            state.best = state.current.clone();
            state.best_cost = state.current_cost;
            state.best_iteration = state.iteration;
        }

        Some(self.record(state, &stats, aspiration, telemetry))
    }

    /// Clears the memory entries that made `candidate` tabu.
    fn forgive(&self, state: &mut SearchState, candidate: &Placement) {
        let abandoned: Vec<_> = state
            .long_term
            .active()
            .filter(|&(cell, _)| !candidate.is_occupied(cell))
            .map(|(cell, _)| cell)
            .collect();
        for cell in abandoned {
            state.long_term.clear(cell);
        }

        let reoccupied: Vec<_> = candidate
            .sites()
            .filter(|&cell| state.short_term.get(cell) > 0)
            .collect();
        for cell in reoccupied {
            state.short_term.clear(cell);
        }
    }

    fn record(
        &self,
        state: &SearchState,
        stats: &ScanStats,
        aspiration: bool,
        telemetry: &Telemetry,
    ) -> IterationRecord {
        let snapshots = telemetry.snapshots_enabled();
        IterationRecord {
            iteration: state.iteration,
            current_cost: state.current_cost,
            best_cost: state.best_cost,
            neighbors_scanned: stats.scanned,
            short_tabu_count: stats.short_count,
            long_tabu_count: stats.long_count,
            short_cadence: cadence(
                self.config.short_term_tenure,
                stats.short_sum,
                stats.short_count,
            ),
            long_cadence: cadence(
                self.config.long_term_tenure,
                stats.long_sum,
                stats.long_count,
            ),
            aspiration,
            placement: snapshots.then(|| state.current.clone()),
            short_term: snapshots.then(|| state.short_term.grid().clone()),
            long_term: snapshots.then(|| state.long_term.grid().clone()),
        }
    }
}
