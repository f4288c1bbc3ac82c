//! Facility-count sweeps.
//!
//! Solves the same problem once per requested facility count. The solves
//! are independent; they share only the read-only problem and one set of
//! distance masks.

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::masks::DistanceMasks;
use crate::tabu::{SitingProblem, SolveResult, SolverConfig, TabuSearchSolver};

/// Outcome of one solve in a sweep.
#[derive(Debug, Clone)]
pub struct SweepEntry {
    pub facilities: usize,
    pub result: Result<SolveResult>,
}

/// Runs one solve per entry of `counts`, overriding
/// [`SolverConfig::facilities`]. Entries come back in input order.
///
/// With the `parallel` feature and `parallel = true` the solves run on
/// rayon's pool; otherwise they run one after another.
///
/// # Examples
///
/// ```
/// use u_siting::sweep::sweep;
/// use u_siting::tabu::{SitingProblem, SolverConfig};
/// use u_siting::Grid;
///
/// let problem = SitingProblem::new(Grid::filled(6, 6, 1));
/// let config = SolverConfig::default()
///     .with_capacity(50)
///     .with_iteration_limit(5);
///
/// let entries = sweep(&problem, &config, &[1, 2, 3], false);
/// assert_eq!(entries.len(), 3);
/// assert!(entries.iter().all(|e| e.result.is_ok()));
/// ```
pub fn sweep(
    problem: &SitingProblem,
    config: &SolverConfig,
    counts: &[usize],
    parallel: bool,
) -> Vec<SweepEntry> {
    let (height, width) = problem.shape();
    let masks = Arc::new(DistanceMasks::new(height, width));
    info!(event = "sweep_start", runs = counts.len(), parallel);

    let run = |&facilities: &usize| {
        let result = TabuSearchSolver::with_masks(
            problem,
            config.clone().with_facilities(facilities),
            Arc::clone(&masks),
        )
        .and_then(|solver| solver.solve());
        SweepEntry { facilities, result }
    };

    map_counts(counts, parallel, run)
}

#[cfg(feature = "parallel")]
fn map_counts<F>(counts: &[usize], parallel: bool, run: F) -> Vec<SweepEntry>
where
    F: Fn(&usize) -> SweepEntry + Send + Sync,
{
    use rayon::prelude::*;

    if parallel {
        counts.par_iter().map(run).collect()
    } else {
        counts.iter().map(run).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn map_counts<F>(counts: &[usize], parallel: bool, run: F) -> Vec<SweepEntry>
where
    F: Fn(&usize) -> SweepEntry,
{
    if parallel {
        tracing::warn!(
            event = "sweep_sequential",
            "built without the `parallel` feature; running solves sequentially"
        );
    }
    counts.iter().map(run).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SitingError;
    use crate::grid::Grid;

    fn problem() -> SitingProblem {
        SitingProblem::new(
            Grid::from_rows(vec![
                vec![3, 0, 0, 1, 0],
                vec![0, 0, 2, 0, 0],
                vec![0, 1, 0, 0, 4],
                vec![2, 0, 0, 0, 0],
            ])
            .unwrap(),
        )
    }

    fn config() -> SolverConfig {
        SolverConfig::default()
            .with_capacity(100)
            .with_service_radius(2)
            .with_short_term_tenure(2)
            .with_long_term_tenure(1)
            .with_iteration_limit(8)
    }

    #[test]
    fn test_sweep_keeps_order() {
        let counts = [3, 1, 2];
        let entries = sweep(&problem(), &config(), &counts, false);
        let facilities: Vec<_> = entries.iter().map(|e| e.facilities).collect();
        assert_eq!(facilities, counts);
        for entry in &entries {
            let result = entry.result.as_ref().unwrap();
            assert_eq!(result.best.facility_count(), entry.facilities);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let counts = [1, 2, 3, 4];
        let seq = sweep(&problem(), &config(), &counts, false);
        let par = sweep(&problem(), &config(), &counts, true);
        for (a, b) in seq.iter().zip(&par) {
            assert_eq!(a.facilities, b.facilities);
            let (a, b) = (a.result.as_ref().unwrap(), b.result.as_ref().unwrap());
            assert_eq!(a.best, b.best);
            assert_eq!(a.best_cost, b.best_cost);
        }
    }

    #[test]
    fn test_more_facilities_never_cost_more_at_start() {
        let entries = sweep(&problem(), &config(), &[1, 4], false);
        let one = entries[0].result.as_ref().unwrap();
        let four = entries[1].result.as_ref().unwrap();
        assert!(four.cost_history[0] <= one.cost_history[0]);
    }

    #[test]
    fn test_errors_stay_per_entry() {
        let entries = sweep(&problem(), &config(), &[0, 2], false);
        assert!(matches!(
            entries[0].result,
            Err(SitingError::Configuration(_))
        ));
        assert!(entries[1].result.is_ok());
    }
}
