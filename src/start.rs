//! Greedy maximum-coverage starting solution.
//!
//! # Algorithm
//!
//! 1. Copy the demand map; the copy tracks demand not yet served.
//! 2. For each facility to place:
//!    a. Score every cell by how many distinct non-empty demand cells lie
//!    within the service radius (magnitude is ignored).
//!    b. Take the highest score, ties to the lowest row-major index. If the
//!    cell is occupied or banned, mark it `-1` and take the next.
//!    c. Occupy it and zero the remaining demand within the service radius.
//! 3. Fail once every score is `-1`.
//!
//! Scores are rebuilt from scratch for each facility, so a cell marked `-1`
//! while placing one facility becomes a candidate again for the next.

use tracing::trace;

use crate::error::{Result, SitingError};
use crate::feasibility::ConditionTester;
use crate::grid::{DemandMap, Grid, Placement};
use crate::masks::DistanceMasks;

const EXCLUDED: i64 = -1;

/// Builds a feasible initial placement with exactly `facilities` sites.
#[derive(Debug, Clone, Copy)]
pub struct StartingSolutionGenerator<'a> {
    demand: &'a DemandMap,
    facilities: usize,
    service_radius: usize,
    tester: &'a ConditionTester,
    masks: &'a DistanceMasks,
}

impl<'a> StartingSolutionGenerator<'a> {
    pub fn new(
        demand: &'a DemandMap,
        facilities: usize,
        service_radius: usize,
        tester: &'a ConditionTester,
        masks: &'a DistanceMasks,
    ) -> Self {
        Self {
            demand,
            facilities,
            service_radius,
            tester,
            masks,
        }
    }

    /// Runs the greedy construction.
    ///
    /// # Errors
    ///
    /// Returns [`SitingError::InfeasibleStart`] when no remaining cell can
    /// take another facility.
    pub fn generate(&self) -> Result<Placement> {
        let (height, width) = self.demand.shape();
        let mut remaining = self.demand.clone();
        let mut placement = Placement::empty(height, width);

        while placement.facility_count() < self.facilities {
            let mut scores = self.coverage_scores(&remaining);
            loop {
                let Some((idx, best)) = first_max(scores.as_slice()) else {
                    return Err(self.infeasible(&placement));
                };
                if best == EXCLUDED {
                    return Err(self.infeasible(&placement));
                }
                let cell = scores.cell_of(idx);
                if placement.is_occupied(cell) || self.tester.is_banned(cell) {
                    scores.as_mut_slice()[idx] = EXCLUDED;
                    continue;
                }

                trace!(row = cell.0, col = cell.1, score = best, "greedy site");
                placement.occupy(cell);
                for served in self.masks.disk(cell, self.service_radius) {
                    remaining[served] = 0;
                }
                break;
            }
        }

        Ok(placement)
    }

    /// For every cell, the number of non-empty cells of `remaining` within
    /// the service radius.
    pub fn coverage_scores(&self, remaining: &DemandMap) -> Grid<i64> {
        let (height, width) = remaining.shape();
        let mut scores = Grid::filled(height, width, 0i64);
        for (cell, &clients) in remaining.cells() {
            if clients > 0 {
                for covered in self.masks.disk(cell, self.service_radius) {
                    scores[covered] += 1;
                }
            }
        }
        scores
    }

    fn infeasible(&self, placement: &Placement) -> SitingError {
        SitingError::InfeasibleStart {
            placed: placement.facility_count(),
            requested: self.facilities,
        }
    }
}

/// Index and value of the first maximum.
fn first_max(values: &[i64]) -> Option<(usize, i64)> {
    values
        .iter()
        .copied()
        .enumerate()
        .fold(None, |acc, (i, v)| match acc {
            Some((_, best)) if best >= v => acc,
            _ => Some((i, v)),
        })
}
