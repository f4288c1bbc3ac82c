//! Problem and result types for the siting Tabu Search.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, SitingError};
use crate::grid::{DemandMap, ExclusionMap, Placement};

/// The immutable inputs of a solve: where the clients are and where
/// facilities may never go.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SitingProblem {
    demand: DemandMap,
    exclusion: Option<ExclusionMap>,
}

impl SitingProblem {
    pub fn new(demand: DemandMap) -> Self {
        Self {
            demand,
            exclusion: None,
        }
    }

    /// Adds an exclusion map.
    ///
    /// # Errors
    ///
    /// Returns [`SitingError::Shape`] if its shape differs from the demand map.
    pub fn with_exclusion(mut self, exclusion: ExclusionMap) -> Result<Self> {
        if exclusion.shape() != self.demand.shape() {
            return Err(SitingError::Shape {
                expected: self.demand.shape(),
                found: exclusion.shape(),
            });
        }
        self.exclusion = Some(exclusion);
        Ok(self)
    }

    pub fn demand(&self) -> &DemandMap {
        &self.demand
    }

    pub fn exclusion(&self) -> Option<&ExclusionMap> {
        self.exclusion.as_ref()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.demand.shape()
    }
}

/// Why a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopReason {
    /// The iteration budget ran out.
    IterationLimit,
    /// The time budget ran out.
    TimeLimit,
    /// An iteration found neither an admissible move nor a tabu move
    /// satisfying aspiration.
    NoAdmissibleMove,
}

/// Result of a Tabu Search run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveResult {
    /// Best placement found.
    pub best: Placement,
    /// Cost of the best placement.
    pub best_cost: f64,
    /// Iterations completed.
    pub iterations: usize,
    /// Iteration at which the best placement was found (0 = start).
    pub best_iteration: usize,
    /// Incumbent cost after the start and after every iteration.
    pub cost_history: Vec<f64>,
    pub stop_reason: StopReason,
}
