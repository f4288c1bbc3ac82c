//! Tabu Search configuration.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, SitingError};

/// Configuration parameters for the siting Tabu Search.
///
/// Exactly one of [`time_limit`](Self::time_limit) and
/// [`iteration_limit`](Self::iteration_limit) must be set.
///
/// # Examples
///
/// ```
/// use u_siting::tabu::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_facilities(20)
///     .with_capacity(30)
///     .with_service_radius(3)
///     .with_iteration_limit(100);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.facilities, 20);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverConfig {
    /// Number of facilities to place (`n_max`).
    pub facilities: usize,
    /// Most clients a single site may have within its service radius (`p_max`).
    pub capacity: u64,
    /// Distance served at full efficiency (`d_max`).
    pub service_radius: usize,
    /// Half-width of the box a facility may move within per iteration (`r`).
    pub move_radius: usize,
    /// Iterations a vacated cell stays closed to new facilities.
    pub short_term_tenure: u32,
    /// Iterations a newly occupied cell stays frozen.
    pub long_term_tenure: u32,
    /// Width of the border band where no facility may stand.
    pub frame: usize,
    /// Stop scanning a neighborhood once a clearly better move is found.
    pub dynamic_neighborhood: bool,
    /// Early-exit threshold factor: the scan stops once the best admissible
    /// cost drops below `factor * (incumbent + current)`.
    pub early_exit_factor: f64,
    /// Accept a tabu move when it beats the incumbent.
    pub aspiration: bool,
    /// Wall-clock budget.
    pub time_limit: Option<Duration>,
    /// Iteration budget.
    pub iteration_limit: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            facilities: 20,
            capacity: 30,
            service_radius: 3,
            move_radius: 1,
            short_term_tenure: 30,
            long_term_tenure: 7,
            frame: 0,
            dynamic_neighborhood: true,
            early_exit_factor: 0.5,
            aspiration: true,
            time_limit: None,
            iteration_limit: None,
        }
    }
}

impl SolverConfig {
    /// Sets the number of facilities.
    pub fn with_facilities(mut self, n: usize) -> Self {
        self.facilities = n;
        self
    }

    /// Sets the per-site capacity.
    pub fn with_capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the service radius.
    pub fn with_service_radius(mut self, radius: usize) -> Self {
        self.service_radius = radius;
        self
    }

    /// Sets the relocation radius.
    pub fn with_move_radius(mut self, radius: usize) -> Self {
        self.move_radius = radius;
        self
    }

    /// Sets the short-term (vacated cell) tenure.
    pub fn with_short_term_tenure(mut self, tenure: u32) -> Self {
        self.short_term_tenure = tenure;
        self
    }

    /// Sets the long-term (occupied cell) tenure.
    pub fn with_long_term_tenure(mut self, tenure: u32) -> Self {
        self.long_term_tenure = tenure;
        self
    }

    /// Sets the border frame width.
    pub fn with_frame(mut self, frame: usize) -> Self {
        self.frame = frame;
        self
    }

    /// Enables or disables the early neighborhood exit.
    pub fn with_dynamic_neighborhood(mut self, enabled: bool) -> Self {
        self.dynamic_neighborhood = enabled;
        self
    }

    /// Sets the early-exit threshold factor.
    pub fn with_early_exit_factor(mut self, factor: f64) -> Self {
        self.early_exit_factor = factor;
        self
    }

    /// Enables or disables the aspiration criterion.
    pub fn with_aspiration(mut self, aspiration: bool) -> Self {
        self.aspiration = aspiration;
        self
    }

    /// Sets a wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Sets an iteration budget.
    pub fn with_iteration_limit(mut self, n: usize) -> Self {
        self.iteration_limit = Some(n);
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// [`SitingError::Configuration`] if zero or two stop criteria are set,
    /// no facilities are requested, or the early-exit factor is not a
    /// positive finite number.
    pub fn validate(&self) -> Result<()> {
        match (self.time_limit, self.iteration_limit) {
            (None, None) => {
                return Err(SitingError::Configuration(
                    "no stop criterion: set either time_limit or iteration_limit".into(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(SitingError::Configuration(
                    "two stop criteria: set only one of time_limit and iteration_limit".into(),
                ))
            }
            _ => {}
        }
        if self.facilities == 0 {
            return Err(SitingError::Configuration(
                "facilities must be positive".into(),
            ));
        }
        if !self.early_exit_factor.is_finite() || self.early_exit_factor <= 0.0 {
            return Err(SitingError::Configuration(format!(
                "early_exit_factor must be positive and finite, got {}",
                self.early_exit_factor
            )));
        }
        Ok(())
    }
}
