//! Post-solve quality measures.
//!
//! Every demand cell is assigned to its nearest facility (ring search,
//! row-major tie-break). The spread of the resulting loads shows how evenly
//! a placement shares its clients; the in-range loads and the unserved
//! count show how well it covers them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, SitingError};
use crate::grid::{DemandMap, Grid, Placement};
use crate::masks::DistanceMasks;

/// Coverage and load summary of a placement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Utilization {
    /// Clients whose nearest facility lies beyond the service radius.
    pub unserved_clients: u64,
    /// `unserved_clients` over all clients; 0 for an empty map.
    pub unserved_share: f64,
    /// Mean in-range load per facility.
    pub mean_load: f64,
    pub median_load: f64,
    pub max_load: u64,
    pub min_load: u64,
}

/// Grades placements against one demand map.
#[derive(Debug, Clone, Copy)]
pub struct SolutionGrader<'a> {
    demand: &'a DemandMap,
    service_radius: usize,
    masks: &'a DistanceMasks,
}

impl<'a> SolutionGrader<'a> {
    /// # Errors
    ///
    /// Returns [`SitingError::Shape`] if `masks` were built for another grid.
    pub fn new(
        demand: &'a DemandMap,
        service_radius: usize,
        masks: &'a DistanceMasks,
    ) -> Result<Self> {
        if masks.shape() != demand.shape() {
            return Err(SitingError::Shape {
                expected: demand.shape(),
                found: masks.shape(),
            });
        }
        Ok(Self {
            demand,
            service_radius,
            masks,
        })
    }

    /// Clients per facility when each cell goes to its nearest site.
    /// Non-site cells stay 0.
    ///
    /// # Errors
    ///
    /// Returns [`SitingError::Shape`] if `placement` does not match the
    /// demand map. The same holds for the other grading methods.
    pub fn loads(&self, placement: &Placement) -> Result<Grid<u64>> {
        self.assign(placement, usize::MAX)
    }

    /// Population variance of the positive loads; 0 when there are none.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_siting::grading::SolutionGrader;
    /// use u_siting::{DistanceMasks, Grid, Placement};
    ///
    /// let demand = Grid::from_rows(vec![vec![2, 0, 0, 0, 4]]).unwrap();
    /// let masks = DistanceMasks::new(1, 5);
    /// let grader = SolutionGrader::new(&demand, 2, &masks).unwrap();
    /// let p = Placement::from_cells(1, 5, [(0, 0), (0, 4)]).unwrap();
    /// assert_eq!(grader.load_variance(&p).unwrap(), 1.0);
    /// ```
    pub fn load_variance(&self, placement: &Placement) -> Result<f64> {
        let positive: Vec<f64> = self
            .loads(placement)?
            .as_slice()
            .iter()
            .filter(|&&v| v > 0)
            .map(|&v| v as f64)
            .collect();
        if positive.is_empty() {
            return Ok(0.0);
        }
        let n = positive.len() as f64;
        let mean = positive.iter().sum::<f64>() / n;
        Ok(positive.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n)
    }

    /// Coverage and in-range load statistics.
    pub fn utilization(&self, placement: &Placement) -> Result<Utilization> {
        let in_range = self.assign(placement, self.service_radius)?;
        let served: u64 = in_range.as_slice().iter().sum();
        let total = self.demand.total();
        let unserved_clients = total - served;

        let mut loads: Vec<u64> = placement.sites().map(|c| in_range[c]).collect();
        loads.sort_unstable();

        let mean_load = if loads.is_empty() {
            0.0
        } else {
            served as f64 / loads.len() as f64
        };

        Ok(Utilization {
            unserved_clients,
            unserved_share: if total == 0 {
                0.0
            } else {
                unserved_clients as f64 / total as f64
            },
            mean_load,
            median_load: median(&loads),
            max_load: loads.last().copied().unwrap_or(0),
            min_load: loads.first().copied().unwrap_or(0),
        })
    }

    fn assign(&self, placement: &Placement, reach: usize) -> Result<Grid<u64>> {
        let (height, width) = self.demand.shape();
        if placement.shape() != (height, width) {
            return Err(SitingError::Shape {
                expected: (height, width),
                found: placement.shape(),
            });
        }
        let mut loads = Grid::filled(height, width, 0u64);
        for (cell, &clients) in self.demand.cells() {
            if clients == 0 {
                continue;
            }
            if let Some((site, distance)) = self.masks.nearest_site(placement, cell) {
                if distance <= reach {
                    loads[site] += u64::from(clients);
                }
            }
        }
        Ok(loads)
    }
}

fn median(sorted: &[u64]) -> f64 {
    match sorted.len() {
        0 => 0.0,
        n if n % 2 == 1 => sorted[n / 2] as f64,
        n => (sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0,
    }
}
