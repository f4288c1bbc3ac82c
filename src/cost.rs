//! Demand-weighted distance cost.

use crate::error::{Result, SitingError};
use crate::grid::{Cell, DemandMap, Placement};
use crate::masks::DistanceMasks;

/// Scores placements: every client pays the distance to its nearest
/// facility, with a saturating penalty past the service radius.
#[derive(Debug, Clone, Copy)]
pub struct CostModel<'a> {
    demand: &'a DemandMap,
    service_radius: usize,
    masks: &'a DistanceMasks,
}

impl<'a> CostModel<'a> {
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
        Ok(Self::from_parts(demand, service_radius, masks))
    }

    /// Skips the shape check; callers have already matched `masks` to `demand`.
    pub(crate) fn from_parts(
        demand: &'a DemandMap,
        service_radius: usize,
        masks: &'a DistanceMasks,
    ) -> Self {
        Self {
            demand,
            service_radius,
            masks,
        }
    }

    /// Sum over demand cells of `clients * penalty(distance)`.
    ///
    /// `placement` is expected to share the demand map's shape; sites
    /// outside the demand grid are never found by the ring search.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_siting::{CostModel, DistanceMasks, Grid, Placement};
    ///
    /// let demand = Grid::from_rows(vec![vec![0, 0, 6]]).unwrap();
    /// let masks = DistanceMasks::new(1, 3);
    /// let placement = Placement::from_cells(1, 3, [(0, 0)]).unwrap();
    /// assert_eq!(CostModel::new(&demand, 2, &masks).unwrap().cost(&placement), 12.0);
    /// ```
    pub fn cost(&self, placement: &Placement) -> f64 {
        self.demand
            .cells()
            .filter(|(_, &clients)| clients > 0)
            .map(|(cell, &clients)| f64::from(clients) * self.distance(placement, cell))
            .sum()
    }

    /// Penalised distance from `cell` to the nearest facility.
    pub fn distance(&self, placement: &Placement, cell: Cell) -> f64 {
        let r = self
            .masks
            .nearest_distance(placement, cell)
            .unwrap_or_else(|| self.masks.max_radius());
        self.penalty(r)
    }

    /// `r` inside the service radius, `d * (2 - e^(-(r - d) / d))` beyond it.
    ///
    /// The penalty never exceeds `2d`. With `d == 0` the exponent is
    /// undefined and the raw radius is used.
    pub fn penalty(&self, r: usize) -> f64 {
        let d = self.service_radius;
        if r <= d || d == 0 {
            return r as f64;
        }
        let d = d as f64;
        d * (2.0 - (-(r as f64 - d) / d).exp())
    }
}
