//! Feasibility oracle for placements.
//!
//! All constraints are folded into a ban matrix once, at construction. A
//! cell is banned if it is excluded, lies in the border frame, or has more
//! demand within the service radius than one facility can take. The
//! capacity bound is conservative and independent of where the other
//! facilities sit.

use crate::error::{Result, SitingError};
use crate::grid::{Cell, DemandMap, ExclusionMap, Grid, Placement};
use crate::masks::DistanceMasks;

/// Checks placements against capacity, exclusion and frame constraints.
#[derive(Debug, Clone)]
pub struct ConditionTester {
    ban_matrix: Grid<bool>,
}

impl ConditionTester {
    /// Precomputes the ban matrix.
    ///
    /// # Errors
    ///
    /// Returns [`SitingError::Shape`] if `exclusion` or `masks` do not match
    /// the demand grid.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_siting::{ConditionTester, DistanceMasks, Grid, Placement};
    ///
    /// let demand = Grid::from_rows(vec![vec![0, 9], vec![0, 0]]).unwrap();
    /// let masks = DistanceMasks::new(2, 2);
    /// let tester = ConditionTester::new(&demand, 5, 0, None, 0, &masks).unwrap();
    ///
    /// assert!(tester.is_banned((0, 1)));
    /// let ok = Placement::from_cells(2, 2, [(1, 0)]).unwrap();
    /// assert!(tester.is_allowed(&ok));
    /// ```
    pub fn new(
        demand: &DemandMap,
        capacity: u64,
        service_radius: usize,
        exclusion: Option<&ExclusionMap>,
        frame: usize,
        masks: &DistanceMasks,
    ) -> Result<Self> {
        let shape = demand.shape();
        if let Some(excluded) = exclusion {
            if excluded.shape() != shape {
                return Err(SitingError::Shape {
                    expected: shape,
                    found: excluded.shape(),
                });
            }
        }
        if masks.shape() != shape {
            return Err(SitingError::Shape {
                expected: shape,
                found: masks.shape(),
            });
        }

        let (height, width) = shape;
        let mut ban_matrix = Grid::filled(height, width, false);
        for row in 0..height {
            for col in 0..width {
                let cell = (row, col);
                ban_matrix[cell] = exclusion.is_some_and(|e| e[cell])
                    || in_frame(cell, frame, height, width)
                    || masks.disk_sum(demand, cell, service_radius) > capacity;
            }
        }

        Ok(Self { ban_matrix })
    }

    /// `true` iff no facility sits on a banned cell.
    #[inline]
    pub fn is_allowed(&self, placement: &Placement) -> bool {
        placement.sites().all(|cell| !self.is_banned(cell))
    }

    /// Whether a facility at `cell` would violate a constraint on its own.
    /// Cells outside the grid count as banned.
    #[inline]
    pub fn is_banned(&self, cell: Cell) -> bool {
        self.ban_matrix.get(cell).copied().unwrap_or(true)
    }

    pub fn ban_matrix(&self) -> &Grid<bool> {
        &self.ban_matrix
    }
}

fn in_frame((row, col): Cell, frame: usize, height: usize, width: usize) -> bool {
    row < frame
        || col < frame
        || row >= height.saturating_sub(frame)
        || col >= width.saturating_sub(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn demand() -> DemandMap {
        Grid::from_rows(vec![
            vec![0, 0, 1, 2],
            vec![3, 5, 0, 2],
            vec![0, 1, 2, 4],
            vec![3, 2, 2, 0],
            vec![0, 0, 1, 1],
        ])
        .unwrap()
    }

    fn tester(demand: &DemandMap, capacity: u64, radius: usize) -> ConditionTester {
        let (h, w) = demand.shape();
        ConditionTester::new(demand, capacity, radius, None, 0, &DistanceMasks::new(h, w)).unwrap()
    }

    #[test]
    fn test_overloaded_area_not_banned() {
        let t = tester(&demand(), 20, 2);
        assert!(!t.is_banned((2, 2)));
    }

    #[test]
    fn test_overloaded_area_banned() {
        let mut d = demand();
        d[(3, 2)] = 8;
        d[(3, 3)] = 8;
        let t = tester(&d, 20, 2);
        assert!(t.is_banned((2, 3)));
    }

    #[test]
    fn test_ban_matrix_capacity() {
        let t = tester(&demand(), 20, 2);
        let banned: Vec<_> = t
            .ban_matrix()
            .cells()
            .filter(|(_, &b)| b)
            .map(|(c, _)| c)
            .collect();
        assert_eq!(banned, vec![(1, 2), (2, 1)]);
    }

    #[test]
    fn test_is_allowed_false() {
        let t = tester(&demand(), 20, 2);
        let p = Placement::from_rows(vec![
            vec![1, 0, 0, 0],
            vec![0, 1, 0, 0],
            vec![1, 1, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 1, 0, 0],
        ])
        .unwrap();
        assert!(!t.is_allowed(&p));
    }

    #[test]
    fn test_is_allowed_true() {
        let t = tester(&demand(), 20, 2);
        let p = Placement::from_rows(vec![
            vec![1, 0, 0, 0],
            vec![0, 1, 0, 0],
            vec![1, 0, 0, 0],
            vec![0, 0, 0, 1],
            vec![0, 1, 0, 0],
        ])
        .unwrap();
        assert!(t.is_allowed(&p));
    }

    #[test]
    fn test_exclusion_map() {
        let d = Grid::filled(3, 3, 0u32);
        let mut excluded = Grid::filled(3, 3, false);
        excluded[(1, 1)] = true;
        let masks = DistanceMasks::new(3, 3);
        let t = ConditionTester::new(&d, 10, 1, Some(&excluded), 0, &masks).unwrap();

        assert!(t.is_banned((1, 1)));
        assert!(!t.is_allowed(&Placement::from_cells(3, 3, [(1, 1)]).unwrap()));
        assert!(t.is_allowed(&Placement::from_cells(3, 3, [(0, 0)]).unwrap()));
    }

    #[test]
    fn test_exclusion_shape_mismatch() {
        let d = Grid::filled(3, 3, 0u32);
        let excluded = Grid::filled(2, 3, false);
        let masks = DistanceMasks::new(3, 3);
        let result = ConditionTester::new(&d, 10, 1, Some(&excluded), 0, &masks);
        assert!(matches!(result, Err(SitingError::Shape { .. })));
    }

    #[test]
    fn test_frame_bans_border() {
        let d = Grid::filled(5, 5, 0u32);
        let masks = DistanceMasks::new(5, 5);
        let t = ConditionTester::new(&d, 10, 1, None, 1, &masks).unwrap();

        for ((row, col), &banned) in t.ban_matrix().cells() {
            let border = row == 0 || col == 0 || row == 4 || col == 4;
            assert_eq!(banned, border, "cell ({row},{col})");
        }
    }

    #[test]
    fn test_huge_frame_bans_everything() {
        let d = Grid::filled(3, 4, 0u32);
        let masks = DistanceMasks::new(3, 4);
        for frame in [2, usize::MAX] {
            let t = ConditionTester::new(&d, 10, 1, None, frame, &masks).unwrap();
            assert_eq!(t.ban_matrix().count(|&b| b), 12);
        }
    }

    #[test]
    fn test_zero_frame_bans_nothing() {
        let d = Grid::filled(3, 3, 0u32);
        let masks = DistanceMasks::new(3, 3);
        let t = ConditionTester::new(&d, 0, 1, None, 0, &masks).unwrap();
        assert_eq!(t.ban_matrix().count(|&b| b), 0);
    }

    #[test]
    fn test_empty_placement_allowed() {
        let t = tester(&demand(), 0, 2);
        assert!(t.is_allowed(&Placement::empty(5, 4)));
    }

    proptest! {
        #[test]
        fn prop_is_allowed_is_pure(
            values in proptest::collection::vec(0u32..6, 30),
            sites in proptest::collection::vec((0usize..5, 0usize..6), 0..6),
            capacity in 0u64..40,
        ) {
            let d = Grid::from_vec(5, 6, values).unwrap();
            let masks = DistanceMasks::new(5, 6);
            let t = ConditionTester::new(&d, capacity, 1, None, 0, &masks).unwrap();
            let p = Placement::from_cells(5, 6, sites).unwrap();

            let first = t.is_allowed(&p);
            prop_assert_eq!(first, t.is_allowed(&p));
            let expected = p.sites().all(|c| masks.disk_sum(&d, c, 1) <= capacity);
            prop_assert_eq!(first, expected);
        }
    }
}
