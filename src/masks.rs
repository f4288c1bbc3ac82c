//! Precomputed Manhattan ("diamond") rings.
//!
//! The ring of radius `r` is the set of offsets `(dy, dx)` with
//! `|dy| + |dx| == r`; the disk of radius `r` is the union of rings
//! `0..=r`. Both are built once per grid shape and clipped to the grid at
//! query time, so every consumer (feasibility, the greedy constructor, the
//! cost model and the grader) walks the same neighborhoods.

use crate::grid::{Cell, Grid, Placement};

/// Ring offsets for every radius a grid of the given shape can need.
#[derive(Debug, Clone)]
pub struct DistanceMasks {
    height: usize,
    width: usize,
    rings: Vec<Vec<(isize, isize)>>,
}

impl DistanceMasks {
    /// Builds rings for radii `0..=height + width`.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_siting::DistanceMasks;
    ///
    /// let masks = DistanceMasks::new(5, 5);
    /// assert_eq!(masks.ring_offsets(0), &[(0, 0)]);
    /// assert_eq!(masks.ring_offsets(2).len(), 8);
    /// ```
    pub fn new(height: usize, width: usize) -> Self {
        let max_radius = height + width;
        let rings = (0..=max_radius).map(ring_offsets).collect();
        Self {
            height,
            width,
            rings,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Largest radius with a precomputed ring.
    pub fn max_radius(&self) -> usize {
        self.rings.len() - 1
    }

    /// Offsets at exactly distance `r`, in row-major order. Empty past
    /// [`max_radius`](Self::max_radius).
    pub fn ring_offsets(&self, r: usize) -> &[(isize, isize)] {
        self.rings.get(r).map_or(&[], Vec::as_slice)
    }

    /// Whether `(dy, dx)` lies on the ring of radius `r`.
    #[inline]
    pub fn on_ring(r: usize, dy: isize, dx: isize) -> bool {
        dy.unsigned_abs() + dx.unsigned_abs() == r
    }

    /// Grid cells at exactly distance `r` from `center`, row-major.
    pub fn ring(&self, center: Cell, r: usize) -> impl Iterator<Item = Cell> + '_ {
        let (height, width) = (self.height, self.width);
        self.ring_offsets(r)
            .iter()
            .filter_map(move |&(dy, dx)| shift(center, dy, dx, height, width))
    }

    /// Grid cells within distance `r` of `center`.
    pub fn disk(&self, center: Cell, r: usize) -> impl Iterator<Item = Cell> + '_ {
        let r = r.min(self.max_radius());
        (0..=r).flat_map(move |radius| self.ring(center, radius))
    }

    /// Sum of `grid` over the disk of radius `r` around `center`.
    pub fn disk_sum(&self, grid: &Grid<u32>, center: Cell, r: usize) -> u64 {
        self.disk(center, r).map(|c| u64::from(grid[c])).sum()
    }

    /// First occupied cell met by an expanding ring search from `center`,
    /// with its distance. Ties at equal distance go to the row-major first.
    pub fn nearest_site(&self, placement: &Placement, center: Cell) -> Option<(Cell, usize)> {
        (0..=self.max_radius()).find_map(|r| {
            self.ring(center, r)
                .find(|&c| placement.is_occupied(c))
                .map(|c| (c, r))
        })
    }

    /// Distance from `center` to the nearest facility.
    pub fn nearest_distance(&self, placement: &Placement, center: Cell) -> Option<usize> {
        (0..=self.max_radius()).find(|&r| self.ring(center, r).any(|c| placement.is_occupied(c)))
    }
}

fn ring_offsets(r: usize) -> Vec<(isize, isize)> {
    let r = r as isize;
    let mut offsets = Vec::with_capacity((4 * r).max(1) as usize);
    for dy in -r..=r {
        let rem = r - dy.abs();
        if rem == 0 {
            offsets.push((dy, 0));
        } else {
            offsets.push((dy, -rem));
            offsets.push((dy, rem));
        }
    }
    offsets
}

#[inline]
fn shift((row, col): Cell, dy: isize, dx: isize, height: usize, width: usize) -> Option<Cell> {
    let row = row.checked_add_signed(dy)?;
    let col = col.checked_add_signed(dx)?;
    (row < height && col < width).then_some((row, col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_sizes() {
        let masks = DistanceMasks::new(4, 4);
        assert_eq!(masks.ring_offsets(0).len(), 1);
        for r in 1..=masks.max_radius() {
            assert_eq!(masks.ring_offsets(r).len(), 4 * r);
        }
        assert!(masks.ring_offsets(masks.max_radius() + 1).is_empty());
    }

    #[test]
    fn test_ring_offsets_exact_distance() {
        let masks = DistanceMasks::new(6, 6);
        for r in 0..=masks.max_radius() {
            for &(dy, dx) in masks.ring_offsets(r) {
                assert!(DistanceMasks::on_ring(r, dy, dx));
            }
        }
    }

    #[test]
    fn test_ring_row_major_order() {
        let masks = DistanceMasks::new(3, 3);
        assert_eq!(
            masks.ring_offsets(1),
            &[(-1, 0), (0, -1), (0, 1), (1, 0)]
        );
    }

    #[test]
    fn test_ring_clipped_at_corner() {
        let masks = DistanceMasks::new(3, 3);
        let cells: Vec<_> = masks.ring((0, 0), 1).collect();
        assert_eq!(cells, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_disk_matches_manhattan_ball() {
        let masks = DistanceMasks::new(5, 6);
        let center = (2, 1);
        let mut cells: Vec<_> = masks.disk(center, 2).collect();
        cells.sort();
        let mut expected = Vec::new();
        for y in 0..5usize {
            for x in 0..6usize {
                if y.abs_diff(center.0) + x.abs_diff(center.1) <= 2 {
                    expected.push((y, x));
                }
            }
        }
        assert_eq!(cells, expected);
    }

    #[test]
    fn test_disk_sum() {
        let demand = Grid::from_rows(vec![
            vec![1, 2, 9, 1],
            vec![6, 3, 0, 0],
            vec![0, 0, 7, 5],
        ])
        .unwrap();
        let masks = DistanceMasks::new(3, 4);
        // (1,2) and its four neighbours: 0 + 9 + 3 + 0 + 7
        assert_eq!(masks.disk_sum(&demand, (1, 2), 1), 19);
    }

    #[test]
    fn test_disk_sum_large_radius() {
        let demand = Grid::from_rows(vec![
            vec![1, 2, 9, 1],
            vec![3, 3, 3, 0],
            vec![8, 0, 7, 5],
            vec![6, 7, 0, 2],
            vec![2, 8, 3, 0],
        ])
        .unwrap();
        let masks = DistanceMasks::new(5, 4);
        // (0,0)=1, (0,2)=9, (0,3)=1 and (1,3)=0 lie beyond distance 3 of (3,1).
        assert_eq!(masks.disk_sum(&demand, (3, 1), 3), demand.total() - 11);
        assert_eq!(masks.disk_sum(&demand, (3, 1), 3), 59);
    }

    #[test]
    fn test_nearest_site() {
        let placement = Placement::from_rows(vec![
            vec![0, 0, 1],
            vec![1, 0, 0],
            vec![0, 0, 0],
            vec![0, 0, 0],
        ])
        .unwrap();
        let masks = DistanceMasks::new(4, 3);
        assert_eq!(masks.nearest_site(&placement, (3, 2)), Some(((0, 2), 3)));
        assert_eq!(masks.nearest_site(&placement, (3, 0)), Some(((1, 0), 2)));
        assert_eq!(masks.nearest_distance(&placement, (1, 0)), Some(0));
    }

    #[test]
    fn test_nearest_site_tie_goes_row_major() {
        let placement = Placement::from_cells(3, 3, [(1, 0), (0, 1)]).unwrap();
        let masks = DistanceMasks::new(3, 3);
        assert_eq!(masks.nearest_site(&placement, (1, 1)), Some(((0, 1), 1)));
    }

    #[test]
    fn test_nearest_site_empty_placement() {
        let masks = DistanceMasks::new(2, 2);
        assert_eq!(masks.nearest_site(&Placement::empty(2, 2), (0, 0)), None);
    }
}
