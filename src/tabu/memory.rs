//! Per-cell countdown memories.
//!
//! The short-term memory counts down on cells a facility just left and
//! forbids moving a facility back onto them. The long-term memory counts
//! down on cells a facility just entered and forbids moving that facility
//! away. Both are plain grids of counters decremented once per iteration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grid::{Cell, Grid, Placement};

/// Grid of non-negative countdowns.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TabuMemory {
    counters: Grid<u32>,
}

impl TabuMemory {
    /// An all-zero memory.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            counters: Grid::filled(height, width, 0),
        }
    }

    pub fn from_grid(counters: Grid<u32>) -> Self {
        Self { counters }
    }

    #[inline]
    pub fn get(&self, cell: Cell) -> u32 {
        self.counters.get(cell).copied().unwrap_or(0)
    }

    pub fn set(&mut self, cell: Cell, value: u32) {
        if self.counters.contains(cell) {
            self.counters[cell] = value;
        }
    }

    pub fn clear(&mut self, cell: Cell) {
        self.set(cell, 0);
    }

    /// Decrements every positive counter by one.
    pub fn decrement(&mut self) {
        for v in self.counters.as_mut_slice() {
            *v = v.saturating_sub(1);
        }
    }

    /// `true` if no counter is running.
    pub fn is_clear(&self) -> bool {
        self.counters.as_slice().iter().all(|&v| v == 0)
    }

    /// Cells with a running counter, row-major.
    pub fn active(&self) -> impl Iterator<Item = (Cell, u32)> + '_ {
        self.counters
            .cells()
            .filter(|(_, &v)| v > 0)
            .map(|(c, &v)| (c, v))
    }

    pub fn grid(&self) -> &Grid<u32> {
        &self.counters
    }

    /// Short-term test: the candidate is tabu when fewer than `facilities`
    /// of its sites have a zero countdown, i.e. some facility stands on a
    /// recently vacated cell.
    ///
    /// Returns the largest countdown among the offending sites, or `None`
    /// when the candidate is admissible.
    pub fn blocks_occupation(&self, candidate: &Placement, facilities: usize) -> Option<u32> {
        let mut free = 0usize;
        let mut cadence = 0u32;
        for cell in candidate.sites() {
            match self.get(cell) {
                0 => free += 1,
                v => cadence = cadence.max(v),
            }
        }
        (free < facilities).then_some(cadence)
    }

    /// Long-term test: the candidate is tabu when some frozen cell is left
    /// without a facility.
    ///
    /// Returns the largest countdown among the abandoned cells, or `None`
    /// when the candidate is admissible.
    pub fn blocks_removal(&self, candidate: &Placement) -> Option<u32> {
        self.active()
            .filter(|&(cell, _)| !candidate.is_occupied(cell))
            .map(|(_, v)| v)
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> TabuMemory {
        TabuMemory::from_grid(
            Grid::from_rows(vec![
                vec![0, 5, 1],
                vec![0, 2, 0],
                vec![0, 3, 0],
                vec![0, 0, 0],
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_short_term_not_tabu() {
        let candidate = Placement::from_rows(vec![
            vec![1, 0, 0],
            vec![1, 0, 1],
            vec![0, 0, 1],
            vec![0, 1, 0],
        ])
        .unwrap();
        assert_eq!(memory().blocks_occupation(&candidate, 5), None);
    }

    #[test]
    fn test_short_term_tabu() {
        let candidate = Placement::from_rows(vec![
            vec![1, 0, 0],
            vec![1, 0, 1],
            vec![0, 1, 1],
            vec![0, 0, 0],
        ])
        .unwrap();
        assert_eq!(memory().blocks_occupation(&candidate, 5), Some(3));
    }

    #[test]
    fn test_short_term_two_offending_sites() {
        let candidate = Placement::from_rows(vec![
            vec![1, 0, 0],
            vec![1, 1, 0],
            vec![0, 1, 1],
            vec![0, 0, 0],
        ])
        .unwrap();
        assert_eq!(memory().blocks_occupation(&candidate, 5), Some(3));
    }

    #[test]
    fn test_long_term_not_tabu() {
        let candidate = Placement::from_rows(vec![
            vec![0, 1, 1],
            vec![0, 1, 1],
            vec![0, 1, 0],
            vec![0, 0, 0],
        ])
        .unwrap();
        assert_eq!(memory().blocks_removal(&candidate), None);
    }

    #[test]
    fn test_long_term_tabu() {
        let candidate = Placement::from_rows(vec![
            vec![0, 1, 1],
            vec![1, 0, 1],
            vec![0, 1, 0],
            vec![0, 0, 0],
        ])
        .unwrap();
        assert_eq!(memory().blocks_removal(&candidate), Some(2));
    }

    #[test]
    fn test_long_term_two_abandoned() {
        let candidate = Placement::from_rows(vec![
            vec![1, 0, 0],
            vec![1, 1, 0],
            vec![0, 1, 1],
            vec![0, 0, 0],
        ])
        .unwrap();
        assert_eq!(memory().blocks_removal(&candidate), Some(5));
    }

    #[test]
    fn test_decrement() {
        let mut m = memory();
        m.decrement();
        let expected = Grid::from_rows(vec![
            vec![0, 4, 0],
            vec![0, 1, 0],
            vec![0, 2, 0],
            vec![0, 0, 0],
        ])
        .unwrap();
        assert_eq!(m.grid(), &expected);
    }

    #[test]
    fn test_clear_and_set() {
        let mut m = memory();
        m.clear((0, 1));
        m.set((2, 0), 10);
        let expected = Grid::from_rows(vec![
            vec![0, 0, 1],
            vec![0, 2, 0],
            vec![10, 3, 0],
            vec![0, 0, 0],
        ])
        .unwrap();
        assert_eq!(m.grid(), &expected);
        // Out-of-range writes are ignored.
        m.set((9, 9), 4);
        assert_eq!(m.grid(), &expected);
    }

    #[test]
    fn test_is_clear() {
        let mut m = TabuMemory::new(2, 2);
        assert!(m.is_clear());
        m.set((1, 1), 1);
        assert!(!m.is_clear());
        m.decrement();
        assert!(m.is_clear());
    }
}
