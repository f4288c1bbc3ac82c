//! Single-facility relocation neighborhood.
//!
//! For every site in row-major order, every free cell inside the
//! `(2r+1) × (2r+1)` box around it (clipped to the grid) yields one
//! neighbor: the same placement with that one facility moved. The base
//! placement is never modified.

use std::iter::FusedIterator;

use crate::grid::{Cell, Placement};

/// One relocation of a single facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbor {
    /// The placement after the move.
    pub placement: Placement,
    /// Cell the facility left.
    pub vacated: Cell,
    /// Cell the facility moved to.
    pub occupied: Cell,
}

/// Lazy, finite enumerator of [`Neighbor`]s.
///
/// Each site's box is clipped to the grid before it is walked, so the cost
/// of a scan depends on the grid size, not on `move_radius`.
///
/// # Examples
///
/// ```
/// use u_siting::{NeighborhoodGenerator, Placement};
///
/// let p = Placement::from_rows(vec![
///     vec![0, 1, 0, 0],
///     vec![0, 0, 1, 0],
///     vec![0, 0, 0, 0],
/// ]).unwrap();
/// assert_eq!(NeighborhoodGenerator::new(&p, 1).count(), 11);
/// ```
#[derive(Debug, Clone)]
pub struct NeighborhoodGenerator {
    base: Placement,
    sites: Vec<Cell>,
    radius: usize,
    site: usize,
    window: Option<Window>,
}

/// Row-major walk over the clipped box around one site.
#[derive(Debug, Clone, Copy)]
struct Window {
    from: Cell,
    rows: (usize, usize),
    cols: (usize, usize),
    next: Cell,
}

impl Window {
    fn around(from: Cell, radius: usize, (height, width): (usize, usize)) -> Self {
        let rows = (
            from.0.saturating_sub(radius),
            from.0.saturating_add(radius).min(height - 1),
        );
        let cols = (
            from.1.saturating_sub(radius),
            from.1.saturating_add(radius).min(width - 1),
        );
        Self {
            from,
            rows,
            cols,
            next: (rows.0, cols.0),
        }
    }

    fn advance(&mut self) -> Option<Cell> {
        let (row, col) = self.next;
        if row > self.rows.1 {
            return None;
        }
        self.next = if col < self.cols.1 {
            (row, col + 1)
        } else {
            (row + 1, self.cols.0)
        };
        Some((row, col))
    }

    fn remaining(&self) -> usize {
        let (row, col) = self.next;
        if row > self.rows.1 {
            return 0;
        }
        let width = self.cols.1 - self.cols.0 + 1;
        (self.rows.1 - row) * width + (self.cols.1 - col + 1)
    }
}

impl NeighborhoodGenerator {
    pub fn new(placement: &Placement, move_radius: usize) -> Self {
        Self {
            base: placement.clone(),
            sites: placement.sites().collect(),
            radius: move_radius,
            site: 0,
            window: None,
        }
    }
}

impl Iterator for NeighborhoodGenerator {
    type Item = Neighbor;

    fn next(&mut self) -> Option<Neighbor> {
        loop {
            let mut window = match self.window {
                Some(window) => window,
                None => {
                    let &from = self.sites.get(self.site)?;
                    self.site += 1;
                    Window::around(from, self.radius, self.base.shape())
                }
            };
            let next = window.advance();
            self.window = next.map(|_| window);
            let Some(to) = next else {
                continue;
            };
            if self.base.is_occupied(to) {
                continue;
            }
            let from = window.from;
            let mut placement = self.base.clone();
            placement.vacate(from);
            placement.occupy(to);
            return Some(Neighbor {
                placement,
                vacated: from,
                occupied: to,
            });
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (height, width) = self.base.shape();
        let pending = self.sites.len().saturating_sub(self.site);
        let current = self.window.as_ref().map_or(0, Window::remaining);
        let upper = pending
            .checked_mul(height * width)
            .and_then(|n| n.checked_add(current));
        (0, upper)
    }
}

impl FusedIterator for NeighborhoodGenerator {}
