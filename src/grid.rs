//! Dense grid storage and the binary facility placement.
//!
//! All maps in this crate share one coordinate convention: a [`Cell`] is
//! `(row, col)` and storage is row-major, so "lowest index" tie-breaks
//! scan rows top to bottom and columns left to right.

use std::ops::{Index, IndexMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, SitingError};

/// A grid coordinate as `(row, col)`.
pub type Cell = (usize, usize);

/// Number of clients per cell. Fixed for the duration of a solve.
pub type DemandMap = Grid<u32>;

/// Cells where no facility may ever be placed.
pub type ExclusionMap = Grid<bool>;

/// Dense H×W grid stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grid<T> {
    height: usize,
    width: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Creates a grid with every cell set to `value`.
    pub fn filled(height: usize, width: usize, value: T) -> Self {
        Self {
            height,
            width,
            data: vec![value; height * width],
        }
    }

    /// Builds a grid from nested rows.
    ///
    /// # Errors
    ///
    /// Returns [`SitingError::Shape`] if the rows have different lengths.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_siting::Grid;
    ///
    /// let grid = Grid::from_rows(vec![vec![1u32, 2], vec![3, 4]]).unwrap();
    /// assert_eq!(grid.shape(), (2, 2));
    /// assert_eq!(grid[(1, 0)], 3);
    /// ```
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(height * width);
        for row in rows {
            if row.len() != width {
                return Err(SitingError::Shape {
                    expected: (height, width),
                    found: (height, row.len()),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            height,
            width,
            data,
        })
    }
}

impl<T> Grid<T> {
    /// Builds a grid from row-major data.
    ///
    /// # Errors
    ///
    /// Returns [`SitingError::Shape`] if `data.len() != height * width`.
    pub fn from_vec(height: usize, width: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != height * width {
            return Err(SitingError::Shape {
                expected: (height, width),
                found: (data.len() / width.max(1), width),
            });
        }
        Ok(Self {
            height,
            width,
            data,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// `(height, width)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major index of `cell`.
    #[inline]
    pub fn index_of(&self, (row, col): Cell) -> usize {
        row * self.width + col
    }

    /// Cell at row-major index `idx`.
    #[inline]
    pub fn cell_of(&self, idx: usize) -> Cell {
        (idx / self.width, idx % self.width)
    }

    #[inline]
    pub fn contains(&self, (row, col): Cell) -> bool {
        row < self.height && col < self.width
    }

    pub fn get(&self, cell: Cell) -> Option<&T> {
        if self.contains(cell) {
            self.data.get(self.index_of(cell))
        } else {
            None
        }
    }

    /// Raw row-major storage.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Iterates `(cell, value)` pairs in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Cell, &T)> + '_ {
        let width = self.width.max(1);
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| ((i / width, i % width), v))
    }

    /// Applies `f` to every cell, keeping the shape.
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Grid<U> {
        Grid {
            height: self.height,
            width: self.width,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Number of cells matching `pred`.
    pub fn count<F: Fn(&T) -> bool>(&self, pred: F) -> usize {
        self.data.iter().filter(|v| pred(v)).count()
    }
}

impl Grid<u32> {
    /// Sum of all cell values.
    pub fn total(&self) -> u64 {
        self.data.iter().map(|&v| u64::from(v)).sum()
    }
}

impl<T> Index<Cell> for Grid<T> {
    type Output = T;

    fn index(&self, cell: Cell) -> &T {
        &self.data[self.index_of(cell)]
    }
}

impl<T> IndexMut<Cell> for Grid<T> {
    fn index_mut(&mut self, cell: Cell) -> &mut T {
        let idx = self.index_of(cell);
        &mut self.data[idx]
    }
}

/// A set of facility sites on the grid.
///
/// Keeps a binary occupancy grid and the sorted row-major indices of the
/// occupied cells side by side, so membership is O(1) and iterating the
/// sites is O(N).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    occupancy: Grid<bool>,
    sites: Vec<usize>,
}

impl Placement {
    /// A placement with no facilities.
    pub fn empty(height: usize, width: usize) -> Self {
        Self {
            occupancy: Grid::filled(height, width, false),
            sites: Vec::new(),
        }
    }

    /// Builds a placement from the given sites.
    ///
    /// # Errors
    ///
    /// Returns [`SitingError::Shape`] if a site lies outside the grid.
    pub fn from_cells<I>(height: usize, width: usize, cells: I) -> Result<Self>
    where
        I: IntoIterator<Item = Cell>,
    {
        let mut placement = Self::empty(height, width);
        for cell in cells {
            if !placement.occupancy.contains(cell) {
                return Err(SitingError::Shape {
                    expected: (height, width),
                    found: (cell.0 + 1, cell.1 + 1),
                });
            }
            placement.occupy(cell);
        }
        Ok(placement)
    }

    /// Builds a placement from a {0,1} matrix; any non-zero value is a site.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_siting::Placement;
    ///
    /// let p = Placement::from_rows(vec![vec![0, 1], vec![1, 0]]).unwrap();
    /// assert_eq!(p.facility_count(), 2);
    /// assert!(p.is_occupied((0, 1)));
    /// ```
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self> {
        let grid = Grid::from_rows(rows)?;
        Ok(Self::from_grid(&grid))
    }

    /// Builds a placement from any grid of integers.
    pub fn from_grid(grid: &Grid<u8>) -> Self {
        let occupancy = grid.map(|&v| v > 0);
        let sites = occupancy
            .as_slice()
            .iter()
            .enumerate()
            .filter_map(|(i, &o)| o.then_some(i))
            .collect();
        Self { occupancy, sites }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.occupancy.shape()
    }

    #[inline]
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.occupancy.get(cell).copied().unwrap_or(false)
    }

    /// Number of facilities.
    pub fn facility_count(&self) -> usize {
        self.sites.len()
    }

    /// Occupied cells in row-major order.
    pub fn sites(&self) -> impl Iterator<Item = Cell> + '_ {
        self.sites.iter().map(|&i| self.occupancy.cell_of(i))
    }

    /// Moves the facility at `from` to `to`.
    ///
    /// Leaves the placement untouched if `from` is empty or `to` is taken.
    pub fn relocate(&mut self, from: Cell, to: Cell) -> bool {
        if !self.is_occupied(from) || self.is_occupied(to) || !self.occupancy.contains(to) {
            return false;
        }
        self.vacate(from);
        self.occupy(to);
        true
    }

    pub(crate) fn occupy(&mut self, cell: Cell) {
        let idx = self.occupancy.index_of(cell);
        if let Err(pos) = self.sites.binary_search(&idx) {
            self.sites.insert(pos, idx);
            self.occupancy.as_mut_slice()[idx] = true;
        }
    }

    pub(crate) fn vacate(&mut self, cell: Cell) {
        let idx = self.occupancy.index_of(cell);
        if let Ok(pos) = self.sites.binary_search(&idx) {
            self.sites.remove(pos);
            self.occupancy.as_mut_slice()[idx] = false;
        }
    }

    /// The occupancy grid.
    pub fn occupancy(&self) -> &Grid<bool> {
        &self.occupancy
    }

    /// {0,1} matrix view.
    pub fn to_grid(&self) -> Grid<u8> {
        self.occupancy.map(|&o| u8::from(o))
    }
}
