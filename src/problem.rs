//! Random demand maps.
//!
//! Each cell is drawn uniformly from `[0, max_per_cell)`, then single
//! clients are removed from (or added to) random cells until the map holds
//! exactly the requested number of clients. Added clients never push a cell
//! above `max_per_cell`.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::{Result, SitingError};
use crate::grid::{DemandMap, Grid};

/// Creates the crate's deterministic RNG from a seed.
pub fn create_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Generator of random [`DemandMap`]s with a fixed client total.
///
/// # Examples
///
/// ```
/// use u_siting::problem::RandomProblemGenerator;
///
/// let demand = RandomProblemGenerator::new((10, 12), 150, 4)
///     .with_seed(7)
///     .generate()
///     .unwrap();
/// assert_eq!(demand.shape(), (10, 12));
/// assert_eq!(demand.total(), 150);
/// ```
#[derive(Debug, Clone)]
pub struct RandomProblemGenerator {
    shape: (usize, usize),
    clients: u64,
    max_per_cell: u32,
    seed: Option<u64>,
}

impl RandomProblemGenerator {
    pub fn new(shape: (usize, usize), clients: u64, max_per_cell: u32) -> Self {
        Self {
            shape,
            clients,
            max_per_cell,
            seed: None,
        }
    }

    /// Fixes the RNG seed for reproducible maps.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Draws a demand map.
    ///
    /// # Errors
    ///
    /// [`SitingError::Configuration`] for an empty grid, a zero cap, or a
    /// client total the grid cannot hold.
    pub fn generate(&self) -> Result<DemandMap> {
        let (height, width) = self.shape;
        if height == 0 || width == 0 {
            return Err(SitingError::Configuration(format!(
                "grid must be non-empty, got {height}x{width}"
            )));
        }
        if self.max_per_cell == 0 {
            return Err(SitingError::Configuration(
                "max_per_cell must be positive".into(),
            ));
        }
        let room = (height * width) as u64 * u64::from(self.max_per_cell);
        if self.clients > room {
            return Err(SitingError::Configuration(format!(
                "{} clients do not fit in {height}x{width} cells of at most {}",
                self.clients, self.max_per_cell
            )));
        }

        let mut rng = match self.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };

        let cells: Vec<u32> = (0..height * width)
            .map(|_| rng.random_range(0..self.max_per_cell))
            .collect();
        let mut demand = Grid::from_vec(height, width, cells)?;
        let drawn = demand.total();
        debug!(event = "demand_drawn", drawn, target = self.clients);

        let cap = self.max_per_cell;
        if drawn > self.clients {
            for _ in 0..drawn - self.clients {
                nudge(&mut demand, &mut rng, |v| v > 0, |v| *v -= 1);
            }
        } else {
            for _ in 0..self.clients - drawn {
                nudge(&mut demand, &mut rng, |v| v < cap, |v| *v += 1);
            }
        }
        Ok(demand)
    }
}

/// Applies `change` to one uniformly chosen cell satisfying `eligible`.
fn nudge<R: Rng>(
    demand: &mut DemandMap,
    rng: &mut R,
    eligible: impl Fn(u32) -> bool,
    change: impl FnOnce(&mut u32),
) {
    let candidates: Vec<usize> = demand
        .as_slice()
        .iter()
        .enumerate()
        .filter(|&(_, &v)| eligible(v))
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return;
    }
    let pick = candidates[rng.random_range(0..candidates.len())];
    change(&mut demand.as_mut_slice()[pick]);
}
