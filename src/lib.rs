//! Grid facility siting via dual-memory Tabu Search.
//!
//! Places a fixed number of facilities on a rectangular grid of client
//! demand so that clients are, on aggregate, close to a facility, while
//! respecting a per-site capacity bound, an exclusion map and an optional
//! border frame.
//!
//! - **Grid and placements** ([`Grid`], [`Placement`]): dense row-major maps
//!   and the binary facility layout.
//! - **Distance masks** ([`DistanceMasks`]): Manhattan ring and disk
//!   offsets, precomputed once per grid shape.
//! - **Feasibility** ([`ConditionTester`]): all constraints folded into a
//!   single ban matrix.
//! - **Starting solution** ([`StartingSolutionGenerator`]): greedy maximum
//!   coverage.
//! - **Neighborhood** ([`NeighborhoodGenerator`]): lazy single-facility
//!   relocations.
//! - **Cost** ([`CostModel`]): demand-weighted saturating distance penalty.
//! - **Tabu Search** ([`tabu`]): the solver, its memories and telemetry.
//! - **Problem generation** ([`problem`]), **grading** ([`grading`]) and
//!   **facility-count sweeps** ([`sweep`]).
//!
//! # Example
//!
//! ```
//! use u_siting::problem::RandomProblemGenerator;
//! use u_siting::tabu::{SitingProblem, SolverConfig, TabuSearchSolver};
//!
//! let demand = RandomProblemGenerator::new((12, 12), 200, 4)
//!     .with_seed(11)
//!     .generate()
//!     .unwrap();
//! let problem = SitingProblem::new(demand);
//! let config = SolverConfig::default()
//!     .with_facilities(6)
//!     .with_capacity(100)
//!     .with_service_radius(3)
//!     .with_iteration_limit(30);
//!
//! let result = TabuSearchSolver::new(&problem, config).unwrap().solve().unwrap();
//! assert_eq!(result.best.facility_count(), 6);
//! assert!(result.best_cost <= result.cost_history[0]);
//! ```

pub mod cost;
pub mod error;
pub mod feasibility;
pub mod grading;
pub mod grid;
pub mod masks;
pub mod neighborhood;
pub mod problem;
pub mod start;
pub mod sweep;
pub mod tabu;

pub use cost::CostModel;
pub use error::{Result, SitingError};
pub use feasibility::ConditionTester;
pub use grid::{Cell, DemandMap, ExclusionMap, Grid, Placement};
pub use masks::DistanceMasks;
pub use neighborhood::{Neighbor, NeighborhoodGenerator};
pub use start::StartingSolutionGenerator;
