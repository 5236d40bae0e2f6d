//! # Arena Core
//!
//! Deterministic 2D arena combat simulation core.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No input handling
//! - No system randomness (a seeded PRNG drives everything; entropy
//!   seeding is opt-in and the chosen seed is always retrievable)
//! - No floating-point simulation state (fixed-point math throughout)
//!
//! A single stored integer - the map seed - reproduces an entire run:
//! the generated wall layout, every AI roll, and every bounce.
//!
//! ## Crate Structure
//!
//! - [`rng`] - seeded pseudo-random stream
//! - [`grid`] - occupancy grid, world/cell mapping, line of sight
//! - [`map_generation`] - seeded wall placement with density and
//!   sight-line constraints
//! - [`pathfinding`] - A* routing over the occupancy grid
//! - [`ballistics`] - swept projectile/wall collision and reflection
//! - [`ai`] - periodic behavior decisions, steering, fire gating
//! - [`components`] - plain-data entity records
//! - [`simulation`] - the explicit-clock tick driver
//! - [`math`] - fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod ballistics;
pub mod components;
pub mod error;
pub mod grid;
pub mod map_generation;
pub mod math;
pub mod pathfinding;
pub mod rng;
pub mod simulation;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ai::{decide_behavior, steer, AiParams, AiState, Behavior, NavQuery};
    pub use crate::ballistics::{reflect_projectile, MotionSample, Obstacle, Reflection};
    pub use crate::components::{EntityId, EntitySnapshot, Projectile, Tank, Team};
    pub use crate::error::{ArenaError, Result};
    pub use crate::grid::{Cell, OccupancyGrid};
    pub use crate::map_generation::{
        estimate_coverage, generate_arena, GeneratedArena, MapGenConfig, WallSegment,
    };
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::pathfinding::{find_path, find_path_world};
    pub use crate::rng::SeededPrng;
    pub use crate::simulation::{ArenaSimulation, PlayerCommand, SimConfig, TickEvents};
}
