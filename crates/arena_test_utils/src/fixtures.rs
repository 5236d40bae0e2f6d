//! Test fixtures and helpers.
//!
//! Pre-built arena configurations and skirmish setups for consistent
//! testing across crates.

use fixed::types::I32F32;

use arena_core::map_generation::MapGenConfig;
use arena_core::math::Vec2Fixed;
use arena_core::simulation::{ArenaSimulation, SimConfig};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Simulation code sticks to integer-derived constants; this exists
/// for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a world-space vector from integer coordinates.
#[must_use]
pub fn vec2(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::new(fixed(x), fixed(y))
}

/// A small arena configuration for fast tests.
#[must_use]
pub fn small_arena_config() -> MapGenConfig {
    MapGenConfig::small()
}

/// Simulation configuration over the small arena.
#[must_use]
pub fn skirmish_config() -> SimConfig {
    SimConfig {
        map: MapGenConfig::small(),
        ..Default::default()
    }
}

/// A ready-to-run skirmish: one player and two enemies on a small
/// arena generated from the given seed.
///
/// # Panics
///
/// Panics if the fixture configuration fails validation, which would
/// be a bug in the fixture itself.
#[must_use]
pub fn skirmish_sim(seed: u64) -> ArenaSimulation {
    let mut sim = ArenaSimulation::new(skirmish_config(), Some(seed))
        .expect("fixture config must be valid");
    sim.spawn_player();
    sim.spawn_enemy(1);
    sim.spawn_enemy(2);
    sim
}
