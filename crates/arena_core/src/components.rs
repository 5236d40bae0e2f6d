//! Plain-data entity records.
//!
//! Entities carry no behavior: AI and steering are free functions in
//! [`crate::ai`], and the tick driver in [`crate::simulation`] owns all
//! mutation. Everything here hashes and serializes bit-exactly so whole
//! simulation states can be compared across runs.

use serde::{Deserialize, Serialize};

use crate::ai::AiState;
use crate::math::{Fixed, Vec2Fixed};

/// Unique identifier for entities.
pub type EntityId = u64;

/// Team affiliation, used for damage filtering and friendly-fire checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Team {
    /// The human-controlled unit.
    Player,
    /// AI-controlled hostiles.
    Enemy,
    /// Unaffiliated.
    #[default]
    Neutral,
}

/// A read-only view of an entity, handed to AI queries.
///
/// Snapshots are taken once per tick for every entity and never
/// outlive the tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySnapshot {
    /// Entity identifier.
    pub id: EntityId,
    /// World position.
    pub position: Vec2Fixed,
    /// Hull heading in radians.
    pub heading: Fixed,
    /// Team affiliation.
    pub team: Team,
    /// Whether the entity is alive and simulated.
    pub active: bool,
}

/// A tank hull: the player or one enemy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tank {
    /// Entity identifier.
    pub id: EntityId,
    /// Team affiliation.
    pub team: Team,
    /// World position.
    pub position: Vec2Fixed,
    /// Hull heading in radians.
    #[serde(with = "crate::math::fixed_serde")]
    pub heading: Fixed,
    /// Current velocity in world units per second.
    pub velocity: Vec2Fixed,
    /// Hit points remaining.
    pub hp: u32,
    /// Maximum drive speed in world units per second.
    #[serde(with = "crate::math::fixed_serde")]
    pub move_speed: Fixed,
    /// Cooldown between shots, in ticks.
    pub fire_delay_ticks: u64,
    /// Earliest tick the next shot may fire.
    pub next_fire_tick: u64,
    /// Decision/steering state for AI-controlled tanks.
    pub ai: Option<AiState>,
}

impl Tank {
    /// Take the per-tick read-only view of this tank.
    #[must_use]
    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            position: self.position,
            heading: self.heading,
            team: self.team,
            active: self.hp > 0,
        }
    }
}

/// A projectile in flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Projectile {
    /// Entity identifier.
    pub id: EntityId,
    /// The tank that fired this projectile.
    pub owner: EntityId,
    /// Position at the end of the last integration step.
    pub position: Vec2Fixed,
    /// Position at the start of the last integration step.
    pub prev_position: Vec2Fixed,
    /// Velocity in world units per second.
    pub velocity: Vec2Fixed,
    /// Collision radius.
    #[serde(with = "crate::math::fixed_serde")]
    pub radius: Fixed,
    /// Tick at which the projectile despawns.
    pub expires_at_tick: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_death() {
        let mut tank = Tank {
            id: 1,
            team: Team::Enemy,
            position: Vec2Fixed::ZERO,
            heading: Fixed::ZERO,
            velocity: Vec2Fixed::ZERO,
            hp: 1,
            move_speed: Fixed::from_num(100),
            fire_delay_ticks: 40,
            next_fire_tick: 0,
            ai: None,
        };
        assert!(tank.snapshot().active);
        tank.hp = 0;
        assert!(!tank.snapshot().active);
    }
}
