//! Match metrics collection.
//!
//! One serializable record per headless match, suitable for JSON lines
//! aggregation across a CI batch. The seed and final state hash make
//! any recorded match reproducible and verifiable.

use serde::{Deserialize, Serialize};

use arena_core::simulation::TickEvents;

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MatchOutcome {
    /// All enemies destroyed.
    PlayerWin,
    /// The player was destroyed.
    EnemiesWin,
    /// Duration elapsed with both sides alive.
    #[default]
    Timeout,
}

/// Complete metrics for a single headless match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Map seed used (reported even when drawn from entropy).
    pub seed: u64,
    /// Ticks actually simulated.
    pub duration_ticks: u64,
    /// Shots fired by all tanks.
    pub shots_fired: u64,
    /// Projectile wall bounces resolved.
    pub wall_bounces: u64,
    /// Damage applications.
    pub damage_events: u64,
    /// Tanks destroyed.
    pub deaths: u64,
    /// Whether the player outlived the match.
    pub player_survived: bool,
    /// Enemies alive at the end.
    pub enemies_surviving: usize,
    /// Match outcome.
    pub outcome: MatchOutcome,
    /// Mean ricochet coverage across spawn points (diagnostic).
    pub coverage_average: f32,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl MatchMetrics {
    /// Create metrics for a named scenario and seed.
    #[must_use]
    pub fn new(scenario: impl Into<String>, seed: u64) -> Self {
        Self {
            scenario: scenario.into(),
            seed,
            ..Default::default()
        }
    }

    /// Fold one tick's events into the counters.
    pub fn record(&mut self, events: &TickEvents) {
        self.shots_fired += events.fired.len() as u64;
        self.wall_bounces += u64::from(events.bounces);
        self.damage_events += events.damage.len() as u64;
        self.deaths += events.deaths.len() as u64;
    }
}
