//! Scenario loading and configuration.
//!
//! Scenarios define a headless match: arena size and density, seed,
//! enemy count, and duration. They live in RON files so CI suites can
//! keep a directory of named setups.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use arena_core::map_generation::MapGenConfig;
use arena_core::simulation::SimConfig;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// Failed to read the file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
}

/// Arena size presets for procedural generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ArenaSize {
    /// 512x384 world units.
    Small,
    /// 800x600 world units.
    #[default]
    Medium,
    /// 1024x768 world units.
    Large,
}

impl ArenaSize {
    /// The generation config for this preset.
    #[must_use]
    pub fn map_config(self) -> MapGenConfig {
        match self {
            Self::Small => MapGenConfig::small(),
            Self::Medium => MapGenConfig::medium(),
            Self::Large => MapGenConfig::large(),
        }
    }
}

/// A complete headless match configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Arena size preset.
    pub arena_size: ArenaSize,
    /// Map seed; `None` draws one from entropy (and reports it).
    pub seed: Option<u64>,
    /// Number of enemy tanks to spawn.
    pub enemies: u32,
    /// Match length in ticks.
    pub duration_ticks: u64,
    /// Wall density override, if any.
    pub wall_density: Option<f32>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "Default Skirmish".to_string(),
            description: "One player versus three enemies on a medium arena".to_string(),
            arena_size: ArenaSize::Medium,
            seed: None,
            enemies: 3,
            duration_ticks: 1200,
            wall_density: None,
        }
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&contents)?)
    }

    /// Build the simulation configuration for this scenario.
    #[must_use]
    pub fn sim_config(&self) -> SimConfig {
        let mut map = self.arena_size.map_config();
        if let Some(density) = self.wall_density {
            map = map.with_density(density);
        }
        SimConfig {
            map,
            ..Default::default()
        }
    }
}
