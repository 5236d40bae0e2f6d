//! Headless match runner.
//!
//! Builds a simulation from a scenario, runs it to completion or
//! timeout, and reports match metrics. The player tank holds position;
//! the point of a headless match is to exercise generation, routing,
//! AI, and ballistics against a stationary reference target.

use arena_core::components::Team;
use arena_core::error::Result;
use arena_core::map_generation::estimate_coverage;
use arena_core::simulation::ArenaSimulation;

use crate::metrics::{MatchMetrics, MatchOutcome};
use crate::scenario::Scenario;

/// Runs one scenario to completion.
pub struct HeadlessRunner {
    scenario: Scenario,
}

impl HeadlessRunner {
    /// Create a runner for a scenario.
    #[must_use]
    pub fn new(scenario: Scenario) -> Self {
        Self { scenario }
    }

    /// Run the match and collect metrics.
    ///
    /// # Errors
    ///
    /// Returns an error when the scenario's map configuration is
    /// invalid.
    pub fn run(&self) -> Result<MatchMetrics> {
        let config = self.scenario.sim_config();
        let mut sim = ArenaSimulation::new(config, self.scenario.seed)?;

        sim.spawn_player();
        for index in 0..self.scenario.enemies {
            sim.spawn_enemy(1 + index as usize);
        }

        let mut metrics = MatchMetrics::new(self.scenario.name.clone(), sim.seed());
        metrics.coverage_average =
            estimate_coverage(sim.grid(), &sim.arena().config.spawn_points).average;

        tracing::info!(
            scenario = %self.scenario.name,
            seed = sim.seed(),
            enemies = self.scenario.enemies,
            "starting headless match"
        );

        let mut outcome = MatchOutcome::Timeout;
        for _ in 0..self.scenario.duration_ticks {
            let events = sim.tick();
            metrics.record(&events);

            if sim.tanks_alive(Team::Player) == 0 {
                outcome = MatchOutcome::EnemiesWin;
                break;
            }
            if sim.tanks_alive(Team::Enemy) == 0 {
                outcome = MatchOutcome::PlayerWin;
                break;
            }
        }

        metrics.duration_ticks = sim.current_tick();
        metrics.player_survived = sim.tanks_alive(Team::Player) > 0;
        metrics.enemies_surviving = sim.tanks_alive(Team::Enemy);
        metrics.outcome = outcome;
        metrics.final_state_hash = sim.state_hash();

        tracing::info!(
            outcome = ?metrics.outcome,
            ticks = metrics.duration_ticks,
            shots = metrics.shots_fired,
            bounces = metrics.wall_bounces,
            "match finished"
        );

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ArenaSize;

    fn quick_scenario(seed: u64) -> Scenario {
        Scenario {
            name: "quick".into(),
            description: "short deterministic match".into(),
            arena_size: ArenaSize::Small,
            seed: Some(seed),
            enemies: 2,
            duration_ticks: 120,
            wall_density: None,
        }
    }

    #[test]
    fn test_run_produces_metrics() {
        let metrics = HeadlessRunner::new(quick_scenario(42)).run().unwrap();
        assert_eq!(metrics.seed, 42);
        assert!(metrics.duration_ticks > 0);
        assert!(metrics.duration_ticks <= 120);
    }

    #[test]
    fn test_runs_replay_identically() {
        let a = HeadlessRunner::new(quick_scenario(7)).run().unwrap();
        let b = HeadlessRunner::new(quick_scenario(7)).run().unwrap();
        assert_eq!(a.final_state_hash, b.final_state_hash);
        assert_eq!(a.shots_fired, b.shots_fired);
        assert_eq!(a.duration_ticks, b.duration_ticks);
    }

    #[test]
    fn test_entropy_seed_is_reported() {
        let scenario = Scenario {
            seed: None,
            duration_ticks: 10,
            ..quick_scenario(0)
        };
        let first = HeadlessRunner::new(scenario.clone()).run().unwrap();

        // Replaying the reported seed reproduces the match
        let replay = Scenario {
            seed: Some(first.seed),
            ..scenario
        };
        let second = HeadlessRunner::new(replay).run().unwrap();
        assert_eq!(first.final_state_hash, second.final_state_hash);
    }
}
