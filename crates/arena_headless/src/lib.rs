//! Headless arena runner for AI testing and CI verification.
//!
//! Runs full matches of the deterministic arena core without graphics:
//!
//! - **AI testing**: enemy behavior plays out against a reference target
//! - **CI verification**: seeds replay to identical state hashes
//! - **Balance sweeps**: JSON metrics per match, one line per run
//!
//! # Example
//!
//! ```bash
//! # Run the default skirmish with a fixed seed
//! cargo run -p arena_headless -- --seed 42
//!
//! # Run a scenario file
//! cargo run -p arena_headless -- --scenario scenarios/corridor.ron
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod metrics;
pub mod runner;
pub mod scenario;

pub use metrics::{MatchMetrics, MatchOutcome};
pub use runner::HeadlessRunner;
pub use scenario::{ArenaSize, Scenario, ScenarioError};
