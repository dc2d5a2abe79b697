//! Engine binary for Deckhand.
//!
//! Loads configuration, seeds a vessel with crew, jobs, and material, and
//! runs the tick loop until the jobs are done or the tick limit is hit.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `deckhand-config.yaml` (or the path given as
//!    the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Create the simulation clock
//! 4. Build the grid and seed crew, material, and jobs
//! 5. Run the simulation loop
//! 6. Log the result

mod error;
mod progress;
mod spawner;

use std::path::{Path, PathBuf};

use deckhand_core::{RunLimits, SimClock, SimulationConfig, log_simulation_end, run_simulation};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress::ProgressCallback;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "deckhand-config.yaml";

/// Ticks between status lines.
const STATUS_EVERY_TICKS: u64 = 100;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so remember whether the
    //    file was found and report it afterwards.
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    let (config, from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str())),
        )
        .with_target(true)
        .init();

    info!("deckhand-engine starting");
    if from_file {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        vessel = config.world.name,
        seed = config.world.seed,
        dt_seconds = config.world.dt_seconds,
        tick_interval_ms = config.world.tick_interval_ms,
        quit_on_disqualify = config.jobs.quit_on_disqualify,
        "Simulation configured"
    );

    // 3. Create the clock.
    let mut clock = SimClock::from_config(&config.world)?;

    // 4. Seed the vessel.
    let mut seeded = spawner::seed_vessel(&config)?;
    info!(
        crew = seeded.crew.len(),
        jobs = seeded.jobs.len(),
        material_piles = seeded.material_piles.len(),
        "Vessel ready, entering tick loop"
    );

    // 5. Run.
    let mut callback = ProgressCallback::new(STATUS_EVERY_TICKS);
    let result = run_simulation(
        &mut seeded.container,
        &mut clock,
        RunLimits::from_config(&config),
        &mut callback,
    )
    .await
    .map_err(EngineError::from)?;

    // 6. Log results.
    log_simulation_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        jobs_done = callback.completed(),
        jobs_left = seeded.container.open_jobs(),
        "deckhand-engine shutdown complete"
    );

    Ok(())
}

/// Load the configuration at `path`, falling back to defaults when the file
/// does not exist. The flag reports whether the file was read.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), EngineError> {
    if path.exists() {
        Ok((SimulationConfig::from_file(path)?, true))
    } else {
        Ok((SimulationConfig::default(), false))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use deckhand_core::SimulationEndReason;

    use super::*;

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let (config, from_file) = load_config(Path::new("does-not-exist.yaml")).unwrap();
        assert!(!from_file);
        assert_eq!(config, SimulationConfig::default());
    }

    #[tokio::test]
    async fn seeded_vessel_runs_to_completion() {
        let config = SimulationConfig::parse(
            "grid:\n  width: 8\n  height: 8\ncrew:\n  count: 2\njobs:\n  initial_jobs: 3\n  work_seconds: 0.5\nsimulation:\n  max_ticks: 5000\n",
        )
        .unwrap();
        let mut seeded = spawner::seed_vessel(&config).unwrap();
        let mut clock = SimClock::from_config(&config.world).unwrap();
        let mut callback = ProgressCallback::new(0);

        let result = run_simulation(
            &mut seeded.container,
            &mut clock,
            RunLimits::from_config(&config),
            &mut callback,
        )
        .await
        .unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::AllJobsDone);
        assert_eq!(callback.completed(), 3);
    }
}
