//! Configuration loading and typed config structures.
//!
//! The configuration lives in `deckhand-config.yaml`. Every section and
//! field has a default, so an empty file (or no file at all) yields a
//! runnable simulation.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an impossible simulation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, timing).
    #[serde(default)]
    pub world: WorldConfig,

    /// Shape of the starting tile grid.
    #[serde(default)]
    pub grid: GridConfig,

    /// Crew (agent) parameters.
    #[serde(default)]
    pub crew: CrewConfig,

    /// Job seeding and assignment policy.
    #[serde(default)]
    pub jobs: JobsConfig,

    /// Run boundaries.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(invalid("grid width and height must be at least 1"));
        }
        if !(self.world.dt_seconds.is_finite() && self.world.dt_seconds > 0.0) {
            return Err(invalid("world.dt_seconds must be a positive number"));
        }
        if !(self.crew.move_speed.is_finite() && self.crew.move_speed > 0.0) {
            return Err(invalid("crew.move_speed must be a positive number"));
        }
        if !(self.jobs.work_seconds.is_finite() && self.jobs.work_seconds >= 0.0) {
            return Err(invalid("jobs.work_seconds must not be negative"));
        }
        let cells = u64::from(self.grid.width).saturating_mul(u64::from(self.grid.height));
        if u64::from(self.crew.count) > cells {
            return Err(invalid("crew.count exceeds the number of grid cells"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable vessel name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for crew and job placement.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds to sleep between ticks (0 runs flat out).
    #[serde(default)]
    pub tick_interval_ms: u64,

    /// Simulated seconds per tick.
    #[serde(default = "default_dt_seconds")]
    pub dt_seconds: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            tick_interval_ms: 0,
            dt_seconds: default_dt_seconds(),
        }
    }
}

/// Starting tile grid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
    /// Columns.
    #[serde(default = "default_grid_width")]
    pub width: u32,

    /// Rows.
    #[serde(default = "default_grid_height")]
    pub height: u32,

    /// Whether agents may step diagonally.
    #[serde(default)]
    pub diagonal_moves: bool,

    /// Block template the starting floor is made of.
    #[serde(default = "default_floor_block")]
    pub floor_block: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_grid_width(),
            height: default_grid_height(),
            diagonal_moves: false,
            floor_block: default_floor_block(),
        }
    }
}

/// Crew configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CrewConfig {
    /// Number of agents to spawn.
    #[serde(default = "default_crew_count")]
    pub count: u32,

    /// Movement speed in spots per second.
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,

    /// Names handed out in order; agents beyond the list are numbered.
    #[serde(default)]
    pub names: Vec<String>,
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            count: default_crew_count(),
            move_speed: default_move_speed(),
            names: Vec::new(),
        }
    }
}

/// Job seeding and assignment policy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobsConfig {
    /// Run the full quit (action reset hooks) when a job stops qualifying
    /// for its worker, instead of only clearing the worker.
    #[serde(default)]
    pub quit_on_disqualify: bool,

    /// Seconds of work each block placement takes once the worker is in
    /// position.
    #[serde(default = "default_work_seconds")]
    pub work_seconds: f32,

    /// Number of place-block jobs seeded at start.
    #[serde(default = "default_initial_jobs")]
    pub initial_jobs: u32,

    /// Block template the seeded jobs place.
    #[serde(default = "default_job_block")]
    pub block: String,

    /// Item consumed per placement. No material is needed when unset.
    #[serde(default)]
    pub material: Option<String>,

    /// Number of material piles seeded when `material` is set.
    #[serde(default)]
    pub material_piles: u32,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            quit_on_disqualify: false,
            work_seconds: default_work_seconds(),
            initial_jobs: default_initial_jobs(),
            block: default_job_block(),
            material: None,
            material_piles: 0,
        }
    }
}

/// Run boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Stop after this many ticks (0 = unlimited).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Stop as soon as no jobs remain.
    #[serde(default = "default_true")]
    pub stop_when_idle: bool,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
            stop_when_idle: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Deckhand".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_dt_seconds() -> f32 {
    0.1
}

const fn default_grid_width() -> u32 {
    16
}

const fn default_grid_height() -> u32 {
    12
}

fn default_floor_block() -> String {
    "deck".to_owned()
}

const fn default_crew_count() -> u32 {
    3
}

const fn default_move_speed() -> f32 {
    crate::agent::DEFAULT_MOVE_SPEED
}

const fn default_work_seconds() -> f32 {
    2.0
}

const fn default_initial_jobs() -> u32 {
    8
}

fn default_job_block() -> String {
    "hull".to_owned()
}

const fn default_max_ticks() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
