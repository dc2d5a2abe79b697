//! Simulation clock.
//!
//! The tick counter is the source of truth; elapsed simulated time is
//! accumulated alongside it so that variable `dt` stays exact over long runs.

use crate::config::WorldConfig;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Invalid timing configuration.
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Tick counter plus accumulated simulated seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SimClock {
    /// Ticks completed so far.
    tick: u64,

    /// Simulated seconds elapsed.
    elapsed_seconds: f64,

    /// Simulated seconds per tick.
    dt_seconds: f32,
}

impl SimClock {
    /// Create a clock at tick 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `dt_seconds` is not a
    /// positive finite number.
    pub fn new(dt_seconds: f32) -> Result<Self, ClockError> {
        if !(dt_seconds.is_finite() && dt_seconds > 0.0) {
            return Err(ClockError::InvalidConfig {
                reason: format!("dt_seconds must be positive, got {dt_seconds}"),
            });
        }
        Ok(Self {
            tick: 0,
            elapsed_seconds: 0.0,
            dt_seconds,
        })
    }

    /// Create a clock from the world section of the configuration.
    ///
    /// # Errors
    ///
    /// See [`SimClock::new`].
    pub fn from_config(config: &WorldConfig) -> Result<Self, ClockError> {
        Self::new(config.dt_seconds)
    }

    /// Advance by one tick of `dt_seconds`. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        self.elapsed_seconds += f64::from(self.dt_seconds);
        Ok(self.tick)
    }

    /// Ticks completed so far.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds elapsed.
    pub const fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// Simulated seconds per tick.
    pub const fn dt_seconds(&self) -> f32 {
        self.dt_seconds
    }
}
