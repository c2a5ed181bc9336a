//! Defines the configuration structures for the Cadence engine.
//!
//! These structs are designed to be deserialized from a configuration file
//! (e.g., a TOML file) using `serde`. This allows the engine's tick speed and
//! logging verbosity to be defined externally from the application code.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// The top-level configuration for the `CadenceEngine`.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// The tick speed of the master `SystemClock`.
    #[serde(default)]
    pub resolution: ClockResolution,

    /// Whether per-tick countdown state is logged for every scanned task.
    /// Stall notices are emitted regardless of this flag.
    #[serde(default)]
    pub debug: bool,
}

/// Defines the operational speed of the `SystemClock`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockResolution {
    /// One tick per second. Task windows are expressed in seconds, so this is
    /// the resolution under which a window of N means N wall-clock seconds.
    Standard,
    /// A user-defined tick period. Useful for demos and simulations that want
    /// to compress scheduler time.
    Custom { millis_per_tick: u64 },
}

impl ClockResolution {
    /// The wall-clock duration of one tick at this resolution.
    pub(crate) fn period(&self) -> Duration {
        match self {
            ClockResolution::Standard => Duration::from_secs(1),
            ClockResolution::Custom { millis_per_tick } => {
                Duration::from_millis((*millis_per_tick).max(1))
            }
        }
    }
}

impl Default for ClockResolution {
    fn default() -> Self {
        ClockResolution::Standard
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            resolution: ClockResolution::default(),
            debug: false,
        }
    }
}

impl SchedulerConfig {
    /// Loads a configuration from a TOML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
