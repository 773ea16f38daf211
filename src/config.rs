//! Harness configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Error type returned when loading a configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Harness configuration. Every field is optional in the JSON form.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Device node of the stimulus port.
    pub port: PathBuf,
    /// Time to wait after the last stimulus batch before sampling the
    /// observations, in milliseconds.
    pub settle_ms: u64,
    /// Pause between the stimulus batches of a scenario, in milliseconds.
    pub hold_ms: u64,
    /// Observation queue capacity.
    pub capture_capacity: usize,
    /// Number of random cases per repeated scenario.
    pub repeat: usize,
    /// Generator seed. A random seed is drawn and logged when absent.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: PathBuf::from("/dev/ttyACM0"),
            settle_ms: 1000,
            hold_ms: 210,
            capture_capacity: 1024,
            repeat: 10,
            seed: None,
        }
    }
}

impl Config {
    /// Loads the configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("Loading config from {}", path.display());
        let s = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&s)
    }

    /// Parses the configuration from a JSON string.
    pub fn from_json(s: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(s)?)
    }

    /// Returns the settle delay.
    #[inline]
    #[must_use]
    pub const fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Returns the delay between stimulus batches.
    #[inline]
    #[must_use]
    pub const fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}
