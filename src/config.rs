//! Configuration loading.
//!
//! Settings come from an optional `sked.toml` next to the invocation (or an
//! explicit `--config` path). Every field has a default so the file is
//! never required.

use std::path::Path;
use std::time::Duration as StdDuration;

use serde::{Deserialize, Serialize};

use crate::deadline::DEFAULT_DATETIME_FORMAT;
use crate::error::{Error, Result};
use crate::task::DEFAULT_TASK_NAME;

pub const CONFIG_FILENAME: &str = "sked.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Countdown refresh period in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Format string for absolute deadlines (parse and display)
    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,

    /// Shell used to execute task commands (`<shell> -c <command>`)
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Label given to tasks created with an empty name
    #[serde(default = "default_task_name")]
    pub default_task_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            datetime_format: default_datetime_format(),
            shell: default_shell(),
            default_task_name: default_task_name(),
        }
    }
}

fn default_tick_ms() -> u64 {
    1000
}

fn default_datetime_format() -> String {
    DEFAULT_DATETIME_FORMAT.to_string()
}

fn default_shell() -> String {
    "sh".to_string()
}

fn default_task_name() -> String {
    DEFAULT_TASK_NAME.to_string()
}

impl Config {
    /// Load from a config file; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `sked.toml` from the current directory, if present.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILENAME))
    }

    pub fn tick(&self) -> StdDuration {
        StdDuration::from_millis(self.tick_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(Error::InvalidConfig(
                "tick_ms must be greater than zero".to_string(),
            ));
        }
        if self.datetime_format.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "datetime_format cannot be empty".to_string(),
            ));
        }
        if self.shell.trim().is_empty() {
            return Err(Error::InvalidConfig("shell cannot be empty".to_string()));
        }
        Ok(())
    }
}
