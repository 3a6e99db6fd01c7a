/// Configuration module for Pomodoro settings
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::hooks::Hooks;
use crate::timer::Durations;

pub const DEFAULT_TOPIC: &str = "Topic Name";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Seconds of work
    pub work: u64,
    /// Seconds of grace before a break
    pub grace: u64,
    /// Seconds of break
    #[serde(rename = "break")]
    pub rest: u64,
    pub topic: String,
    pub sound: Option<PathBuf>,
    pub hooks: Hooks,
}

impl Default for Config {
    fn default() -> Self {
        let durations = Durations::default();
        Self {
            work: durations.work.as_secs(),
            grace: durations.grace.as_secs(),
            rest: durations.rest.as_secs(),
            topic: DEFAULT_TOPIC.to_string(),
            sound: None,
            hooks: Hooks::default(),
        }
    }
}

impl Config {
    /// Reads the config at `path`, writing a default one if it doesn't exist.
    ///
    /// Read or parse failures are logged and the defaults are used.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            let config = Self {
                hooks: Hooks::examples(),
                ..Self::default()
            };
            if let Err(e) = config.save(path) {
                log::warn!("Could not write default config to {}: {}", path.display(), e);
            }
            return config;
        }

        match Self::read(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Invalid config {}, using defaults: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Zero durations in the file are ignored in favour of the defaults.
    pub fn durations(&self) -> Durations {
        let defaults = Durations::default();
        let pick = |secs: u64, fallback: Duration| {
            if secs == 0 {
                fallback
            } else {
                Duration::from_secs(secs)
            }
        };
        Durations {
            work: pick(self.work, defaults.work),
            grace: pick(self.grace, defaults.grace),
            rest: pick(self.rest, defaults.rest),
        }
    }
}

pub fn config_path() -> PathBuf {
    if let Some(home) = env::var_os("HOME") {
        PathBuf::from(home).join(".config").join("pomo").join("config.json")
    } else {
        PathBuf::from("pomo-config.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_writes_default_with_example_hooks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pomo").join("config.json");

        let config = Config::load(&path);
        assert_eq!(config.topic, DEFAULT_TOPIC);
        assert_eq!(config.hooks, Hooks::examples());
        assert!(path.exists());
        assert_eq!(Config::read(&path).unwrap(), config);
    }

    #[test]
    fn invalid_json_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(Config::load(&path), Config::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "work": 3000, "break": 600, "hooks": { "grace_start": "echo grace" } }"#,
        )
        .unwrap();

        let config = Config::load(&path);
        let durations = config.durations();
        assert_eq!(durations.work, Duration::from_secs(3000));
        assert_eq!(durations.grace, Duration::from_secs(10));
        assert_eq!(durations.rest, Duration::from_secs(600));
        assert_eq!(config.hooks.grace_start.as_deref(), Some("echo grace"));
        assert_eq!(config.hooks.work_start, None);
    }

    #[test]
    fn zero_durations_use_defaults() {
        let config = Config {
            work: 0,
            ..Config::default()
        };
        assert_eq!(config.durations().work, Duration::from_secs(1500));
    }
}
