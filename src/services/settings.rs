//! Settings persistence for the reminder interval

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    error::Result,
    state::{reminder_config::parse_value, ReminderConfig},
};

/// File name of the settings file, stored beside the executable by default
pub const SETTINGS_FILE_NAME: &str = "reminder-settings.json";

/// On-disk shape. Fields may be strings or numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSettings {
    #[serde(default)]
    minutes: Value,
    #[serde(default)]
    seconds: Value,
}

impl StoredSettings {
    fn defaults() -> Self {
        Self {
            minutes: Value::from("0"),
            seconds: Value::from("30"),
        }
    }
}

impl From<&ReminderConfig> for StoredSettings {
    fn from(config: &ReminderConfig) -> Self {
        Self {
            minutes: Value::from(config.minutes),
            seconds: Value::from(config.seconds),
        }
    }
}

/// Reads and writes the `{minutes, seconds}` record
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved interval, writing the defaults on first use
    pub fn load(&self) -> Result<ReminderConfig> {
        if !self.path.exists() {
            info!(
                "No settings at {}, writing defaults",
                self.path.display()
            );
            self.write(&StoredSettings::defaults())?;
            return Ok(ReminderConfig::default());
        }

        let data = fs::read_to_string(&self.path)?;
        let stored: StoredSettings = serde_json::from_str(&data)?;
        let config = ReminderConfig::new(
            stored_part("minutes", &stored.minutes),
            stored_part("seconds", &stored.seconds),
        );
        debug!("Loaded settings {:?} from {}", config, self.path.display());
        Ok(config)
    }

    /// Overwrite the settings file with `config`
    pub fn save(&self, config: &ReminderConfig) -> Result<()> {
        self.write(&StoredSettings::from(config))?;
        debug!("Saved settings {:?} to {}", config, self.path.display());
        Ok(())
    }

    fn write(&self, settings: &StoredSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(settings)?)?;
        Ok(())
    }
}

/// Missing, empty or unparseable parts load as 0; negative parts clamp to 0
fn stored_part(name: &str, value: &Value) -> u64 {
    let parsed = parse_value(value).unwrap_or(0);
    u64::try_from(parsed).unwrap_or_else(|_| {
        warn!("Stored {} value {} is negative, using 0", name, parsed);
        0
    })
}
