use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::delivery::NotificationChannel;
use crate::core::scheduler::ScheduleStrategy;
use crate::models::prescription::NotificationMode;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reminders: Reminders,
    #[serde(default)]
    pub channel: Channel,
    #[serde(default)]
    pub logging: Logging,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Reminders {
    #[serde(default)]
    pub strategy: ScheduleStrategy,
    /// Whether the device grants exact, wake-from-idle alarms to the app.
    #[serde(default = "default_exact_alarms")]
    pub exact_alarms: bool,
    #[serde(default)]
    pub default_mode: NotificationMode,
}

fn default_exact_alarms() -> bool {
    true
}

impl Default for Reminders {
    fn default() -> Self {
        Self {
            strategy: ScheduleStrategy::default(),
            exact_alarms: true,
            default_mode: NotificationMode::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default = "default_channel_id")]
    pub id: String,
    #[serde(default = "default_channel_name")]
    pub name: String,
    #[serde(default = "default_channel_description")]
    pub description: String,
}

fn default_channel_id() -> String {
    "medication_reminders".to_string()
}
fn default_channel_name() -> String {
    "Medication Reminders".to_string()
}
fn default_channel_description() -> String {
    "Notifications for medication reminders".to_string()
}

impl Default for Channel {
    fn default() -> Self {
        Self {
            id: default_channel_id(),
            name: default_channel_name(),
            description: default_channel_description(),
        }
    }
}

impl Channel {
    pub fn to_notification_channel(&self) -> NotificationChannel {
        NotificationChannel::new(&self.id, &self.name, &self.description)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Logging {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

pub fn default_log_filter() -> String {
    "medtime=warn".to_string()
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load config from the standard path, or return defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the standard path.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700))?;
            }
        }
        let contents = toml::to_string_pretty(self)?;
        write_private(&path, &contents)
    }

    pub fn data_dir() -> PathBuf {
        if let Ok(home) = std::env::var("MEDTIME_HOME") {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(".medtime")
    }

    pub fn path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    pub fn db_path() -> PathBuf {
        Self::data_dir().join("medtime.db")
    }

    pub fn session_path() -> PathBuf {
        Self::data_dir().join("session.toml")
    }
}

/// Write `contents` to `path`, leaving the file readable by the owner only.
pub(crate) fn write_private(path: &std::path::Path, contents: &str) -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use std::fs::{self, OpenOptions};
        use std::io::Write;
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        file.write_all(contents.as_bytes())?;

        // An existing file keeps its old mode through open(); fix it up.
        let mut perms = file.metadata()?.permissions();
        if perms.mode() & 0o777 != 0o600 {
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }
    }
    #[cfg(not(unix))]
    {
        std::fs::write(path, contents)?;
    }
    Ok(())
}
