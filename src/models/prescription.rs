use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::med::Medication;
use crate::core::scheduler::ScheduleStrategy;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationMode {
    Push,
    #[default]
    Alarm,
}

impl std::fmt::Display for NotificationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Push => write!(f, "push"),
            Self::Alarm => write!(f, "alarm"),
        }
    }
}

impl FromStr for NotificationMode {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "push" => Ok(Self::Push),
            "alarm" => Ok(Self::Alarm),
            _ => anyhow::bail!("invalid notification mode: {} (expected push/alarm)", s),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PrescriptionStatus {
    #[default]
    Active,
    Inactive,
}

impl std::fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

impl FromStr for PrescriptionStatus {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => anyhow::bail!("invalid prescription status: {} (expected active/inactive)", s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedPrescription {
    pub id: String,
    pub user_id: String,
    pub medications: Vec<Medication>,
    pub model_used: String,
    pub notification_mode: NotificationMode,
    /// How the reminders were laid out when the prescription was saved.
    /// Later cancels and reschedules use this, not the current setting.
    #[serde(default)]
    pub strategy: ScheduleStrategy,
    pub status: PrescriptionStatus,
    pub created_at: DateTime<Utc>,
}

impl SavedPrescription {
    /// A new active course-mode prescription with a fresh random id.
    pub fn new(
        user_id: impl Into<String>,
        medications: Vec<Medication>,
        model_used: impl Into<String>,
        notification_mode: NotificationMode,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            medications,
            model_used: model_used.into(),
            notification_mode,
            strategy: ScheduleStrategy::default(),
            status: PrescriptionStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn with_strategy(mut self, strategy: ScheduleStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == PrescriptionStatus::Active
    }
}
