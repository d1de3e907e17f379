//! Device facilities the reminder engine talks to: the alarm registry and
//! the notification tray.
//!
//! `memory` holds in-process implementations; `device` persists both to the
//! local SQLite database so the CLI can act as the device.

pub mod device;
pub mod memory;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::delivery::{Notification, NotificationChannel};
use crate::models::med::Medication;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("exact alarms are not permitted for this app")]
    ExactNotPermitted,

    #[error("alarm or notification service unavailable: {0}")]
    Unavailable(String),
}

/// Everything the delivery side needs to render a reminder without lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub id: i32,
    pub prescription_id: String,
    pub medication_name: String,
    pub dosage: String,
    pub instructions: String,
}

impl ReminderPayload {
    pub fn for_medication(id: i32, prescription_id: &str, medication: &Medication) -> Self {
        Self {
            id,
            prescription_id: prescription_id.to_string(),
            medication_name: medication.name.clone(),
            dosage: medication.dosage.clone(),
            instructions: medication.instructions.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// Fires at the requested instant, waking the device if idle.
    Exact,
    /// Best effort; the OS may batch or delay it.
    Inexact,
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Inexact => write!(f, "inexact"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    Once,
    Daily,
}

impl std::fmt::Display for Repeat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Once => write!(f, "once"),
            Self::Daily => write!(f, "daily"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmRequest {
    pub id: i32,
    pub trigger_at: DateTime<Utc>,
    pub precision: Precision,
    pub repeat: Repeat,
    pub payload: ReminderPayload,
}

impl AlarmRequest {
    /// Where a fired alarm goes next: `None` for one-shots, otherwise the
    /// first daily occurrence strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.repeat {
            Repeat::Once => None,
            Repeat::Daily => {
                let mut next = self.trigger_at + Duration::days(1);
                while next <= now {
                    next += Duration::days(1);
                }
                Some(next)
            }
        }
    }
}

/// The OS alarm facility. Registrations are keyed by id: registering an id
/// that already exists replaces it.
pub trait AlarmPlatform {
    /// Whether exact alarms are currently granted to the app.
    fn can_schedule_exact(&self) -> bool;

    fn register(&self, request: &AlarmRequest) -> Result<(), PlatformError>;

    /// Withdraw the registration for `id`. `Ok(false)` if none existed.
    fn withdraw(&self, id: i32) -> Result<bool, PlatformError>;
}

/// The firing side of the alarm facility.
pub trait AlarmClock: AlarmPlatform {
    /// Remove and return every alarm due at `now`. Daily alarms are re-armed
    /// at their next occurrence before being returned.
    fn take_due(&self, now: DateTime<Utc>) -> Result<Vec<AlarmRequest>, PlatformError>;

    /// Every registration, ordered by trigger time.
    fn pending(&self) -> Result<Vec<AlarmRequest>, PlatformError>;

    /// Forget every registration, as a reboot does. Returns how many were lost.
    fn clear(&self) -> Result<usize, PlatformError>;
}

/// The OS notification facility.
pub trait NotificationSink {
    fn has_channel(&self, channel_id: &str) -> bool;

    fn create_channel(&self, channel: &NotificationChannel) -> Result<(), PlatformError>;

    fn post(&self, notification: &Notification) -> Result<(), PlatformError>;
}

impl<T: AlarmPlatform + ?Sized> AlarmPlatform for &T {
    fn can_schedule_exact(&self) -> bool {
        (**self).can_schedule_exact()
    }

    fn register(&self, request: &AlarmRequest) -> Result<(), PlatformError> {
        (**self).register(request)
    }

    fn withdraw(&self, id: i32) -> Result<bool, PlatformError> {
        (**self).withdraw(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(repeat: Repeat) -> AlarmRequest {
        AlarmRequest {
            id: 1,
            trigger_at: Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap(),
            precision: Precision::Exact,
            repeat,
            payload: ReminderPayload {
                id: 1,
                prescription_id: "rx".into(),
                medication_name: "X".into(),
                dosage: String::new(),
                instructions: String::new(),
            },
        }
    }

    #[test]
    fn one_shot_has_no_next() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        assert_eq!(request(Repeat::Once).next_after(now), None);
    }

    #[test]
    fn daily_rearms_after_now() {
        let r = request(Repeat::Daily);
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        assert_eq!(
            r.next_after(now),
            Some(Utc.with_ymd_and_hms(2026, 3, 11, 9, 0, 0).unwrap())
        );
        // Several missed days collapse into one firing.
        let late = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
        assert_eq!(
            r.next_after(late),
            Some(Utc.with_ymd_and_hms(2026, 3, 15, 9, 0, 0).unwrap())
        );
    }
}
