use chrono::{DateTime, Utc};
use std::path::Path;

use super::{AlarmClock, AlarmPlatform, AlarmRequest, NotificationSink, PlatformError, Precision};
use crate::core::delivery::{Notification, NotificationChannel};
use crate::db::Database;

fn unavailable(e: anyhow::Error) -> PlatformError {
    PlatformError::Unavailable(e.to_string())
}

/// Alarm registry persisted in the `alarms` table.
///
/// `exact_permitted` mirrors the OS permission toggle from the config.
pub struct DeviceAlarms {
    db: Database,
    exact_permitted: bool,
}

impl DeviceAlarms {
    pub fn new(db: Database, exact_permitted: bool) -> Self {
        Self {
            db,
            exact_permitted,
        }
    }

    pub fn open(path: &Path, exact_permitted: bool) -> anyhow::Result<Self> {
        Ok(Self::new(Database::open(path)?, exact_permitted))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl AlarmPlatform for DeviceAlarms {
    fn can_schedule_exact(&self) -> bool {
        self.exact_permitted
    }

    fn register(&self, request: &AlarmRequest) -> Result<(), PlatformError> {
        if request.precision == Precision::Exact && !self.exact_permitted {
            return Err(PlatformError::ExactNotPermitted);
        }
        self.db.upsert_alarm(request).map_err(unavailable)
    }

    fn withdraw(&self, id: i32) -> Result<bool, PlatformError> {
        self.db.delete_alarm(id).map_err(unavailable)
    }
}

impl AlarmClock for DeviceAlarms {
    fn take_due(&self, now: DateTime<Utc>) -> Result<Vec<AlarmRequest>, PlatformError> {
        let due = self.db.due_alarms(now).map_err(unavailable)?;
        for alarm in &due {
            match alarm.next_after(now) {
                Some(next) => {
                    let mut rearmed = alarm.clone();
                    rearmed.trigger_at = next;
                    self.db.upsert_alarm(&rearmed).map_err(unavailable)?;
                }
                None => {
                    self.db.delete_alarm(alarm.id).map_err(unavailable)?;
                }
            }
        }
        Ok(due)
    }

    fn pending(&self) -> Result<Vec<AlarmRequest>, PlatformError> {
        self.db.list_alarms().map_err(unavailable)
    }

    fn clear(&self) -> Result<usize, PlatformError> {
        self.db.clear_alarms().map_err(unavailable)
    }
}

/// Notification tray persisted in the `notifications` table.
pub struct DeviceNotifier<'a> {
    db: &'a Database,
}

impl<'a> DeviceNotifier<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }
}

impl NotificationSink for DeviceNotifier<'_> {
    fn has_channel(&self, channel_id: &str) -> bool {
        matches!(self.db.get_channel(channel_id), Ok(Some(_)))
    }

    fn create_channel(&self, channel: &NotificationChannel) -> Result<(), PlatformError> {
        self.db.upsert_channel(channel).map_err(unavailable)
    }

    fn post(&self, notification: &Notification) -> Result<(), PlatformError> {
        self.db
            .insert_notification(notification, Utc::now())
            .map_err(unavailable)
    }
}
