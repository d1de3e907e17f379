//! Rebuilding reminders after the device restarts.
//!
//! The OS forgets every registered alarm on reboot. Recovery asks who is
//! signed in, fetches their active prescriptions and schedules each one
//! again. Ids are recomputed from the same inputs and registration
//! replaces by id, so running it twice leaves the same set of alarms.

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::core::scheduler::{ReminderScheduler, ScheduleReport};
use crate::models::prescription::SavedPrescription;
use crate::models::user::User;
use crate::platform::AlarmPlatform;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("prescription store unavailable: {0}")]
    Unavailable(String),

    #[error("prescription not found: {0}")]
    NotFound(String),
}

/// Where prescriptions live.
pub trait PrescriptionStore {
    /// Active prescriptions of `user_id`, newest first.
    fn active_prescriptions(&self, user_id: &str) -> Result<Vec<SavedPrescription>, StoreError>;

    /// Every prescription of `user_id`, including inactive ones.
    fn list(&self, user_id: &str) -> Result<Vec<SavedPrescription>, StoreError>;

    fn get(&self, prescription_id: &str) -> Result<SavedPrescription, StoreError>;

    /// Persist a new prescription, returning its id.
    fn save(&self, prescription: &SavedPrescription) -> Result<String, StoreError>;

    /// Overwrite the medications and status of a stored prescription.
    /// `Ok(false)` if it did not exist.
    fn update(&self, prescription: &SavedPrescription) -> Result<bool, StoreError>;

    /// Remove a prescription. `Ok(false)` if it did not exist.
    fn delete(&self, prescription_id: &str) -> Result<bool, StoreError>;
}

/// The signed-in user, if any.
pub trait CurrentUser {
    fn current_user(&self) -> Option<User>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecoveryOutcome {
    /// Nobody is signed in; nothing to restore.
    NoUser,
    /// The store could not be read. Recovery is not retried.
    StoreUnavailable { reason: String },
    Rescheduled {
        prescriptions: usize,
        report: ScheduleReport,
    },
}

impl RecoveryOutcome {
    /// Reminders registered by this run.
    pub fn scheduled(&self) -> usize {
        match self {
            Self::Rescheduled { report, .. } => report.scheduled,
            _ => 0,
        }
    }
}

pub struct RestartRecovery<'a, U: ?Sized, S: ?Sized, P: AlarmPlatform> {
    session: &'a U,
    store: &'a S,
    scheduler: &'a ReminderScheduler<P>,
}

impl<'a, U, S, P> RestartRecovery<'a, U, S, P>
where
    U: CurrentUser + ?Sized,
    S: PrescriptionStore + ?Sized,
    P: AlarmPlatform,
{
    pub fn new(session: &'a U, store: &'a S, scheduler: &'a ReminderScheduler<P>) -> Self {
        Self {
            session,
            store,
            scheduler,
        }
    }

    pub fn run(&self) -> RecoveryOutcome {
        self.run_at(&Local::now())
    }

    pub fn run_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> RecoveryOutcome {
        let Some(user) = self.session.current_user() else {
            info!("no signed-in user, skipping reminder recovery");
            return RecoveryOutcome::NoUser;
        };

        let prescriptions = match self.store.active_prescriptions(&user.uid) {
            Ok(p) => p,
            Err(e) => {
                error!(user = %user.uid, error = %e, "could not load prescriptions for recovery");
                return RecoveryOutcome::StoreUnavailable {
                    reason: e.to_string(),
                };
            }
        };

        let mut report = ScheduleReport::default();
        for p in &prescriptions {
            let r = self
                .scheduler
                .schedule_as_at(p.strategy, &p.id, &p.medications, now);
            report.merge(&r);
        }

        info!(
            user = %user.uid,
            prescriptions = prescriptions.len(),
            scheduled = report.scheduled,
            "restored reminders after restart"
        );
        RecoveryOutcome::Rescheduled {
            prescriptions: prescriptions.len(),
            report,
        }
    }
}
