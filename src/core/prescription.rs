use anyhow::{Result, bail};
use serde::Serialize;
use tracing::{info, warn};

use crate::core::recovery::{CurrentUser, PrescriptionStore};
use crate::core::scheduler::{CancelReport, ScheduleReport};
use crate::core::worker::{ReminderWorker, RescheduleReport};
use crate::db::Database;
use crate::models::med::Medication;
use crate::models::prescription::{NotificationMode, PrescriptionStatus, SavedPrescription};
use crate::platform::AlarmPlatform;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Saved {
    pub prescription: SavedPrescription,
    pub reminders: ScheduleReport,
    /// Daily medications whose time count differs from their frequency.
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusChange {
    pub prescription: SavedPrescription,
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled: Option<CancelReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<ScheduleReport>,
}

#[derive(Debug, Serialize)]
pub struct Edited {
    pub prescription: SavedPrescription,
    /// `None` when the prescription is paused and nothing was rescheduled.
    pub reminders: Option<RescheduleReport>,
}

/// Changes to one medication of a saved prescription.
///
/// Indices in `set_times` and `remove_times` point into the times as they
/// were before the edit. The resulting list is sorted once at the end.
#[derive(Debug, Default)]
pub struct MedicationEdit {
    pub add_times: Vec<String>,
    pub remove_times: Vec<usize>,
    pub set_times: Vec<(usize, String)>,
    pub duration_days: Option<i32>,
    pub dosage: Option<String>,
    pub instructions: Option<String>,
}

impl MedicationEdit {
    pub fn is_empty(&self) -> bool {
        self.add_times.is_empty()
            && self.remove_times.is_empty()
            && self.set_times.is_empty()
            && self.duration_days.is_none()
            && self.dosage.is_none()
            && self.instructions.is_none()
    }

    fn apply(&self, m: &mut Medication) -> Result<()> {
        m.edit_times(&self.set_times, &self.remove_times, &self.add_times)?;
        if let Some(days) = self.duration_days {
            m.set_duration_days(Some(days));
        }
        if let Some(d) = &self.dosage {
            m.dosage = d.clone();
        }
        if let Some(i) = &self.instructions {
            m.instructions = i.clone();
        }
        Ok(())
    }
}

fn frequency_warnings(medications: &[Medication]) -> Vec<String> {
    medications
        .iter()
        .filter(|m| m.frequency_mismatch())
        .map(|m| {
            format!(
                "{}: {} time(s) listed but frequency is {} per day",
                m.name,
                m.times.len(),
                m.frequency
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Save a reviewed prescription for the signed-in user and schedule its
/// reminders.
pub fn save_prescription<P, S>(
    db: &Database,
    worker: &ReminderWorker<P, S>,
    session: &(impl CurrentUser + ?Sized),
    medications: Vec<Medication>,
    model_used: &str,
    mode: NotificationMode,
) -> Result<Saved>
where
    P: AlarmPlatform + Send + 'static,
    S: PrescriptionStore + Send + 'static,
{
    let Some(user) = session.current_user() else {
        bail!("User not logged in");
    };
    if medications.is_empty() {
        bail!("No medications to save");
    }
    if let Some(i) = medications.iter().position(|m| m.name.trim().is_empty()) {
        bail!("medication {} has no name", i + 1);
    }

    let prescription = SavedPrescription::new(user.uid, medications, model_used, mode)
        .with_strategy(worker.strategy());
    db.insert_prescription(&prescription)?;
    let warnings = frequency_warnings(&prescription.medications);
    for w in &warnings {
        warn!(prescription_id = %prescription.id, "{w}");
    }

    let reminders = worker
        .schedule(
            &prescription.id,
            prescription.strategy,
            prescription.medications.clone(),
        )
        .wait()?;
    info!(
        prescription_id = %prescription.id,
        medications = prescription.medications.len(),
        "saved prescription"
    );
    Ok(Saved {
        prescription,
        reminders,
        warnings,
    })
}

/// The signed-in user's prescriptions, newest first.
pub fn list_prescriptions(
    db: &Database,
    session: &(impl CurrentUser + ?Sized),
    include_inactive: bool,
) -> Result<Vec<SavedPrescription>> {
    let Some(user) = session.current_user() else {
        bail!("User not logged in");
    };
    db.list_prescriptions(&user.uid, include_inactive)
}

pub fn get_prescription(db: &Database, id: &str) -> Result<SavedPrescription> {
    match db.get_prescription(id)? {
        Some(p) => Ok(p),
        None => bail!("prescription not found: {id}"),
    }
}

/// Cancel every reminder of the prescription, then delete it.
pub fn delete_prescription<P, S>(
    db: &Database,
    worker: &ReminderWorker<P, S>,
    id: &str,
) -> Result<CancelReport>
where
    P: AlarmPlatform + Send + 'static,
    S: PrescriptionStore + Send + 'static,
{
    let p = get_prescription(db, id)?;
    let cancelled = worker
        .cancel(&p.id, p.strategy, p.medications.clone())
        .wait()?;
    db.delete_prescription(&p.id)?;
    info!(prescription_id = %p.id, withdrawn = cancelled.withdrawn, "deleted prescription");
    Ok(cancelled)
}

/// Withdraw and re-register the reminders of an active prescription.
pub fn reschedule_prescription<P, S>(
    db: &Database,
    worker: &ReminderWorker<P, S>,
    id: &str,
) -> Result<RescheduleReport>
where
    P: AlarmPlatform + Send + 'static,
    S: PrescriptionStore + Send + 'static,
{
    let p = get_prescription(db, id)?;
    if !p.is_active() {
        bail!("prescription {id} is paused; resume it first");
    }
    let meds = p.medications.clone();
    Ok(worker
        .reschedule(&p.id, p.strategy, meds.clone(), meds)
        .wait()?)
}

/// Pause (cancel reminders) or resume (schedule them again).
pub fn set_status<P, S>(
    db: &Database,
    worker: &ReminderWorker<P, S>,
    id: &str,
    status: PrescriptionStatus,
) -> Result<StatusChange>
where
    P: AlarmPlatform + Send + 'static,
    S: PrescriptionStore + Send + 'static,
{
    let mut p = get_prescription(db, id)?;
    if p.status == status {
        return Ok(StatusChange {
            prescription: p,
            changed: false,
            cancelled: None,
            scheduled: None,
        });
    }

    let (cancelled, scheduled) = match status {
        PrescriptionStatus::Inactive => {
            let report = worker.cancel(&p.id, p.strategy, p.medications.clone());
            (Some(report.wait()?), None)
        }
        PrescriptionStatus::Active => {
            let report = worker.schedule(&p.id, p.strategy, p.medications.clone());
            (None, Some(report.wait()?))
        }
    };
    db.set_prescription_status(&p.id, status)?;
    p.status = status;
    info!(prescription_id = %p.id, status = %status, "changed prescription status");
    Ok(StatusChange {
        prescription: p,
        changed: true,
        cancelled,
        scheduled,
    })
}

/// Edit one medication (1-based `number`) and bring reminders in line.
pub fn edit_medication<P, S>(
    db: &Database,
    worker: &ReminderWorker<P, S>,
    id: &str,
    number: usize,
    edit: &MedicationEdit,
) -> Result<Edited>
where
    P: AlarmPlatform + Send + 'static,
    S: PrescriptionStore + Send + 'static,
{
    if edit.is_empty() {
        bail!("nothing to change");
    }
    let mut p = get_prescription(db, id)?;
    let previous = p.medications.clone();
    let count = p.medications.len();
    let Some(m) = number.checked_sub(1).and_then(|i| p.medications.get_mut(i)) else {
        bail!("medication {number} out of range (prescription has {count})");
    };
    edit.apply(m)?;
    db.update(&p)?;

    let reminders = if p.is_active() {
        Some(
            worker
                .reschedule(&p.id, p.strategy, previous, p.medications.clone())
                .wait()?,
        )
    } else {
        None
    };
    Ok(Edited {
        prescription: p,
        reminders,
    })
}
