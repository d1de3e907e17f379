mod common;

use medtime::core::prescription::{self, MedicationEdit};
use medtime::core::scheduler::{ReminderScheduler, ScheduleStrategy};
use medtime::core::session::SessionContext;
use medtime::core::worker::ReminderWorker;
use medtime::db::Database;
use medtime::models::prescription::{NotificationMode, PrescriptionStatus};
use medtime::models::user::User;
use medtime::platform::AlarmClock;
use medtime::platform::device::DeviceAlarms;
use tempfile::TempDir;

struct Env {
    worker: ReminderWorker<DeviceAlarms, Database>,
    db: Database,
    session: SessionContext,
    path: std::path::PathBuf,
    _dir: TempDir,
}

impl Env {
    fn new(strategy: ScheduleStrategy) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("medtime.db");
        let db = Database::open(&path).unwrap();
        let scheduler = ReminderScheduler::new(DeviceAlarms::open(&path, true).unwrap(), strategy);
        let worker = ReminderWorker::spawn(scheduler, Database::open(&path).unwrap());
        Self {
            worker,
            db,
            session: SessionContext::in_memory(Some(User::new("u1"))),
            path,
            _dir: dir,
        }
    }

    /// A second worker on the same database, as after a config change.
    fn worker_with(&self, strategy: ScheduleStrategy) -> ReminderWorker<DeviceAlarms, Database> {
        let scheduler =
            ReminderScheduler::new(DeviceAlarms::open(&self.path, true).unwrap(), strategy);
        ReminderWorker::spawn(scheduler, Database::open(&self.path).unwrap())
    }

    fn alarm_count(&self) -> usize {
        DeviceAlarms::open(&self.path, true).unwrap().pending().unwrap().len()
    }
}

/// Five days so some doses are always still ahead, whatever the time.
fn meds() -> Vec<medtime::models::med::Medication> {
    vec![common::make_med("Amoxicillin", &["09:00", "21:00"], Some(5))]
}

#[test]
fn save_schedules_and_delete_cancels() {
    let env = Env::new(ScheduleStrategy::Course);
    let saved = prescription::save_prescription(
        &env.db,
        &env.worker,
        &env.session,
        meds(),
        "gemini-2.0-flash",
        NotificationMode::Alarm,
    )
    .unwrap();

    assert!(saved.reminders.scheduled >= 8);
    assert_eq!(env.alarm_count(), saved.reminders.scheduled);
    let stored = prescription::get_prescription(&env.db, &saved.prescription.id).unwrap();
    assert_eq!(stored.model_used, "gemini-2.0-flash");

    let cancelled =
        prescription::delete_prescription(&env.db, &env.worker, &saved.prescription.id).unwrap();
    assert_eq!(cancelled.withdrawn, saved.reminders.scheduled);
    assert_eq!(env.alarm_count(), 0);
    assert!(prescription::get_prescription(&env.db, &saved.prescription.id).is_err());
}

#[test]
fn save_requires_user_and_medications() {
    let env = Env::new(ScheduleStrategy::Course);
    let nobody = SessionContext::in_memory(None);
    let err = prescription::save_prescription(
        &env.db,
        &env.worker,
        &nobody,
        meds(),
        "m",
        NotificationMode::Push,
    )
    .unwrap_err();
    assert!(err.to_string().contains("not logged in"));

    let err = prescription::save_prescription(
        &env.db,
        &env.worker,
        &env.session,
        Vec::new(),
        "m",
        NotificationMode::Push,
    )
    .unwrap_err();
    assert!(err.to_string().contains("No medications"));
    assert!(prescription::list_prescriptions(&env.db, &env.session, true).unwrap().is_empty());
}

#[test]
fn pause_and_resume() {
    let env = Env::new(ScheduleStrategy::Course);
    let saved = prescription::save_prescription(
        &env.db,
        &env.worker,
        &env.session,
        meds(),
        "m",
        NotificationMode::Alarm,
    )
    .unwrap();
    let id = saved.prescription.id.clone();

    let paused =
        prescription::set_status(&env.db, &env.worker, &id, PrescriptionStatus::Inactive).unwrap();
    assert!(paused.changed);
    assert_eq!(env.alarm_count(), 0);
    assert!(prescription::list_prescriptions(&env.db, &env.session, false).unwrap().is_empty());
    assert!(prescription::reschedule_prescription(&env.db, &env.worker, &id).is_err());

    let again =
        prescription::set_status(&env.db, &env.worker, &id, PrescriptionStatus::Inactive).unwrap();
    assert!(!again.changed);

    let resumed =
        prescription::set_status(&env.db, &env.worker, &id, PrescriptionStatus::Active).unwrap();
    assert!(resumed.scheduled.unwrap().scheduled >= 8);
    assert!(env.alarm_count() >= 8);
}

#[test]
fn edit_reschedules_with_new_times() {
    let env = Env::new(ScheduleStrategy::Repeating);
    let saved = prescription::save_prescription(
        &env.db,
        &env.worker,
        &env.session,
        meds(),
        "m",
        NotificationMode::Alarm,
    )
    .unwrap();
    assert_eq!(env.alarm_count(), 2);

    let edit = MedicationEdit {
        add_times: vec!["13:00".into()],
        ..Default::default()
    };
    let edited =
        prescription::edit_medication(&env.db, &env.worker, &saved.prescription.id, 1, &edit)
            .unwrap();
    assert_eq!(
        edited.prescription.medications[0].times,
        vec!["09:00", "13:00", "21:00"]
    );
    let report = edited.reminders.unwrap();
    assert_eq!(report.cancelled.withdrawn, 2);
    assert_eq!(report.scheduled.scheduled, 3);
    assert_eq!(env.alarm_count(), 3);

    assert!(
        prescription::edit_medication(&env.db, &env.worker, &saved.prescription.id, 2, &edit)
            .is_err()
    );
}

#[test]
fn reschedule_is_stable() {
    let env = Env::new(ScheduleStrategy::Repeating);
    let saved = prescription::save_prescription(
        &env.db,
        &env.worker,
        &env.session,
        meds(),
        "m",
        NotificationMode::Alarm,
    )
    .unwrap();
    let report =
        prescription::reschedule_prescription(&env.db, &env.worker, &saved.prescription.id)
            .unwrap();
    assert_eq!(report.cancelled.withdrawn, 2);
    assert_eq!(report.scheduled.scheduled, 2);
    assert_eq!(env.alarm_count(), 2);
}

#[test]
fn delete_after_strategy_change_cancels_every_course_alarm() {
    let env = Env::new(ScheduleStrategy::Course);
    let saved = prescription::save_prescription(
        &env.db,
        &env.worker,
        &env.session,
        meds(),
        "m",
        NotificationMode::Alarm,
    )
    .unwrap();
    assert_eq!(saved.prescription.strategy, ScheduleStrategy::Course);
    assert!(saved.reminders.scheduled >= 8);

    let repeating = env.worker_with(ScheduleStrategy::Repeating);
    let cancelled =
        prescription::delete_prescription(&env.db, &repeating, &saved.prescription.id).unwrap();
    assert_eq!(cancelled.withdrawn, saved.reminders.scheduled);
    assert_eq!(env.alarm_count(), 0);
}

#[test]
fn pause_and_resume_keep_the_saved_strategy() {
    let env = Env::new(ScheduleStrategy::Course);
    let saved = prescription::save_prescription(
        &env.db,
        &env.worker,
        &env.session,
        meds(),
        "m",
        NotificationMode::Alarm,
    )
    .unwrap();
    let id = saved.prescription.id.clone();

    let repeating = env.worker_with(ScheduleStrategy::Repeating);
    prescription::set_status(&env.db, &repeating, &id, PrescriptionStatus::Inactive).unwrap();
    assert_eq!(env.alarm_count(), 0);

    let resumed =
        prescription::set_status(&env.db, &repeating, &id, PrescriptionStatus::Active).unwrap();
    assert_eq!(resumed.prescription.strategy, ScheduleStrategy::Course);
    assert!(resumed.scheduled.unwrap().scheduled >= 8);
    let stored = prescription::get_prescription(&env.db, &id).unwrap();
    assert_eq!(stored.strategy, ScheduleStrategy::Course);
}
