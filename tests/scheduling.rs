mod common;

use chrono::Duration;
use medtime::core::delivery::{DeliveryHandler, NotificationChannel, deliver_due};
use medtime::core::identity::reminder_id;
use medtime::core::scheduler::{ReminderScheduler, ScheduleStrategy, enumerate_slots};
use medtime::db::Database;
use medtime::platform::device::{DeviceAlarms, DeviceNotifier};
use medtime::platform::memory::{MemoryAlarms, MemoryNotifier};
use medtime::platform::{AlarmClock, Precision, Repeat};
use std::collections::HashSet;

fn device(dir: &tempfile::TempDir, exact: bool) -> DeviceAlarms {
    DeviceAlarms::open(&dir.path().join("medtime.db"), exact).unwrap()
}

// ---------------------------------------------------------------------------
// Course strategy on the device registry
// ---------------------------------------------------------------------------

#[test]
fn amoxicillin_course_end_to_end() {
    let dir = tempfile::TempDir::new().unwrap();
    let scheduler = ReminderScheduler::new(device(&dir, true), ScheduleStrategy::Course);

    let report = scheduler.schedule_at("rx-1", &[common::amoxicillin()], &common::at(10, 0));
    assert_eq!(report.scheduled, 5);
    assert_eq!(report.skipped_past, 1);

    let pending = scheduler.platform().pending().unwrap();
    assert_eq!(pending.len(), 5);
    assert_eq!(pending[0].id, reminder_id("rx-1", 0, 1, 0));
    assert_eq!(pending[0].trigger_at, common::at(21, 0));
    assert!(pending.iter().all(|a| a.repeat == Repeat::Once));

    let cancelled = scheduler.cancel("rx-1", &[common::amoxicillin()]);
    assert_eq!(cancelled.withdrawn, 5);
    assert_eq!(cancelled.absent, 1);
    assert!(scheduler.platform().pending().unwrap().is_empty());
}

#[test]
fn registrations_survive_reopening_the_registry() {
    let dir = tempfile::TempDir::new().unwrap();
    {
        let scheduler = ReminderScheduler::new(device(&dir, true), ScheduleStrategy::Course);
        scheduler.schedule_at("rx-1", &[common::amoxicillin()], &common::at(8, 0));
    }
    let reopened = device(&dir, true);
    assert_eq!(reopened.pending().unwrap().len(), 6);
}

#[test]
fn device_without_exact_permission_gets_inexact_alarms() {
    let dir = tempfile::TempDir::new().unwrap();
    let scheduler = ReminderScheduler::new(device(&dir, false), ScheduleStrategy::Course);
    assert!(!scheduler.can_schedule_exact_reminders());

    let report = scheduler.schedule_at("rx-1", &[common::amoxicillin()], &common::at(8, 0));
    assert_eq!(report.inexact, 6);
    assert!(
        scheduler
            .platform()
            .pending()
            .unwrap()
            .iter()
            .all(|a| a.precision == Precision::Inexact)
    );
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

#[test]
fn course_reminders_fire_once_each() {
    let dir = tempfile::TempDir::new().unwrap();
    let scheduler = ReminderScheduler::new(device(&dir, true), ScheduleStrategy::Course);
    scheduler.schedule_at("rx-1", &[common::amoxicillin()], &common::at(8, 0));

    let db = Database::open(&dir.path().join("medtime.db")).unwrap();
    let notifier = DeviceNotifier::new(&db);
    let handler = DeliveryHandler::new(&notifier, NotificationChannel::default());

    let first = deliver_due(scheduler.platform(), &handler, common::at(9, 30)).unwrap();
    assert_eq!(first.delivered.len(), 1);
    let n = &first.delivered[0];
    assert_eq!(n.id, reminder_id("rx-1", 0, 0, 0));
    assert_eq!(n.title, "It's time for your medicine Amoxicillin");
    assert_eq!(n.text, "500mg - after meals");
    assert_eq!(n.channel_id, "medication_reminders");

    // Nothing new is due until the evening dose.
    let again = deliver_due(scheduler.platform(), &handler, common::at(9, 30)).unwrap();
    assert!(again.delivered.is_empty());

    let later = deliver_due(scheduler.platform(), &handler, common::at(23, 0) + Duration::days(2)).unwrap();
    assert_eq!(later.delivered.len(), 5);
    assert!(scheduler.platform().pending().unwrap().is_empty());
    assert!(db.get_channel("medication_reminders").unwrap().is_some());
    assert_eq!(db.list_notifications(None).unwrap().len(), 6);
}

#[test]
fn repeating_reminders_rearm_until_cancelled() {
    let alarms = MemoryAlarms::new();
    let scheduler = ReminderScheduler::new(&alarms, ScheduleStrategy::Repeating);
    scheduler.schedule_at("rx-1", &[common::amoxicillin()], &common::at(8, 0));

    let sink = MemoryNotifier::new();
    let handler = DeliveryHandler::new(&sink, NotificationChannel::default());
    for day in 0..5 {
        let report = deliver_due(&alarms, &handler, common::at(22, 0) + Duration::days(day)).unwrap();
        assert_eq!(report.delivered.len(), 2, "day {day}");
    }
    // Repeating alarms outlive the nominal course.
    assert_eq!(alarms.len(), 2);

    scheduler.cancel("rx-1", &[common::amoxicillin()]);
    assert!(alarms.is_empty());
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[test]
fn ids_unique_within_realistic_prescription() {
    let meds: Vec<_> = (0..10)
        .map(|i| common::make_med(&format!("M{i}"), &["06:00", "10:00", "14:00", "18:00", "22:00"], Some(90)))
        .collect();
    let slots = enumerate_slots("b1f3c0de-5a7e-4c1b-9d3e-0a1b2c3d4e5f", &meds, ScheduleStrategy::Course);
    let ids: HashSet<i32> = slots.iter().map(|s| s.id).collect();
    assert_eq!(slots.len(), 10 * 5 * 90);
    assert_eq!(ids.len(), slots.len());
    assert!(ids.iter().all(|id| *id >= 0));
}
