use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::core::identity::{MAX_COURSE_DAYS, MAX_TIME_SLOTS, reminder_id, repeating_reminder_id};
use crate::core::time::{PastPolicy, TimeOfDay};
use crate::models::med::Medication;
use crate::platform::{
    AlarmPlatform, AlarmRequest, PlatformError, Precision, ReminderPayload, Repeat,
};

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// How a prescription's doses are turned into alarms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStrategy {
    /// One one-shot alarm per medication, time slot and day of the course.
    #[default]
    Course,
    /// One daily repeating alarm per medication and time slot.
    Repeating,
}

impl ScheduleStrategy {
    fn policy(self) -> PastPolicy {
        match self {
            Self::Course => PastPolicy::Skip,
            Self::Repeating => PastPolicy::RollForward,
        }
    }

    fn repeat(self) -> Repeat {
        match self {
            Self::Course => Repeat::Once,
            Self::Repeating => Repeat::Daily,
        }
    }
}

impl fmt::Display for ScheduleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Course => write!(f, "course"),
            Self::Repeating => write!(f, "repeating"),
        }
    }
}

impl FromStr for ScheduleStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "course" => Ok(Self::Course),
            "repeating" => Ok(Self::Repeating),
            other => anyhow::bail!("unknown schedule strategy: {other} (expected course or repeating)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Slot enumeration
// ---------------------------------------------------------------------------

/// One reminder position within a prescription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReminderSlot {
    pub medication_index: usize,
    pub time_index: usize,
    /// `None` for daily repeating alarms.
    pub day_offset: Option<u32>,
    pub id: i32,
}

/// Slots of one medication. Empty when the medication has no positive
/// duration. Time slots and course days are clamped to what the id space
/// can hold.
fn medication_slots(
    prescription_id: &str,
    medication_index: usize,
    medication: &Medication,
    strategy: ScheduleStrategy,
) -> Vec<ReminderSlot> {
    let days = medication.course_days();
    if days == 0 {
        return Vec::new();
    }
    let days = if days > MAX_COURSE_DAYS {
        warn!(
            prescription_id,
            medication = %medication.name,
            days,
            max = MAX_COURSE_DAYS,
            "course too long, clamping"
        );
        MAX_COURSE_DAYS
    } else {
        days
    };
    let times = if medication.times.len() > MAX_TIME_SLOTS {
        warn!(
            prescription_id,
            medication = %medication.name,
            times = medication.times.len(),
            max = MAX_TIME_SLOTS,
            "too many dose times, ignoring the rest"
        );
        MAX_TIME_SLOTS
    } else {
        medication.times.len()
    };

    let mut slots = Vec::new();
    for time_index in 0..times {
        match strategy {
            ScheduleStrategy::Course => {
                for day in 0..days {
                    slots.push(ReminderSlot {
                        medication_index,
                        time_index,
                        day_offset: Some(day),
                        id: reminder_id(prescription_id, medication_index, time_index, day),
                    });
                }
            }
            ScheduleStrategy::Repeating => slots.push(ReminderSlot {
                medication_index,
                time_index,
                day_offset: None,
                id: repeating_reminder_id(prescription_id, medication_index, time_index),
            }),
        }
    }
    slots
}

/// Every slot of a prescription under `strategy`. Scheduling and
/// cancelling both walk this list, so they always agree on ids.
pub fn enumerate_slots(
    prescription_id: &str,
    medications: &[Medication],
    strategy: ScheduleStrategy,
) -> Vec<ReminderSlot> {
    medications
        .iter()
        .enumerate()
        .flat_map(|(i, m)| medication_slots(prescription_id, i, m, strategy))
        .collect()
}

/// Number of course reminders the medications would produce, ignoring
/// whether any of them are already in the past.
pub fn total_reminder_count(medications: &[Medication]) -> usize {
    enumerate_slots("", medications, ScheduleStrategy::Course).len()
}

/// One human-readable line per dose time, e.g. `Amoxicillin at 09:00 for 3 days`.
pub fn schedule_preview(medications: &[Medication]) -> Vec<String> {
    let mut lines = Vec::new();
    for m in medications {
        let days = m.course_days();
        if days == 0 {
            continue;
        }
        let unit = if days == 1 { "day" } else { "days" };
        for t in m.times.iter().take(MAX_TIME_SLOTS) {
            lines.push(format!("{} at {} for {} {}", m.name, t, days.min(MAX_COURSE_DAYS), unit));
        }
    }
    lines
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleReport {
    /// Alarms registered, exact or not.
    pub scheduled: usize,
    /// Of `scheduled`, how many ended up inexact.
    pub inexact: usize,
    pub skipped_past: usize,
    pub skipped_invalid: usize,
    /// Medications without a positive duration.
    pub skipped_medications: usize,
    pub failed: usize,
}

impl ScheduleReport {
    pub fn merge(&mut self, other: &ScheduleReport) {
        self.scheduled += other.scheduled;
        self.inexact += other.inexact;
        self.skipped_past += other.skipped_past;
        self.skipped_invalid += other.skipped_invalid;
        self.skipped_medications += other.skipped_medications;
        self.failed += other.failed;
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CancelReport {
    pub withdrawn: usize,
    /// Slots with nothing registered; not an error.
    pub absent: usize,
    pub failed: usize,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Registers and withdraws the alarms of a prescription on `P`.
///
/// The strategy given at construction applies to new prescriptions. A
/// stored prescription is scheduled and cancelled with the strategy it was
/// saved under, through [`schedule_as`](Self::schedule_as) and
/// [`cancel_as`](Self::cancel_as).
pub struct ReminderScheduler<P: AlarmPlatform> {
    platform: P,
    strategy: ScheduleStrategy,
}

impl<P: AlarmPlatform> ReminderScheduler<P> {
    pub fn new(platform: P, strategy: ScheduleStrategy) -> Self {
        Self { platform, strategy }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn strategy(&self) -> ScheduleStrategy {
        self.strategy
    }

    pub fn can_schedule_exact_reminders(&self) -> bool {
        self.platform.can_schedule_exact()
    }

    /// Schedule against the local clock.
    pub fn schedule(&self, prescription_id: &str, medications: &[Medication]) -> ScheduleReport {
        self.schedule_at(prescription_id, medications, &Local::now())
    }

    pub fn schedule_at<Tz: TimeZone>(
        &self,
        prescription_id: &str,
        medications: &[Medication],
        now: &DateTime<Tz>,
    ) -> ScheduleReport {
        self.schedule_as_at(self.strategy, prescription_id, medications, now)
    }

    pub fn schedule_as(
        &self,
        strategy: ScheduleStrategy,
        prescription_id: &str,
        medications: &[Medication],
    ) -> ScheduleReport {
        self.schedule_as_at(strategy, prescription_id, medications, &Local::now())
    }

    /// Register every reminder of the prescription under `strategy` as of
    /// `now`. Bad slots and failed registrations are logged and counted;
    /// the rest of the batch still goes through.
    pub fn schedule_as_at<Tz: TimeZone>(
        &self,
        strategy: ScheduleStrategy,
        prescription_id: &str,
        medications: &[Medication],
        now: &DateTime<Tz>,
    ) -> ScheduleReport {
        let mut report = ScheduleReport::default();
        let precision = if self.platform.can_schedule_exact() {
            Precision::Exact
        } else {
            info!(prescription_id, "exact alarms unavailable, using inexact");
            Precision::Inexact
        };

        for (medication_index, medication) in medications.iter().enumerate() {
            let slots = medication_slots(prescription_id, medication_index, medication, strategy);
            if slots.is_empty() {
                if medication.course_days() == 0 {
                    debug!(
                        prescription_id,
                        medication = %medication.name,
                        duration = ?medication.duration_days,
                        "no positive duration, not scheduling"
                    );
                    report.skipped_medications += 1;
                }
                continue;
            }

            for slot in slots {
                let raw = &medication.times[slot.time_index];
                let time: TimeOfDay = match raw.parse() {
                    Ok(t) => t,
                    Err(e) => {
                        warn!(
                            prescription_id,
                            medication = %medication.name,
                            reminder_id = slot.id,
                            error = %e,
                            "skipping reminder with invalid time"
                        );
                        report.skipped_invalid += 1;
                        continue;
                    }
                };
                let day = slot.day_offset.unwrap_or(0);
                let Some(at) = time.resolve(day, now, strategy.policy()) else {
                    debug!(reminder_id = slot.id, time = %time, day, "already passed, skipping");
                    report.skipped_past += 1;
                    continue;
                };

                let request = AlarmRequest {
                    id: slot.id,
                    trigger_at: at.with_timezone(&Utc),
                    precision,
                    repeat: strategy.repeat(),
                    payload: ReminderPayload::for_medication(slot.id, prescription_id, medication),
                };
                match self.register(request) {
                    Ok(got) => {
                        report.scheduled += 1;
                        if got == Precision::Inexact {
                            report.inexact += 1;
                        }
                        debug!(
                            reminder_id = slot.id,
                            medication = %medication.name,
                            trigger_at = %at.with_timezone(&Utc),
                            precision = %got,
                            "registered reminder"
                        );
                    }
                    Err(e) => {
                        warn!(reminder_id = slot.id, error = %e, "failed to register reminder");
                        report.failed += 1;
                    }
                }
            }
        }

        info!(
            prescription_id,
            strategy = %strategy,
            scheduled = report.scheduled,
            skipped_past = report.skipped_past,
            skipped_invalid = report.skipped_invalid,
            failed = report.failed,
            "scheduled prescription"
        );
        report
    }

    /// Register `request`, retrying inexact if exact alarms are refused.
    /// Returns the precision that was accepted.
    fn register(&self, mut request: AlarmRequest) -> Result<Precision, PlatformError> {
        match self.platform.register(&request) {
            Ok(()) => Ok(request.precision),
            Err(PlatformError::ExactNotPermitted) if request.precision == Precision::Exact => {
                info!(reminder_id = request.id, "exact alarm refused, falling back to inexact");
                request.precision = Precision::Inexact;
                self.platform.register(&request)?;
                Ok(Precision::Inexact)
            }
            Err(e) => Err(e),
        }
    }

    pub fn cancel(&self, prescription_id: &str, medications: &[Medication]) -> CancelReport {
        self.cancel_as(self.strategy, prescription_id, medications)
    }

    /// Withdraw every reminder the prescription could have under
    /// `strategy`, including slots that were skipped when it was scheduled.
    pub fn cancel_as(
        &self,
        strategy: ScheduleStrategy,
        prescription_id: &str,
        medications: &[Medication],
    ) -> CancelReport {
        let mut report = CancelReport::default();
        for slot in enumerate_slots(prescription_id, medications, strategy) {
            match self.platform.withdraw(slot.id) {
                Ok(true) => report.withdrawn += 1,
                Ok(false) => report.absent += 1,
                Err(e) => {
                    warn!(reminder_id = slot.id, error = %e, "failed to withdraw reminder");
                    report.failed += 1;
                }
            }
        }
        info!(
            prescription_id,
            withdrawn = report.withdrawn,
            absent = report.absent,
            "cancelled prescription reminders"
        );
        report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::AlarmClock;
    use crate::platform::memory::MemoryAlarms;
    use chrono::{Duration, FixedOffset};
    use std::collections::HashSet;

    fn med(name: &str, times: &[&str], days: Option<i32>) -> Medication {
        let mut m = Medication::new(name);
        m.dosage = "500mg".into();
        m.times = times.iter().map(|t| t.to_string()).collect();
        m.duration_days = days;
        m
    }

    fn amoxicillin() -> Medication {
        med("Amoxicillin", &["09:00", "21:00"], Some(3))
    }

    fn at(h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, h, mi, 0).unwrap()
    }

    // -- ScheduleStrategy ----------------------------------------------------

    #[test]
    fn strategy_round_trips_through_str() {
        assert_eq!("course".parse::<ScheduleStrategy>().unwrap(), ScheduleStrategy::Course);
        assert_eq!(" Repeating ".parse::<ScheduleStrategy>().unwrap(), ScheduleStrategy::Repeating);
        assert!("weekly".parse::<ScheduleStrategy>().is_err());
        assert_eq!(ScheduleStrategy::default().to_string(), "course");
    }

    // -- Enumeration ---------------------------------------------------------

    #[test]
    fn course_enumeration_is_times_by_days() {
        let slots = enumerate_slots("rx-1", &[amoxicillin()], ScheduleStrategy::Course);
        assert_eq!(slots.len(), 6);
        assert_eq!(slots[0].id, reminder_id("rx-1", 0, 0, 0));
        assert_eq!(slots[5].day_offset, Some(2));
        assert_eq!(slots[5].time_index, 1);
    }

    #[test]
    fn repeating_enumeration_has_one_slot_per_time() {
        let slots = enumerate_slots("rx-1", &[amoxicillin()], ScheduleStrategy::Repeating);
        assert_eq!(slots.len(), 2);
        assert!(slots.iter().all(|s| s.day_offset.is_none()));
        assert_eq!(slots[1].id, repeating_reminder_id("rx-1", 0, 1));
    }

    #[test]
    fn enumeration_clamps_long_courses() {
        let long = med("Vitamin D", &["08:00"], Some(5000));
        let slots = enumerate_slots("rx", &[long], ScheduleStrategy::Course);
        assert_eq!(slots.len(), MAX_COURSE_DAYS as usize);
        let ids: HashSet<i32> = slots.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), slots.len());
    }

    #[test]
    fn count_law() {
        let meds = vec![
            med("A", &["08:00", "14:00", "20:00"], Some(7)),
            med("B", &["09:00"], Some(10)),
            med("C", &["10:00"], Some(0)),
            med("D", &["10:00"], Some(-3)),
            med("E", &["10:00"], None),
        ];
        assert_eq!(total_reminder_count(&meds), 3 * 7 + 10);
        assert_eq!(total_reminder_count(&[]), 0);
    }

    #[test]
    fn preview_lines() {
        let meds = vec![amoxicillin(), med("Ibuprofen", &["12:00"], Some(1)), med("X", &["10:00"], None)];
        assert_eq!(
            schedule_preview(&meds),
            vec![
                "Amoxicillin at 09:00 for 3 days",
                "Amoxicillin at 21:00 for 3 days",
                "Ibuprofen at 12:00 for 1 day",
            ]
        );
    }

    // -- Scheduling ----------------------------------------------------------

    #[test]
    fn amoxicillin_before_first_dose_schedules_six() {
        let alarms = MemoryAlarms::new();
        let scheduler = ReminderScheduler::new(&alarms, ScheduleStrategy::Course);
        let report = scheduler.schedule_at("rx-1", &[amoxicillin()], &at(8, 0));
        assert_eq!(report.scheduled, 6);
        assert_eq!(report.skipped_past, 0);
        assert_eq!(alarms.len(), 6);

        let first = alarms.get(reminder_id("rx-1", 0, 0, 0)).unwrap();
        assert_eq!(first.trigger_at, at(9, 0));
        assert_eq!(first.precision, Precision::Exact);
        assert_eq!(first.repeat, Repeat::Once);
        assert_eq!(first.payload.medication_name, "Amoxicillin");
        assert_eq!(first.payload.prescription_id, "rx-1");

        let last = alarms.get(reminder_id("rx-1", 0, 1, 2)).unwrap();
        assert_eq!(last.trigger_at, at(21, 0) + Duration::days(2));
    }

    #[test]
    fn amoxicillin_after_morning_dose_schedules_five() {
        let alarms = MemoryAlarms::new();
        let scheduler = ReminderScheduler::new(&alarms, ScheduleStrategy::Course);
        let report = scheduler.schedule_at("rx-1", &[amoxicillin()], &at(10, 0));
        assert_eq!(report.scheduled, 5);
        assert_eq!(report.skipped_past, 1);
        assert!(alarms.get(reminder_id("rx-1", 0, 0, 0)).is_none());
        assert!(alarms.get(reminder_id("rx-1", 0, 0, 1)).is_some());
    }

    #[test]
    fn schedule_is_deterministic_across_runs() {
        let a = MemoryAlarms::new();
        let b = MemoryAlarms::new();
        ReminderScheduler::new(&a, ScheduleStrategy::Course).schedule_at("rx-1", &[amoxicillin()], &at(8, 0));
        ReminderScheduler::new(&b, ScheduleStrategy::Course).schedule_at("rx-1", &[amoxicillin()], &at(8, 0));
        assert_eq!(a.pending().unwrap(), b.pending().unwrap());
    }

    #[test]
    fn rescheduling_replaces_instead_of_duplicating() {
        let alarms = MemoryAlarms::new();
        let scheduler = ReminderScheduler::new(&alarms, ScheduleStrategy::Course);
        scheduler.schedule_at("rx-1", &[amoxicillin()], &at(8, 0));
        scheduler.schedule_at("rx-1", &[amoxicillin()], &at(8, 0));
        assert_eq!(alarms.len(), 6);
        assert_eq!(alarms.registration_count(), 12);
    }

    #[test]
    fn zero_negative_and_missing_duration_schedule_nothing() {
        let alarms = MemoryAlarms::new();
        let scheduler = ReminderScheduler::new(&alarms, ScheduleStrategy::Course);
        let meds = vec![
            med("A", &["09:00"], Some(0)),
            med("B", &["09:00"], Some(-1)),
            med("C", &["09:00"], None),
        ];
        let report = scheduler.schedule_at("rx", &meds, &at(8, 0));
        assert_eq!(report.scheduled, 0);
        assert_eq!(report.skipped_medications, 3);
        assert!(alarms.is_empty());
    }

    #[test]
    fn invalid_time_skips_only_its_slots() {
        let alarms = MemoryAlarms::new();
        let scheduler = ReminderScheduler::new(&alarms, ScheduleStrategy::Course);
        let m = med("A", &["25:99", "09:00"], Some(2));
        let report = scheduler.schedule_at("rx", &[m], &at(8, 0));
        assert_eq!(report.skipped_invalid, 2);
        assert_eq!(report.scheduled, 2);
        assert!(alarms.get(reminder_id("rx", 0, 1, 0)).is_some());
    }

    #[test]
    fn inexact_when_exact_not_available() {
        let alarms = MemoryAlarms::new().with_exact_permission(false);
        let scheduler = ReminderScheduler::new(&alarms, ScheduleStrategy::Course);
        assert!(!scheduler.can_schedule_exact_reminders());
        let report = scheduler.schedule_at("rx-1", &[amoxicillin()], &at(8, 0));
        assert_eq!(report.scheduled, 6);
        assert_eq!(report.inexact, 6);
        assert!(alarms.pending().unwrap().iter().all(|a| a.precision == Precision::Inexact));
    }

    #[test]
    fn falls_back_when_exact_revoked_mid_batch() {
        let alarms = MemoryAlarms::new().with_revoked_exact_permission();
        let scheduler = ReminderScheduler::new(&alarms, ScheduleStrategy::Course);
        let report = scheduler.schedule_at("rx-1", &[amoxicillin()], &at(8, 0));
        assert_eq!(report.scheduled, 6);
        assert_eq!(report.inexact, 6);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn one_failed_registration_does_not_stop_the_batch() {
        let bad = reminder_id("rx-1", 0, 1, 1);
        let alarms = MemoryAlarms::new().failing_on(bad);
        let scheduler = ReminderScheduler::new(&alarms, ScheduleStrategy::Course);
        let report = scheduler.schedule_at("rx-1", &[amoxicillin()], &at(8, 0));
        assert_eq!(report.failed, 1);
        assert_eq!(report.scheduled, 5);
        assert!(alarms.get(bad).is_none());
    }

    #[test]
    fn repeating_rolls_passed_times_to_tomorrow() {
        let alarms = MemoryAlarms::new();
        let scheduler = ReminderScheduler::new(&alarms, ScheduleStrategy::Repeating);
        let report = scheduler.schedule_at("rx-1", &[amoxicillin()], &at(10, 0));
        assert_eq!(report.scheduled, 2);
        assert_eq!(report.skipped_past, 0);

        let morning = alarms.get(repeating_reminder_id("rx-1", 0, 0)).unwrap();
        assert_eq!(morning.trigger_at, at(9, 0) + Duration::days(1));
        assert_eq!(morning.repeat, Repeat::Daily);
        let evening = alarms.get(repeating_reminder_id("rx-1", 0, 1)).unwrap();
        assert_eq!(evening.trigger_at, at(21, 0));
    }

    #[test]
    fn schedule_honours_callers_zone() {
        let alarms = MemoryAlarms::new();
        let scheduler = ReminderScheduler::new(&alarms, ScheduleStrategy::Course);
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap();
        scheduler.schedule_at("rx-1", &[med("A", &["09:00"], Some(1))], &now);
        let alarm = alarms.get(reminder_id("rx-1", 0, 0, 0)).unwrap();
        assert_eq!(alarm.trigger_at, at(14, 0));
    }

    // -- Cancelling ----------------------------------------------------------

    #[test]
    fn cancel_removes_everything_scheduled() {
        let alarms = MemoryAlarms::new();
        let scheduler = ReminderScheduler::new(&alarms, ScheduleStrategy::Course);
        scheduler.schedule_at("rx-1", &[amoxicillin()], &at(10, 0));
        assert_eq!(alarms.len(), 5);

        let report = scheduler.cancel("rx-1", &[amoxicillin()]);
        assert_eq!(report.withdrawn, 5);
        // The skipped morning slot is visited too.
        assert_eq!(report.absent, 1);
        assert!(alarms.is_empty());
    }

    #[test]
    fn second_cancel_is_a_no_op() {
        let alarms = MemoryAlarms::new();
        let scheduler = ReminderScheduler::new(&alarms, ScheduleStrategy::Course);
        scheduler.schedule_at("rx-1", &[amoxicillin()], &at(8, 0));
        scheduler.cancel("rx-1", &[amoxicillin()]);
        let again = scheduler.cancel("rx-1", &[amoxicillin()]);
        assert_eq!(again.withdrawn, 0);
        assert_eq!(again.absent, 6);
        assert_eq!(again.failed, 0);
    }

    #[test]
    fn cancel_leaves_other_prescriptions_alone() {
        let alarms = MemoryAlarms::new();
        let scheduler = ReminderScheduler::new(&alarms, ScheduleStrategy::Course);
        scheduler.schedule_at("rx-1", &[amoxicillin()], &at(8, 0));
        scheduler.schedule_at("rx-2", &[med("B", &["12:00"], Some(2))], &at(8, 0));
        scheduler.cancel("rx-1", &[amoxicillin()]);
        assert_eq!(alarms.len(), 2);
    }

    #[test]
    fn cancel_repeating() {
        let alarms = MemoryAlarms::new();
        let scheduler = ReminderScheduler::new(&alarms, ScheduleStrategy::Repeating);
        scheduler.schedule_at("rx-1", &[amoxicillin()], &at(8, 0));
        let report = scheduler.cancel("rx-1", &[amoxicillin()]);
        assert_eq!(report.withdrawn, 2);
        assert!(alarms.is_empty());
    }

    #[test]
    fn explicit_strategy_overrides_the_default() {
        let alarms = MemoryAlarms::new();
        let course = ReminderScheduler::new(&alarms, ScheduleStrategy::Course);
        course.schedule_at("rx-1", &[amoxicillin()], &at(8, 0));
        assert_eq!(alarms.len(), 6);

        let repeating = ReminderScheduler::new(&alarms, ScheduleStrategy::Repeating);
        let report = repeating.cancel_as(ScheduleStrategy::Course, "rx-1", &[amoxicillin()]);
        assert_eq!(report.withdrawn, 6);
        assert!(alarms.is_empty());

        let report =
            course.schedule_as_at(ScheduleStrategy::Repeating, "rx-2", &[amoxicillin()], &at(8, 0));
        assert_eq!(report.scheduled, 2);
        assert!(alarms.pending().unwrap().iter().all(|a| a.repeat == Repeat::Daily));
    }

    #[test]
    fn two_medications_get_disjoint_ids() {
        let a = med("A", &["09:00", "21:00"], Some(30));
        let b = med("B", &["09:00", "21:00"], Some(30));
        let slots = enumerate_slots("rx-1", &[a, b], ScheduleStrategy::Course);
        let (first, second): (Vec<&ReminderSlot>, Vec<&ReminderSlot>) = slots.iter().partition(|s| s.medication_index == 0);
        let first: HashSet<i32> = first.iter().map(|s| s.id).collect();
        let second: HashSet<i32> = second.iter().map(|s| s.id).collect();
        assert_eq!(first.len(), 60);
        assert!(first.is_disjoint(&second));
    }
}
