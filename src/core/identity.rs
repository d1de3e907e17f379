//! Deterministic reminder ids.
//!
//! A reminder is identified by `(prescription_id, medication_index,
//! time_index, day_offset)`. The id is recomputed wherever it is needed
//! (scheduling, cancelling, boot recovery) instead of being stored, so the
//! function must give the same answer in every process:
//!
//! ```text
//! h      = string_hash(prescription_id)       // 31-polynomial over UTF-16, wrapping i32
//! base   = |h|
//! offset = medication_index * 100_000 + time_index * 1_000 + day_offset
//! id     = (base + offset) mod 2_147_483_647
//! ```
//!
//! Within one prescription ids are distinct while `day_offset < 1000` and
//! `time_index < 100`. Ids of different prescriptions may collide; the
//! later registration then replaces the earlier one.

/// Weight of the medication index.
pub const MEDICATION_WEIGHT: i64 = 100_000;
/// Weight of the time-slot index.
pub const TIME_WEIGHT: i64 = 1_000;

/// Time slots per medication that fit before ids spill into the next medication.
pub const MAX_TIME_SLOTS: usize = (MEDICATION_WEIGHT / TIME_WEIGHT) as usize;
/// Day offsets per time slot that fit before ids spill into the next slot.
pub const MAX_COURSE_DAYS: u32 = TIME_WEIGHT as u32 - 1;

const MODULUS: i64 = i32::MAX as i64;

/// Polynomial string hash (`h = 31 * h + unit`) over UTF-16 code units with
/// 32-bit wrapping arithmetic. Stable across runs and platforms.
pub fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Id of the one-shot reminder for `day_offset` of a course.
pub fn reminder_id(
    prescription_id: &str,
    medication_index: usize,
    time_index: usize,
    day_offset: u32,
) -> i32 {
    let base = i64::from(string_hash(prescription_id)).abs();
    let offset = (medication_index as i64)
        .saturating_mul(MEDICATION_WEIGHT)
        .saturating_add((time_index as i64).saturating_mul(TIME_WEIGHT))
        .saturating_add(i64::from(day_offset));
    // Both operands are non-negative and the result is below i32::MAX.
    (base.saturating_add(offset) % MODULUS) as i32
}

/// Id of a daily repeating reminder. Shares the day-zero id of the course
/// space; a prescription only ever uses one of the two strategies.
pub fn repeating_reminder_id(prescription_id: &str, medication_index: usize, time_index: usize) -> i32 {
    reminder_id(prescription_id, medication_index, time_index, 0)
}
