//! Wall-clock dose times and their resolution to absolute trigger instants.

use chrono::{DateTime, Days, LocalResult, NaiveDateTime, NaiveTime, TimeZone};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("invalid time format: {0:?} (expected HH:MM)")]
    Format(String),

    #[error("time out of range: {0:?} (hour 0-23, minute 0-59)")]
    OutOfRange(String),
}

/// What to do when the requested instant is not in the future.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PastPolicy {
    /// Drop the slot; used when every day of the course is enumerated.
    Skip,
    /// Move to the same time tomorrow; used for daily repeating alarms.
    RollForward,
}

/// An hour and minute on a 24-hour clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour <= 23 && minute <= 59).then_some(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    fn naive(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or_default()
    }

    /// The instant at this time of day, `day_offset` days after `now`'s date,
    /// in `now`'s time zone. Seconds and sub-seconds are zero.
    ///
    /// An instant at or before `now` is handled per `policy`; `None` means
    /// the slot should not be scheduled.
    pub fn resolve<Tz: TimeZone>(
        &self,
        day_offset: u32,
        now: &DateTime<Tz>,
        policy: PastPolicy,
    ) -> Option<DateTime<Tz>> {
        let tz = now.timezone();
        let date = now
            .date_naive()
            .checked_add_days(Days::new(u64::from(day_offset)))?;
        let candidate = localize(&tz, date.and_time(self.naive()))?;
        if candidate > *now {
            return Some(candidate);
        }
        match policy {
            PastPolicy::Skip => None,
            PastPolicy::RollForward => {
                let next = date.checked_add_days(Days::new(1))?;
                localize(&tz, next.and_time(self.naive()))
            }
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    /// Accepts `H:MM` and `HH:MM`; whitespace anywhere is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let parts: Vec<&str> = cleaned.split(':').collect();
        if parts.len() != 2 {
            return Err(TimeParseError::Format(s.to_string()));
        }
        let numeric = |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
        if !numeric(parts[0]) || !numeric(parts[1]) {
            return Err(TimeParseError::Format(s.to_string()));
        }
        let hour: u32 = parts[0]
            .parse()
            .map_err(|_| TimeParseError::OutOfRange(s.to_string()))?;
        let minute: u32 = parts[1]
            .parse()
            .map_err(|_| TimeParseError::OutOfRange(s.to_string()))?;
        Self::new(hour, minute).ok_or_else(|| TimeParseError::OutOfRange(s.to_string()))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Parse `time` and resolve it against `now`. See [`TimeOfDay::resolve`].
pub fn resolve<Tz: TimeZone>(
    time: &str,
    day_offset: u32,
    now: &DateTime<Tz>,
    policy: PastPolicy,
) -> Result<Option<DateTime<Tz>>, TimeParseError> {
    let tod: TimeOfDay = time.parse()?;
    Ok(tod.resolve(day_offset, now, policy))
}

/// Attach a zone to a local wall-clock time. Ambiguous times take the earlier
/// instant; times inside a DST gap move forward one hour.
fn localize<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => Some(t),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => tz
            .from_local_datetime(&(naive + chrono::Duration::hours(1)))
            .earliest(),
    }
}
