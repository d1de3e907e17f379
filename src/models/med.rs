use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::core::time::TimeOfDay;

// ---------------------------------------------------------------------------
// FrequencyType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyType {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl FromStr for FrequencyType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(anyhow::anyhow!(
                "unknown frequency type: {other} (expected daily/weekly/monthly)"
            )),
        }
    }
}

impl fmt::Display for FrequencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient numeric fields
// ---------------------------------------------------------------------------

static NON_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9]").expect("constant pattern"));

/// Extract a day count from free text such as `"7"`, `"7 days"` or `"x10"`.
///
/// Every non-digit character is dropped before parsing, so `"1-2 weeks"`
/// reads as `12`. Returns `None` when no digits remain.
pub fn parse_duration_days(input: &str) -> Option<i32> {
    let digits = NON_DIGITS.replace_all(input, "");
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<LooseNumber> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None => None,
        Some(LooseNumber::Int(n)) => i32::try_from(n).ok(),
        Some(LooseNumber::Float(n)) if n.is_finite() => Some(n as i32),
        Some(LooseNumber::Float(_)) => None,
        Some(LooseNumber::Text(s)) => parse_duration_days(&s),
    })
}

fn deserialize_frequency<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<LooseNumber> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(LooseNumber::Int(n)) => u32::try_from(n).unwrap_or(1),
        Some(LooseNumber::Float(n)) if n.is_finite() && n >= 0.0 => n as u32,
        Some(LooseNumber::Text(s)) => s.trim().parse().unwrap_or(1),
        _ => 1,
    })
}

fn deserialize_frequency_type<'de, D>(deserializer: D) -> Result<FrequencyType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .and_then(|s| s.parse().ok())
        .unwrap_or(FrequencyType::Daily))
}

fn default_frequency() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Medication
// ---------------------------------------------------------------------------

/// One medication line of a prescription, as extracted and then reviewed
/// by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default = "default_frequency", deserialize_with = "deserialize_frequency")]
    pub frequency: u32,
    #[serde(
        default,
        alias = "frequencyType",
        deserialize_with = "deserialize_frequency_type"
    )]
    pub frequency_type: FrequencyType,
    #[serde(default)]
    pub times: Vec<String>,
    #[serde(
        default,
        alias = "durationDays",
        deserialize_with = "deserialize_duration"
    )]
    pub duration_days: Option<i32>,
    #[serde(default)]
    pub instructions: String,
}

impl Medication {
    /// A daily, once-a-day medication with no times and no duration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dosage: String::new(),
            frequency: 1,
            frequency_type: FrequencyType::Daily,
            times: Vec::new(),
            duration_days: None,
            instructions: String::new(),
        }
    }

    /// Number of days the course runs for; zero when scheduling is disabled.
    pub fn course_days(&self) -> u32 {
        match self.duration_days {
            Some(d) if d > 0 => d as u32,
            _ => 0,
        }
    }

    /// Replace, remove and add dose times in one step.
    ///
    /// Indices in `set` and `remove` refer to `times` as it is before the
    /// call. The result is normalized once at the end. On error nothing
    /// changes.
    pub fn edit_times(
        &mut self,
        set: &[(usize, String)],
        remove: &[usize],
        add: &[String],
    ) -> anyhow::Result<()> {
        let mut times: Vec<Option<String>> = self.times.iter().cloned().map(Some).collect();
        for (index, time) in set {
            let t: TimeOfDay = time.parse()?;
            let Some(slot) = times.get_mut(*index) else {
                anyhow::bail!("no time at index {index} for {}", self.name);
            };
            *slot = Some(t.to_string());
        }
        for &index in remove {
            let Some(slot) = times.get_mut(index) else {
                anyhow::bail!("no time at index {index} for {}", self.name);
            };
            *slot = None;
        }
        let mut times: Vec<String> = times.into_iter().flatten().collect();
        for time in add {
            times.push(time.parse::<TimeOfDay>()?.to_string());
        }
        self.times = times;
        self.normalize_times();
        Ok(())
    }

    pub fn set_duration_days(&mut self, days: Option<i32>) {
        self.duration_days = days;
    }

    /// True for daily medications whose time count disagrees with `frequency`.
    pub fn frequency_mismatch(&self) -> bool {
        self.frequency_type == FrequencyType::Daily && self.times.len() != self.frequency as usize
    }

    /// Canonicalize parseable times to `HH:MM`, then sort and dedup.
    /// Unparseable entries are kept verbatim so the scheduler can report them.
    pub(crate) fn normalize_times(&mut self) {
        for t in self.times.iter_mut() {
            if let Ok(parsed) = t.parse::<TimeOfDay>() {
                *t = parsed.to_string();
            }
        }
        self.times.sort();
        self.times.dedup();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
