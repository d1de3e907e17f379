//! Turning a fired alarm into a visible notification.
//!
//! The handler only renders and posts. It never schedules, cancels or
//! reads the prescription store; everything it shows comes from the
//! payload attached when the alarm was registered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::platform::{AlarmClock, NotificationSink, PlatformError, ReminderPayload};

const FALLBACK_NAME: &str = "Medication";
const VIBRATION_PATTERN: [u64; 4] = [0, 500, 200, 500];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Low,
    Default,
    High,
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Default => write!(f, "default"),
            Self::High => write!(f, "high"),
        }
    }
}

impl FromStr for Importance {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "default" => Ok(Self::Default),
            "high" => Ok(Self::High),
            other => Err(anyhow::anyhow!("unknown importance: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub importance: Importance,
    pub vibration: bool,
    pub lights: bool,
    pub show_badge: bool,
}

impl NotificationChannel {
    /// A high-importance channel with vibration, lights and badge enabled.
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            importance: Importance::High,
            vibration: true,
            lights: true,
            show_badge: true,
        }
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new(
            "medication_reminders",
            "Medication Reminders",
            "Notifications for medication reminders",
        )
    }
}

/// What happens when the user taps the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TapAction {
    OpenMainEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i32,
    pub channel_id: String,
    pub prescription_id: String,
    pub title: String,
    pub text: String,
    pub expanded_text: String,
    pub high_priority: bool,
    pub category: String,
    pub auto_cancel: bool,
    pub vibration_pattern: Vec<u64>,
    pub tap_action: TapAction,
}

/// Render the notification for `payload` on `channel_id`.
pub fn render(payload: &ReminderPayload, channel_id: &str) -> Notification {
    let name = match payload.medication_name.trim() {
        "" => FALLBACK_NAME,
        n => n,
    };
    let dosage = payload.dosage.trim();
    let instructions = payload.instructions.trim();

    let text = match (dosage.is_empty(), instructions.is_empty()) {
        (false, false) => format!("{dosage} - {instructions}"),
        (false, true) => dosage.to_string(),
        (true, false) => instructions.to_string(),
        (true, true) => String::new(),
    };

    Notification {
        id: payload.id,
        channel_id: channel_id.to_string(),
        prescription_id: payload.prescription_id.clone(),
        title: format!("It's time for your medicine {name}"),
        text,
        expanded_text: format!("Dosage: {dosage}\nInstructions: {instructions}"),
        high_priority: true,
        category: "reminder".to_string(),
        auto_cancel: true,
        vibration_pattern: VIBRATION_PATTERN.to_vec(),
        tap_action: TapAction::OpenMainEntry,
    }
}

pub struct DeliveryHandler<'a, N: NotificationSink + ?Sized> {
    sink: &'a N,
    channel: NotificationChannel,
}

impl<'a, N: NotificationSink + ?Sized> DeliveryHandler<'a, N> {
    pub fn new(sink: &'a N, channel: NotificationChannel) -> Self {
        Self { sink, channel }
    }

    pub fn channel(&self) -> &NotificationChannel {
        &self.channel
    }

    /// Create the channel if the sink does not know it yet. Returns whether
    /// it was created.
    pub fn ensure_channel(&self) -> Result<bool, PlatformError> {
        if self.sink.has_channel(&self.channel.id) {
            return Ok(false);
        }
        self.sink.create_channel(&self.channel)?;
        debug!(channel = %self.channel.id, "created notification channel");
        Ok(true)
    }

    /// Show the reminder described by `payload`.
    pub fn handle(&self, payload: &ReminderPayload) -> Result<Notification, PlatformError> {
        self.ensure_channel()?;
        let notification = render(payload, &self.channel.id);
        self.sink.post(&notification)?;
        info!(
            reminder_id = payload.id,
            medication = %payload.medication_name,
            "posted medication reminder"
        );
        Ok(notification)
    }
}

#[derive(Debug, Default, Serialize)]
pub struct DeliveryReport {
    pub delivered: Vec<Notification>,
    pub failed: usize,
}

/// Fire every alarm due at `now` through `handler`. A failed post is
/// logged and counted; the remaining alarms are still delivered.
pub fn deliver_due<C, N>(
    clock: &C,
    handler: &DeliveryHandler<'_, N>,
    now: DateTime<Utc>,
) -> Result<DeliveryReport, PlatformError>
where
    C: AlarmClock + ?Sized,
    N: NotificationSink + ?Sized,
{
    let due = clock.take_due(now)?;
    let mut report = DeliveryReport::default();
    for alarm in &due {
        match handler.handle(&alarm.payload) {
            Ok(n) => report.delivered.push(n),
            Err(e) => {
                warn!(reminder_id = alarm.id, error = %e, "failed to post reminder");
                report.failed += 1;
            }
        }
    }
    Ok(report)
}
