use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{AlarmClock, AlarmPlatform, AlarmRequest, NotificationSink, PlatformError, Precision};
use crate::core::delivery::{Notification, NotificationChannel};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Alarm registry held in process memory.
///
/// `exact_reported` is what the app is told when it asks; `exact_granted` is
/// what registration actually enforces. They differ when the user revokes
/// the permission between the two calls.
#[derive(Debug)]
pub struct MemoryAlarms {
    registry: Mutex<BTreeMap<i32, AlarmRequest>>,
    exact_reported: bool,
    exact_granted: bool,
    failing: HashSet<i32>,
    registrations: Mutex<usize>,
}

impl Default for MemoryAlarms {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAlarms {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(BTreeMap::new()),
            exact_reported: true,
            exact_granted: true,
            failing: HashSet::new(),
            registrations: Mutex::new(0),
        }
    }

    /// Grant or deny exact alarms, consistently for the check and registration.
    pub fn with_exact_permission(mut self, granted: bool) -> Self {
        self.exact_reported = granted;
        self.exact_granted = granted;
        self
    }

    /// Report exact alarms as available but refuse them at registration.
    pub fn with_revoked_exact_permission(mut self) -> Self {
        self.exact_reported = true;
        self.exact_granted = false;
        self
    }

    /// Make registration of `id` fail with `Unavailable`.
    pub fn failing_on(mut self, id: i32) -> Self {
        self.failing.insert(id);
        self
    }

    pub fn get(&self, id: i32) -> Option<AlarmRequest> {
        lock(&self.registry).get(&id).cloned()
    }

    pub fn ids(&self) -> Vec<i32> {
        lock(&self.registry).keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.registry).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total successful `register` calls, including replacements.
    pub fn registration_count(&self) -> usize {
        *lock(&self.registrations)
    }
}

impl AlarmPlatform for MemoryAlarms {
    fn can_schedule_exact(&self) -> bool {
        self.exact_reported
    }

    fn register(&self, request: &AlarmRequest) -> Result<(), PlatformError> {
        if self.failing.contains(&request.id) {
            return Err(PlatformError::Unavailable(format!(
                "registration of {} rejected",
                request.id
            )));
        }
        if request.precision == Precision::Exact && !self.exact_granted {
            return Err(PlatformError::ExactNotPermitted);
        }
        lock(&self.registry).insert(request.id, request.clone());
        *lock(&self.registrations) += 1;
        Ok(())
    }

    fn withdraw(&self, id: i32) -> Result<bool, PlatformError> {
        Ok(lock(&self.registry).remove(&id).is_some())
    }
}

impl AlarmClock for MemoryAlarms {
    fn take_due(&self, now: DateTime<Utc>) -> Result<Vec<AlarmRequest>, PlatformError> {
        let mut registry = lock(&self.registry);
        let due_ids: Vec<i32> = registry
            .values()
            .filter(|a| a.trigger_at <= now)
            .map(|a| a.id)
            .collect();

        let mut due = Vec::with_capacity(due_ids.len());
        for id in due_ids {
            let Some(alarm) = registry.remove(&id) else {
                continue;
            };
            if let Some(next) = alarm.next_after(now) {
                let mut rearmed = alarm.clone();
                rearmed.trigger_at = next;
                registry.insert(id, rearmed);
            }
            due.push(alarm);
        }
        due.sort_by_key(|a| (a.trigger_at, a.id));
        Ok(due)
    }

    fn pending(&self) -> Result<Vec<AlarmRequest>, PlatformError> {
        let mut all: Vec<AlarmRequest> = lock(&self.registry).values().cloned().collect();
        all.sort_by_key(|a| (a.trigger_at, a.id));
        Ok(all)
    }

    fn clear(&self) -> Result<usize, PlatformError> {
        let mut registry = lock(&self.registry);
        let n = registry.len();
        registry.clear();
        Ok(n)
    }
}

/// Notification tray held in process memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    channels: Mutex<Vec<NotificationChannel>>,
    posted: Mutex<Vec<Notification>>,
    disabled: bool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tray where the user has turned notifications off.
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    pub fn channels(&self) -> Vec<NotificationChannel> {
        lock(&self.channels).clone()
    }

    pub fn posted(&self) -> Vec<Notification> {
        lock(&self.posted).clone()
    }
}

impl NotificationSink for MemoryNotifier {
    fn has_channel(&self, channel_id: &str) -> bool {
        lock(&self.channels).iter().any(|c| c.id == channel_id)
    }

    fn create_channel(&self, channel: &NotificationChannel) -> Result<(), PlatformError> {
        let mut channels = lock(&self.channels);
        channels.retain(|c| c.id != channel.id);
        channels.push(channel.clone());
        Ok(())
    }

    fn post(&self, notification: &Notification) -> Result<(), PlatformError> {
        if self.disabled {
            return Err(PlatformError::Unavailable("notifications are disabled".into()));
        }
        let mut posted = lock(&self.posted);
        // Same id replaces the notification already in the tray.
        posted.retain(|n| n.id != notification.id);
        posted.push(notification.clone());
        Ok(())
    }
}
