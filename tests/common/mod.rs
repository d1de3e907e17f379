#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use medtime::core::recovery::{PrescriptionStore, StoreError};
use medtime::db::Database;
use medtime::models::med::Medication;
use medtime::models::prescription::{NotificationMode, SavedPrescription};
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a temporary database for testing.
pub fn setup_db() -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("test.db");
    let db = Database::open(&db_path).unwrap();
    (dir, db)
}

/// A medication with the given dose times and course length.
pub fn make_med(name: &str, times: &[&str], days: Option<i32>) -> Medication {
    let mut m = Medication::new(name);
    m.dosage = "500mg".to_string();
    m.instructions = "after meals".to_string();
    m.times = times.iter().map(|t| t.to_string()).collect();
    m.duration_days = days;
    m
}

pub fn amoxicillin() -> Medication {
    make_med("Amoxicillin", &["09:00", "21:00"], Some(3))
}

pub fn make_prescription(user_id: &str, medications: Vec<Medication>) -> SavedPrescription {
    SavedPrescription::new(user_id, medications, "test-model", NotificationMode::Alarm)
}

/// 2026-03-10 at `h:m` UTC.
pub fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, h, m, 0).unwrap()
}

/// Prescription store held in memory, optionally failing every read.
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<Vec<SavedPrescription>>,
    pub offline: bool,
}

impl MemoryStore {
    pub fn with(items: Vec<SavedPrescription>) -> Self {
        Self {
            items: Mutex::new(items),
            offline: false,
        }
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable("network unreachable".into()));
        }
        Ok(())
    }
}

impl PrescriptionStore for MemoryStore {
    fn active_prescriptions(&self, user_id: &str) -> Result<Vec<SavedPrescription>, StoreError> {
        Ok(self
            .list(user_id)?
            .into_iter()
            .filter(|p| p.is_active())
            .collect())
    }

    fn list(&self, user_id: &str) -> Result<Vec<SavedPrescription>, StoreError> {
        self.check()?;
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    fn get(&self, prescription_id: &str) -> Result<SavedPrescription, StoreError> {
        self.check()?;
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == prescription_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(prescription_id.to_string()))
    }

    fn save(&self, prescription: &SavedPrescription) -> Result<String, StoreError> {
        self.check()?;
        self.items.lock().unwrap().push(prescription.clone());
        Ok(prescription.id.clone())
    }

    fn update(&self, prescription: &SavedPrescription) -> Result<bool, StoreError> {
        self.check()?;
        let mut items = self.items.lock().unwrap();
        match items.iter_mut().find(|p| p.id == prescription.id) {
            Some(slot) => {
                *slot = prescription.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, prescription_id: &str) -> Result<bool, StoreError> {
        self.check()?;
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|p| p.id != prescription_id);
        Ok(items.len() != before)
    }
}
