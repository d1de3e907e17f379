use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::core::recovery::{PrescriptionStore, StoreError};
use crate::core::scheduler::ScheduleStrategy;
use crate::models::med::Medication;
use crate::models::prescription::{NotificationMode, PrescriptionStatus, SavedPrescription};

use super::Database;

struct PrescriptionRow {
    id: String,
    user_id: String,
    medications: String,
    model_used: String,
    notification_mode: String,
    strategy: String,
    status: String,
    created_at: String,
}

fn row_to_prescription(r: PrescriptionRow) -> Result<SavedPrescription> {
    let medications: Vec<Medication> = serde_json::from_str(&r.medications)?;
    let notification_mode: NotificationMode = r.notification_mode.parse()?;
    let strategy: ScheduleStrategy = r.strategy.parse()?;
    let status: PrescriptionStatus = r.status.parse()?;
    let created_at: DateTime<Utc> =
        DateTime::parse_from_rfc3339(&r.created_at)?.with_timezone(&Utc);

    Ok(SavedPrescription {
        id: r.id,
        user_id: r.user_id,
        medications,
        model_used: r.model_used,
        notification_mode,
        strategy,
        status,
        created_at,
    })
}

const SELECT_COLS: &str =
    "id, user_id, medications, model_used, notification_mode, strategy, status, created_at";

macro_rules! map_row {
    ($row:expr) => {
        Ok(PrescriptionRow {
            id: $row.get(0)?,
            user_id: $row.get(1)?,
            medications: $row.get(2)?,
            model_used: $row.get(3)?,
            notification_mode: $row.get(4)?,
            strategy: $row.get(5)?,
            status: $row.get(6)?,
            created_at: $row.get(7)?,
        })
    };
}

impl Database {
    pub fn insert_prescription(&self, p: &SavedPrescription) -> Result<()> {
        self.conn.execute(
            "INSERT INTO prescriptions
                (id, user_id, medications, model_used, notification_mode, strategy, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                p.id,
                p.user_id,
                serde_json::to_string(&p.medications)?,
                p.model_used,
                p.notification_mode.to_string(),
                p.strategy.to_string(),
                p.status.to_string(),
                p.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_prescription(&self, id: &str) -> Result<Option<SavedPrescription>> {
        let sql = format!("SELECT {SELECT_COLS} FROM prescriptions WHERE id = ?1");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![id], |row| map_row!(row))?;
        match rows.next() {
            Some(row) => Ok(Some(row_to_prescription(row?)?)),
            None => Ok(None),
        }
    }

    /// A user's prescriptions, newest first.
    pub fn list_prescriptions(
        &self,
        user_id: &str,
        include_inactive: bool,
    ) -> Result<Vec<SavedPrescription>> {
        let sql = if include_inactive {
            format!(
                "SELECT {SELECT_COLS} FROM prescriptions WHERE user_id = ?1
                 ORDER BY created_at DESC"
            )
        } else {
            format!(
                "SELECT {SELECT_COLS} FROM prescriptions WHERE user_id = ?1 AND status = 'active'
                 ORDER BY created_at DESC"
            )
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], |row| map_row!(row))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row_to_prescription(row?)?);
        }
        Ok(out)
    }

    pub fn set_prescription_status(&self, id: &str, status: PrescriptionStatus) -> Result<bool> {
        let count = self.conn.execute(
            "UPDATE prescriptions SET status = ?1 WHERE id = ?2",
            params![status.to_string(), id],
        )?;
        Ok(count > 0)
    }

    pub fn delete_prescription(&self, id: &str) -> Result<bool> {
        let count = self
            .conn
            .execute("DELETE FROM prescriptions WHERE id = ?1", params![id])?;
        Ok(count > 0)
    }
}

fn unavailable(e: anyhow::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

impl PrescriptionStore for Database {
    fn active_prescriptions(&self, user_id: &str) -> Result<Vec<SavedPrescription>, StoreError> {
        self.list_prescriptions(user_id, false).map_err(unavailable)
    }

    fn list(&self, user_id: &str) -> Result<Vec<SavedPrescription>, StoreError> {
        self.list_prescriptions(user_id, true).map_err(unavailable)
    }

    fn get(&self, prescription_id: &str) -> Result<SavedPrescription, StoreError> {
        self.get_prescription(prescription_id)
            .map_err(unavailable)?
            .ok_or_else(|| StoreError::NotFound(prescription_id.to_string()))
    }

    fn save(&self, prescription: &SavedPrescription) -> Result<String, StoreError> {
        self.insert_prescription(prescription).map_err(unavailable)?;
        Ok(prescription.id.clone())
    }

    fn update(&self, prescription: &SavedPrescription) -> Result<bool, StoreError> {
        let json = serde_json::to_string(&prescription.medications)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let count = self
            .conn
            .execute(
                "UPDATE prescriptions SET medications = ?1, status = ?2 WHERE id = ?3",
                params![json, prescription.status.to_string(), prescription.id],
            )
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(count > 0)
    }

    fn delete(&self, prescription_id: &str) -> Result<bool, StoreError> {
        self.delete_prescription(prescription_id).map_err(unavailable)
    }
}
