use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::platform::{AlarmRequest, Precision, Repeat, ReminderPayload};

use super::Database;

struct AlarmRow {
    id: i32,
    trigger_at: String,
    precision: String,
    repeat: String,
    payload: String,
}

fn row_to_alarm(r: AlarmRow) -> Result<AlarmRequest> {
    let trigger_at: DateTime<Utc> =
        DateTime::parse_from_rfc3339(&r.trigger_at)?.with_timezone(&Utc);
    let precision = match r.precision.as_str() {
        "exact" => Precision::Exact,
        _ => Precision::Inexact,
    };
    let repeat = match r.repeat.as_str() {
        "daily" => Repeat::Daily,
        _ => Repeat::Once,
    };
    let payload: ReminderPayload = serde_json::from_str(&r.payload)?;
    Ok(AlarmRequest {
        id: r.id,
        trigger_at,
        precision,
        repeat,
        payload,
    })
}

macro_rules! map_row {
    ($row:expr) => {
        Ok(AlarmRow {
            id: $row.get(0)?,
            trigger_at: $row.get(1)?,
            precision: $row.get(2)?,
            repeat: $row.get(3)?,
            payload: $row.get(4)?,
        })
    };
}

impl Database {
    /// Insert or replace the alarm with `alarm.id`.
    pub fn upsert_alarm(&self, alarm: &AlarmRequest) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO alarms (id, trigger_at, precision, repeat, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                alarm.id,
                alarm.trigger_at.to_rfc3339(),
                alarm.precision.to_string(),
                alarm.repeat.to_string(),
                serde_json::to_string(&alarm.payload)?,
            ],
        )?;
        Ok(())
    }

    pub fn delete_alarm(&self, id: i32) -> Result<bool> {
        let count = self
            .conn
            .execute("DELETE FROM alarms WHERE id = ?1", params![id])?;
        Ok(count > 0)
    }

    /// All alarms ordered by trigger time.
    pub fn list_alarms(&self) -> Result<Vec<AlarmRequest>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, trigger_at, precision, repeat, payload FROM alarms ORDER BY trigger_at, id",
        )?;
        let rows = stmt.query_map([], |row| map_row!(row))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row_to_alarm(row?)?);
        }
        Ok(out)
    }

    /// Alarms whose trigger time is at or before `now`.
    pub fn due_alarms(&self, now: DateTime<Utc>) -> Result<Vec<AlarmRequest>> {
        Ok(self
            .list_alarms()?
            .into_iter()
            .filter(|a| a.trigger_at <= now)
            .collect())
    }

    pub fn clear_alarms(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM alarms", [])?)
    }
}
