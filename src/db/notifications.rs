use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::core::delivery::{Importance, Notification, NotificationChannel};

use super::Database;

/// A notification as recorded in the tray, with the time it was posted.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PostedNotification {
    pub posted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub notification: Notification,
}

impl Database {
    pub fn upsert_channel(&self, channel: &NotificationChannel) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO notification_channels (id, name, description, importance)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                channel.id,
                channel.name,
                channel.description,
                channel.importance.to_string(),
            ],
        )?;
        Ok(())
    }

    pub fn get_channel(&self, id: &str) -> Result<Option<NotificationChannel>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, importance FROM notification_channels WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;
        match rows.next() {
            Some(row) => {
                let (id, name, description, importance) = row?;
                let mut channel = NotificationChannel::new(&id, &name, &description);
                channel.importance = importance.parse().unwrap_or(Importance::High);
                Ok(Some(channel))
            }
            None => Ok(None),
        }
    }

    /// Record a posted notification. A notification with the same id
    /// replaces the previous one, as in a real tray.
    pub fn insert_notification(&self, n: &Notification, posted_at: DateTime<Utc>) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM notifications WHERE id = ?1", params![n.id])?;
        tx.execute(
            "INSERT INTO notifications (id, channel_id, posted_at, body) VALUES (?1, ?2, ?3, ?4)",
            params![n.id, n.channel_id, posted_at.to_rfc3339(), serde_json::to_string(n)?],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Most recently posted notifications first.
    pub fn list_notifications(&self, limit: Option<u32>) -> Result<Vec<PostedNotification>> {
        let limit = limit.map(i64::from).unwrap_or(-1);
        let mut stmt = self.conn.prepare(
            "SELECT posted_at, body FROM notifications ORDER BY seq DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (posted_at, body) = row?;
            out.push(PostedNotification {
                posted_at: DateTime::parse_from_rfc3339(&posted_at)?.with_timezone(&Utc),
                notification: serde_json::from_str(&body)?,
            });
        }
        Ok(out)
    }
}
