use anyhow::Result;
use rusqlite::Connection;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS prescriptions (
            id                TEXT PRIMARY KEY,
            user_id           TEXT NOT NULL,
            medications       TEXT NOT NULL,
            model_used        TEXT NOT NULL DEFAULT '',
            notification_mode TEXT NOT NULL DEFAULT 'alarm',
            strategy          TEXT NOT NULL DEFAULT 'course',
            status            TEXT NOT NULL DEFAULT 'active',
            created_at        TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_prescriptions_user ON prescriptions(user_id, status);

        CREATE TABLE IF NOT EXISTS alarms (
            id          INTEGER PRIMARY KEY,
            trigger_at  TEXT NOT NULL,
            precision   TEXT NOT NULL,
            repeat      TEXT NOT NULL,
            payload     TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_alarms_trigger ON alarms(trigger_at);

        CREATE TABLE IF NOT EXISTS notification_channels (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            description TEXT NOT NULL,
            importance  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS notifications (
            seq         INTEGER PRIMARY KEY AUTOINCREMENT,
            id          INTEGER NOT NULL,
            channel_id  TEXT NOT NULL,
            posted_at   TEXT NOT NULL,
            body        TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_notifications_id ON notifications(id);",
    )?;
    Ok(())
}
