use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use medtime::core::delivery::DeliveryHandler;
use medtime::core::scheduler::ReminderScheduler;
use medtime::core::session::SessionContext;
use medtime::core::worker::ReminderWorker;
use medtime::db::Database;
use medtime::models::config::Config;
use medtime::platform::NotificationSink;
use medtime::platform::device::DeviceAlarms;

/// What every command needs: configuration, the database and the session.
pub struct App {
    pub config: Config,
    pub db: Database,
    pub session: SessionContext,
}

impl App {
    pub fn open() -> Result<Self> {
        let config = Config::load()?;
        let db = Database::open(&Config::db_path())?;
        let session = SessionContext::load(&Config::session_path())?;
        Ok(Self {
            config,
            db,
            session,
        })
    }

    /// The device alarm registry, on its own connection.
    pub fn alarms(&self) -> Result<DeviceAlarms> {
        DeviceAlarms::open(&Config::db_path(), self.config.reminders.exact_alarms)
    }

    pub fn scheduler(&self) -> Result<ReminderScheduler<DeviceAlarms>> {
        Ok(ReminderScheduler::new(
            self.alarms()?,
            self.config.reminders.strategy,
        ))
    }

    /// A background worker with its own alarm and store connections.
    pub fn worker(&self) -> Result<ReminderWorker<DeviceAlarms, Database>> {
        let store = Database::open(&Config::db_path())?;
        Ok(ReminderWorker::spawn(self.scheduler()?, store))
    }

    pub fn delivery<'a, N: NotificationSink>(&self, sink: &'a N) -> DeliveryHandler<'a, N> {
        DeliveryHandler::new(sink, self.config.channel.to_notification_channel())
    }
}

/// Read a file, or stdin when `path` is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
    }
}
