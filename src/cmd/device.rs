use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::json;

use medtime::core::delivery::deliver_due;
use medtime::output;
use medtime::output::human;
use medtime::platform::AlarmClock;
use medtime::platform::device::DeviceNotifier;

use super::app::App;

pub fn run_alarms(human: bool) -> Result<()> {
    let app = App::open()?;
    let alarms = app.alarms()?.pending()?;

    if human {
        println!("{}", human::format_alarms(&alarms));
    } else {
        let out = output::success("alarms", json!({ "count": alarms.len(), "alarms": alarms }));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_deliver(at: Option<&str>, human: bool) -> Result<()> {
    let now = match at {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("invalid --at {s:?}, expected RFC 3339"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };
    let app = App::open()?;
    let clock = app.alarms()?;
    let notifier = DeviceNotifier::new(&app.db);
    let handler = app.delivery(&notifier);
    let report = deliver_due(&clock, &handler, now)?;

    if human {
        if report.delivered.is_empty() {
            println!("Nothing due");
        }
        for n in &report.delivered {
            println!("{}", n.title);
        }
        if report.failed > 0 {
            eprintln!("{} notification(s) could not be posted", report.failed);
        }
    } else {
        let out = output::success(
            "deliver",
            json!({
                "at": now.to_rfc3339(),
                "delivered": report.delivered,
                "failed": report.failed,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_notifications(last: Option<u32>, human: bool) -> Result<()> {
    let app = App::open()?;
    let posted = app.db.list_notifications(last)?;

    if human {
        println!("{}", human::format_notifications(&posted));
    } else {
        let out = output::success(
            "notifications",
            json!({ "count": posted.len(), "notifications": posted }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

/// Forget every alarm, as a reboot does, then restore them.
pub fn run_boot(human: bool) -> Result<()> {
    let app = App::open()?;
    let cleared = app.alarms()?.clear()?;

    let notifier = DeviceNotifier::new(&app.db);
    app.delivery(&notifier).ensure_channel()?;

    let worker = app.worker()?;
    let outcome = worker.recover(&app.session).wait()?;

    if human {
        println!("Cleared {cleared} alarm(s)");
        println!("{}", human::format_recovery(&outcome));
    } else {
        let out = output::success("boot", json!({ "cleared": cleared, "recovery": outcome }));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_permissions(human: bool) -> Result<()> {
    let app = App::open()?;
    let exact = app.scheduler()?.can_schedule_exact_reminders();

    if human {
        if exact {
            println!("Exact alarms: granted");
        } else {
            println!("Exact alarms: not granted (reminders will be inexact)");
        }
    } else {
        let out = output::success("permissions", json!({ "exact_alarms": exact }));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}
