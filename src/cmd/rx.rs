use anyhow::{Result, bail};
use serde_json::json;
use std::path::Path;

use medtime::core::import::parse_medications;
use medtime::core::prescription::{self, MedicationEdit};
use medtime::models::prescription::{NotificationMode, PrescriptionStatus};
use medtime::output;
use medtime::output::human;
use medtime::platform::device::DeviceNotifier;

use super::app::{App, read_input};

pub fn run_add(file: &Path, mode: Option<&str>, model: &str, human: bool) -> Result<()> {
    let app = App::open()?;
    let mode: NotificationMode = match mode {
        Some(m) => m.parse()?,
        None => app.config.reminders.default_mode,
    };
    let medications = parse_medications(&read_input(file)?)?;

    let notifier = DeviceNotifier::new(&app.db);
    app.delivery(&notifier).ensure_channel()?;

    let worker = app.worker()?;
    let saved =
        prescription::save_prescription(&app.db, &worker, &app.session, medications, model, mode)?;

    if human {
        println!("Saved prescription {}", saved.prescription.id);
        println!("{}", human::format_schedule_report(&saved.reminders));
        for w in &saved.warnings {
            eprintln!("Warning: {w}");
        }
    } else {
        let out = output::success("rx_add", json!(saved));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_list(all: bool, human: bool) -> Result<()> {
    let app = App::open()?;
    let list = prescription::list_prescriptions(&app.db, &app.session, all)?;

    if human {
        println!("{}", human::format_prescription_list(&list));
    } else {
        let out = output::success(
            "rx_list",
            json!({ "count": list.len(), "prescriptions": list }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_show(id: &str, human: bool) -> Result<()> {
    let app = App::open()?;
    let p = prescription::get_prescription(&app.db, id)?;

    if human {
        println!("{}", human::format_prescription(&p));
    } else {
        let out = output::success("rx_show", json!({ "prescription": p }));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_delete(id: &str, yes: bool, human: bool) -> Result<()> {
    if !yes {
        bail!("refusing to delete {id} without --yes");
    }
    let app = App::open()?;
    let worker = app.worker()?;
    let cancelled = prescription::delete_prescription(&app.db, &worker, id)?;

    if human {
        println!("Deleted {id}; {}", human::format_cancel_report(&cancelled));
    } else {
        let out = output::success("rx_delete", json!({ "id": id, "cancelled": cancelled }));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_reschedule(id: &str, human: bool) -> Result<()> {
    let app = App::open()?;
    let worker = app.worker()?;
    let report = prescription::reschedule_prescription(&app.db, &worker, id)?;

    if human {
        println!("{}", human::format_cancel_report(&report.cancelled));
        println!("{}", human::format_schedule_report(&report.scheduled));
    } else {
        let out = output::success("rx_reschedule", json!({ "id": id, "report": report }));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_status(id: &str, status: PrescriptionStatus, human: bool) -> Result<()> {
    let app = App::open()?;
    let worker = app.worker()?;
    let change = prescription::set_status(&app.db, &worker, id, status)?;
    let command = match status {
        PrescriptionStatus::Active => "rx_resume",
        PrescriptionStatus::Inactive => "rx_pause",
    };

    if human {
        if !change.changed {
            println!("{id} is already {status}");
        }
        if let Some(c) = &change.cancelled {
            println!("Paused {id}; {}", human::format_cancel_report(c));
        }
        if let Some(s) = &change.scheduled {
            println!("Resumed {id}; {}", human::format_schedule_report(s));
        }
    } else {
        let out = output::success(command, json!(change));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

/// Parse `INDEX=HH:MM`.
fn parse_set_time(raw: &str) -> Result<(usize, String)> {
    let Some((index, time)) = raw.split_once('=') else {
        bail!("expected INDEX=HH:MM, got {raw:?}");
    };
    let index: usize = index
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid time index in {raw:?}"))?;
    Ok((index, time.trim().to_string()))
}

pub struct EditArgs<'a> {
    pub med: usize,
    pub add_time: &'a [String],
    pub remove_time: &'a [usize],
    pub set_time: &'a [String],
    pub duration: Option<i32>,
    pub dosage: Option<&'a str>,
    pub instructions: Option<&'a str>,
}

pub fn run_edit(id: &str, args: EditArgs<'_>, human: bool) -> Result<()> {
    let edit = MedicationEdit {
        add_times: args.add_time.to_vec(),
        remove_times: args.remove_time.to_vec(),
        set_times: args
            .set_time
            .iter()
            .map(|s| parse_set_time(s))
            .collect::<Result<_>>()?,
        duration_days: args.duration,
        dosage: args.dosage.map(String::from),
        instructions: args.instructions.map(String::from),
    };

    let app = App::open()?;
    let worker = app.worker()?;
    let edited = prescription::edit_medication(&app.db, &worker, id, args.med, &edit)?;

    if human {
        println!("{}", human::format_prescription(&edited.prescription));
        if let Some(r) = &edited.reminders {
            println!("\n{}", human::format_schedule_report(&r.scheduled));
        }
    } else {
        let out = output::success("rx_edit", json!(edited));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_time_argument() {
        assert_eq!(parse_set_time("1=08:30").unwrap(), (1, "08:30".to_string()));
        assert_eq!(parse_set_time(" 0 = 9:00 ").unwrap(), (0, "9:00".to_string()));
        assert!(parse_set_time("08:30").is_err());
        assert!(parse_set_time("x=08:30").is_err());
    }
}
