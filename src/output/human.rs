use colored::Colorize;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};

use crate::core::recovery::RecoveryOutcome;
use crate::core::scheduler::{CancelReport, ScheduleReport};
use crate::db::notifications::PostedNotification;
use crate::models::prescription::{PrescriptionStatus, SavedPrescription};
use crate::platform::AlarmRequest;

fn table() -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    t
}

fn status_label(status: PrescriptionStatus) -> String {
    match status {
        PrescriptionStatus::Active => "active".green().to_string(),
        PrescriptionStatus::Inactive => "paused".yellow().to_string(),
    }
}

/// One row per prescription.
pub fn format_prescription_list(prescriptions: &[SavedPrescription]) -> String {
    if prescriptions.is_empty() {
        return "No prescriptions.".to_string();
    }
    let mut t = table();
    t.set_header(vec!["ID", "Created", "Medications", "Mode", "Status"]);
    for p in prescriptions {
        let names: Vec<&str> = p.medications.iter().map(|m| m.name.as_str()).collect();
        t.add_row(vec![
            p.id.clone(),
            p.created_at.format("%Y-%m-%d %H:%M").to_string(),
            names.join(", "),
            p.notification_mode.to_string(),
            status_label(p.status),
        ]);
    }
    t.to_string()
}

/// A prescription with each medication on its own numbered block.
pub fn format_prescription(p: &SavedPrescription) -> String {
    let mut out = format!(
        "{} ({}, {} via {}, {} reminders)\nsaved {}\n",
        p.id.bold(),
        status_label(p.status),
        p.notification_mode,
        p.model_used,
        p.strategy,
        p.created_at.format("%Y-%m-%d %H:%M"),
    );
    for (i, m) in p.medications.iter().enumerate() {
        let duration = match m.duration_days {
            Some(d) if d > 0 => format!("{d} days"),
            _ => "no duration (not scheduled)".dimmed().to_string(),
        };
        out.push_str(&format!("\n{}. {}", i + 1, m.name.bold()));
        if !m.dosage.is_empty() {
            out.push_str(&format!(" {}", m.dosage));
        }
        out.push_str(&format!(
            "\n   {} x {}  at {}  for {}",
            m.frequency,
            m.frequency_type,
            if m.times.is_empty() {
                "-".to_string()
            } else {
                m.times.join(", ")
            },
            duration
        ));
        if !m.instructions.is_empty() {
            out.push_str(&format!("\n   {}", m.instructions.italic()));
        }
    }
    out
}

pub fn format_schedule_report(r: &ScheduleReport) -> String {
    let mut line = format!("{} reminder(s) scheduled", r.scheduled);
    if r.inexact > 0 {
        line.push_str(&format!(" ({} inexact)", r.inexact));
    }
    let skipped = r.skipped_past + r.skipped_invalid;
    if skipped > 0 {
        line.push_str(&format!(
            ", {} skipped ({} past, {} invalid time)",
            skipped, r.skipped_past, r.skipped_invalid
        ));
    }
    if r.skipped_medications > 0 {
        line.push_str(&format!(
            ", {} medication(s) without duration",
            r.skipped_medications
        ));
    }
    if r.failed > 0 {
        line.push_str(&format!(", {}", format!("{} failed", r.failed).red()));
    }
    line
}

pub fn format_cancel_report(r: &CancelReport) -> String {
    let mut line = format!("{} reminder(s) cancelled", r.withdrawn);
    if r.failed > 0 {
        line.push_str(&format!(", {}", format!("{} failed", r.failed).red()));
    }
    line
}

pub fn format_recovery(outcome: &RecoveryOutcome) -> String {
    match outcome {
        RecoveryOutcome::NoUser => "Nobody signed in; no reminders restored.".to_string(),
        RecoveryOutcome::StoreUnavailable { reason } => {
            format!("{} {}", "Could not load prescriptions:".red(), reason)
        }
        RecoveryOutcome::Rescheduled {
            prescriptions,
            report,
        } => format!(
            "Restored {} prescription(s): {}",
            prescriptions,
            format_schedule_report(report)
        ),
    }
}

pub fn format_alarms(alarms: &[AlarmRequest]) -> String {
    if alarms.is_empty() {
        return "No alarms registered.".to_string();
    }
    let mut t = table();
    t.set_header(vec!["ID", "Fires at (local)", "Medication", "Precision", "Repeat"]);
    for a in alarms {
        t.add_row(vec![
            a.id.to_string(),
            a.trigger_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            a.payload.medication_name.clone(),
            a.precision.to_string(),
            a.repeat.to_string(),
        ]);
    }
    t.to_string()
}

pub fn format_notifications(posted: &[PostedNotification]) -> String {
    if posted.is_empty() {
        return "No notifications.".to_string();
    }
    let mut out = Vec::with_capacity(posted.len());
    for p in posted {
        let n = &p.notification;
        let mut line = format!(
            "{} {}",
            p.posted_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .dimmed(),
            n.title.bold()
        );
        if !n.text.is_empty() {
            line.push_str(&format!("\n  {}", n.text));
        }
        out.push(line);
    }
    out.join("\n")
}
