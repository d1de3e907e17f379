use anyhow::Result;
use serde_json::json;
use std::path::Path;

use medtime::core::import::parse_medications;
use medtime::core::scheduler::{schedule_preview, total_reminder_count};
use medtime::output;

use super::app::read_input;

pub fn run(file: &Path, human: bool) -> Result<()> {
    let medications = parse_medications(&read_input(file)?)?;
    let total = total_reminder_count(&medications);
    let lines = schedule_preview(&medications);

    if human {
        for line in &lines {
            println!("{line}");
        }
        println!("{total} reminder(s) in total");
    } else {
        let out = output::success(
            "preview",
            json!({
                "medications": medications,
                "total_reminders": total,
                "schedule": lines,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}
