use anyhow::Result;
use serde_json::json;

use medtime::models::config::Config;
use medtime::output;
use medtime::platform::device::DeviceNotifier;

use super::app::App;

pub fn run(human: bool) -> Result<()> {
    let config = Config::load().unwrap_or_default();
    config.save()?;

    let app = App::open()?;
    let notifier = DeviceNotifier::new(&app.db);
    let created = app.delivery(&notifier).ensure_channel()?;

    if human {
        println!("Config initialized at {}", Config::path().display());
        if created {
            println!("Created notification channel '{}'", config.channel.name);
        }
    } else {
        let out = output::success(
            "init",
            json!({
                "message": "Config initialized",
                "config_path": Config::path(),
                "db_path": Config::db_path(),
                "channel": config.channel.id,
                "channel_created": created,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}
