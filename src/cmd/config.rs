use anyhow::Result;
use serde_json::json;

use medtime::models::config::Config;
use medtime::output;

pub fn run_show(human: bool) -> Result<()> {
    let config = Config::load()?;
    if human {
        let toml_str = toml::to_string_pretty(&config)?;
        println!("{}", toml_str);
    } else {
        let out = output::success("config", json!({ "config": config }));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;

    match key {
        "reminders.strategy" => config.reminders.strategy = value.parse()?,
        "reminders.exact_alarms" => {
            config.reminders.exact_alarms = value
                .parse()
                .map_err(|_| anyhow::anyhow!("reminders.exact_alarms must be true or false"))?;
        }
        "reminders.default_mode" => config.reminders.default_mode = value.parse()?,
        "channel.id" => config.channel.id = value.to_string(),
        "channel.name" => config.channel.name = value.to_string(),
        "channel.description" => config.channel.description = value.to_string(),
        "logging.filter" => config.logging.filter = value.to_string(),
        _ => anyhow::bail!("unknown config key: {}", key),
    }

    config.save()?;
    let out = output::success("config", json!({ "key": key, "value": value }));
    println!("{}", serde_json::to_string(&out)?);
    Ok(())
}
