mod cli;
mod cmd;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, ConfigAction, RxAction};
use std::process;

use medtime::models::config::Config;
use medtime::models::prescription::PrescriptionStatus;
use medtime::output;

fn command_name(c: &Commands) -> &'static str {
    match c {
        Commands::Init => "init",
        Commands::Login { .. } => "login",
        Commands::Logout => "logout",
        Commands::Whoami => "whoami",
        Commands::Rx { action } => match action {
            RxAction::Add { .. } => "rx_add",
            RxAction::List { .. } => "rx_list",
            RxAction::Show { .. } => "rx_show",
            RxAction::Delete { .. } => "rx_delete",
            RxAction::Reschedule { .. } => "rx_reschedule",
            RxAction::Pause { .. } => "rx_pause",
            RxAction::Resume { .. } => "rx_resume",
            RxAction::Edit { .. } => "rx_edit",
        },
        Commands::Preview { .. } => "preview",
        Commands::Alarms => "alarms",
        Commands::Deliver { .. } => "deliver",
        Commands::Notifications { .. } => "notifications",
        Commands::Boot => "boot",
        Commands::Permissions => "permissions",
        Commands::Config { .. } => "config",
        Commands::Completions { .. } => "completions",
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = Config::load()
        .map(|c| c.logging.filter)
        .unwrap_or_else(|_| medtime::models::config::default_log_filter());
    medtime::telemetry::init(&filter);

    let name = command_name(&cli.command);
    let human = cli.human;

    let result = match cli.command {
        Commands::Init => cmd::init::run(human),
        Commands::Login { uid, email, name } => {
            cmd::session::run_login(&uid, email.as_deref(), name.as_deref(), human)
        }
        Commands::Logout => cmd::session::run_logout(human),
        Commands::Whoami => cmd::session::run_whoami(human),
        Commands::Rx { action } => match action {
            RxAction::Add { file, mode, model } => {
                cmd::rx::run_add(&file, mode.as_deref(), &model, human)
            }
            RxAction::List { all } => cmd::rx::run_list(all, human),
            RxAction::Show { id } => cmd::rx::run_show(&id, human),
            RxAction::Delete { id, yes } => cmd::rx::run_delete(&id, yes, human),
            RxAction::Reschedule { id } => cmd::rx::run_reschedule(&id, human),
            RxAction::Pause { id } => {
                cmd::rx::run_status(&id, PrescriptionStatus::Inactive, human)
            }
            RxAction::Resume { id } => cmd::rx::run_status(&id, PrescriptionStatus::Active, human),
            RxAction::Edit {
                id,
                med,
                add_time,
                remove_time,
                set_time,
                duration,
                dosage,
                instructions,
            } => cmd::rx::run_edit(
                &id,
                cmd::rx::EditArgs {
                    med,
                    add_time: &add_time,
                    remove_time: &remove_time,
                    set_time: &set_time,
                    duration,
                    dosage: dosage.as_deref(),
                    instructions: instructions.as_deref(),
                },
                human,
            ),
        },
        Commands::Preview { file } => cmd::preview::run(&file, human),
        Commands::Alarms => cmd::device::run_alarms(human),
        Commands::Deliver { at } => cmd::device::run_deliver(at.as_deref(), human),
        Commands::Notifications { last } => cmd::device::run_notifications(last, human),
        Commands::Boot => cmd::device::run_boot(human),
        Commands::Permissions => cmd::device::run_permissions(human),
        Commands::Config { action } => match action {
            ConfigAction::Show => cmd::config::run_show(human),
            ConfigAction::Set { key, value } => cmd::config::run_set(&key, &value),
        },
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "medtime", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        let err = output::error(name, "general_error", &format!("{e:#}"));
        match serde_json::to_string(&err) {
            Ok(s) => eprintln!("{s}"),
            Err(_) => eprintln!("{e:#}"),
        }
        process::exit(1);
    }
}
