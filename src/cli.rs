use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "medtime", version, about = "Medication reminder scheduler")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as human-readable text instead of JSON
    #[arg(long = "human", short = 'H', global = true)]
    pub human: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create config, database and notification channel
    Init,

    /// Sign in as a user
    Login {
        /// User id from the authentication backend
        uid: String,

        #[arg(long)]
        email: Option<String>,

        /// Display name
        #[arg(long)]
        name: Option<String>,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Manage prescriptions
    Rx {
        #[command(subcommand)]
        action: RxAction,
    },

    /// Show what a medication list would schedule, without saving
    Preview {
        /// Extraction JSON file, or "-" for stdin
        file: PathBuf,
    },

    /// List registered alarms
    Alarms,

    /// Fire every alarm that is due
    Deliver {
        /// Pretend the current time is this RFC 3339 instant
        #[arg(long)]
        at: Option<String>,
    },

    /// List posted notifications
    Notifications {
        /// Number of most recent notifications to show
        #[arg(long)]
        last: Option<u32>,
    },

    /// Simulate a device restart and restore reminders
    Boot,

    /// Report whether exact alarms are available
    Permissions,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum RxAction {
    /// Save a prescription from extraction output and schedule its reminders
    Add {
        /// Extraction JSON file, or "-" for stdin
        file: PathBuf,

        /// Notification mode (push, alarm)
        #[arg(long)]
        mode: Option<String>,

        /// Name of the model that produced the extraction
        #[arg(long, default_value = "manual")]
        model: String,
    },

    /// List your prescriptions
    List {
        /// Include paused prescriptions
        #[arg(long)]
        all: bool,
    },

    /// Show one prescription
    Show { id: String },

    /// Delete a prescription and cancel its reminders
    Delete {
        id: String,

        /// Required to confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// Cancel and re-register a prescription's reminders
    Reschedule { id: String },

    /// Stop reminders for a prescription
    Pause { id: String },

    /// Restart reminders for a paused prescription
    Resume { id: String },

    /// Edit one medication and update its reminders
    Edit {
        id: String,

        /// Medication number, starting at 1
        #[arg(long)]
        med: usize,

        /// Add a dose time (HH:MM)
        #[arg(long = "add-time")]
        add_time: Vec<String>,

        /// Remove the dose time at this index (0-based)
        #[arg(long = "remove-time")]
        remove_time: Vec<usize>,

        /// Replace a dose time, as INDEX=HH:MM
        #[arg(long = "set-time")]
        set_time: Vec<String>,

        /// Course length in days
        #[arg(long, allow_negative_numbers = true)]
        duration: Option<i32>,

        #[arg(long)]
        dosage: Option<String>,

        #[arg(long)]
        instructions: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set a config value
    Set {
        /// Config key (e.g. reminders.strategy, reminders.exact_alarms)
        key: String,
        /// Config value
        value: String,
    },
}
