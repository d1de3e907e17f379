//! Medication reminder scheduling engine.
//!
//! Turns a prescription's medications into deterministic, cancellable
//! alarms, renders them as notifications when they fire, and restores them
//! after a restart. The `platform` traits abstract the device; `db` backs
//! both the prescription store and a simulated device for the CLI.

pub mod core;
pub mod db;
pub mod models;
pub mod output;
pub mod platform;
pub mod telemetry;
