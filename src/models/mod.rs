pub mod config;
pub mod med;
pub mod prescription;
pub mod user;

pub use med::{FrequencyType, Medication};
pub use prescription::{NotificationMode, PrescriptionStatus, SavedPrescription};
pub use user::User;
