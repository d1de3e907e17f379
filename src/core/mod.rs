pub mod delivery;
pub mod identity;
pub mod import;
pub mod prescription;
pub mod recovery;
pub mod scheduler;
pub mod session;
pub mod time;
pub mod worker;
