pub mod app;
pub mod config;
pub mod device;
pub mod init;
pub mod preview;
pub mod rx;
pub mod session;
