pub mod config;
pub mod entry;
pub mod error;
pub mod format;
pub mod hooks;
pub mod scheduler;
pub mod session;
pub mod sound;
pub mod timer;
pub mod ui;
