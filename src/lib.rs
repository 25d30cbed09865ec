//! claude-notifier: notification preferences and the interactive terminal
//! menu used to edit them.

pub mod config;
pub mod doctor;
pub mod hooks;
pub mod logging;
pub mod platform;
pub mod settings;
pub mod tui;
pub mod types;
