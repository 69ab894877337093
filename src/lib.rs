// LumiTracker launcher - starts the installed version of the tracker
//
// This is the library crate containing the launch sequence and its building blocks.
// The binary crate (main.rs) wires them to the real process, dialogs and log file.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod locale;
pub mod logging;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use bootstrap::{BootstrapContext, Bootstrapper, LaunchError, LaunchOutcome};
pub use config::{ConfigDocument, ConfigError, LauncherLayout, UserPreferences};
pub use models::{LaunchFlags, LaunchOptions, LaunchTarget, NotificationEvent};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
