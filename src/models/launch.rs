use crate::config::{APPLICATION_SECTION, CONSOLE_KEY, ConfigDocument, UserPreferences};
use camino::Utf8PathBuf;
use std::time::Duration;

/// Delay used after an update when no explicit `--delay` was given.
///
/// Gives the updater that just restarted us time to exit and release its file locks.
pub const JUST_UPDATED_DELAY: Duration = Duration::from_millis(1500);

/// Argument passed to the application after an update.
pub const JUST_UPDATED_ARG: &str = "just_updated";

/// Resolved location of the application to launch.
///
/// `executable_path` is always `working_directory/<executable name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTarget {
    pub installation_root: Utf8PathBuf,
    pub working_directory: Utf8PathBuf,
    pub executable_path: Utf8PathBuf,
    pub version: String,
}

/// Flags given to the launcher itself on its command line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LaunchFlags {
    pub just_updated: bool,
    /// Seconds to wait before doing anything
    pub delay_secs: f64,
}

impl LaunchFlags {
    /// An explicit delay wins; `just_updated` alone implies [`JUST_UPDATED_DELAY`].
    pub fn effective_delay(&self) -> Duration {
        let secs = if self.delay_secs.is_finite() && self.delay_secs > 0.0 {
            self.delay_secs
        } else {
            0.0
        };

        if secs == 0.0 {
            if self.just_updated {
                JUST_UPDATED_DELAY
            } else {
                Duration::ZERO
            }
        } else {
            Duration::from_secs_f64(secs)
        }
    }
}

/// How the child process is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Inherit the launcher's privileges
    Plain,
    /// Ask the OS for administrator rights
    Elevated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleMode {
    /// New, visible console window
    Visible,
    /// No console, hidden window
    Hidden,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    pub show_console: bool,
    pub run_elevated: bool,
    pub extra_args: Vec<String>,
}

impl LaunchOptions {
    /// Combine the ini file, the user's preferences and the launcher flags.
    pub fn from_sources(
        config: &ConfigDocument,
        preferences: &UserPreferences,
        flags: &LaunchFlags,
    ) -> Self {
        let show_console = config.get(APPLICATION_SECTION, CONSOLE_KEY) == Some("1");

        let mut extra_args = Vec::new();
        if flags.just_updated {
            extra_args.push(JUST_UPDATED_ARG.to_string());
        }

        Self {
            show_console,
            run_elevated: preferences.run_as_admin,
            extra_args,
        }
    }

    pub fn mode(&self) -> LaunchMode {
        if self.run_elevated {
            LaunchMode::Elevated
        } else {
            LaunchMode::Plain
        }
    }

    pub fn console(&self) -> ConsoleMode {
        if self.show_console {
            ConsoleMode::Visible
        } else {
            ConsoleMode::Hidden
        }
    }
}
