//! Configuration sources for the launcher.
//!
//! - [`ConfigDocument`]: the `<product>.ini` file next to the launcher, which names the
//!   installed application version and whether it wants a console window
//! - [`UserPreferences`]: the application's own JSON settings, from which the launcher only
//!   reads `run_as_admin`
//! - [`LauncherLayout`]: how file and directory names are derived from the product name

pub mod ini;
pub mod preferences;

pub use ini::{ConfigDocument, Section};
pub use preferences::UserPreferences;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Section of the ini file describing the installed application.
pub const APPLICATION_SECTION: &str = "Application";

/// Installed version, used verbatim as part of the install directory name.
pub const VERSION_KEY: &str = "Version";

/// `1` asks for a visible console window.
pub const CONSOLE_KEY: &str = "Console";

/// Errors raised while reading the ini file or extracting required values from it
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Unreadable {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config content is not valid UTF-8 (valid up to byte {valid_up_to})")]
    Decode { valid_up_to: usize },

    #[error("Config file {path} is not valid UTF-8 (valid up to byte {valid_up_to})")]
    Undecodable {
        path: Utf8PathBuf,
        valid_up_to: usize,
    },

    #[error("No '{0}' section found in the config file")]
    MissingSection(String),

    #[error("No '{key}' specified in the '{section}' section")]
    MissingKey { section: String, key: String },
}

/// Naming scheme of an installation.
///
/// ```text
/// <root>/<product>.ini
/// <root>/<app_name>-<version>/<app_name>[.exe]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherLayout {
    pub product: String,
    pub app_name: String,
}

impl LauncherLayout {
    pub fn new(product: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            app_name: app_name.into(),
        }
    }

    pub fn ini_path(&self, root: &Utf8Path) -> Utf8PathBuf {
        root.join(format!("{}.ini", self.product))
    }

    pub fn app_dir_name(&self, version: &str) -> String {
        format!("{}-{}", self.app_name, version)
    }

    pub fn executable_name(&self) -> String {
        format!("{}{}", self.app_name, std::env::consts::EXE_SUFFIX)
    }

    pub fn log_file_name(&self) -> String {
        format!("{}Launcher.log", self.product)
    }

    /// `<Documents>/<product>/config/config.json`, if the platform has a documents folder.
    pub fn preferences_path(&self) -> Option<Utf8PathBuf> {
        let documents = dirs::document_dir()?;
        let documents = Utf8PathBuf::try_from(documents).ok()?;
        Some(documents.join(&self.product).join("config").join("config.json"))
    }
}

impl Default for LauncherLayout {
    fn default() -> Self {
        Self::new("LumiTracker", "LumiTrackerApp")
    }
}
