use camino::Utf8Path;
use serde::Deserialize;
use std::fs;

/// The subset of the application's `config.json` the launcher cares about.
///
/// The file belongs to the launched application; any other keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub run_as_admin: bool,
}

impl UserPreferences {
    /// Load preferences, falling back to defaults on any problem.
    ///
    /// A missing file is normal (the application has never saved settings) and is only
    /// logged at debug level. Read and parse failures are logged as warnings.
    pub fn load(path: Option<&Utf8Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No documents directory, using default preferences");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!("Preference file {} not found, using defaults", path);
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("Failed to read preference file {}: {}", path, e);
                return Self::default();
            }
        };

        Self::parse(&contents).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse preference file {}: {}", path, e);
            Self::default()
        })
    }

    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }
}
