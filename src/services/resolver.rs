use crate::config::{APPLICATION_SECTION, ConfigDocument, ConfigError, LauncherLayout, VERSION_KEY};
use crate::models::LaunchTarget;
use camino::{Utf8Path, Utf8PathBuf};
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Specified executable not found: {0}")]
    NotFound(Utf8PathBuf),
}

/// Directory containing the running launcher binary.
///
/// Falls back to the current working directory when the executable path cannot be
/// determined or is not UTF-8, and to `.` when even that fails.
pub fn bootstrap_root() -> Utf8PathBuf {
    let from_exe = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
        .and_then(|dir| Utf8PathBuf::try_from(dir).ok());

    if let Some(dir) = from_exe {
        return dir;
    }

    tracing::warn!("Could not determine launcher location, using working directory");
    env::current_dir()
        .ok()
        .and_then(|dir| Utf8PathBuf::try_from(dir).ok())
        .unwrap_or_else(|| Utf8PathBuf::from("."))
}

/// Compute where the configured version should live, without touching the filesystem.
pub fn locate(
    root: &Utf8Path,
    config: &ConfigDocument,
    layout: &LauncherLayout,
) -> Result<LaunchTarget, ConfigError> {
    let version = config.require(APPLICATION_SECTION, VERSION_KEY)?;

    let working_directory = root.join(layout.app_dir_name(version));
    let executable_path = working_directory.join(layout.executable_name());

    Ok(LaunchTarget {
        installation_root: root.to_path_buf(),
        working_directory,
        executable_path,
        version: version.to_string(),
    })
}

/// Find the versioned application below `root`.
///
/// The version string is used verbatim as a path segment. The only verification is that
/// the executable exists.
pub fn resolve(
    root: &Utf8Path,
    config: &ConfigDocument,
    layout: &LauncherLayout,
) -> Result<LaunchTarget, ResolveError> {
    let target = locate(root, config, layout)?;

    if !target.executable_path.is_file() {
        tracing::error!("Executable not found: {}", target.executable_path);
        return Err(ResolveError::NotFound(target.executable_path));
    }

    tracing::info!(
        "Resolved version {} at {}",
        target.version,
        target.executable_path
    );
    Ok(target)
}
