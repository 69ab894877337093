//! The launch sequence.
//!
//! [`Bootstrapper::launch`] runs the steps in a fixed order and stops at the first structural
//! problem:
//!
//! 1. Optional startup delay (see [`LaunchFlags::effective_delay`])
//! 2. Read `<product>.ini`, resolve the versioned executable
//! 3. Read the user's preferences and build [`LaunchOptions`]
//! 4. Check the .NET runtimes; a failure only warns
//! 5. Spawn the application and return without waiting for it
//!
//! [`Bootstrapper::run`] turns any [`LaunchError`] into a fatal notification and an exit
//! status. Nothing here is global: all inputs live in [`BootstrapContext`].

use crate::config::{ConfigDocument, ConfigError, LauncherLayout, UserPreferences};
use crate::locale::MessageCatalog;
use crate::models::{LaunchFlags, LaunchOptions, LaunchTarget, NotificationEvent};
use crate::services::{
    Flow, Notifier, PrerequisiteChecker, PrerequisiteReport, ResolveError, SpawnError,
    SpawnRequest, Spawner, bootstrap_root, resolve,
};
use camino::Utf8PathBuf;
use thiserror::Error;

/// Inputs of one launch attempt, fixed at startup.
#[derive(Debug, Clone)]
pub struct BootstrapContext {
    /// Directory holding the ini file and the versioned install directories
    pub root: Utf8PathBuf,
    pub layout: LauncherLayout,
    pub preferences_path: Option<Utf8PathBuf>,
    pub flags: LaunchFlags,
}

impl BootstrapContext {
    /// Context for the running launcher binary with the default layout.
    pub fn discover(flags: LaunchFlags) -> Self {
        let layout = LauncherLayout::default();
        Self {
            root: bootstrap_root(),
            preferences_path: layout.preferences_path(),
            layout,
            flags,
        }
    }
}

/// Conditions that stop the launch
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Specified executable not found: {0}")]
    ExecutableNotFound(Utf8PathBuf),

    #[error("Failed to start application: {0}")]
    Spawn(#[from] SpawnError),
}

impl From<ResolveError> for LaunchError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::Config(e) => LaunchError::Config(e),
            ResolveError::NotFound(path) => LaunchError::ExecutableNotFound(path),
        }
    }
}

impl LaunchError {
    /// Localized text for the error dialog.
    pub fn user_message(&self, catalog: &MessageCatalog) -> String {
        match self {
            LaunchError::Config(ConfigError::Unreadable { path, .. })
            | LaunchError::Config(ConfigError::Undecodable { path, .. }) => {
                catalog.config_unreadable(path.as_str())
            }
            LaunchError::Config(ConfigError::Decode { .. }) => catalog.config_unreadable("?"),
            LaunchError::Config(ConfigError::MissingSection(section)) => {
                catalog.missing_section(section)
            }
            LaunchError::Config(ConfigError::MissingKey { section, key }) => {
                catalog.missing_key(section, key)
            }
            LaunchError::ExecutableNotFound(path) => catalog.executable_not_found(path.as_str()),
            LaunchError::Spawn(e) => catalog.spawn_failed(e.code, &e.message),
        }
    }
}

/// Result of a successful launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub target: LaunchTarget,
    pub options: LaunchOptions,
    pub pid: Option<u32>,
}

pub struct Bootstrapper {
    context: BootstrapContext,
    checker: PrerequisiteChecker,
    spawner: Box<dyn Spawner>,
    notifier: Notifier,
}

impl Bootstrapper {
    pub fn new(
        context: BootstrapContext,
        checker: PrerequisiteChecker,
        spawner: Box<dyn Spawner>,
        notifier: Notifier,
    ) -> Self {
        Self {
            context,
            checker,
            spawner,
            notifier,
        }
    }

    /// Launch and map the result to a process exit status.
    pub async fn run(&self) -> u8 {
        match self.launch().await {
            Ok(_) => 0,
            Err(e) => {
                tracing::error!("Launch failed: {}", e);
                let message = e.user_message(self.notifier.catalog());
                match self.notifier.notify(&NotificationEvent::fatal(message)) {
                    Flow::Exit(code) => code,
                    Flow::Continue => crate::services::FATAL_EXIT_CODE,
                }
            }
        }
    }

    pub async fn launch(&self) -> Result<LaunchOutcome, LaunchError> {
        let delay = self.context.flags.effective_delay();
        if !delay.is_zero() {
            tracing::info!("Waiting {:?} before launch", delay);
            tokio::time::sleep(delay).await;
        }

        let ini_path = self.context.layout.ini_path(&self.context.root);
        let config = ConfigDocument::load(&ini_path)?;
        let target = resolve(&self.context.root, &config, &self.context.layout)?;

        let preferences = UserPreferences::load(self.context.preferences_path.as_deref());
        let options = LaunchOptions::from_sources(&config, &preferences, &self.context.flags);
        tracing::info!(
            "Launch options: console={}, elevated={}, args={:?}",
            options.show_console,
            options.run_elevated,
            options.extra_args
        );

        let report = self.checker.check().await;
        self.warn_about_prerequisites(&report);

        let request = SpawnRequest::new(&target, &options);
        let spawned = self.spawner.spawn(&request)?;

        tracing::info!(
            "Launched version {} successfully (pid {:?})",
            target.version,
            spawned.pid
        );

        Ok(LaunchOutcome {
            target,
            options,
            pid: spawned.pid,
        })
    }

    /// Warn (never stop) when the runtimes look missing.
    fn warn_about_prerequisites(&self, report: &PrerequisiteReport) {
        let catalog = self.notifier.catalog();
        let message = match report {
            PrerequisiteReport::Satisfied => return,
            PrerequisiteReport::Missing(missing) => catalog.missing_runtimes(missing),
            PrerequisiteReport::ToolingUnavailable { reason } => {
                tracing::warn!("Runtime tool unavailable: {}", reason);
                catalog.tooling_unavailable.to_string()
            }
        };

        let event = NotificationEvent::warning(message).with_documentation_link();
        if let Flow::Exit(code) = self.notifier.notify(&event) {
            tracing::warn!("Ignoring exit request {} for a non-fatal notification", code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::catalog_for;

    #[test]
    fn test_user_messages() {
        let catalog = catalog_for("en-US");

        let missing = LaunchError::from(ConfigError::MissingSection("Application".to_string()));
        assert!(missing.user_message(catalog).contains("'Application'"));

        let not_found = LaunchError::from(ResolveError::NotFound(Utf8PathBuf::from(
            "/opt/app/App-1/App.exe",
        )));
        assert!(matches!(not_found, LaunchError::ExecutableNotFound(_)));
        assert!(not_found.user_message(catalog).contains("/opt/app/App-1/App.exe"));

        let spawn = LaunchError::from(SpawnError {
            code: Some(740),
            message: "The requested operation requires elevation.".to_string(),
        });
        let text = spawn.user_message(catalog);
        assert!(text.contains("740"));
        assert!(text.contains("requires elevation"));
    }

    #[test]
    fn test_discover_uses_default_layout() {
        let context = BootstrapContext::discover(LaunchFlags::default());
        assert_eq!(context.layout, LauncherLayout::default());
        assert!(context.root.is_dir());
    }
}
