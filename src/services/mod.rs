//! Services module - the steps of a launch.
//!
//! Each service does one thing and takes its inputs explicitly; [`crate::bootstrap`] wires
//! them together.
//!
//! # Components
//!
//! - [`resolver`]: finds the launcher's own directory and the versioned application below it
//! - [`prerequisite`]: runs `dotnet --list-runtimes` and checks for the .NET 8 runtimes
//! - [`spawner`]: creates the application process, plain or elevated, with or without console
//! - [`notifier`]: logs and shows messages to the user, optionally opening a download page
//! - [`handle`]: scoped release of raw OS handles
//!
//! # Launch sequence
//!
//! 1. Wait if the updater just restarted us
//! 2. Read `<product>.ini` and resolve `<app>-<version>/<app>.exe`
//! 3. Check the runtimes (warn only)
//! 4. Spawn the application and exit without waiting for it

pub mod handle;
pub mod notifier;
pub mod prerequisite;
pub mod resolver;
pub mod spawner;

pub use notifier::{DesktopPrompt, FATAL_EXIT_CODE, Flow, Notifier, UserPrompt};
pub use prerequisite::{PrerequisiteChecker, PrerequisiteReport, RuntimeComponent};
pub use resolver::{ResolveError, bootstrap_root, locate, resolve};
pub use spawner::{
    SpawnError, SpawnRequest, SpawnedProcess, Spawner, SystemSpawner, os_error_code,
};
