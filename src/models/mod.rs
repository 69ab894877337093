//! Value types shared by the launcher's services.
//!
//! - [`LaunchTarget`]: where the application lives, produced by the path resolver
//! - [`LaunchOptions`]: console visibility, elevation and extra arguments for the child
//! - [`LaunchFlags`]: the launcher's own command line flags
//! - [`NotificationEvent`]: one message for the user, possibly fatal
//!
//! All of these are built once per launch and never mutated afterwards.

pub mod launch;
pub mod notification;

pub use launch::{
    ConsoleMode, JUST_UPDATED_ARG, JUST_UPDATED_DELAY, LaunchFlags, LaunchMode, LaunchOptions,
    LaunchTarget,
};
pub use notification::{NotificationEvent, Severity};
