use crate::locale::MessageCatalog;
use crate::models::{NotificationEvent, Severity};
use std::process::{Command, Stdio};

/// Exit status used for every fatal condition.
pub const FATAL_EXIT_CODE: u8 = 1;

/// Surface for talking to the user.
pub trait UserPrompt {
    /// Show a message and block until the user acknowledges it.
    fn alert(&self, title: &str, message: &str, severity: Severity);

    /// Show informational text, such as usage, and wait for acknowledgement.
    fn show_text(&self, title: &str, text: &str);

    /// Open a URL in the default browser.
    fn open_url(&self, url: &str) -> Result<(), String>;
}

/// Native message boxes via `rfd`, links via the platform opener.
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopPrompt;

impl UserPrompt for DesktopPrompt {
    fn alert(&self, title: &str, message: &str, severity: Severity) {
        let level = match severity {
            Severity::Warning => rfd::MessageLevel::Warning,
            Severity::Error => rfd::MessageLevel::Error,
        };

        rfd::MessageDialog::new()
            .set_level(level)
            .set_title(title)
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }

    fn show_text(&self, title: &str, text: &str) {
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Info)
            .set_title(title)
            .set_description(text)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }

    fn open_url(&self, url: &str) -> Result<(), String> {
        open_url_with_system_browser(url)
    }
}

/// Program and leading arguments that hand a URL to the desktop's default handler.
#[cfg(target_os = "windows")]
const URL_OPENER: Option<(&str, &[&str])> = Some(("rundll32", &["url.dll,FileProtocolHandler"]));
#[cfg(target_os = "macos")]
const URL_OPENER: Option<(&str, &[&str])> = Some(("open", &[]));
#[cfg(all(unix, not(target_os = "macos")))]
const URL_OPENER: Option<(&str, &[&str])> = Some(("xdg-open", &[]));
#[cfg(not(any(target_os = "macos", target_os = "windows", unix)))]
const URL_OPENER: Option<(&str, &[&str])> = None;

fn open_url_with_system_browser(url: &str) -> Result<(), String> {
    let Some((program, leading)) = URL_OPENER else {
        return Err("Opening external URLs is not supported on this platform.".to_string());
    };

    Command::new(program)
        .args(leading)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|error| format!("Failed to run '{program}': {error}"))
}

/// What the caller should do after a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Stop and exit the process with this status
    Exit(u8),
}

/// Logs, shows and optionally links every notification.
///
/// The log line is always written before the dialog is shown, so the log contains
/// everything the user saw.
pub struct Notifier {
    prompt: Box<dyn UserPrompt>,
    catalog: &'static MessageCatalog,
}

impl Notifier {
    pub fn new(prompt: Box<dyn UserPrompt>, catalog: &'static MessageCatalog) -> Self {
        Self { prompt, catalog }
    }

    pub fn catalog(&self) -> &'static MessageCatalog {
        self.catalog
    }

    pub fn notify(&self, event: &NotificationEvent) -> Flow {
        let title = match event.severity() {
            Severity::Error => {
                tracing::error!("{}", event.message);
                self.catalog.error_title
            }
            Severity::Warning => {
                tracing::warn!("{}", event.message);
                self.catalog.warning_title
            }
        };

        self.prompt.alert(title, &event.message, event.severity());

        if event.offer_documentation_link {
            let url = self.catalog.documentation_url;
            tracing::info!("Opening documentation: {}", url);
            if let Err(e) = self.prompt.open_url(url) {
                tracing::warn!("Failed to open {}: {}", url, e);
            }
        }

        if event.fatal {
            tracing::error!("Exiting with status {}", FATAL_EXIT_CODE);
            Flow::Exit(FATAL_EXIT_CODE)
        } else {
            Flow::Continue
        }
    }
}
