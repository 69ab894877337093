/// A single report to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub message: String,
    /// Open the localized documentation page after the user acknowledges
    pub offer_documentation_link: bool,
    /// Terminate the launcher with exit status 1 afterwards
    pub fatal: bool,
}

impl NotificationEvent {
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offer_documentation_link: false,
            fatal: true,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offer_documentation_link: false,
            fatal: false,
        }
    }

    pub fn with_documentation_link(mut self) -> Self {
        self.offer_documentation_link = true;
        self
    }

    pub fn severity(&self) -> Severity {
        if self.fatal {
            Severity::Error
        } else {
            Severity::Warning
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}
