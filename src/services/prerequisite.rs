use regex::RegexSet;
use std::collections::BTreeSet;
use std::fmt;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Default upper bound for the diagnostic command.
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(15);

/// Runtime components the application needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuntimeComponent {
    /// `Microsoft.NETCore.App 8.x`
    Core,
    /// `Microsoft.WindowsDesktop.App 8.x`
    Desktop,
}

impl RuntimeComponent {
    pub const ALL: [RuntimeComponent; 2] = [RuntimeComponent::Core, RuntimeComponent::Desktop];

    /// Text the runtime listing contains when the component is installed.
    pub fn marker(self) -> &'static str {
        match self {
            RuntimeComponent::Core => "Microsoft.NETCore.App 8.",
            RuntimeComponent::Desktop => "Microsoft.WindowsDesktop.App 8.",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            RuntimeComponent::Core => ".NET Runtime 8",
            RuntimeComponent::Desktop => ".NET Desktop Runtime 8",
        }
    }
}

impl fmt::Display for RuntimeComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Outcome of one prerequisite check. Never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrerequisiteReport {
    Satisfied,
    /// The listing ran but lacks these components (never empty)
    Missing(BTreeSet<RuntimeComponent>),
    /// The diagnostic command could not be run at all
    ToolingUnavailable { reason: String },
}

/// Runs `<tool> --list-runtimes` and checks its output for the required runtimes.
///
/// Only the output text matters. The exit status is ignored because some versions of the
/// tool exit non-zero while still printing the installed runtimes.
pub struct PrerequisiteChecker {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    markers: RegexSet,
}

impl PrerequisiteChecker {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let markers = RegexSet::new(
            RuntimeComponent::ALL
                .iter()
                .map(|c| regex::escape(c.marker())),
        )
        .expect("escaped literals always compile");

        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: DEFAULT_CHECK_TIMEOUT,
            markers,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the diagnostic command and evaluate its combined output.
    pub async fn check(&self) -> PrerequisiteReport {
        tracing::info!("Checking prerequisites: {} {}", self.program, self.args.join(" "));

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        cmd.creation_flags(windows::Win32::System::Threading::CREATE_NO_WINDOW.0);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!("Failed to start {}: {}", self.program, e);
                return PrerequisiteReport::ToolingUnavailable {
                    reason: e.to_string(),
                };
            }
        };

        // On timeout the future is dropped, which kills the child
        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::warn!("Failed to read output of {}: {}", self.program, e);
                return PrerequisiteReport::ToolingUnavailable {
                    reason: e.to_string(),
                };
            }
            Err(_) => {
                tracing::warn!("{} timed out after {:?}", self.program, self.timeout);
                return PrerequisiteReport::ToolingUnavailable {
                    reason: format!("timed out after {:?}", self.timeout),
                };
            }
        };

        tracing::debug!(
            "{} exited with {:?} ({} bytes stdout, {} bytes stderr)",
            self.program,
            output.status.code(),
            output.stdout.len(),
            output.stderr.len()
        );

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        if !combined.is_empty() && !combined.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        let report = self.evaluate(&combined);
        tracing::info!("Prerequisite check result: {:?}", report);
        report
    }

    /// Scan a runtime listing line by line for the required components.
    pub fn evaluate(&self, listing: &str) -> PrerequisiteReport {
        let mut found = BTreeSet::new();
        for line in listing.lines() {
            for index in self.markers.matches(line).iter() {
                found.insert(RuntimeComponent::ALL[index]);
            }
            if found.len() == RuntimeComponent::ALL.len() {
                return PrerequisiteReport::Satisfied;
            }
        }

        let missing: BTreeSet<_> = RuntimeComponent::ALL
            .into_iter()
            .filter(|c| !found.contains(c))
            .collect();
        if missing.is_empty() {
            PrerequisiteReport::Satisfied
        } else {
            PrerequisiteReport::Missing(missing)
        }
    }
}

impl Default for PrerequisiteChecker {
    fn default() -> Self {
        Self::new("dotnet", ["--list-runtimes"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORE: &str = "Microsoft.NETCore.App 8.0.11 [C:\\Program Files\\dotnet\\shared\\Microsoft.NETCore.App]";
    const DESKTOP: &str = "Microsoft.WindowsDesktop.App 8.0.11 [C:\\Program Files\\dotnet\\shared\\Microsoft.WindowsDesktop.App]";

    fn missing(components: &[RuntimeComponent]) -> PrerequisiteReport {
        PrerequisiteReport::Missing(components.iter().copied().collect())
    }

    #[test]
    fn test_both_present_any_order() {
        let checker = PrerequisiteChecker::default();

        let forward = format!("{}\n{}\n", CORE, DESKTOP);
        let backward = format!("Microsoft.AspNetCore.App 8.0.11 [x]\r\n{}\r\n{}\r\n", DESKTOP, CORE);

        assert_eq!(checker.evaluate(&forward), PrerequisiteReport::Satisfied);
        assert_eq!(checker.evaluate(&backward), PrerequisiteReport::Satisfied);
    }

    #[test]
    fn test_only_one_present() {
        let checker = PrerequisiteChecker::default();

        assert_eq!(checker.evaluate(CORE), missing(&[RuntimeComponent::Desktop]));
        assert_eq!(checker.evaluate(DESKTOP), missing(&[RuntimeComponent::Core]));
    }

    #[test]
    fn test_neither_present() {
        let checker = PrerequisiteChecker::default();
        let listing = "Microsoft.NETCore.App 6.0.36 [x]\nMicrosoft.WindowsDesktop.App 7.0.20 [x]\n";

        assert_eq!(
            checker.evaluate(listing),
            missing(&[RuntimeComponent::Core, RuntimeComponent::Desktop])
        );
        assert_eq!(
            checker.evaluate(""),
            missing(&[RuntimeComponent::Core, RuntimeComponent::Desktop])
        );
    }

    #[test]
    fn test_marker_is_literal() {
        let checker = PrerequisiteChecker::default();
        // '.' must not match any character
        let listing = "MicrosoftXNETCoreXApp 8.0.1\nMicrosoft.WindowsDesktop.App 8X0\n";

        assert_eq!(
            checker.evaluate(listing),
            missing(&[RuntimeComponent::Core, RuntimeComponent::Desktop])
        );
    }

    #[test]
    fn test_major_version_must_be_eight() {
        let checker = PrerequisiteChecker::default();
        let listing = "Microsoft.NETCore.App 18.0.0 [x]\nMicrosoft.WindowsDesktop.App 8.0.4 [x]\n";

        assert_eq!(checker.evaluate(listing), missing(&[RuntimeComponent::Core]));
    }

    #[tokio::test]
    async fn test_missing_tool_is_distinct_from_missing_runtimes() {
        let checker = PrerequisiteChecker::new("lumi-launcher-no-such-tool", ["--list-runtimes"]);

        let report = checker.check().await;
        assert!(matches!(report, PrerequisiteReport::ToolingUnavailable { .. }));
        assert_ne!(
            report,
            missing(&[RuntimeComponent::Core, RuntimeComponent::Desktop])
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stderr_is_scanned_and_exit_code_ignored() {
        let script = format!("printf '%s\\n' '{}'; printf '%s\\n' '{}' >&2; exit 3", CORE, DESKTOP);
        let checker = PrerequisiteChecker::new("sh", ["-c".to_string(), script]);

        assert_eq!(checker.check().await, PrerequisiteReport::Satisfied);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_tool_times_out() {
        let checker = PrerequisiteChecker::new("sleep", ["5"]).with_timeout(Duration::from_millis(100));

        let report = checker.check().await;
        assert!(matches!(report, PrerequisiteReport::ToolingUnavailable { ref reason } if reason.contains("timed out")));
    }
}
