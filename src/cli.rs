//! Command line of the launcher.
//!
//! The launcher is started by shortcuts, by the updater and by older updaters that pass
//! `just_updated` as a bare word. Unknown arguments must never stop the launch, so the
//! argument vector is filtered down to the known flags before clap sees it.

use crate::models::LaunchFlags;
use crate::services::UserPrompt;
use clap::Parser;
use clap::error::ErrorKind;

#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(
    name = "lumi-launcher",
    version,
    about = "Launches the installed LumiTracker version",
    args_override_self = true
)]
pub struct Cli {
    /// Started by the updater right after installing a new version
    #[arg(long = "just_updated")]
    pub just_updated: bool,

    /// Seconds to wait before launching (1.5 after an update if not given)
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0, allow_negative_numbers = true)]
    pub delay: f64,
}

impl Cli {
    pub fn flags(&self) -> LaunchFlags {
        LaunchFlags {
            just_updated: self.just_updated,
            delay_secs: self.delay,
        }
    }
}

/// What `main` should do after looking at the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum CliAction {
    Launch(Cli),
    /// Print `output` (help or version) and exit with `code` without launching
    Exit { code: u8, output: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArgs {
    pub action: CliAction,
    /// Arguments dropped before parsing
    pub ignored: Vec<String>,
    /// Parse problem that was recovered from with defaults
    pub warning: Option<String>,
}

/// Keep only the arguments the launcher understands.
///
/// The first element (program name) is always kept. A bare `just_updated` becomes
/// `--just_updated`, which is kept only once.
pub fn sanitize_args<I>(args: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().peekable();
    let mut kept = Vec::new();
    let mut ignored = Vec::new();
    let mut just_updated = false;

    if let Some(program) = args.next() {
        kept.push(program);
    }

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--just_updated" | "just_updated" => {
                if !just_updated {
                    kept.push("--just_updated".to_string());
                    just_updated = true;
                }
            }
            "-h" | "--help" | "-V" | "--version" => kept.push(arg),
            "--delay" => match args.next_if(|value| !value.starts_with("--")) {
                Some(value) => {
                    kept.push(arg);
                    kept.push(value);
                }
                None => ignored.push(arg),
            },
            _ if arg.starts_with("--delay=") => kept.push(arg),
            _ => ignored.push(arg),
        }
    }

    (kept, ignored)
}

/// Sanitised arguments without any `--delay` option.
fn without_delay(kept: &[String]) -> Vec<String> {
    let mut args = kept.iter();
    let mut remaining = Vec::new();
    while let Some(arg) = args.next() {
        if arg == "--delay" {
            args.next();
        } else if !arg.starts_with("--delay=") {
            remaining.push(arg.clone());
        }
    }
    remaining
}

/// Parse the launcher's argument vector. Never fails.
///
/// An unusable `--delay` value is dropped on its own; the other flags still apply.
pub fn parse_args<I>(args: I) -> ParsedArgs
where
    I: IntoIterator<Item = String>,
{
    let (kept, ignored) = sanitize_args(args);

    match Cli::try_parse_from(&kept) {
        Ok(cli) => ParsedArgs {
            action: CliAction::Launch(cli),
            ignored,
            warning: None,
        },
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            ParsedArgs {
                action: CliAction::Exit {
                    code: 0,
                    output: e.render().to_string(),
                },
                ignored,
                warning: None,
            }
        }
        Err(e) => ParsedArgs {
            action: CliAction::Launch(
                Cli::try_parse_from(without_delay(&kept)).unwrap_or_default(),
            ),
            ignored,
            warning: Some(e.render().to_string()),
        },
    }
}

/// Title of the dialog that shows help or version text.
pub const USAGE_TITLE: &str = "LumiTracker Launcher";

/// Deliver help or version text.
///
/// Without an attached console (the Windows GUI subsystem) stdout goes nowhere, so the
/// text is shown in a dialog instead.
pub fn show_exit_output(output: &str, prompt: &dyn UserPrompt, has_console: bool) {
    if has_console {
        print!("{output}");
    } else {
        prompt.show_text(USAGE_TITLE, output.trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use mockall::mock;
    use std::time::Duration;

    mock! {
        Prompt {}
        impl UserPrompt for Prompt {
            fn alert(&self, title: &str, message: &str, severity: Severity);
            fn show_text(&self, title: &str, text: &str);
            fn open_url(&self, url: &str) -> Result<(), String>;
        }
    }

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("lumi-launcher")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    fn launch(list: &[&str]) -> Cli {
        match parse_args(args(list)).action {
            CliAction::Launch(cli) => cli,
            other => panic!("expected launch, got {other:?}"),
        }
    }

    #[test]
    fn test_no_arguments() {
        let cli = launch(&[]);
        assert_eq!(cli, Cli::default());
        assert_eq!(cli.flags().effective_delay(), Duration::ZERO);
    }

    #[test]
    fn test_just_updated_default_delay() {
        let cli = launch(&["--delay", "0", "--just_updated"]);
        assert!(cli.just_updated);
        assert_eq!(cli.flags().effective_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn test_explicit_delay_wins() {
        let cli = launch(&["--delay", "2", "--just_updated"]);
        assert_eq!(cli.flags().effective_delay(), Duration::from_millis(2000));

        let cli = launch(&["--delay=0.5"]);
        assert_eq!(cli.flags().effective_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_bare_just_updated_is_honored() {
        let cli = launch(&["just_updated"]);
        assert!(cli.just_updated);
    }

    #[test]
    fn test_unknown_arguments_are_ignored() {
        let parsed = parse_args(args(&["--foo", "bar", "-x", "--just_updated", "C:\\root\\"]));

        assert_eq!(
            parsed.ignored,
            vec!["--foo".to_string(), "bar".to_string(), "-x".to_string(), "C:\\root\\".to_string()]
        );
        assert!(parsed.warning.is_none());
        assert!(matches!(parsed.action, CliAction::Launch(Cli { just_updated: true, .. })));
    }

    #[test]
    fn test_delay_without_value_is_dropped() {
        let parsed = parse_args(args(&["--delay", "--just_updated"]));

        assert_eq!(parsed.ignored, vec!["--delay".to_string()]);
        assert!(matches!(parsed.action, CliAction::Launch(Cli { just_updated: true, .. })));
    }

    #[test]
    fn test_bad_delay_falls_back_to_defaults() {
        let parsed = parse_args(args(&["--delay", "soon"]));

        assert!(parsed.warning.is_some());
        assert_eq!(parsed.action, CliAction::Launch(Cli::default()));
    }

    #[test]
    fn test_bad_delay_keeps_just_updated() {
        for list in [
            &["--just_updated", "--delay", "soon"][..],
            &["--delay=soon", "just_updated"][..],
        ] {
            let parsed = parse_args(args(list));

            assert!(parsed.warning.is_some());
            let CliAction::Launch(cli) = parsed.action else {
                panic!("expected launch for {list:?}");
            };
            assert!(cli.just_updated);
            assert_eq!(cli.flags().effective_delay(), Duration::from_millis(1500));
        }
    }

    #[test]
    fn test_repeated_just_updated_is_accepted() {
        let (kept, _) = sanitize_args(args(&["--just_updated", "just_updated", "--just_updated"]));
        assert_eq!(kept, vec!["lumi-launcher".to_string(), "--just_updated".to_string()]);

        let parsed = parse_args(args(&["--just_updated", "just_updated"]));
        assert!(parsed.warning.is_none());
        assert!(matches!(parsed.action, CliAction::Launch(Cli { just_updated: true, .. })));
    }

    #[test]
    fn test_last_delay_wins() {
        let cli = launch(&["--delay", "1", "--delay", "3"]);
        assert_eq!(cli.flags().effective_delay(), Duration::from_secs(3));
    }

    #[test]
    fn test_negative_delay_is_clamped() {
        let cli = launch(&["--delay", "-1"]);
        assert_eq!(cli.flags().effective_delay(), Duration::ZERO);
    }

    #[test]
    fn test_help_exits_zero() {
        for flag in ["-h", "--help"] {
            match parse_args(args(&["--unknown", flag])).action {
                CliAction::Exit { code, output } => {
                    assert_eq!(code, 0);
                    assert!(output.contains("--just_updated"));
                    assert!(output.contains("--delay"));
                }
                other => panic!("expected exit, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_sanitize_keeps_program_name() {
        let (kept, ignored) = sanitize_args(args(&["x"]));
        assert_eq!(kept, vec!["lumi-launcher".to_string()]);
        assert_eq!(ignored, vec!["x".to_string()]);
    }

    #[test]
    fn test_help_goes_to_dialog_without_console() {
        let CliAction::Exit { output, .. } = parse_args(args(&["--help"])).action else {
            panic!("expected exit");
        };

        let mut prompt = MockPrompt::new();
        prompt
            .expect_show_text()
            .withf(|title, text| {
                title == USAGE_TITLE && text.contains("--just_updated") && !text.ends_with('\n')
            })
            .times(1)
            .return_const(());
        prompt.expect_alert().times(0);

        show_exit_output(&output, &prompt, false);
    }

    #[test]
    fn test_help_goes_to_stdout_with_console() {
        let mut prompt = MockPrompt::new();
        prompt.expect_show_text().times(0);

        show_exit_output("usage\n", &prompt, true);
    }
}
