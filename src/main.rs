//! LumiTracker launcher
//!
//! Main entry point. The process lives only long enough to start the application:
//!
//! 1. Parse the command line (help/version exit here without touching the disk; on Windows
//!    the text is shown in a dialog since there is no console)
//! 2. Find the install root and open `<product>Launcher.log` there
//! 3. Run the launch sequence on a single-threaded tokio runtime
//! 4. Exit with 0 on success, 1 after a fatal error dialog

#![cfg_attr(windows, windows_subsystem = "windows")]

use lumi_launcher::cli::{CliAction, parse_args, show_exit_output};
use lumi_launcher::locale::{catalog_for, detect_locale};
use lumi_launcher::services::{
    DesktopPrompt, FATAL_EXIT_CODE, Notifier, PrerequisiteChecker, SystemSpawner,
};
use lumi_launcher::{APP_NAME, BootstrapContext, Bootstrapper, VERSION};
use std::process::ExitCode;

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().collect();
    let parsed = parse_args(argv.clone());

    let cli = match parsed.action {
        CliAction::Launch(cli) => cli,
        CliAction::Exit { code, output } => {
            show_exit_output(&output, &DesktopPrompt, !cfg!(windows));
            return ExitCode::from(code);
        }
    };

    let context = BootstrapContext::discover(cli.flags());
    let log_path = context.root.join(context.layout.log_file_name());

    // Held until exit so buffered lines reach the file
    let _guard = match lumi_launcher::logging::setup_logging(
        &log_path,
        cfg!(debug_assertions),
        false,
    ) {
        Ok(guard) => guard,
        Err(e) => {
            if cfg!(debug_assertions) {
                eprintln!("Logging unavailable: {e:#}");
            }
            None
        }
    };

    tracing::info!("Command line: {:?}", argv);
    tracing::info!("Starting {} v{} from {}", APP_NAME, VERSION, context.root);
    if !parsed.ignored.is_empty() {
        tracing::warn!("Ignoring unknown arguments: {:?}", parsed.ignored);
    }
    if let Some(warning) = parsed.warning {
        tracing::warn!("Invalid arguments, using defaults: {}", warning.trim_end());
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create async runtime: {}", e);
            return ExitCode::from(FATAL_EXIT_CODE);
        }
    };

    let locale = detect_locale();
    tracing::debug!("Locale: {}", locale);

    let bootstrapper = Bootstrapper::new(
        context,
        PrerequisiteChecker::default(),
        Box::new(SystemSpawner),
        Notifier::new(Box::new(DesktopPrompt), catalog_for(locale)),
    );

    let code = runtime.block_on(bootstrapper.run());
    tracing::info!("Launcher exiting with status {}", code);
    ExitCode::from(code)
}
