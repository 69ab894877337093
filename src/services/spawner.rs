use crate::models::{ConsoleMode, LaunchMode, LaunchOptions, LaunchTarget};
use camino::Utf8PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Everything needed to create the application process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    pub mode: LaunchMode,
    pub console: ConsoleMode,
    pub program: Utf8PathBuf,
    pub working_directory: Utf8PathBuf,
    pub args: Vec<String>,
}

impl SpawnRequest {
    pub fn new(target: &LaunchTarget, options: &LaunchOptions) -> Self {
        Self {
            mode: options.mode(),
            console: options.console(),
            program: target.executable_path.clone(),
            working_directory: target.working_directory.clone(),
            args: options.extra_args.clone(),
        }
    }
}

/// A started child. Nothing else is kept; the launcher never waits on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnedProcess {
    /// Not every elevation path reports a process id
    pub pid: Option<u32>,
}

/// OS-level process creation failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SpawnError {
    pub code: Option<i32>,
    pub message: String,
}

impl From<std::io::Error> for SpawnError {
    fn from(e: std::io::Error) -> Self {
        Self {
            code: e.raw_os_error(),
            message: e.to_string(),
        }
    }
}

/// `FACILITY_WIN32` HRESULTs carry a plain Win32 error code in their low 16 bits.
const FACILITY_WIN32_MASK: u32 = 0xFFFF_0000;
const FACILITY_WIN32_PREFIX: u32 = 0x8007_0000;

/// Win32 error code wrapped in an HRESULT, or the HRESULT itself for other facilities.
pub fn os_error_code(hresult: i32) -> i32 {
    let bits = hresult as u32;
    if bits & FACILITY_WIN32_MASK == FACILITY_WIN32_PREFIX {
        (bits & 0xFFFF) as i32
    } else {
        hresult
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for SpawnError {
    fn from(e: windows::core::Error) -> Self {
        Self {
            code: Some(os_error_code(e.code().0)),
            message: e.to_string(),
        }
    }
}

/// Creates the application process.
pub trait Spawner {
    fn spawn(&self, request: &SpawnRequest) -> Result<SpawnedProcess, SpawnError>;
}

/// Spawner backed by the operating system.
///
/// Must be used from inside a tokio runtime; plain launches go through
/// `tokio::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSpawner;

impl Spawner for SystemSpawner {
    fn spawn(&self, request: &SpawnRequest) -> Result<SpawnedProcess, SpawnError> {
        tracing::info!(
            "Spawning {} ({:?}, console {:?}) in {} with args {:?}",
            request.program,
            request.mode,
            request.console,
            request.working_directory,
            request.args
        );

        match request.mode {
            LaunchMode::Plain => spawn_plain(request),
            LaunchMode::Elevated => spawn_elevated(request),
        }
    }
}

fn spawn_plain(request: &SpawnRequest) -> Result<SpawnedProcess, SpawnError> {
    let mut cmd = Command::new(request.program.as_std_path());
    cmd.args(&request.args)
        .current_dir(request.working_directory.as_std_path())
        .stdin(Stdio::null());

    match request.console {
        ConsoleMode::Visible => {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }
        ConsoleMode::Hidden => {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
    }

    #[cfg(windows)]
    {
        use windows::Win32::System::Threading::{CREATE_NEW_CONSOLE, CREATE_NO_WINDOW};
        let flags = match request.console {
            ConsoleMode::Visible => CREATE_NEW_CONSOLE,
            ConsoleMode::Hidden => CREATE_NO_WINDOW,
        };
        cmd.creation_flags(flags.0);
    }

    // Dropping the child closes our handles without waiting on or killing it
    let child = cmd.spawn()?;
    Ok(SpawnedProcess { pid: child.id() })
}

#[cfg(windows)]
fn spawn_elevated(request: &SpawnRequest) -> Result<SpawnedProcess, SpawnError> {
    use super::handle::own_handle;
    use windows::Win32::System::Threading::GetProcessId;
    use windows::Win32::UI::Shell::{SEE_MASK_NOCLOSEPROCESS, SHELLEXECUTEINFOW, ShellExecuteExW};
    use windows::Win32::UI::WindowsAndMessaging::{SW_HIDE, SW_SHOWNORMAL};
    use windows::core::{PCWSTR, w};

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    let file = wide(request.program.as_str());
    let parameters = wide(&join_windows_args(&request.args));
    let directory = wide(request.working_directory.as_str());

    let mut info = SHELLEXECUTEINFOW {
        cbSize: std::mem::size_of::<SHELLEXECUTEINFOW>() as u32,
        fMask: SEE_MASK_NOCLOSEPROCESS,
        lpVerb: w!("runas"),
        lpFile: PCWSTR(file.as_ptr()),
        lpParameters: PCWSTR(parameters.as_ptr()),
        lpDirectory: PCWSTR(directory.as_ptr()),
        nShow: match request.console {
            ConsoleMode::Visible => SW_SHOWNORMAL.0,
            ConsoleMode::Hidden => SW_HIDE.0,
        },
        ..Default::default()
    };

    // SAFETY: every pointer in `info` refers to a buffer that outlives the call
    unsafe { ShellExecuteExW(&mut info) }?;

    if info.hProcess.is_invalid() {
        return Ok(SpawnedProcess { pid: None });
    }

    let process = own_handle(info.hProcess);
    // SAFETY: `process` holds a valid handle until the end of this scope
    let pid = unsafe { GetProcessId(*process.get()) };
    Ok(SpawnedProcess {
        pid: (pid != 0).then_some(pid),
    })
}

#[cfg(not(windows))]
fn spawn_elevated(request: &SpawnRequest) -> Result<SpawnedProcess, SpawnError> {
    let mut cmd = Command::new("pkexec");
    cmd.arg(request.program.as_std_path())
        .args(&request.args)
        .current_dir(request.working_directory.as_std_path())
        .stdin(Stdio::null());

    if request.console == ConsoleMode::Hidden {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }

    let child = cmd.spawn()?;
    Ok(SpawnedProcess { pid: child.id() })
}

/// Join arguments into one command line string, quoting where Windows needs it.
pub fn join_windows_args(args: &[String]) -> String {
    args.iter()
        .map(|arg| {
            if !arg.is_empty() && !arg.contains([' ', '\t', '"']) {
                arg.clone()
            } else {
                format!("\"{}\"", arg.replace('"', "\\\""))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
