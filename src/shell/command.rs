//! Shell command execution.

use crate::error::{Result, SetupError};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// Result of executing a shell command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal or timed out).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,

    /// Whether the command was killed after exceeding its timeout.
    pub timed_out: bool,
}

impl CommandResult {
    /// Last non-empty line of stderr, else of stdout.
    ///
    /// Used as the error message when a step's command fails.
    pub fn failure_summary(&self) -> String {
        let last_line = |text: &str| {
            text.lines()
                .rev()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .map(str::to_string)
        };

        if self.timed_out {
            return format!("timed out after {}s", self.duration.as_secs());
        }
        last_line(&self.stderr)
            .or_else(|| last_line(&self.stdout))
            .unwrap_or_else(|| match self.exit_code {
                Some(code) => format!("exit code {}", code),
                None => "terminated by signal".to_string(),
            })
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, String>,

    /// Timeout in seconds (None = no timeout).
    pub timeout: Option<u64>,
}

/// Output line from command execution.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

impl OutputLine {
    /// The line's text.
    pub fn text(&self) -> &str {
        match self {
            OutputLine::Stdout(s) | OutputLine::Stderr(s) => s,
        }
    }
}

/// Execute a shell command, capturing its output.
pub fn execute(command: &str, options: &CommandOptions) -> Result<CommandResult> {
    execute_streaming(command, options, |_| {})
}

/// Execute a command and return success/failure.
pub fn execute_check(command: &str, cwd: Option<&Path>) -> bool {
    let options = CommandOptions {
        cwd: cwd.map(Path::to_path_buf),
        ..Default::default()
    };

    execute(command, &options)
        .map(|r| r.success)
        .unwrap_or(false)
}

/// Execute a command, handing each output line to `on_line` as it arrives.
///
/// Output is captured as well. The callback runs on the calling thread.
pub fn execute_streaming(
    command: &str,
    options: &CommandOptions,
    mut on_line: impl FnMut(OutputLine),
) -> Result<CommandResult> {
    let start = Instant::now();
    let spawn_failed = |_| SetupError::CommandFailed {
        command: command.to_string(),
        code: None,
    };

    let mut cmd = Command::new(detect_shell());
    cmd.arg(shell_flag()).arg(command);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }
    cmd.envs(&options.env);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    tracing::debug!("Executing: {}", command);
    let mut child = cmd.spawn().map_err(spawn_failed)?;

    let (tx, rx) = mpsc::channel();
    let stdout_handle = child
        .stdout
        .take()
        .map(|out| forward_lines(out, tx.clone(), OutputLine::Stdout));
    let stderr_handle = child
        .stderr
        .take()
        .map(|err| forward_lines(err, tx, OutputLine::Stderr));

    let deadline = options
        .timeout
        .map(|secs| start + Duration::from_secs(secs));
    let mut timed_out = false;

    loop {
        let wait = deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::from_millis(250));
        match rx.recv_timeout(wait) {
            Ok(line) => on_line(line),
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    timed_out = true;
                    kill(&mut child);
                    break;
                }
            }
        }
    }

    let stdout = stdout_handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default();
    let stderr = stderr_handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default();

    let status = child.wait().map_err(spawn_failed)?;
    let duration = start.elapsed();
    let success = status.success() && !timed_out;

    tracing::debug!(
        "Command finished in {:?} with {:?}{}",
        duration,
        status.code(),
        if timed_out { " (timed out)" } else { "" }
    );

    Ok(CommandResult {
        exit_code: if timed_out { None } else { status.code() },
        stdout,
        stderr,
        duration,
        success,
        timed_out,
    })
}

fn forward_lines<R: Read + Send + 'static>(
    reader: R,
    tx: mpsc::Sender<OutputLine>,
    wrap: fn(String) -> OutputLine,
) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut output = String::new();
        for line in BufReader::new(reader)
            .lines()
            .map_while(std::result::Result::ok)
        {
            output.push_str(&line);
            output.push('\n');
            let _ = tx.send(wrap(line));
        }
        output
    })
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::warn!("Failed to kill timed-out command: {}", e);
    }
}

/// Shell used to run commands.
#[cfg(unix)]
pub fn detect_shell() -> String {
    "/bin/sh".to_string()
}

/// Shell used to run commands.
#[cfg(windows)]
pub fn detect_shell() -> String {
    std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
}

#[cfg(unix)]
fn shell_flag() -> &'static str {
    "-c"
}

#[cfg(windows)]
fn shell_flag() -> &'static str {
    "/C"
}
