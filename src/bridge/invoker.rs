//! Agent subprocess invocation.
//!
//! Runs the agent as a structured argument vector (program + discrete
//! arguments) with a wall-clock timeout, capturing stdout and stderr in memory.
//! Nothing here ever goes through a shell.

use crate::error::{CoworkError, Result};
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
#[cfg(unix)]
use tracing::debug;

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A fully built agent command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute (looked up on PATH).
    pub program: String,
    /// Discrete arguments, passed verbatim.
    pub args: Vec<String>,
    /// Working directory (inherits the caller's when `None`).
    pub cwd: Option<PathBuf>,
    /// Maximum execution time before the process is killed.
    pub timeout: Duration,
}

/// Captured outcome of one agent process.
#[derive(Debug, Clone)]
pub struct InvocationOutput {
    /// Exit code of the process (None if killed or terminated by a signal).
    pub exit_code: Option<i32>,
    /// Everything the process wrote to stdout (lossy UTF-8).
    pub stdout: String,
    /// Everything the process wrote to stderr (lossy UTF-8).
    pub stderr: String,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
    /// Whether the process was killed due to timeout.
    pub timed_out: bool,
}

impl InvocationOutput {
    /// Check if the run exited cleanly with code 0.
    pub fn is_success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Something that can run an [`Invocation`].
///
/// The bridge talks to agents only through this trait, which lets tests
/// substitute a scripted runner for the real process spawner.
pub trait CommandRunner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> Result<InvocationOutput>;
}

/// Spawns exactly one OS process per call; no pooling or reuse.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessInvoker;

impl CommandRunner for ProcessInvoker {
    fn run(&self, invocation: &Invocation) -> Result<InvocationOutput> {
        invoke(invocation)
    }
}

/// Run an agent command to completion or timeout.
///
/// Returns `Err` only when the process cannot be spawned or supervised; a
/// non-zero exit or a timeout is reported through [`InvocationOutput`].
pub fn invoke(invocation: &Invocation) -> Result<InvocationOutput> {
    let mut command = Command::new(&invocation.program);
    command
        .args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(cwd) = &invocation.cwd {
        command.current_dir(cwd);
    }

    // Own process group, so a timeout can take down everything the agent spawned.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let start_time = Instant::now();
    let mut child = command.spawn().map_err(|e| {
        CoworkError::Invocation(format!(
            "failed to execute agent command '{}': {}\n\
             Fix: ensure the command is installed and in PATH.",
            invocation.program, e
        ))
    })?;

    // Drain both pipes concurrently so a chatty agent cannot block on a full pipe.
    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let (exit_code, timed_out) = wait_with_timeout(&mut child, invocation.timeout)?;
    let elapsed = start_time.elapsed();

    // A killed agent may have left grandchildren holding the pipes open;
    // don't block on them.
    let (stdout, stderr) = if timed_out {
        (String::new(), String::new())
    } else {
        (collect(stdout_reader), collect(stderr_reader))
    };

    Ok(InvocationOutput {
        exit_code,
        stdout,
        stderr,
        elapsed,
        timed_out,
    })
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Wait for a child process with timeout.
///
/// Returns (exit_code, timed_out).
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<(Option<i32>, bool)> {
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return Ok((status.code(), false));
            }
            Ok(None) => {
                if start.elapsed() >= timeout {
                    kill_process(child);
                    return Ok((None, true));
                }
                std::thread::sleep(POLL_INTERVAL.min(timeout.saturating_sub(start.elapsed())));
            }
            Err(e) => {
                kill_process(child);
                return Err(CoworkError::Invocation(format!(
                    "failed to check agent process status: {}",
                    e
                )));
            }
        }
    }
}

/// Kill the agent's whole process group and reap the agent.
#[cfg(unix)]
fn kill_process(child: &mut Child) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let group = Pid::from_raw(child.id() as i32);
    if let Err(e) = killpg(group, Signal::SIGKILL) {
        debug!(pid = child.id(), error = %e, "killpg failed, killing agent only");
        let _ = child.kill();
    }
    let _ = child.wait();
}

/// Kill a process and reap it so no zombie is left behind.
#[cfg(not(unix))]
fn kill_process(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
