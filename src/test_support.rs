//! Shared helpers for unit tests: a scripted runner and fake agent scripts.

use crate::bridge::{CommandRunner, Invocation, InvocationOutput};
use crate::error::{CoworkError, Result};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// What a [`ScriptedRunner`] does on its next call.
pub(crate) enum Step {
    Output(InvocationOutput),
    Fail(String),
}

/// Records every invocation and replays queued outcomes in order.
///
/// Once the queue is empty it keeps answering with a plain successful run.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub(crate) fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn last_args(&self) -> Vec<String> {
        self.calls().last().map(|c| c.args.clone()).unwrap_or_default()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<InvocationOutput> {
        self.calls.lock().unwrap().push(invocation.clone());
        match self.steps.lock().unwrap().pop_front() {
            Some(Step::Output(output)) => Ok(output),
            Some(Step::Fail(message)) => Err(CoworkError::Invocation(message)),
            None => Ok(exited(0, "done", "")),
        }
    }
}

pub(crate) fn exited(code: i32, stdout: &str, stderr: &str) -> InvocationOutput {
    InvocationOutput {
        exit_code: Some(code),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
        elapsed: Duration::from_millis(5),
        timed_out: false,
    }
}

pub(crate) fn envelope(result: &str, session_id: &str) -> Step {
    let stdout = serde_json::json!({
        "type": "result",
        "result": result,
        "session_id": session_id,
    })
    .to_string();
    Step::Output(exited(0, &stdout, ""))
}

pub(crate) fn timed_out(after: Duration) -> Step {
    Step::Output(InvocationOutput {
        exit_code: None,
        stdout: String::new(),
        stderr: String::new(),
        elapsed: after,
        timed_out: true,
    })
}

/// Write an executable shell script standing in for the agent.
///
/// The script records its argv (one per line) to `argv.txt` next to itself,
/// then runs `body`.
#[cfg(unix)]
pub(crate) fn write_fake_agent(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-agent.sh");
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > \"$(dirname \"$0\")/argv.txt\"\n{}\n",
        body
    );
    std::fs::write(&path, script).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

/// Lines recorded by the last run of a fake agent in `dir`.
#[cfg(unix)]
pub(crate) fn recorded_argv(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("argv.txt"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
