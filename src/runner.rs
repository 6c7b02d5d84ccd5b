//! Shell command execution.
//!
//! The runner knows nothing about tasks: it takes a command string, blocks
//! until the shell exits, and reports the outcome. Failures are observable
//! but never escalated past the alarm fire path (fire-and-forget).

use std::io;
use std::process::Command;
use std::sync::Mutex;

use tracing::debug;

/// Outcome of one command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitResult {
    /// Shell exited with a code.
    Exited(i32),
    /// Shell was terminated by a signal (no exit code).
    Terminated,
}

impl ExitResult {
    pub fn success(&self) -> bool {
        matches!(self, ExitResult::Exited(0))
    }
}

/// Executes a shell command string, blocking until completion.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &str) -> io::Result<ExitResult>;
}

/// Production runner: hands the command verbatim to `<shell> -c`.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl ShellRunner {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new("sh")
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> io::Result<ExitResult> {
        let status = Command::new(&self.shell).arg("-c").arg(command).status()?;
        let result = match status.code() {
            Some(code) => ExitResult::Exited(code),
            None => ExitResult::Terminated,
        };
        debug!(command, ?result, "command finished");
        Ok(result)
    }
}

/// Test double that records every command instead of executing it.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    commands: Mutex<Vec<String>>,
    exit_code: i32,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record invocations but report the given exit code.
    pub fn failing(exit_code: i32) -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            exit_code,
        }
    }

    /// Commands seen so far, in invocation order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().expect("runner lock poisoned").clone()
    }

    pub fn run_count(&self) -> usize {
        self.commands.lock().expect("runner lock poisoned").len()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &str) -> io::Result<ExitResult> {
        self.commands
            .lock()
            .expect("runner lock poisoned")
            .push(command.to_string());
        Ok(ExitResult::Exited(self.exit_code))
    }
}
