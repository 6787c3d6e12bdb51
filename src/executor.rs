//! Command execution
//!
//! Rules are run by handing the expanded command to a shell. The runner only
//! sees the [`CommandExecutor`] trait so tests can observe commands without
//! spawning processes.

use std::io;
use std::process::{Command, ExitStatus};

/// How a command finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    pub success: bool,

    /// Exit code, absent when the process was killed by a signal
    pub code: Option<i32>,
}

impl ExitReport {
    pub fn success() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    pub fn code(code: i32) -> Self {
        Self {
            success: code == 0,
            code: Some(code),
        }
    }

    /// Short description for failure messages
    pub fn describe(&self) -> String {
        match self.code {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

impl From<ExitStatus> for ExitReport {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

/// Runs one command to completion
pub trait CommandExecutor {
    /// Execute `command`, blocking until it exits.
    /// An `Err` means the command could not be started.
    fn execute(&mut self, command: &str) -> io::Result<ExitReport>;
}

impl<E: CommandExecutor + ?Sized> CommandExecutor for &mut E {
    fn execute(&mut self, command: &str) -> io::Result<ExitReport> {
        (**self).execute(command)
    }
}

/// Runs commands through a shell with the terminal's stdin/stdout/stderr
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    program: String,
    args: Vec<String>,
}

impl ShellExecutor {
    /// `program args... <command>`, e.g. `bash -c <command>`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new("bash", vec!["-c".to_string()])
    }
}

impl CommandExecutor for ShellExecutor {
    fn execute(&mut self, command: &str) -> io::Result<ExitReport> {
        tracing::debug!(shell = %self.program, %command, "spawning command");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(command)
            .status()?;
        Ok(status.into())
    }
}
