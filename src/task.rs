//! Runs build commands.  Unaware of the dependency graph; just command
//! execution.

use anyhow::anyhow;
use std::io::Write;
use std::os::unix::process::ExitStatusExt;

#[derive(Debug, PartialEq)]
pub enum Termination {
    Success,
    Interrupted,
    /// Carries the exit code to surface as our own.
    Failure(i32),
}

/// The result of executing one build command.
pub struct TaskResult {
    pub termination: Termination,
    /// Combined stdout and stderr.
    pub output: Vec<u8>,
}

/// Executes a build command as a subprocess, blocking until it exits.
/// Returns an Err() only if we failed outside of the process itself.
pub fn run_command(cmdline: &str) -> anyhow::Result<TaskResult> {
    let mut cmd = std::process::Command::new("/bin/sh")
        .arg("-c")
        .arg(cmdline)
        .output()
        .map_err(|err| anyhow!("spawn /bin/sh: {}", err))?;
    let mut output = Vec::new();
    output.append(&mut cmd.stdout);
    output.append(&mut cmd.stderr);

    let termination = if cmd.status.success() {
        Termination::Success
    } else if let Some(sig) = cmd.status.signal() {
        match sig {
            libc::SIGINT => {
                write!(output, "interrupted").unwrap();
                Termination::Interrupted
            }
            _ => {
                write!(output, "signal {}", sig).unwrap();
                Termination::Failure(128 + sig)
            }
        }
    } else {
        Termination::Failure(cmd.status.code().unwrap_or(1))
    };

    Ok(TaskResult {
        termination,
        output,
    })
}
