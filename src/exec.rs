//! Wrappers around executing commands.

use std::{
    ffi::OsString,
    fmt::Write,
    thread,
    time::{Duration, Instant},
};

use duct::Expression;
use tracing::{trace, Level};

use crate::{
    jobs::{CommandOutput, JobError as E},
    log,
};

/// How often to check whether a command with a timeout has finished.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Shell-escaped rendering of a command line, used for logs and error messages.
pub fn format_command<T, U>(program: T, args: U) -> String
where
    T: Into<OsString>,
    U: IntoIterator,
    U::Item: Into<OsString>,
{
    let mut formatted_cmd = shell_escape::escape(program.into().to_string_lossy()).into_owned();
    for arg in args {
        // Writing to a String can't fail.
        let _ = write!(
            formatted_cmd,
            " {arg}",
            arg = shell_escape::escape(arg.into().to_string_lossy())
        );
    }
    formatted_cmd
}

/// Wrapper around `duct::cmd` function that lets us log the command we're running.
pub fn cmd_log<T, U>(l: Level, program: T, args: U) -> Expression
where
    T: duct::IntoExecutablePath + Clone,
    U: IntoIterator + Clone,
    U::Item: Into<OsString>,
{
    log!(
        l,
        "Running command: {}",
        format_command(program.clone().to_executable(), args.clone())
    );
    duct::cmd(program, args)
}

/**
Run an expression to completion, capturing stdout and stderr in full.

A non-zero exit code is not an error here, callers decide what it means. If `timeout` is set
and the command is still running once it passes, the command is killed and
[`JobError::TimedOut`](crate::jobs::JobError::TimedOut) is returned.
*/
pub fn run_captured(
    expression: &Expression,
    command: &str,
    timeout: Option<Duration>,
) -> Result<CommandOutput, E> {
    let handle = expression
        .stdin_null()
        .stdout_capture()
        .stderr_capture()
        .unchecked()
        .start()
        .map_err(|e| E::Spawn {
            command: command.to_owned(),
            source: e,
        })?;

    let output = match timeout {
        None => handle.wait(),
        Some(timeout) => {
            let deadline = Instant::now() + timeout;
            loop {
                match handle.try_wait() {
                    Ok(Some(_)) => break handle.wait(),
                    Ok(None) if Instant::now() >= deadline => {
                        trace!("Killing '{command}' after {timeout:?}.");
                        handle.kill().map_err(|e| E::Wait {
                            command: command.to_owned(),
                            source: e,
                        })?;
                        return Err(E::TimedOut {
                            command: command.to_owned(),
                            timeout,
                        });
                    }
                    Ok(None) => thread::sleep(POLL_INTERVAL),
                    Err(e) => break Err(e),
                }
            }
        }
    }
    .map_err(|e| E::Wait {
        command: command.to_owned(),
        source: e,
    })?;

    let exit_code = output.status.code().ok_or_else(|| E::Terminated {
        command: command.to_owned(),
    })?;
    Ok(CommandOutput {
        exit_code,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
