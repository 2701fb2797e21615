//! Running a batch of independent external-command jobs over a bounded worker pool.

use std::{
    fmt::{self, Display},
    io,
    time::Duration,
};

use camino::{Utf8Path, Utf8PathBuf};
use displaydoc::Display;
use thiserror::Error;

pub mod order;
pub mod progress;
pub mod results;
pub mod scheduler;
pub mod source;

/// One unit of work: a directory to run a command in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Job(Utf8PathBuf);

impl Job {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Utf8Path {
        &self.0
    }

    /// Final path component, falling back to the whole path (e.g. for `/`).
    pub fn name(&self) -> &str {
        self.0.file_name().unwrap_or_else(|| self.0.as_str())
    }
}

impl Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Captured result of an external command that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Runs the external command for a single job. Called concurrently from every worker.
pub trait JobExecutor: Sync {
    /// Run the job to completion. A non-zero exit code is a normal return, `Err` means the
    /// command couldn't be run (or finished) at all.
    fn execute(&self, job: &Job) -> Result<CommandOutput, JobError>;
}

impl<F> JobExecutor for F
where
    F: Fn(&Job) -> Result<CommandOutput, JobError> + Sync,
{
    fn execute(&self, job: &Job) -> Result<CommandOutput, JobError> {
        self(job)
    }
}

/// How a job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// The command ran and exited with this code.
    Exited(i32),
    /// The command couldn't be run, was killed, or the executor panicked.
    Faulted(String),
}

/// The recorded result of one dispatched job.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub job: Job,
    /// Position of the job in the dispatch order.
    pub index: usize,
    pub status: JobStatus,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl JobOutcome {
    pub fn success(&self) -> bool {
        self.status == JobStatus::Exited(0)
    }
}

#[derive(Error, Debug, Display)]
/// Errors running a job's command.
pub enum JobError {
    /// Failed to start command `{command}`.
    Spawn {
        /// The command we tried to run.
        command: String,
        /// Source error.
        source: io::Error,
    },
    /// Failed while waiting for command `{command}`.
    Wait {
        /// The command we were waiting on.
        command: String,
        /// Source error.
        source: io::Error,
    },
    /// Command `{command}` was still running after {timeout:?} and was killed.
    TimedOut {
        /// The command that timed out.
        command: String,
        /// Configured timeout.
        timeout: Duration,
    },
    /// Command `{command}` was terminated by a signal.
    Terminated {
        /// The command that was terminated.
        command: String,
    },
}
