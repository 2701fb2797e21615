//! Progress hooks emitted by the scheduler.

use std::time::Duration;

use itertools::Itertools;
use tracing::{debug, error, info, warn, Level};

use super::{results::RunState, Job, JobOutcome, JobStatus};
use crate::log;

/// Jobs taking longer than this get a warning.
const SLOW_JOB_WARNING: Duration = Duration::from_secs(60);

/**
Receives progress events from the scheduler. Called concurrently from worker threads.

The per-job hooks get the live [`RunState`], which other workers keep updating while a hook
runs. Read `completed` before `dispatched` to see a consistent pair.
*/
pub trait ProgressReporter: Sync {
    /// A worker claimed `job`, the `index`th job in dispatch order.
    fn job_started(&self, _job: &Job, _index: usize, _state: &RunState) {}

    /// A job finished, `remaining` jobs hadn't finished when it was recorded.
    fn job_finished(&self, _outcome: &JobOutcome, _remaining: usize, _state: &RunState) {}

    /// Every job has finished.
    fn run_finished(&self, _state: &RunState) {}
}

/// Reporter that discards every event.
#[cfg(test)]
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Silent;

#[cfg(test)]
impl ProgressReporter for Silent {}

/**
Reports progress through `tracing`.

| Outcome | Status  | Stdout/Stderr |
| ---     | ---     | ---           |
| passes  | `info`  | `debug`       |
| fails   | `error` | `error`       |
*/
#[derive(Debug)]
pub struct LogReporter {
    /// What the jobs are, used in messages, e.g. "repo".
    noun: &'static str,
}

impl LogReporter {
    pub fn new(noun: &'static str) -> Self {
        Self { noun }
    }
}

impl ProgressReporter for LogReporter {
    fn job_started(&self, job: &Job, index: usize, state: &RunState) {
        let noun = self.noun;
        let n = index + 1;
        let total = state.total();
        debug!("Starting {noun} {n}/{total}: {job}");
    }

    fn job_finished(&self, outcome: &JobOutcome, remaining: usize, _state: &RunState) {
        let (level, output_level) = if outcome.success() {
            (Level::INFO, Level::DEBUG)
        } else {
            (Level::ERROR, Level::ERROR)
        };
        let job = &outcome.job;
        let name = job.name();
        let elapsed = outcome.elapsed;
        match &outcome.status {
            JobStatus::Exited(code) => log!(
                level,
                "[{remaining} left] {name}: exit code {code} in {elapsed:?}"
            ),
            JobStatus::Faulted(message) => log!(
                level,
                "[{remaining} left] {name}: failed to run after {elapsed:?}: {message}"
            ),
        }
        if !outcome.stdout.trim().is_empty() {
            log!(output_level, "{job} stdout:\n<<<\n{}>>>\n", outcome.stdout);
        }
        if !outcome.stderr.trim().is_empty() {
            log!(output_level, "{job} stderr:\n<<<\n{}>>>\n", outcome.stderr);
        }
        if elapsed > SLOW_JOB_WARNING {
            warn!("{job} took {elapsed:?}");
        }
    }

    fn run_finished(&self, state: &RunState) {
        let noun = self.noun;
        let failures = state.results().failures();
        let ran = state.completed();
        let failed = failures.len();
        info!("{}", summary(noun, ran, failed));
        if !failures.is_empty() {
            let failed_list = failures
                .iter()
                .map(|failure| match &failure.status {
                    JobStatus::Exited(code) => format!("{} (exit code {code})", failure.job),
                    JobStatus::Faulted(message) => format!("{} ({message})", failure.job),
                })
                .join("\n  ");
            error!("Failed {noun} jobs:\n  {failed_list}");
        }
    }
}

/// e.g. "Ran 3 repo jobs, 2 passed, 1 failed".
fn summary(noun: &str, ran: usize, failed: usize) -> String {
    let passed = ran.saturating_sub(failed);
    let jobs = if ran == 1 { "job" } else { "jobs" };
    format!("Ran {ran} {noun} {jobs}, {passed} passed, {failed} failed")
}
