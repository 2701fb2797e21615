//! Bounded-concurrency scheduler: runs every job exactly once on a fixed pool of threads.

use std::{
    num::NonZeroUsize,
    panic::{self, AssertUnwindSafe},
    sync::atomic::{AtomicUsize, Ordering},
    time::Instant,
};

use displaydoc::Display;
use thiserror::Error;
use tracing::{debug, error, trace};

use self::SchedulerError as E;
use super::{
    progress::ProgressReporter, results::RunState, Job, JobExecutor, JobOutcome, JobStatus,
};
use crate::utils::errors::{log_error, panic_message};

/**
Runs jobs on at most `concurrency` worker threads.

Workers claim jobs in dispatch order from a shared cursor. Every job is run once, a failing job
doesn't stop the others, and [`run`](Self::run) returns only once every job has finished.
*/
#[derive(Debug)]
pub struct BoundedScheduler {
    concurrency: NonZeroUsize,
}

impl BoundedScheduler {
    pub fn new(concurrency: NonZeroUsize) -> Self {
        Self { concurrency }
    }

    pub fn run(
        &self,
        jobs: &[Job],
        executor: &dyn JobExecutor,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunState, SchedulerError> {
        let state = RunState::new(jobs.len());
        if jobs.is_empty() {
            debug!("No jobs to run.");
            reporter.run_finished(&state);
            return Ok(state);
        }

        let workers = self.concurrency.get().min(jobs.len());
        debug!(
            "Running {count} jobs on {workers} workers.",
            count = jobs.len()
        );
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("bulk-pull-worker-{i}"))
            .build()
            .map_err(|e| E::ThreadPool { source: e })?;

        let cursor = AtomicUsize::new(0);
        pool.scope(|s| {
            for _ in 0..workers {
                s.spawn(|_| work(jobs, &cursor, &state, executor, reporter));
            }
        });

        reporter.run_finished(&state);
        Ok(state)
    }
}

/// Worker loop: claim the next job until there are none left.
fn work(
    jobs: &[Job],
    cursor: &AtomicUsize,
    state: &RunState,
    executor: &dyn JobExecutor,
    reporter: &dyn ProgressReporter,
) {
    loop {
        let index = cursor.fetch_add(1, Ordering::SeqCst);
        let Some(job) = jobs.get(index) else {
            trace!("Worker found no jobs left.");
            return;
        };
        state.mark_dispatched();
        reporter.job_started(job, index, state);
        let outcome = run_job(job, index, executor);
        let remaining = state.record(outcome.clone());
        reporter.job_finished(&outcome, remaining, state);
    }
}

/// Run a single job, turning executor errors and panics into a faulted outcome.
fn run_job(job: &Job, index: usize, executor: &dyn JobExecutor) -> JobOutcome {
    let now = Instant::now();
    let result = panic::catch_unwind(AssertUnwindSafe(|| executor.execute(job)));
    let elapsed = now.elapsed();
    let (status, stdout, stderr) = match result {
        Ok(Ok(output)) => (
            JobStatus::Exited(output.exit_code),
            output.stdout,
            output.stderr,
        ),
        Ok(Err(e)) => {
            error!("Job {job} failed to run.{}", log_error(&e));
            (JobStatus::Faulted(e.to_string()), String::new(), String::new())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("Job {job} panicked: {message}");
            (
                JobStatus::Faulted(format!("panicked: {message}")),
                String::new(),
                String::new(),
            )
        }
    };
    JobOutcome {
        job: job.clone(),
        index,
        status,
        stdout,
        stderr,
        elapsed,
    }
}

#[derive(Error, Debug, Display)]
/// Errors thrown by the scheduler.
pub enum SchedulerError {
    /// Failed to build the worker thread pool.
    ThreadPool {
        /// Source error.
        source: rayon::ThreadPoolBuildError,
    },
}
