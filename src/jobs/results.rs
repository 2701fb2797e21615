//! Shared state that workers write job results into.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

use super::{Job, JobOutcome, JobStatus};

/// A job that didn't succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub job: Job,
    pub status: JobStatus,
}

/**
Collects failed jobs from concurrent workers.

Failures are keyed by dispatch index so the final report comes out in dispatch order no matter
which order the workers finished in.
*/
#[derive(Debug, Default)]
pub struct ResultAggregator {
    failures: Mutex<BTreeMap<usize, Failure>>,
    any_failed: AtomicBool,
}

impl ResultAggregator {
    pub fn record_failure(&self, index: usize, failure: Failure) {
        lock(&self.failures).insert(index, failure);
        self.any_failed.store(true, Ordering::SeqCst);
    }

    pub fn any_failed(&self) -> bool {
        self.any_failed.load(Ordering::SeqCst)
    }

    /// Failures in dispatch order.
    pub fn failures(&self) -> Vec<Failure> {
        lock(&self.failures).values().cloned().collect()
    }

    pub fn failed_jobs(&self) -> Vec<Job> {
        lock(&self.failures)
            .values()
            .map(|failure| failure.job.clone())
            .collect()
    }
}

/// Progress and results of one scheduler run.
#[derive(Debug)]
pub struct RunState {
    total: usize,
    dispatched: AtomicUsize,
    completed: AtomicUsize,
    results: ResultAggregator,
    outcomes: Mutex<Vec<JobOutcome>>,
}

impl RunState {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            total,
            dispatched: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            results: ResultAggregator::default(),
            outcomes: Mutex::new(Vec::with_capacity(total)),
        }
    }

    pub(crate) fn mark_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a finished job, returning how many jobs are still not completed.
    pub(crate) fn record(&self, outcome: JobOutcome) -> usize {
        if !outcome.success() {
            self.results.record_failure(
                outcome.index,
                Failure {
                    job: outcome.job.clone(),
                    status: outcome.status.clone(),
                },
            );
        }
        lock(&self.outcomes).push(outcome);
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        self.total.saturating_sub(completed)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn any_failed(&self) -> bool {
        self.results.any_failed()
    }

    pub fn results(&self) -> &ResultAggregator {
        &self.results
    }

    /// Outcomes in dispatch order.
    pub fn outcomes(&self) -> Vec<JobOutcome> {
        let mut outcomes = lock(&self.outcomes).clone();
        outcomes.sort_by_key(|outcome| outcome.index);
        outcomes
    }
}

/// A worker that panicked while holding a lock has already been recorded as a failure, so the
/// data behind the lock is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
