//! Dispatch ordering of jobs by priority prefix.

use std::cmp::Ordering;

use tracing::{debug, trace};

use super::Job;

/// Width that job names are padded/truncated to before matching priority prefixes.
const KEY_WIDTH: usize = 32;

/**
Orders jobs so that those whose name starts with an earlier priority token are dispatched
first. Jobs matching no token come after all jobs that match one. Ties are broken by comparing
the full paths.
*/
#[derive(Debug)]
pub struct PriorityOrderer<'a> {
    tokens: &'a [String],
}

impl<'a> PriorityOrderer<'a> {
    /// Returns `None` if there are no tokens, in which case jobs shouldn't be reordered.
    pub fn new(tokens: &'a [String]) -> Option<Self> {
        if tokens.is_empty() {
            None
        } else {
            Some(Self { tokens })
        }
    }

    /// Three-way comparison of two jobs. Never fails: a job whose name can't be used as a key
    /// is treated as having no priority, and equal priorities compare by full path.
    pub fn compare(&self, left: &Job, right: &Job) -> Ordering {
        let by_rank = match (self.rank(left), self.rank(right)) {
            (Some(l), Some(r)) => l.cmp(&r),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_rank.then_with(|| left.path().cmp(right.path()))
    }

    /// Index of the first token the job's key starts with.
    fn rank(&self, job: &Job) -> Option<usize> {
        let key = sort_key(job)?;
        self.tokens
            .iter()
            .position(|token| key.starts_with(token.as_str()))
    }
}

/// Final path component, padded with spaces or truncated to [`KEY_WIDTH`] characters.
fn sort_key(job: &Job) -> Option<String> {
    let name = job.path().file_name()?;
    let mut key: String = name.chars().take(KEY_WIDTH).collect();
    let len = key.chars().count();
    key.extend(std::iter::repeat(' ').take(KEY_WIDTH - len));
    Some(key)
}

/// Sort jobs into dispatch order. Leaves them in source order if there are no priority tokens.
pub fn order_jobs(jobs: &mut [Job], tokens: &[String]) {
    let Some(orderer) = PriorityOrderer::new(tokens) else {
        trace!("No priority tokens, keeping source order.");
        return;
    };
    jobs.sort_by(|left, right| orderer.compare(left, right));
    debug!("Dispatch order: {jobs:?}");
}
