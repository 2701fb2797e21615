//! Updating every repo under the root with `git pull`.

use std::time::Duration;

use color_eyre::eyre::Result;
use tracing::{debug, info, warn, Level};

use crate::{
    config::RunConfig,
    exec::{cmd_log, format_command, run_captured},
    jobs::{
        order::order_jobs,
        progress::LogReporter,
        results::RunState,
        scheduler::BoundedScheduler,
        source::{JobSource, RepoScanner, SourceError},
        CommandOutput, Job, JobError, JobExecutor,
    },
    utils::errors::log_error,
};

/// Pulls the configured remote into a repo, optionally running `git maintenance` first.
#[derive(Debug)]
pub struct GitPullExecutor<'a> {
    remote: &'a str,
    aggressive: bool,
    timeout: Option<Duration>,
}

impl<'a> GitPullExecutor<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self {
            remote: &config.remote,
            aggressive: config.aggressive,
            timeout: config.job_timeout,
        }
    }

    /// Run a git command in the repo. Prompts for credentials would hang a worker forever, so
    /// git is told to fail instead.
    fn git(&self, job: &Job, args: &[&str]) -> Result<CommandOutput, JobError> {
        let expression = cmd_log(Level::DEBUG, "git", args)
            .dir(job.path().as_std_path())
            .env("GIT_TERMINAL_PROMPT", "0");
        run_captured(&expression, &format_command("git", args), self.timeout)
    }

    fn maintenance(&self, job: &Job) {
        match self.git(job, &["maintenance", "run", "--task", "gc"]) {
            Ok(output) if output.exit_code == 0 => debug!("{job}: git maintenance done."),
            Ok(output) => warn!(
                "{job}: git maintenance exited with code {code}, pulling anyway.\n{stderr}",
                code = output.exit_code,
                stderr = output.stderr.trim_end(),
            ),
            Err(e) => warn!("{job}: git maintenance didn't run, pulling anyway.{}", log_error(&e)),
        }
    }
}

impl JobExecutor for GitPullExecutor<'_> {
    fn execute(&self, job: &Job) -> Result<CommandOutput, JobError> {
        if self.aggressive {
            self.maintenance(job);
        }
        self.git(
            job,
            &["pull", "--progress", "-v", "--prune", "--no-rebase", self.remote],
        )
    }
}

/// Repos under the root, in the order they should be started.
pub fn find_jobs(config: &RunConfig) -> Result<Vec<Job>, SourceError> {
    let mut jobs = RepoScanner::new(&config.root, &config.excludes).jobs()?;
    order_jobs(&mut jobs, &config.order);
    Ok(jobs)
}

/// Update every repo under the root.
pub fn run(config: &RunConfig) -> Result<RunState> {
    let jobs = find_jobs(config)?;
    info!(
        "Updating {count} repos in '{root}', {concurrency} at a time.",
        count = jobs.len(),
        root = config.root,
        concurrency = config.concurrency,
    );
    let state = BoundedScheduler::new(config.concurrency).run(
        &jobs,
        &GitPullExecutor::new(config),
        &LogReporter::new("repo"),
    )?;
    Ok(state)
}
