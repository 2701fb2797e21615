//! The optional toolchain update run alongside or after the repos.

use std::{env, num::NonZeroUsize, time::Duration};

use camino::Utf8PathBuf;
use color_eyre::eyre::Result;
use tracing::{info, Level};

use crate::{
    config::{RunConfig, ToolchainConfig},
    exec::{cmd_log, format_command, run_captured},
    jobs::{
        progress::LogReporter, results::RunState, scheduler::BoundedScheduler, CommandOutput, Job,
        JobError, JobExecutor,
    },
};

/// Runs the configured toolchain command, e.g. `rustup update`.
#[derive(Debug)]
pub struct ToolchainExecutor<'a> {
    toolchain: &'a ToolchainConfig,
    timeout: Option<Duration>,
}

impl<'a> ToolchainExecutor<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self {
            toolchain: &config.toolchain,
            timeout: config.job_timeout,
        }
    }
}

impl JobExecutor for ToolchainExecutor<'_> {
    fn execute(&self, job: &Job) -> Result<CommandOutput, JobError> {
        let ToolchainConfig { program, args, .. } = self.toolchain;
        let expression =
            cmd_log(Level::DEBUG, program.as_str(), args).dir(job.path().as_std_path());
        run_captured(&expression, &format_command(program, args), self.timeout)
    }
}

/// Update the toolchain, as a single job through the same scheduler as the repos.
pub fn run(config: &RunConfig) -> Result<RunState> {
    let toolchain = &config.toolchain;
    info!(
        "Updating toolchain with '{}'.",
        format_command(&toolchain.program, &toolchain.args)
    );
    let dir = match &toolchain.dir {
        Some(dir) => dir.clone(),
        None => Utf8PathBuf::try_from(env::current_dir()?)?,
    };
    let jobs = [Job::new(dir)];
    let state = BoundedScheduler::new(NonZeroUsize::MIN).run(
        &jobs,
        &ToolchainExecutor::new(config),
        &LogReporter::new("toolchain"),
    )?;
    Ok(state)
}
