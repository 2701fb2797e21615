//! bulk-pull updates every git checkout in a directory, several at a time.
use color_eyre::eyre::Result;
use tracing::trace;

use crate::{
    config::RunConfig,
    opts::{Opts, SubCommand},
    tasks::{RunStatus, TasksAction},
};

pub mod config;
pub mod exec;
pub mod jobs;
pub mod opts;
pub mod tasks;
pub mod utils;

/// Run `bulk-pull` with provided [Opts][] struct.
///
/// Returns [`RunStatus::Failed`] if any repo or the toolchain failed to update. Errors that
/// stop anything from running (e.g. a broken config file) are returned as `Err`.
///
/// [Opts]: crate::opts::Opts
pub fn run(opts: &Opts) -> Result<RunStatus> {
    trace!("Options: {opts:?}");
    match &opts.cmd {
        Some(SubCommand::Completions(cmd_opts)) => {
            tasks::completions::run(cmd_opts);
            Ok(RunStatus::Passed)
        }
        Some(SubCommand::List) => {
            let config = RunConfig::from(opts)?;
            tasks::run(&config, TasksAction::List)
        }
        Some(SubCommand::Run) | None => {
            let config = RunConfig::from(opts)?;
            tasks::run(&config, TasksAction::Run)
        }
    }
}
