use std::io::{self, BufRead, IsTerminal, Write};

use color_eyre::eyre::Result;
use tracing::{debug, error, info, warn};

use crate::{config::RunConfig, opts::ToolchainWhen, utils::errors::log_error};

pub mod completions;
pub mod git;
pub mod toolchain;

/// What to do with the repos.
#[derive(Debug, Clone, Copy)]
pub enum TasksAction {
    /// Update them.
    Run,
    /// Just list them, in the order they would be updated.
    List,
}

/// Whether everything that ran succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum RunStatus {
    Passed,
    Failed,
}

impl RunStatus {
    fn from_passed(passed: bool) -> Self {
        if passed {
            Self::Passed
        } else {
            Self::Failed
        }
    }
}

/// Run or list the repos under the configured root.
pub fn run(config: &RunConfig, action: TasksAction) -> Result<RunStatus> {
    match action {
        TasksAction::List => {
            list(config)?;
            Ok(RunStatus::Passed)
        }
        TasksAction::Run => {
            let status = update(config);
            if status == RunStatus::Failed && config.wait_after {
                wait_for_enter()?;
            }
            Ok(status)
        }
    }
}

fn list(config: &RunConfig) -> Result<()> {
    let jobs = git::find_jobs(config)?;
    let mut stdout = io::stdout().lock();
    for job in &jobs {
        writeln!(stdout, "{job}")?;
    }
    Ok(())
}

/// Update the repos, and the toolchain if enabled. Failures are logged as they happen.
fn update(config: &RunConfig) -> RunStatus {
    let toolchain = &config.toolchain;
    let (repos_passed, toolchain_passed) = if !toolchain.enabled {
        (update_repos(config), true)
    } else {
        match toolchain.when {
            ToolchainWhen::After => {
                let repos_passed = update_repos(config);
                (repos_passed, update_toolchain(config))
            }
            ToolchainWhen::Alongside => {
                rayon::join(|| update_repos(config), || update_toolchain(config))
            }
        }
    };
    debug!("Repos passed: {repos_passed}, toolchain passed: {toolchain_passed}");
    RunStatus::from_passed(repos_passed && toolchain_passed)
}

/// Returns whether every repo was updated. A bad root counts as a failure.
fn update_repos(config: &RunConfig) -> bool {
    match git::run(config) {
        Ok(state) => !state.any_failed(),
        Err(e) => {
            error!("Failed to update repos.{}", log_error(&e));
            false
        }
    }
}

fn update_toolchain(config: &RunConfig) -> bool {
    match toolchain::run(config) {
        Ok(state) => {
            if !state.any_failed() {
                info!("Toolchain updated.");
            }
            !state.any_failed()
        }
        Err(e) => {
            error!("Failed to update toolchain.{}", log_error(&e));
            false
        }
    }
}

/// Block until the user presses Enter, so failures stay on screen. Does nothing if nobody is
/// there to press it.
fn wait_for_enter() -> Result<()> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        debug!("Not waiting for Enter as stdin isn't a terminal.");
        return Ok(());
    }
    warn!("Some updates failed, press Enter to exit.");
    stdin.lock().read_line(&mut String::new())?;
    Ok(())
}
