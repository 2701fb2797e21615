//! Command-line options.

use std::num::NonZeroUsize;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde_derive::Deserialize;
use tracing::level_filters::LevelFilter;

/// Config file location used when `--config` isn't passed.
pub(crate) const DEFAULT_CONFIG_PATH: &str = "$XDG_CONFIG_HOME/bulk-pull/bulk-pull.yaml";

/// Builds the Opts struct from CLI input and from environment variable input.
#[must_use]
pub fn parse() -> Opts {
    Opts::parse()
}

/**
bulk-pull updates every git checkout directly inside a directory, running `git pull --prune`
in several of them at once.

Running `bulk-pull` without a subcommand runs `bulk-pull run`. Repos are started in path order,
or in the order given by `--order` prefixes. When anything fails the failed repos are listed at
the end and the exit code is 1.

Defaults for every option can be set in the YAML config file, e.g.:

```yaml
path: ~/code
parallelism: 4
order: [mega, ms_]
toolchain:
  enabled: true
  cmd: [rustup, update]
```
*/
#[derive(Debug, Parser)]
#[command(version)]
pub struct Opts {
    /// Set the logging level explicitly (options: Off, Error, Warn, Info,
    /// Debug, Trace).
    #[arg(long, short = 'l', default_value = "info", env = "LOG_LEVEL", global = true)]
    pub log_level: LevelFilter,
    /// Whether to color terminal output.
    #[arg(long, default_value = "auto", ignore_case = true, value_enum, global = true)]
    pub color: Color,
    /// Path to the bulk-pull.yaml config file.
    #[arg(long, short = 'c', default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub(crate) config: String,
    #[command(flatten)]
    pub(crate) run: RunOptions,
    #[command(subcommand)]
    pub(crate) cmd: Option<SubCommand>,
}

/// Settings for colouring output.
/// Auto: Colour on if stderr isatty, else off.
/// Always: Always enable colours.
/// Never: Never enable colours.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Color {
    Auto,
    Always,
    Never,
}

// Optional subcommand (e.g. the "list" in "bulk-pull list").
#[derive(Debug, Subcommand)]
pub(crate) enum SubCommand {
    /// Update every repo. If you don't provide a subcommand this is the default action.
    Run,
    /// Print the repos that would be updated, in the order they would be started.
    List,
    /// Generate shell completions to stdout.
    Completions(CompletionsOptions),
}

/// Options for finding and updating repos. Unset options fall back to the config file, then to
/// built-in defaults.
#[derive(Debug, Default, clap::Args)]
pub(crate) struct RunOptions {
    /// Directory whose immediate subdirectories are the repos to update [default: ~/code].
    #[arg(long, global = true, env = "BULK_PULL_PATH")]
    pub(crate) path: Option<String>,
    /// Number of repos to update at once [default: 2].
    #[arg(long, short = 'j', global = true, alias = "parallellism")]
    pub(crate) parallelism: Option<NonZeroUsize>,
    /// Comma-separated name prefixes. Repos whose name starts with an earlier prefix are
    /// started first, repos matching no prefix are started last.
    #[arg(long, global = true, value_delimiter = ',')]
    pub(crate) order: Option<Vec<String>>,
    /// Wait for Enter before exiting if anything failed (only when stdin is a terminal)
    /// [default: true].
    #[arg(long, global = true, value_name = "BOOL", alias = "waitAfter")]
    pub(crate) wait_after: Option<bool>,
    /// Run `git maintenance run --task gc` in each repo before pulling.
    #[arg(long, global = true)]
    pub(crate) aggressive: bool,
    /// Remote to pull from [default: origin].
    #[arg(long, global = true)]
    pub(crate) remote: Option<String>,
    /// Skip repos whose directory name contains this value, e.g. 'archive'. Can be passed
    /// more than once.
    #[arg(long, global = true)]
    pub(crate) exclude: Vec<String>,
    /// Kill a repo's update if it takes longer than this many seconds [default: no limit].
    #[arg(long, global = true, value_name = "SECONDS")]
    pub(crate) job_timeout: Option<u64>,
    /// Also update the toolchain (runs the config file's `toolchain.cmd`, by default
    /// `rustup update`).
    #[arg(long, global = true)]
    pub(crate) update_toolchain: bool,
    /// When to update the toolchain relative to the repos [default: after].
    #[arg(long, global = true, value_enum)]
    pub(crate) toolchain_when: Option<ToolchainWhen>,
}

/// When to run the toolchain update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolchainWhen {
    /// Once every repo has been updated.
    #[default]
    After,
    /// At the same time as the repos.
    Alongside,
}

#[derive(Debug, clap::Args)]
pub(crate) struct CompletionsOptions {
    /// Shell for which to generate completions.
    pub(crate) shell: Shell,
}
