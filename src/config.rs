//! Run configuration, built from CLI options and the optional YAML config file.
use std::{env, fs, io, num::NonZeroUsize, time::Duration};

use camino::Utf8PathBuf;
use color_eyre::eyre::Result;
use displaydoc::Display;
use serde_derive::Deserialize;
use thiserror::Error;
use tracing::{debug, trace};

use self::ConfigError as E;
use crate::{
    opts::{Opts, ToolchainWhen, DEFAULT_CONFIG_PATH},
    utils::files,
};

/// Directory scanned for repos if none is configured.
const DEFAULT_ROOT: &str = "~/code";
const DEFAULT_PARALLELISM: NonZeroUsize = match NonZeroUsize::new(2) {
    Some(n) => n,
    None => unreachable!(),
};
const DEFAULT_REMOTE_NAME: &str = "origin";
const DEFAULT_TOOLCHAIN_CMD: [&str; 2] = ["rustup", "update"];

/// Everything a run needs to know, fixed once the run starts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory whose immediate subdirectories are the repos to update.
    pub root: Utf8PathBuf,
    /// Number of repos to update at once.
    pub concurrency: NonZeroUsize,
    /// Name prefixes that decide which repos are started first.
    pub order: Vec<String>,
    /// Pause before exiting if anything failed.
    pub wait_after: bool,
    /// Run `git maintenance` before pulling.
    pub aggressive: bool,
    /// Remote to pull from.
    pub remote: String,
    /// Skip repos whose directory name contains any of these.
    pub excludes: Vec<String>,
    /// Per-command time limit.
    pub job_timeout: Option<Duration>,
    pub toolchain: ToolchainConfig,
}

/// The secondary toolchain update.
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    pub enabled: bool,
    pub when: ToolchainWhen,
    pub program: String,
    pub args: Vec<String>,
    /// Working directory to run the command in, the current directory if unset.
    pub dir: Option<Utf8PathBuf>,
}

/// Contents of the YAML config file. Everything is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConfigFile {
    path: Option<String>,
    parallelism: Option<NonZeroUsize>,
    order: Option<Vec<String>>,
    wait_after: Option<bool>,
    aggressive: Option<bool>,
    remote: Option<String>,
    #[serde(default)]
    excludes: Vec<String>,
    job_timeout_secs: Option<u64>,
    #[serde(default)]
    toolchain: ToolchainFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ToolchainFile {
    enabled: Option<bool>,
    when: Option<ToolchainWhen>,
    cmd: Option<Vec<String>>,
    dir: Option<String>,
}

impl RunConfig {
    /// Build the config. CLI options win over the config file, which wins over the defaults.
    pub fn from(opts: &Opts) -> Result<Self> {
        let file = ConfigFile::load(&opts.config)?;
        let run = &opts.run;

        let root = files::expand_path(
            run.path
                .as_deref()
                .or(file.path.as_deref())
                .unwrap_or(DEFAULT_ROOT),
        )?;

        let order = run
            .order
            .clone()
            .or(file.order)
            .unwrap_or_default()
            .into_iter()
            .map(|token| token.trim().to_owned())
            .filter(|token| !token.is_empty())
            .collect();

        let mut excludes = file.excludes;
        excludes.extend(run.exclude.iter().cloned());

        let mut toolchain_cmd = file
            .toolchain
            .cmd
            .unwrap_or_else(|| DEFAULT_TOOLCHAIN_CMD.map(ToOwned::to_owned).to_vec())
            .into_iter();
        let program = toolchain_cmd.next().ok_or(E::EmptyToolchainCmd)?;
        let toolchain_dir = file
            .toolchain
            .dir
            .as_deref()
            .map(files::expand_path)
            .transpose()?;

        let config = Self {
            root,
            concurrency: run
                .parallelism
                .or(file.parallelism)
                .unwrap_or(DEFAULT_PARALLELISM),
            order,
            wait_after: run.wait_after.or(file.wait_after).unwrap_or(true),
            aggressive: run.aggressive || file.aggressive.unwrap_or(false),
            remote: run
                .remote
                .clone()
                .or(file.remote)
                .unwrap_or_else(|| DEFAULT_REMOTE_NAME.to_owned()),
            excludes,
            job_timeout: run
                .job_timeout
                .or(file.job_timeout_secs)
                .map(Duration::from_secs),
            toolchain: ToolchainConfig {
                enabled: run.update_toolchain || file.toolchain.enabled.unwrap_or(false),
                when: run
                    .toolchain_when
                    .or(file.toolchain.when)
                    .unwrap_or_default(),
                program,
                args: toolchain_cmd.collect(),
                dir: toolchain_dir,
            },
        };
        debug!("Run config: {config:#?}");
        Ok(config)
    }
}

impl ConfigFile {
    /// Read the config file. A missing file is only an error if the user asked for that file.
    fn load(config_path: &str) -> Result<Self> {
        let path = if config_path == DEFAULT_CONFIG_PATH {
            default_config_path()?
        } else {
            files::expand_path(config_path)?
        };
        trace!("Reading config file '{path}'");
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound && config_path == DEFAULT_CONFIG_PATH => {
                debug!("No config file at '{path}', using defaults.");
                return Ok(Self::default());
            }
            Err(e) => return Err(E::ReadConfig { path, source: e }.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let file = serde_yaml::from_str(&contents).map_err(|e| E::InvalidYaml {
            path: path.clone(),
            source: e,
        })?;
        trace!("Config file '{path}': {file:?}");
        Ok(file)
    }
}

/// `$XDG_CONFIG_HOME/bulk-pull/bulk-pull.yaml`, with `XDG_CONFIG_HOME` defaulting to
/// `~/.config`.
fn default_config_path() -> Result<Utf8PathBuf> {
    let config_home = match env::var("XDG_CONFIG_HOME") {
        Ok(dir) if !dir.is_empty() => Utf8PathBuf::from(dir),
        _ => files::home_dir()?.join(".config"),
    };
    Ok(config_home.join("bulk-pull/bulk-pull.yaml"))
}

#[derive(Error, Debug, Display)]
/// Errors loading the configuration.
pub enum ConfigError {
    /// Failed to read config file `{path}`.
    ReadConfig {
        /// Config file path.
        path: Utf8PathBuf,
        /// Source error.
        source: io::Error,
    },
    /// Invalid yaml in config file `{path}`.
    InvalidYaml {
        /// Config file path.
        path: Utf8PathBuf,
        /// Source error.
        source: serde_yaml::Error,
    },
    /// The toolchain command in the config file is empty.
    EmptyToolchainCmd,
}
