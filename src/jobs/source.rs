//! Finding the jobs to run.

use std::{fs, io};

use camino::{Utf8Path, Utf8PathBuf};
use displaydoc::Display;
use thiserror::Error;
use tracing::{debug, trace, warn};

use self::SourceError as E;
use super::Job;
use crate::utils::files::to_utf8_path;

/// Produces the jobs for a run, in a stable order.
pub trait JobSource {
    fn jobs(&self) -> Result<Vec<Job>, SourceError>;
}

/// Finds git checkouts that are immediate children of `root`.
#[derive(Debug)]
pub struct RepoScanner<'a> {
    root: &'a Utf8Path,
    /// Skip repos whose directory name contains any of these substrings, e.g. `archive`.
    excludes: &'a [String],
}

impl<'a> RepoScanner<'a> {
    pub fn new(root: &'a Utf8Path, excludes: &'a [String]) -> Self {
        Self { root, excludes }
    }

    /// Only the part of the path below the root is matched, so an exclude that happens to
    /// appear in the root itself doesn't drop every repo.
    fn is_excluded(&self, path: &Utf8Path) -> bool {
        let relative = path.strip_prefix(self.root).unwrap_or(path);
        self.excludes
            .iter()
            .any(|exclude| relative.as_str().contains(exclude.as_str()))
    }
}

impl JobSource for RepoScanner<'_> {
    /// Subdirectories of the root containing a `.git` entry, sorted by path. `.git` may be a
    /// file, as it is for worktrees and submodules.
    fn jobs(&self) -> Result<Vec<Job>, SourceError> {
        let root = self.root;
        if !root.is_dir() {
            return Err(E::InvalidRoot {
                path: root.to_owned(),
            });
        }
        trace!("Searching in '{root}'");

        let mut repo_paths: Vec<Utf8PathBuf> = Vec::new();
        for entry in fs::read_dir(root).map_err(|e| E::ReadDir {
            path: root.to_owned(),
            source: e,
        })? {
            let entry = entry.map_err(|e| E::ReadDir {
                path: root.to_owned(),
                source: e,
            })?;
            let path = entry.path();
            let Ok(path) = to_utf8_path(&path).map(Utf8Path::to_path_buf) else {
                warn!("Skipping non UTF-8 path {path:?}");
                continue;
            };
            if !path.is_dir() {
                continue;
            }
            if !path.join(".git").exists() {
                trace!("Skipping '{path}' as it isn't a git checkout.");
                continue;
            }
            if self.is_excluded(&path) {
                debug!("Skipping '{path}' as it matches an exclude.");
                continue;
            }
            repo_paths.push(path);
        }
        repo_paths.sort();
        debug!("Found repo paths: {repo_paths:?}");
        Ok(repo_paths.into_iter().map(Job::new).collect())
    }
}

#[derive(Error, Debug, Display)]
/// Errors finding jobs.
pub enum SourceError {
    /// Root path `{path}` doesn't exist or isn't a directory.
    InvalidRoot {
        /// The configured root.
        path: Utf8PathBuf,
    },
    /// Error reading directory `{path}`.
    ReadDir {
        /// Directory being read.
        path: Utf8PathBuf,
        /// Source error.
        source: io::Error,
    },
}
