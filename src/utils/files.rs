//! Utilities for dealing with paths.

use camino::Utf8Path;
use camino::Utf8PathBuf;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing::warn;

/**
Empty home directory. sshd and friends use it to deny a home directory, which would make
defaults like `~/code` meaningless.
*/
const EMPTY_HOME_DIR: &str = "/var/empty";

/// Return path to user's home directory if we can discover it.
pub fn home_dir() -> Result<Utf8PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| eyre!("Expected to be able to calculate the user's home directory."))?;
    let home_dir = Utf8PathBuf::try_from(home_dir)?;
    if home_dir == EMPTY_HOME_DIR {
        warn!(
            "User home directory appears to be set to {EMPTY_HOME_DIR}. Paths relative to ~ are \
             unlikely to exist."
        );
    }
    Ok(home_dir)
}

/// Convert a std path to a `Utf8Path`.
pub fn to_utf8_path(path: &std::path::Path) -> Result<&Utf8Path> {
    Utf8Path::from_path(path).ok_or_else(|| eyre!("Invalid UTF-8 in path {path:?}"))
}

/// Expand `~` and environment variables in a path passed by the user.
pub fn expand_path(path: &str) -> Result<Utf8PathBuf> {
    let home_dir = home_dir()?;
    let expanded = shellexpand::full_with_context(
        path,
        || Some(home_dir.as_str()),
        |var| std::env::var(var).map(Some),
    )
    .map_err(|e| eyre!("Failed to expand '{path}', is '{}' set? {}", e.var_name, e.cause))?;
    Ok(Utf8PathBuf::from(expanded.into_owned()))
}
