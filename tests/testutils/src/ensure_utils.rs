use crate::ensure_eq;
use camino::Utf8Path;
use color_eyre::eyre::ensure;
use color_eyre::Result;
use std::fs;

/// Error if there is not a file at the path, or if the contents don't match.
pub fn file(path: &Utf8Path, contents: &str) -> Result<()> {
    ensure!(
        path.is_file(),
        "Expected path to be a file.\n  Path: {path}\n  Exists: {}\n  Is directory: {}",
        path.exists(),
        path.is_dir(),
    );

    let actual_contents = fs::read_to_string(path)?;
    ensure_eq!(
        contents,
        actual_contents,
        "\n  Expected file contents don't match actual file contents..\n  Expected: \
         \n<<<\n{contents}>>>\n  Actual: \n<<<\n{actual_contents}>>>",
    );
    Ok(())
}

/// Error if the text does not contain the expected pattern.
pub fn contains_all(text: &str, patterns: &[&str]) -> Result<()> {
    for pattern in patterns {
        contains(text, pattern)?;
    }
    Ok(())
}

/// Error if the text does not contain the expected pattern.
pub fn contains(text: &str, pattern: &str) -> Result<()> {
    ensure!(
        text.contains(pattern),
        "\n  Expected text to contain pattern.\n  Pattern: {pattern:?}\n  Text: <<<{text}>>>",
    );
    Ok(())
}

/// Error if the text contains the pattern.
pub fn not_contains(text: &str, pattern: &str) -> Result<()> {
    ensure!(
        !text.contains(pattern),
        "\n  Expected text not to contain pattern.\n  Pattern: {pattern:?}\n  Text: <<<{text}>>>",
    );
    Ok(())
}
