use std::fs;

use camino::Utf8Path;
use color_eyre::Result;
use testutils::ensure_eq;
use testutils::ensure_utils;
use testutils::AssertCmdExt;

/// Lay out a root with some checkouts and some things that aren't.
fn make_root(temp_dir: &Utf8Path) -> Result<()> {
    let root = temp_dir.join("code");
    for name in ["zeta", "mega-sdk", "alpha", "ms_tools", "megaphone", "old-archive"] {
        testutils::fake_repo(&root, name)?;
    }
    fs::create_dir_all(root.join("not_a_repo"))?;
    fs::write(root.join("notes.txt"), "")?;
    Ok(())
}

fn list(temp_dir: &Utf8Path, args: &[&str]) -> Result<Vec<String>> {
    let mut cmd = testutils::crate_binary_cmd("bulk-pull", temp_dir)?;
    cmd.args(["list", "--path", temp_dir.join("code").as_str()].iter());
    cmd.args(args);
    let assert = cmd.assert().eprint_stdout_stderr().try_success()?;
    let root = temp_dir.join("code");
    Ok(assert
        .stdout_string()
        .lines()
        .map(|line| line.trim_start_matches(root.as_str()).trim_start_matches('/').to_owned())
        .collect())
}

#[test]
fn test_list_lexical_order() -> Result<()> {
    let temp_dir = testutils::temp_dir("bulk-pull", testutils::function_path!())?;
    make_root(&temp_dir)?;
    ensure_eq!(
        list(&temp_dir, &[])?,
        [
            "alpha",
            "mega-sdk",
            "megaphone",
            "ms_tools",
            "old-archive",
            "zeta"
        ]
    );
    Ok(())
}

#[test]
fn test_list_priority_order() -> Result<()> {
    let temp_dir = testutils::temp_dir("bulk-pull", testutils::function_path!())?;
    make_root(&temp_dir)?;
    ensure_eq!(
        list(&temp_dir, &["--order", "ms_,mega"])?,
        [
            "ms_tools",
            "mega-sdk",
            "megaphone",
            "alpha",
            "old-archive",
            "zeta"
        ]
    );
    ensure_eq!(
        list(&temp_dir, &["--order", "ms_,mega", "--exclude", "archive"])?,
        ["ms_tools", "mega-sdk", "megaphone", "alpha", "zeta"]
    );
    Ok(())
}

/// Order and excludes can come from the config file, CLI options override them.
#[test]
fn test_list_config_file() -> Result<()> {
    let temp_dir = testutils::temp_dir("bulk-pull", testutils::function_path!())?;
    make_root(&temp_dir)?;
    let config_path = temp_dir.join("bulk-pull.yaml");
    fs::write(
        &config_path,
        "order: [zeta]\nexcludes: [mega]\nparallelism: 3\n",
    )?;

    ensure_eq!(
        list(&temp_dir, &["--config", config_path.as_str()])?,
        ["zeta", "alpha", "ms_tools", "old-archive"]
    );
    ensure_eq!(
        list(&temp_dir, &["--config", config_path.as_str(), "--order", "old"])?,
        ["old-archive", "alpha", "ms_tools", "zeta"]
    );
    Ok(())
}

#[test]
fn test_list_invalid_root() -> Result<()> {
    let temp_dir = testutils::temp_dir("bulk-pull", testutils::function_path!())?;
    let mut cmd = testutils::crate_binary_cmd("bulk-pull", &temp_dir)?;
    cmd.args(["list", "--path", temp_dir.join("missing").as_str()].iter());
    let assert = cmd.assert().eprint_stdout_stderr().try_failure()?;
    ensure_utils::contains(
        &assert.stderr_string(),
        "doesn't exist or isn't a directory",
    )?;
    Ok(())
}

/// Excludes only look below the root, so a root under e.g. `archive_mirror/` still lists repos.
#[test]
fn test_list_exclude_matching_root() -> Result<()> {
    let temp_dir = testutils::temp_dir("bulk-pull", testutils::function_path!())?;
    let root = temp_dir.join("archive_mirror/code");
    testutils::fake_repo(&root, "app")?;
    testutils::fake_repo(&root, "old-archive")?;

    let mut cmd = testutils::crate_binary_cmd("bulk-pull", &temp_dir)?;
    cmd.args(["list", "--path", root.as_str(), "--exclude", "archive"].iter());
    let assert = cmd.assert().eprint_stdout_stderr().try_success()?;
    ensure_eq!(assert.stdout_string(), format!("{root}/app\n"));
    Ok(())
}
