//! Self update from the upstream repository.

use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use which::which;

use crate::errors::DogiError;

pub const REPOSITORY: &str = env!("CARGO_PKG_REPOSITORY");
pub const BRANCH: &str = "main";

/// Commit hash from `git ls-remote <repo> <branch>` output.
pub fn parse_ls_remote(out: &str) -> Option<String> {
    let hash = out.lines().next()?.split_whitespace().next()?;
    (hash.len() >= 7 && hash.chars().all(|c| c.is_ascii_hexdigit())).then(|| hash.to_string())
}

fn no_internet(what: &str, detail: &str) -> DogiError {
    DogiError::docker_with(
        format!("{what} failed: {}", detail.trim()),
        "check your network connection (no internet?)",
    )
}

/// Latest upstream commit.
pub fn latest_commit() -> Result<String> {
    let git = which("git").map_err(|_| DogiError::missing_tool("git"))?;
    let out = Command::new(git)
        .args(["ls-remote", REPOSITORY, BRANCH])
        .stdin(Stdio::null())
        .output()
        .context("failed to run git ls-remote")?;
    if !out.status.success() {
        return Err(no_internet("git ls-remote", &String::from_utf8_lossy(&out.stderr)).into());
    }
    parse_ls_remote(&String::from_utf8_lossy(&out.stdout))
        .ok_or_else(|| anyhow::anyhow!("{REPOSITORY} has no branch {BRANCH}"))
}

pub fn install_args(rev: &str) -> Vec<String> {
    vec![
        "install".into(),
        "--locked".into(),
        "--force".into(),
        "--git".into(),
        REPOSITORY.into(),
        "--rev".into(),
        rev.into(),
    ]
}

/// Reinstall dogi at the latest upstream commit with `cargo install`.
pub fn update(dry_run: bool) -> Result<()> {
    let use_err = crate::color_enabled_stderr();
    let rev = latest_commit()?;
    crate::log_info_stderr(
        use_err,
        &format!("dogi: latest commit hash: {}", crate::paint(use_err, crate::color::GRAY, &rev)),
    );

    let args = install_args(&rev);
    let mut preview = vec!["cargo".to_string()];
    preview.extend(args.iter().cloned());
    crate::log_info_stderr(use_err, &format!("dogi: {}", crate::shell_join(&preview)));
    if dry_run {
        return Ok(());
    }

    let cargo = which("cargo").map_err(|_| DogiError::missing_tool("cargo"))?;
    let out = Command::new(cargo)
        .args(&args)
        .stdin(Stdio::null())
        .output()
        .context("failed to run cargo install")?;
    if !out.status.success() {
        crate::log_error_stderr(use_err, "dogi: update FAILED");
        return Err(no_internet("cargo install", &String::from_utf8_lossy(&out.stderr)).into());
    }
    crate::log_info_stderr(
        use_err,
        &format!("dogi: {} check the new version with: dogi --version", crate::paint(use_err, crate::color::GREEN, "OK")),
    );
    Ok(())
}
