//! Per-invocation configuration.
//!
//! The CLI layer builds one of these structs and every operation borrows it; nothing here is
//! mutated after construction. Defaults may come from a dotenv file, see `load_env_file`.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::errors::DogiError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Image reference; None means "ask".
    pub image: Option<String>,
    /// Command after `--`; empty means the image's default command.
    pub command: Vec<String>,
    pub no_user: bool,
    pub workdir: Option<PathBuf>,
    pub mount_home: bool,
    pub name: Option<String>,
    pub privileged: bool,
    pub no_cacher: bool,
    pub no_rm: bool,
    pub no_nethost: bool,
    pub runtime_nvidia: bool,
    pub gpus_all: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecConfig {
    /// Container id or name; None means "ask" (or the latest one with `recent`).
    pub container: Option<String>,
    pub command: Vec<String>,
    pub no_user: bool,
    pub workdir: Option<String>,
    pub recent: bool,
    pub dry_run: bool,
}

/// `$XDG_CONFIG_HOME/dogi`, falling back to `~/.config/dogi`.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(x) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(x).join(crate::APP_NAME));
    }
    home::home_dir().map(|h| h.join(".config").join(crate::APP_NAME))
}

/// Load `dogi.env` from the config dir. Variables already set in the environment win.
///
/// Returns the path that was loaded, if any.
pub fn load_env_file() -> Result<Option<PathBuf>> {
    let Some(dir) = config_dir() else {
        return Ok(None);
    };
    load_env_file_from(&dir.join("dogi.env"))
}

pub fn load_env_file_from(path: &Path) -> Result<Option<PathBuf>> {
    if !path.is_file() {
        return Ok(None);
    }
    dotenvy::from_path(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Some(path.to_path_buf()))
}

/// Absolute, symlink-free working directory: `requested` or the current directory.
pub fn resolve_workdir(requested: Option<&Path>) -> Result<PathBuf> {
    let raw = match requested {
        Some(p) => p.to_path_buf(),
        None => env::current_dir().context("cannot determine the current directory")?,
    };
    let canon = std::fs::canonicalize(&raw)
        .map_err(|e| DogiError::usage(format!("invalid workdir {}: {e}", raw.display())))?;
    if !canon.is_dir() {
        return Err(DogiError::usage(format!("workdir {} is not a directory", canon.display())).into());
    }
    Ok(canon)
}
