//! `dogi prune`: remove stopped containers, dangling images and unused volumes.

use anyhow::{Context, Result};

use super::runtime::DockerCli;
use crate::util::last_line;

const PRUNES: &[(&str, &[&str])] = &[
    ("containers", &["container", "prune", "-f"]),
    ("images", &["image", "prune", "-f"]),
    ("volumes", &["volume", "prune", "-f"]),
];

/// Run each prune and return `(what, summary)` with docker's last output line as summary.
pub fn prune(docker: &dyn DockerCli) -> Result<Vec<(&'static str, String)>> {
    let mut out = Vec::with_capacity(PRUNES.len());
    for (what, args) in PRUNES {
        let text = docker
            .capture(args)
            .with_context(|| format!("failed to prune {what}"))?;
        out.push((*what, last_line(&text).to_string()));
    }
    Ok(out)
}
