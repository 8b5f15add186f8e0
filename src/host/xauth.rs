//! X11 cookie export for GUI applications inside the container.
//!
//! The cookie of the current display is listed with `xauth nlist`, its family rewritten to the
//! wildcard family (`ffff`) so it matches whatever hostname the container reports, and merged
//! into a fresh file with `xauth -f <file> nmerge -`. The file is copied to `/.xauth` in the
//! container, where `XAUTHORITY` points.

use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use which::which;

use crate::errors::DogiError;
use crate::util::fs::persist_temp_file;

pub const DEFAULT_DISPLAY: &str = ":0";

/// `DISPLAY` from the environment, or `:0` with a warning.
pub fn display_from_env() -> String {
    match env::var("DISPLAY") {
        Ok(d) if !d.trim().is_empty() => d,
        _ => {
            crate::warn_print(&format!("DISPLAY is not set, using {DEFAULT_DISPLAY}"));
            DEFAULT_DISPLAY.to_string()
        }
    }
}

/// Replace the 4 hex digit family of each `nlist` entry with the wildcard family.
pub fn wildcard_family(nlist: &str) -> String {
    let mut out = String::with_capacity(nlist.len());
    for line in nlist.lines().filter(|l| !l.trim().is_empty()) {
        match line.char_indices().nth(4) {
            Some((idx, _)) => {
                out.push_str("ffff");
                out.push_str(&line[idx..]);
            }
            None => out.push_str(line),
        }
        out.push('\n');
    }
    out
}

pub struct XauthForwarder {
    xauth: PathBuf,
}

impl XauthForwarder {
    pub fn locate() -> Result<Self> {
        let xauth = which("xauth").map_err(|_| DogiError::missing_tool("xauth"))?;
        Ok(XauthForwarder { xauth })
    }

    pub fn path(&self) -> &Path {
        &self.xauth
    }

    fn nlist(&self, dpy: &str) -> Result<String> {
        let out = Command::new(&self.xauth)
            .arg("nlist")
            .arg(dpy)
            .stdin(Stdio::null())
            .output()
            .context("failed to run xauth nlist")?;
        if !out.status.success() {
            anyhow::bail!(
                "xauth nlist {dpy} failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }

    fn nmerge(&self, file: &Path, entries: &str) -> Result<()> {
        let mut child = Command::new(&self.xauth)
            .arg("-f")
            .arg(file)
            .arg("nmerge")
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("failed to run xauth nmerge")?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(entries.as_bytes())
                .context("failed to feed xauth nmerge")?;
        }
        let out = child.wait_with_output().context("xauth nmerge did not finish")?;
        if !out.status.success() {
            anyhow::bail!(
                "xauth nmerge failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            );
        }
        Ok(())
    }

    /// Write a cookie file for display `dpy` and return its host path.
    pub fn export_cookie(&self, dpy: &str) -> Result<PathBuf> {
        let entries = wildcard_family(&self.nlist(dpy)?);
        if entries.is_empty() {
            crate::warn_print(&format!(
                "no X11 cookie found for display {dpy}; GUI applications may fail to connect"
            ));
        }
        let file = persist_temp_file(".dogi", ".xauth", b"")
            .context("failed to create the xauth cookie file")?;
        self.nmerge(&file, &entries)?;
        tracing::debug!(file = %file.display(), display = dpy, "exported X11 cookie");
        Ok(file)
    }
}
