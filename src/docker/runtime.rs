#![allow(clippy::module_name_repetitions)]
//! Docker runtime discovery and invocation.
//!
//! Every docker interaction goes through `DockerCli` so flows can be driven by a recording fake
//! in tests; `Docker` is the real implementation backed by `std::process::Command`.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Result;
use which::which;

use crate::errors::DogiError;

/// Result of one finished docker invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmdOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        CmdOutput {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        CmdOutput {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

pub trait DockerCli {
    /// Path of the docker executable (used for the final process replacement).
    fn program(&self) -> &Path;

    /// Run `docker <args>` to completion and capture its output. Only spawn failures are errors.
    fn invoke(&self, args: &[&str]) -> io::Result<CmdOutput>;

    /// Run and return stdout; a non-zero exit becomes a `DogiError::Docker` quoting stderr.
    fn capture(&self, args: &[&str]) -> Result<String> {
        let out = self.invoke(args)?;
        if out.success {
            return Ok(out.stdout);
        }
        let detail = out.stderr.trim();
        Err(DogiError::docker(format!(
            "docker {} failed{}{}",
            args.join(" "),
            out.code.map(|c| format!(" (exit {c})")).unwrap_or_default(),
            if detail.is_empty() {
                String::new()
            } else {
                format!(": {detail}")
            }
        ))
        .into())
    }
}

/// Locate the docker binary: `DOGI_DOCKER` when set, otherwise `docker` on PATH.
pub fn container_runtime_path() -> io::Result<PathBuf> {
    if let Ok(v) = env::var("DOGI_DOCKER") {
        let v = v.trim();
        if !v.is_empty() {
            return which(v).map_err(|e| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("DOGI_DOCKER={v} is not executable: {e}"),
                )
            });
        }
    }
    which("docker").map_err(|_| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "Docker is required but was not found in PATH.",
        )
    })
}

#[derive(Debug, Clone)]
pub struct Docker {
    path: PathBuf,
}

impl Docker {
    pub fn new(path: PathBuf) -> Self {
        Docker { path }
    }

    /// Fails with `DogiError::MissingTool` when docker cannot be found.
    pub fn locate() -> Result<Self> {
        match container_runtime_path() {
            Ok(path) => Ok(Docker { path }),
            Err(e) => Err(DogiError::MissingTool {
                tool: "docker".into(),
                hint: Some(format!(
                    "{e} Install docker (https://docs.docker.com/engine/install/) or set DOGI_DOCKER"
                )),
            }
            .into()),
        }
    }

    fn finish(&self, out: std::process::Output) -> CmdOutput {
        let res = CmdOutput {
            success: out.status.success(),
            code: out.status.code(),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        };
        tracing::debug!(code = ?res.code, "docker exited");
        res
    }
}

impl DockerCli for Docker {
    fn program(&self) -> &Path {
        &self.path
    }

    fn invoke(&self, args: &[&str]) -> io::Result<CmdOutput> {
        tracing::debug!(argv = %args.join(" "), "docker");
        let out = Command::new(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .output()?;
        Ok(self.finish(out))
    }
}
