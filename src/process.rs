//! Terminal step of `run` and `exec`: become docker.
//!
//! Flows return an `Outcome` instead of spawning docker themselves. `Outcome::Exec` is the
//! "hand over" state: the caller replaces the current process image with docker, so docker
//! inherits the terminal and environment directly and its exit status is the user's exit
//! status. Nothing runs after a successful replacement: `Drop` impls, deferred cleanups and
//! buffered output of this process are discarded, which is why temp files handed to docker are
//! persisted rather than scoped.

use std::ffi::OsString;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::Command;

use anyhow::anyhow;

use crate::util::shell_join;

/// A program and its arguments (argv[0] excluded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecPlan {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ExecPlan {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        ExecPlan {
            program: program.into(),
            args,
        }
    }

    /// `docker ...` as a shell-escaped line.
    pub fn preview(&self) -> String {
        let mut v = vec!["docker".to_string()];
        v.extend(self.args.iter().cloned());
        shell_join(&v)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Replace this process with the plan; never returns on success.
    Exec(ExecPlan),
    /// The operation finished in-process.
    Done,
}

/// Replace the process image. Only returns when the exec itself failed.
pub fn replace_process(plan: &ExecPlan) -> anyhow::Error {
    tracing::debug!(program = %plan.program.display(), argv = %plan.preview(), "exec");
    let err = Command::new(&plan.program)
        .arg0(OsString::from("docker"))
        .args(&plan.args)
        .exec();
    anyhow!(err).context(format!("failed to execute {}", plan.program.display()))
}
