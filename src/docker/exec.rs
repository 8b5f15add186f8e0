//! The `dogi exec` flow: attach a new shell (or command) to a running container.

use anyhow::Result;
use tracing::instrument;

use super::containers::{
    container_args, container_working_dir, ensure_container_exists, latest_container,
    running_containers,
};
use super::runtime::DockerCli;
use crate::config::ExecConfig;
use crate::errors::DogiError;
use crate::identity::Identity;
use crate::process::{ExecPlan, Outcome};
use crate::script::CREATE_USER_SCRIPT_PATH;
use crate::ui::select::Chooser;
use crate::util::table::field;

fn no_containers() -> anyhow::Error {
    DogiError::usage("no containers running").into()
}

/// The container given, the latest one (`recent`), or one picked from `docker ps`.
///
/// With nothing running the selector is never shown.
pub fn resolve_container(
    cfg: &ExecConfig,
    docker: &dyn DockerCli,
    chooser: &dyn Chooser,
) -> Result<String> {
    if let Some(c) = cfg.container.as_deref().filter(|c| !c.is_empty()) {
        ensure_container_exists(docker, c)?;
        return Ok(c.to_string());
    }
    if cfg.recent {
        return latest_container(docker)?.ok_or_else(no_containers);
    }
    let table = running_containers(docker)?;
    if table.is_empty() {
        return Err(no_containers());
    }
    let idx = chooser.choose(&table.header, &table.rows)?;
    let row = table
        .rows
        .get(idx)
        .ok_or_else(|| anyhow::anyhow!("selection {idx} is out of range"))?;
    field(row, 0)
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("unexpected docker ps row: {row}"))
}

/// `exec --interactive --tty [--user=..] --workdir=.. <container> <cmd...>`
pub fn build_exec_args(
    container: &str,
    user: Option<&str>,
    workdir: &str,
    command: &[String],
) -> Vec<String> {
    let mut args: Vec<String> = vec!["exec".into(), "--interactive".into(), "--tty".into()];
    if let Some(u) = user {
        args.push(format!("--user={u}"));
    }
    args.push(format!("--workdir={workdir}"));
    args.push(container.to_string());
    if command.is_empty() {
        args.push("bash".into());
    } else {
        args.extend(command.iter().cloned());
    }
    args
}

/// Resolve the container and build the `docker exec` hand-over.
///
/// `username` is only consulted for containers started by dogi with a replicated user.
pub fn plan_exec(
    cfg: &ExecConfig,
    docker: &dyn DockerCli,
    chooser: &dyn Chooser,
    username: Option<&str>,
) -> Result<ExecPlan> {
    let container = resolve_container(cfg, docker, chooser)?;

    let replicated = container_args(docker, &container)?
        .iter()
        .any(|a| a == CREATE_USER_SCRIPT_PATH);
    let user = if cfg.no_user {
        None
    } else if replicated {
        username
    } else {
        crate::warn_print(&format!(
            "container {container} was not started by dogi with a user, running as root"
        ));
        None
    };

    let workdir = match cfg.workdir.as_deref().filter(|w| !w.is_empty()) {
        Some(w) => w.to_string(),
        None => {
            let w = container_working_dir(docker, &container)?;
            if w.is_empty() {
                "/".to_string()
            } else {
                w
            }
        }
    };

    Ok(ExecPlan::new(
        docker.program(),
        build_exec_args(&container, user, &workdir, &cfg.command),
    ))
}

#[instrument(level = "debug", skip_all, fields(container = ?cfg.container, recent = cfg.recent))]
pub fn exec(cfg: &ExecConfig, docker: &dyn DockerCli, chooser: &dyn Chooser) -> Result<Outcome> {
    exec_as(cfg, docker, chooser, Identity::current)
}

/// `exec` with the identity lookup injected; with `--no-user` it is never called.
pub fn exec_as(
    cfg: &ExecConfig,
    docker: &dyn DockerCli,
    chooser: &dyn Chooser,
    lookup: impl FnOnce() -> Result<Identity>,
) -> Result<Outcome> {
    let use_err = crate::color_enabled_stderr();
    let identity = if cfg.no_user { None } else { Some(lookup()?) };
    let username = identity.as_ref().map(|i| i.username.as_str());
    let plan = plan_exec(cfg, docker, chooser, username)?;
    crate::log_info_stderr(use_err, &format!("dogi: {}", plan.preview()));
    if cfg.dry_run {
        return Ok(Outcome::Done);
    }
    Ok(Outcome::Exec(plan))
}
