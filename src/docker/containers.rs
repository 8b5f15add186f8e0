//! Container inspection and lifecycle calls used by `run`, `exec` and the APT sidecar.

use anyhow::{Context, Result};

use super::runtime::DockerCli;
use crate::errors::DogiError;
use crate::util::table::Table;

/// Whether `container` exists (any state).
pub fn container_exists(docker: &dyn DockerCli, container: &str) -> bool {
    docker
        .invoke(&["container", "inspect", "--format", "{{.Id}}", container])
        .map(|o| o.success)
        .unwrap_or(false)
}

pub fn ensure_container_exists(docker: &dyn DockerCli, container: &str) -> Result<()> {
    if container_exists(docker, container) {
        return Ok(());
    }
    Err(DogiError::docker_with(
        format!("container '{container}' does not exist"),
        "docker ps --all",
    )
    .into())
}

/// Arguments the container's main process was started with (`.Args`).
pub fn container_args(docker: &dyn DockerCli, container: &str) -> Result<Vec<String>> {
    let out = docker.capture(&["container", "inspect", "--format", "{{json .Args}}", container])?;
    let args: Option<Vec<String>> =
        serde_json::from_str(out.trim()).context("unexpected docker inspect output")?;
    Ok(args.unwrap_or_default())
}

/// Configured working dir of a container; empty when none was set.
pub fn container_working_dir(docker: &dyn DockerCli, container: &str) -> Result<String> {
    let out = docker.capture(&[
        "container",
        "inspect",
        "--format",
        "{{.Config.WorkingDir}}",
        container,
    ])?;
    Ok(out.trim().to_string())
}

/// The `docker ps` table (running containers).
pub fn running_containers(docker: &dyn DockerCli) -> Result<Table> {
    let out = docker.capture(&["ps"])?;
    Ok(Table::parse(&out))
}

/// Id of the most recently created running container, if any.
///
/// `docker ps --latest` would include exited containers; the running list is newest first.
pub fn latest_container(docker: &dyn DockerCli) -> Result<Option<String>> {
    let out = docker.capture(&["ps", "--quiet", "--filter", "status=running"])?;
    Ok(out
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string))
}

/// `docker create <args>`; returns the new container id.
pub fn create_container(docker: &dyn DockerCli, args: &[String]) -> Result<String> {
    let mut argv: Vec<&str> = vec!["create"];
    argv.extend(args.iter().map(String::as_str));
    let out = docker.capture(&argv).context("failed to create container")?;
    let id = out.trim().lines().last().unwrap_or("").trim().to_string();
    if id.is_empty() {
        return Err(DogiError::docker("docker create did not print a container id").into());
    }
    Ok(id)
}

/// Copy a host file into a (created or running) container, following symlinks.
pub fn copy_into(docker: &dyn DockerCli, src: &str, container: &str, dest: &str) -> Result<()> {
    let target = format!("{container}:{dest}");
    docker
        .capture(&["cp", "-aL", src, &target])
        .with_context(|| format!("failed to copy {src} to {target}"))?;
    Ok(())
}

pub fn stop_container(docker: &dyn DockerCli, container: &str) -> Result<()> {
    docker.capture(&["stop", container])?;
    Ok(())
}

pub fn remove_container(docker: &dyn DockerCli, container: &str) -> Result<()> {
    docker.capture(&["rm", container])?;
    Ok(())
}
