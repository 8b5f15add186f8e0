//! The APT caching proxy sidecar.
//!
//! One long-lived container (`dogi_apt-cacher_cont`) serves every dogi container on the host.
//! On each `run` its image is rebuilt from the embedded Dockerfile (a no-op when docker's build
//! cache is warm) and the container is recreated when it is stopped or runs an older image.
//! The cache itself lives in the named volume `dogi_apt-cacher_vol`, so it survives recreation.
//!
//! Concurrent invocations are not coordinated: two `dogi run` racing to recreate the sidecar can
//! make one of them fail with a docker name conflict.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::instrument;

use super::containers::{remove_container, stop_container};
use super::images::{build_image, image_id};
use super::runtime::DockerCli;
use crate::errors::DogiError;
use crate::util::fs::persist_shared_temp_file;

pub const CACHER_IMAGE: &str = "dogi/apt-cacher";
pub const CACHER_CONTAINER: &str = "dogi_apt-cacher_cont";
pub const CACHER_VOLUME: &str = "dogi_apt-cacher_vol";
pub const CACHER_PORT: u16 = 3142;

const DOCKERFILE: &str = include_str!("../../assets/apt-cacher-ng/Dockerfile");

/// Observed sidecar container; queried fresh on every invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AptCacheSidecarState {
    pub exists: bool,
    pub running: bool,
    pub image_id: String,
    pub container_id: String,
    pub ip_address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidecarStatus {
    Absent,
    StaleImage,
    Stopped,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidecarAction {
    Keep,
    /// Stop and/or remove the old container as needed, then start a fresh one.
    Recreate { stop: bool, remove: bool },
}

impl AptCacheSidecarState {
    /// Parse `{{.Id}} {{.Image}} {{.State.Running}} {{.NetworkSettings.IPAddress}}`.
    fn parse(line: &str) -> Self {
        let mut it = line.split_whitespace();
        let container_id = it.next().unwrap_or("").to_string();
        let image_id = it.next().unwrap_or("").to_string();
        let running = it.next() == Some("true");
        let ip_address = it.next().unwrap_or("").to_string();
        AptCacheSidecarState {
            exists: !container_id.is_empty(),
            running,
            image_id,
            container_id,
            ip_address,
        }
    }

    pub fn status(&self, expected_image: &str) -> SidecarStatus {
        if !self.exists {
            SidecarStatus::Absent
        } else if self.image_id != expected_image {
            SidecarStatus::StaleImage
        } else if !self.running {
            SidecarStatus::Stopped
        } else {
            SidecarStatus::Running
        }
    }

    pub fn plan(&self, expected_image: &str) -> SidecarAction {
        match self.status(expected_image) {
            SidecarStatus::Running => SidecarAction::Keep,
            SidecarStatus::Absent => SidecarAction::Recreate {
                stop: false,
                remove: false,
            },
            SidecarStatus::StaleImage | SidecarStatus::Stopped => SidecarAction::Recreate {
                stop: self.running,
                remove: true,
            },
        }
    }
}

/// `Acquire::http::Proxy` snippet for apt inside the target container.
pub fn proxy_conf(ip: &str) -> String {
    format!("Acquire::http::Proxy \"http://{ip}:{CACHER_PORT}\";\n")
}

pub struct AptCacheManager<'a> {
    docker: &'a dyn DockerCli,
}

impl<'a> AptCacheManager<'a> {
    pub fn new(docker: &'a dyn DockerCli) -> Self {
        AptCacheManager { docker }
    }

    /// Current sidecar state; a failed inspect means the container does not exist.
    pub fn inspect(&self) -> Result<AptCacheSidecarState> {
        let out = self.docker.invoke(&[
            "container",
            "inspect",
            "--format",
            "{{.Id}} {{.Image}} {{.State.Running}} {{.NetworkSettings.IPAddress}}",
            CACHER_CONTAINER,
        ])?;
        if !out.success {
            return Ok(AptCacheSidecarState::default());
        }
        Ok(AptCacheSidecarState::parse(out.stdout.trim()))
    }

    fn build(&self) -> Result<String> {
        let dir = tempfile::Builder::new()
            .prefix("dogi_apt-cache")
            .tempdir()
            .context("failed to create a build directory")?;
        fs::write(dir.path().join("Dockerfile"), DOCKERFILE)
            .context("failed to write the apt cacher Dockerfile")?;
        tracing::debug!(dir = %dir.path().display(), "building {CACHER_IMAGE}");
        build_image(self.docker, CACHER_IMAGE, &dir.path().to_string_lossy())?;
        image_id(self.docker, CACHER_IMAGE)
    }

    fn start(&self) -> Result<()> {
        let volume = format!("--volume={CACHER_VOLUME}:/var/cache/apt-cacher-ng");
        let name = format!("--name={CACHER_CONTAINER}");
        self.docker
            .capture(&[
                "run",
                "-d",
                "--restart=always",
                &volume,
                &name,
                CACHER_IMAGE,
            ])
            .context("failed to start the apt cacher container")?;
        Ok(())
    }

    /// What `ensure_running` would do, without building the image or touching the container.
    ///
    /// An image that was never built counts as stale.
    pub fn preview(&self) -> Result<SidecarAction> {
        let expected = image_id(self.docker, CACHER_IMAGE).unwrap_or_default();
        let state = self.inspect()?;
        Ok(state.plan(&expected))
    }

    /// Bring the sidecar to the running state with the current image; at most one recreation.
    #[instrument(level = "debug", skip_all, fields(container = CACHER_CONTAINER))]
    pub fn ensure_running(&self) -> Result<AptCacheSidecarState> {
        let use_err = crate::color_enabled_stderr();
        let expected = self.build()?;
        let state = self.inspect()?;
        match state.plan(&expected) {
            SidecarAction::Keep => {
                tracing::debug!(ip = %state.ip_address, "apt cacher up to date");
            }
            SidecarAction::Recreate { stop, remove } => {
                crate::log_info_stderr(use_err, "dogi: (re)starting the apt cacher container...");
                if stop {
                    stop_container(self.docker, CACHER_CONTAINER)?;
                }
                if remove {
                    remove_container(self.docker, CACHER_CONTAINER)?;
                }
                self.start()?;
            }
        }

        let state = self.inspect()?;
        if !state.running || state.ip_address.is_empty() {
            return Err(DogiError::docker_with(
                format!("{CACHER_CONTAINER} is not running or has no IP address"),
                format!("docker logs {CACHER_CONTAINER}"),
            )
            .into());
        }
        Ok(state)
    }

    /// Ensure the sidecar and write the proxy config file; returns its host path.
    pub fn prepare(&self) -> Result<PathBuf> {
        let state = self.ensure_running()?;
        let path = persist_shared_temp_file(".dogi_apt-cacher", ".conf", proxy_conf(&state.ip_address).as_bytes())
            .context("failed to write the apt proxy config")?;
        tracing::debug!(path = %path.display(), ip = %state.ip_address, "apt proxy config");
        Ok(path)
    }
}
