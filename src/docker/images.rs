#![allow(clippy::module_name_repetitions)]
//! Docker image helpers.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::runtime::DockerCli;
use crate::errors::DogiError;
use crate::util::table::Table;

/// Return true if a docker image exists locally (without pulling).
pub fn image_exists(docker: &dyn DockerCli, image: &str) -> bool {
    docker
        .invoke(&["image", "inspect", "--format", "{{.Id}}", image])
        .map(|o| o.success)
        .unwrap_or(false)
}

/// Fail with a `docker pull` remediation when the image is not available locally.
pub fn ensure_image_exists(docker: &dyn DockerCli, image: &str) -> Result<()> {
    if image_exists(docker, image) {
        return Ok(());
    }
    Err(DogiError::docker_with(
        format!("docker image '{image}' does not exist locally"),
        format!("docker pull {image}"),
    )
    .into())
}

/// The subset of `.Config` from `docker image inspect` that dogi reads.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ImageConfig {
    #[serde(default)]
    pub cmd: Option<Vec<String>>,
    #[serde(default)]
    pub entrypoint: Option<Vec<String>>,
    #[serde(default)]
    pub env: Option<Vec<String>>,
}

impl ImageConfig {
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json.trim()).context("unexpected docker image config")
    }

    /// Value of `name` in the image's declared environment.
    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env.as_ref()?.iter().find_map(|kv| {
            let (k, v) = kv.split_once('=')?;
            (k == name).then_some(v)
        })
    }

    /// The image's ENTRYPOINT, or None when it declares none.
    pub fn entrypoint(&self) -> Option<&[String]> {
        match &self.entrypoint {
            Some(e) if !e.is_empty() => Some(e.as_slice()),
            _ => None,
        }
    }

    /// The image's CMD, or None when it declares none.
    pub fn default_command(&self) -> Option<&[String]> {
        match &self.cmd {
            Some(c) if !c.is_empty() => Some(c.as_slice()),
            _ => None,
        }
    }
}

pub fn image_config(docker: &dyn DockerCli, image: &str) -> Result<ImageConfig> {
    let out = docker
        .capture(&["image", "inspect", "--format", "{{json .Config}}", image])
        .with_context(|| format!("failed to inspect image {image}"))?;
    ImageConfig::parse(&out)
}

/// Full id (`sha256:...`) of a local image.
pub fn image_id(docker: &dyn DockerCli, image: &str) -> Result<String> {
    let out = docker.capture(&["image", "inspect", "--format", "{{.Id}}", image])?;
    Ok(out.trim().to_string())
}

/// The `docker images` table.
pub fn list_images(docker: &dyn DockerCli) -> Result<Table> {
    let out = docker.capture(&["images"])?;
    Ok(Table::parse(&out))
}

/// `docker build --tag <tag> <context>`; build output is only shown on failure.
pub fn build_image(docker: &dyn DockerCli, tag: &str, context_dir: &str) -> Result<()> {
    docker
        .capture(&["build", "--quiet", "--tag", tag, context_dir])
        .with_context(|| format!("failed to build image {tag}"))?;
    Ok(())
}
