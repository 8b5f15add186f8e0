//! Base distribution of an image, read from its `/etc/os-release`.

use std::fmt;

use anyhow::Result;
use tracing::instrument;

use super::runtime::DockerCli;
use crate::errors::DogiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distro {
    Ubuntu,
    Debian,
    Fedora,
    Unsupported,
}

/// Checked in order; the first substring found wins.
const SUPPORTED: &[(&str, Distro)] = &[
    ("Ubuntu", Distro::Ubuntu),
    ("Debian", Distro::Debian),
    ("Fedora", Distro::Fedora),
];

impl Distro {
    /// Case-sensitive substring match of `os-release` text against the supported names.
    pub fn classify(os_release: &str) -> Distro {
        SUPPORTED
            .iter()
            .find(|(needle, _)| os_release.contains(needle))
            .map(|(_, d)| *d)
            .unwrap_or(Distro::Unsupported)
    }

    pub fn is_supported(self) -> bool {
        self != Distro::Unsupported
    }

    /// APT proxy configuration only makes sense for apt based images.
    pub fn uses_apt(self) -> bool {
        matches!(self, Distro::Ubuntu | Distro::Debian)
    }

    /// Non-interactive install of `pkg` with the distribution's package manager.
    pub fn install_command(self, pkg: &str) -> Option<String> {
        match self {
            Distro::Ubuntu | Distro::Debian => Some(format!(
                "(apt-get update -qq && DEBIAN_FRONTEND=noninteractive apt-get install -y -qq {pkg})"
            )),
            Distro::Fedora => Some(format!("dnf install -y -q {pkg}")),
            Distro::Unsupported => None,
        }
    }
}

impl fmt::Display for Distro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Distro::Ubuntu => "ubuntu",
            Distro::Debian => "debian",
            Distro::Fedora => "fedora",
            Distro::Unsupported => "unsupported",
        })
    }
}

/// Run a throwaway container of `image` that prints its `/etc/os-release`.
#[instrument(level = "debug", skip(docker))]
pub fn image_distro(docker: &dyn DockerCli, image: &str) -> Result<Distro> {
    tracing::debug!(image, "classifying image distribution");
    let out = docker.invoke(&[
        "run",
        "--rm",
        "--entrypoint",
        "cat",
        image,
        "/etc/os-release",
    ])?;
    if !out.success {
        return Err(DogiError::docker_with(
            format!(
                "could not read /etc/os-release from image '{image}': {}",
                out.stderr.trim()
            ),
            format!("docker pull {image}"),
        )
        .into());
    }
    Ok(Distro::classify(&out.stdout))
}
