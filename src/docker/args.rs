//! Assembly of the `docker create` argument vector for `dogi run`.
//!
//! The order is fixed: base flags, workdir and mounts, X11/env, optional GPU/network flags,
//! security options, `--rm`, `--name`, cache volumes, ssh, the user script, then the image and
//! finally the entrypoint tokens. Nothing may follow the image except entrypoint tokens, since
//! docker would take it as part of the command.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use super::caches::CacheMount;
use super::env::{push_bind_same, push_env_kv, push_env_passthrough, push_volume, push_volume_ro};
use crate::config::RunConfig;
use crate::script::CREATE_USER_SCRIPT_PATH;
use crate::util::shell_join;

/// Container-id marker visible inside the container.
pub const CID_FILE_PATH: &str = "/dogi.cid";
pub const XAUTH_PATH: &str = "/.xauth";
pub const APT_PROXY_CONF_PATH: &str = "/etc/apt/apt.conf.d/01proxy";
pub const DOGI_BIN_PATH: &str = "/usr/bin/dogi";
pub const X11_SOCKET_DIR: &str = "/tmp/.X11-unix";

/// Host facts and derived paths the assembler needs; gathered by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchInputs {
    pub workdir: PathBuf,
    pub home: PathBuf,
    pub cid_file: PathBuf,
    pub display: String,
    pub timezone: Option<String>,
    /// `/dev/dri` exists on the host.
    pub dri_device: bool,
    /// Home cache first, then toolchain caches.
    pub caches: Vec<CacheMount>,
    pub ssh_dir: Option<PathBuf>,
    /// Host path of the rendered user creation script, when replicating the user.
    pub user_script: Option<PathBuf>,
    pub image: String,
    /// The command to run: explicit, or the image's default.
    pub command: Vec<String>,
}

/// Final `docker create` arguments: flags, then image, then entrypoint tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerLaunchSpec {
    pub flags: Vec<String>,
    pub image: String,
    pub entrypoint: Vec<String>,
}

impl ContainerLaunchSpec {
    /// Arguments after `docker create`.
    pub fn docker_args(&self) -> Vec<String> {
        let mut v = Vec::with_capacity(self.flags.len() + 1 + self.entrypoint.len());
        v.extend(self.flags.iter().cloned());
        v.push(self.image.clone());
        v.extend(self.entrypoint.iter().cloned());
        v
    }

    /// Shell-escaped `docker create ...` line for echoing.
    pub fn preview(&self) -> String {
        let mut v = vec!["docker".to_string(), "create".to_string()];
        v.extend(self.docker_args());
        shell_join(&v)
    }
}

pub fn assemble(cfg: &RunConfig, inputs: &LaunchInputs) -> ContainerLaunchSpec {
    let mut f: Vec<String> = vec!["--interactive".into(), "--tty".into()];

    // workdir and mounts
    f.push(format!("--workdir={}", inputs.workdir.display()));
    push_bind_same(&mut f, &inputs.workdir);
    if cfg.mount_home && inputs.home != inputs.workdir {
        push_bind_same(&mut f, &inputs.home);
    }
    f.push(format!("--cidfile={}", inputs.cid_file.display()));
    push_volume(&mut f, inputs.cid_file.to_string_lossy(), Path::new(CID_FILE_PATH));

    // X11, time zone, devices
    push_volume(&mut f, X11_SOCKET_DIR, Path::new(X11_SOCKET_DIR));
    push_env_kv(&mut f, "XAUTHORITY", XAUTH_PATH);
    push_env_kv(&mut f, "DISPLAY", &inputs.display);
    push_env_passthrough(&mut f, "TERM");
    if let Some(tz) = &inputs.timezone {
        push_env_kv(&mut f, "TZ", tz);
    }
    if inputs.dri_device {
        f.push("--device=/dev/dri".into());
    }
    f.push("--userns=host".into());
    f.push("--cap-add=SYS_NICE".into());

    if cfg.gpus_all {
        f.push("--gpus=all".into());
    }
    if cfg.runtime_nvidia {
        f.push("--runtime=nvidia".into());
    }
    if cfg.privileged {
        f.push("--privileged".into());
    }
    if !cfg.no_nethost {
        f.push("--network=host".into());
    }

    f.push("--security-opt=apparmor:unconfined".into());
    if !cfg.no_rm {
        f.push("--rm".into());
    }
    if let Some(name) = cfg.name.as_deref().filter(|n| !n.is_empty()) {
        f.push(format!("--name={name}"));
    }

    for c in &inputs.caches {
        push_volume(&mut f, &c.volume, &c.target);
    }
    if let Some(ssh) = &inputs.ssh_dir {
        push_volume_ro(&mut f, ssh.to_string_lossy(), ssh);
    }

    let entrypoint = match &inputs.user_script {
        Some(script) => {
            push_volume_ro(&mut f, script.to_string_lossy(), Path::new(CREATE_USER_SCRIPT_PATH));
            let mut e = vec!["bash".to_string(), CREATE_USER_SCRIPT_PATH.to_string()];
            e.extend(inputs.command.iter().cloned());
            e
        }
        None => inputs.command.clone(),
    };

    ContainerLaunchSpec {
        flags: f,
        image: inputs.image.clone(),
        entrypoint,
    }
}

/// A host file copied into the created container before it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxiliaryFile {
    pub src: PathBuf,
    pub dest: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuxiliaryFiles {
    files: Vec<AuxiliaryFile>,
}

impl AuxiliaryFiles {
    /// Register `src` to be copied to `dest`; the same source twice is a bug in the caller.
    pub fn add(&mut self, src: impl Into<PathBuf>, dest: &str) -> Result<()> {
        let src = src.into();
        if self.files.iter().any(|a| a.src == src) {
            bail!("{} is already scheduled to be copied", src.display());
        }
        self.files.push(AuxiliaryFile {
            src,
            dest: dest.to_string(),
        });
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuxiliaryFile> {
        self.files.iter()
    }

    pub fn has_dest(&self, dest: &str) -> bool {
        self.files.iter().any(|a| a.dest == dest)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
