//! The `dogi run` flow.
//!
//! identify user, resolve image, classify distro, prepare the APT cache, build flags and the
//! user script, `docker create`, copy auxiliary files in, then hand over to
//! `docker start -ai` via `Outcome::Exec`.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::instrument;

use super::apt_cache::AptCacheManager;
use super::args::{
    assemble, AuxiliaryFiles, ContainerLaunchSpec, LaunchInputs, APT_PROXY_CONF_PATH,
    DOGI_BIN_PATH, XAUTH_PATH,
};
use super::caches::{home_cache, toolchain_caches};
use super::containers::{copy_into, create_container};
use super::distro::{image_distro, Distro};
use super::images::{ensure_image_exists, image_config, list_images};
use super::runtime::DockerCli;
use crate::config::{resolve_workdir, RunConfig};
use crate::errors::DogiError;
use crate::host::timezone::detect_timezone;
use crate::host::xauth::{display_from_env, XauthForwarder};
use crate::host::{has_dri_device, has_second_dri_card};
use crate::identity::Identity;
use crate::process::{ExecPlan, Outcome};
use crate::script::user::UserScriptInputs;
use crate::script::{render_create_user_script, GroupReconciliationPlan, GROUPS_OF_INTEREST};
use crate::ui::select::Chooser;
use crate::ui::warn::warn_block;
use crate::util::fs::{is_same_dir, persist_shared_temp_file};
use crate::util::id::cid_file_path;
use crate::util::table::field;
use crate::warn_print;

/// Stands in for the proxy config path under `--dry-run`, where the sidecar is left untouched.
pub const DRY_RUN_PROXY_CONF: &str = "<apt-cacher proxy conf>";

/// Host-side inputs gathered before planning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostFacts {
    pub workdir: PathBuf,
    pub display: String,
    pub timezone: Option<String>,
    pub dri_device: bool,
    pub ssh_dir: Option<PathBuf>,
    pub cid_file: PathBuf,
    pub xauth_file: Option<PathBuf>,
    /// This executable, copied to `/usr/bin/dogi` in the container.
    pub dogi_exe: Option<PathBuf>,
}

impl HostFacts {
    /// Inspect the host and export the X11 cookie. A missing `xauth` is fatal.
    pub fn gather(cfg: &RunConfig, identity: &Identity) -> Result<Self> {
        let workdir = resolve_workdir(cfg.workdir.as_deref())?;
        let display = display_from_env();
        let xauth = XauthForwarder::locate()?;
        let xauth_file = xauth
            .export_cookie(&display)
            .context("failed to export the X11 cookie")?;
        let ssh = identity.home.join(".ssh");
        Ok(HostFacts {
            workdir,
            display,
            timezone: detect_timezone(),
            dri_device: has_dri_device(),
            ssh_dir: ssh.is_dir().then_some(ssh),
            cid_file: cid_file_path(&env::temp_dir()),
            xauth_file: Some(xauth_file),
            dogi_exe: env::current_exe().ok(),
        })
    }
}

/// Everything needed to create and start the container.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub spec: ContainerLaunchSpec,
    pub aux: AuxiliaryFiles,
    pub distro: Option<Distro>,
    pub replicate_user: bool,
}

/// The image to run: the one given, or one picked from `docker images`.
pub fn resolve_image(cfg: &RunConfig, docker: &dyn DockerCli, chooser: &dyn Chooser) -> Result<String> {
    if let Some(image) = cfg.image.as_deref().filter(|i| !i.is_empty()) {
        return Ok(image.to_string());
    }
    let table = list_images(docker)?;
    if table.is_empty() {
        return Err(DogiError::usage("no images locally available").into());
    }
    let idx = chooser.choose(&table.header, &table.rows)?;
    let row = table
        .rows
        .get(idx)
        .ok_or_else(|| anyhow::anyhow!("selection {idx} is out of range"))?;
    field(row, 2)
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("unexpected docker images row: {row}"))
}

/// Plan the container: command, distro gate, APT cache, cache mounts, user script, flags.
pub fn prepare_launch(
    cfg: &RunConfig,
    docker: &dyn DockerCli,
    identity: &Identity,
    image: &str,
    host: &HostFacts,
) -> Result<LaunchPlan> {
    let use_err = crate::color_enabled_stderr();
    let config = image_config(docker, image)?;

    let command: Vec<String> = if !cfg.command.is_empty() {
        cfg.command.clone()
    } else if let Some(cmd) = config.default_command() {
        cmd.to_vec()
    } else {
        warn_print(&format!("image {image} declares no default command, using bash"));
        vec!["bash".to_string()]
    };

    let mut replicate_user = !cfg.no_user;
    if replicate_user && identity.is_root() {
        warn_block(
            "dogi is running as root (did you use sudo?)",
            &["the container will run as root; run dogi as your user to replicate it"],
        );
        replicate_user = false;
    }

    if replicate_user {
        if let Some(ep) = config.entrypoint() {
            warn_print(&format!(
                "image {image} has the entrypoint '{}', which runs before the user is created",
                ep.join(" ")
            ));
        }
    }

    let distro = if replicate_user || !cfg.no_cacher {
        Some(image_distro(docker, image)?)
    } else {
        None
    };
    tracing::debug!(?distro, replicate_user, "image classified");

    if replicate_user && !distro.is_some_and(Distro::is_supported) {
        return Err(DogiError::Unsupported {
            message: format!(
                "image {image} is not based on a supported distribution (ubuntu, debian, fedora), \
                 so its user cannot be replicated"
            ),
            escape_hatch: format!("dogi run --no-user {image}"),
        }
        .into());
    }

    let mut aux = AuxiliaryFiles::default();
    if let Some(xauth) = &host.xauth_file {
        aux.add(xauth.clone(), XAUTH_PATH)?;
    }

    if !cfg.no_cacher {
        if distro.is_some_and(Distro::uses_apt) {
            crate::log_info_stderr(use_err, "dogi: using apt-cacher, disable it with --no-cacher");
            let cacher = AptCacheManager::new(docker);
            if cfg.dry_run {
                let action = cacher.preview()?;
                crate::log_info_stderr(use_err, &format!("dogi: apt cacher would be: {action:?}"));
                aux.add(PathBuf::from(DRY_RUN_PROXY_CONF), APT_PROXY_CONF_PATH)?;
            } else {
                aux.add(cacher.prepare()?, APT_PROXY_CONF_PATH)?;
            }
        } else {
            tracing::debug!("image is not apt based, apt cacher disabled");
        }
    }

    if let Some(exe) = &host.dogi_exe {
        aux.add(exe.clone(), DOGI_BIN_PATH)?;
    }

    let mut caches = vec![home_cache(&identity.home)];
    caches.extend(toolchain_caches(&config));

    let user_script = if replicate_user {
        let groups = GroupReconciliationPlan::for_identity(identity, GROUPS_OF_INTEREST)?;
        let owned: Vec<PathBuf> = caches.iter().skip(1).map(|c| c.target.clone()).collect();
        let text = render_create_user_script(&UserScriptInputs {
            identity,
            groups: &groups,
            home: &identity.home,
            distro: distro.unwrap_or(Distro::Unsupported),
            owned_dirs: &owned,
        })?;
        let path = persist_shared_temp_file(".dogi_create_user", ".sh", text.as_bytes())
            .context("failed to write the user creation script")?;
        tracing::debug!(path = %path.display(), groups = %groups.joined_names(), "user script");
        Some(path)
    } else {
        None
    };

    let inputs = LaunchInputs {
        workdir: host.workdir.clone(),
        home: identity.home.clone(),
        cid_file: host.cid_file.clone(),
        display: host.display.clone(),
        timezone: host.timezone.clone(),
        dri_device: host.dri_device,
        caches,
        ssh_dir: host.ssh_dir.clone(),
        user_script,
        image: image.to_string(),
        command,
    };

    Ok(LaunchPlan {
        spec: assemble(cfg, &inputs),
        aux,
        distro,
        replicate_user,
    })
}

fn warn_if_home_workdir(workdir: &Path, home: &Path, mount_home: bool) {
    if is_same_dir(workdir, home).unwrap_or(false) {
        let extra = if mount_home {
            "your complete home directory is shared with the container"
        } else {
            "consider running dogi from a project directory instead"
        };
        warn_block(
            "the working directory is your home directory",
            &[
                "the container will use the host's shell rc files (.bashrc, .profile, ...)",
                extra,
            ],
        );
    }
}

/// Create the container and return the hand-over to `docker start -ai`.
pub fn launch(cfg: &RunConfig, docker: &dyn DockerCli, identity: &Identity, plan: &LaunchPlan, host: &HostFacts) -> Result<Outcome> {
    let use_err = crate::color_enabled_stderr();
    crate::log_info_stderr(use_err, &format!("dogi: {}", plan.spec.preview()));

    if cfg.dry_run {
        for a in plan.aux.iter() {
            crate::log_info_stderr(
                use_err,
                &format!("dogi: docker cp -aL {} <container>:{}", a.src.display(), a.dest),
            );
        }
        crate::log_info_stderr(use_err, "dogi: docker start -ai <container>");
        return Ok(Outcome::Done);
    }

    let id = create_container(docker, &plan.spec.docker_args())?;
    for a in plan.aux.iter() {
        copy_into(docker, &a.src.to_string_lossy(), &id, &a.dest)?;
    }

    warn_if_home_workdir(&host.workdir, &identity.home, cfg.mount_home);
    let short: String = id.chars().take(12).collect();
    crate::log_info_stderr(use_err, &format!("dogi: going inside container {short}"));

    Ok(Outcome::Exec(ExecPlan::new(
        docker.program(),
        vec!["start".into(), "-ai".into(), id],
    )))
}

#[instrument(level = "debug", skip_all, fields(image = ?cfg.image, dry_run = cfg.dry_run))]
pub fn run(cfg: &RunConfig, docker: &dyn DockerCli, chooser: &dyn Chooser) -> Result<Outcome> {
    let use_err = crate::color_enabled_stderr();
    let identity = Identity::current()?;
    let image = resolve_image(cfg, docker, chooser)?;
    ensure_image_exists(docker, &image)?;

    let host = HostFacts::gather(cfg, &identity)?;
    if has_second_dri_card() {
        crate::log_warn_stderr(
            use_err,
            "dogi: note: /dev/dri/card1 exists (NVIDIA card?); 3D acceleration may need --gpus-all",
        );
    }

    let plan = prepare_launch(cfg, docker, &identity, &image, &host)?;
    launch(cfg, docker, &identity, &plan, &host)
}
