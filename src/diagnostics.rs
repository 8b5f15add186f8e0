//! `dogi debug`: internal state as dogi sees it. Read-only; never starts or removes anything.

use std::env;

use crate::docker::apt_cache::{AptCacheManager, CACHER_CONTAINER};
use crate::docker::runtime::{Docker, DockerCli};
use crate::host::timezone::host_timezone;
use crate::host::xauth::XauthForwarder;
use crate::host::inside_container;
use crate::identity::Identity;
use crate::script::{GroupReconciliationPlan, GROUPS_OF_INTEREST};

fn row(use_color: bool, key: &str, val: &str) {
    eprintln!("  {key:<18} {}", crate::paint(use_color, crate::color::BLUE, val));
}

fn timezone_label(tz: Option<String>) -> String {
    tz.unwrap_or_else(|| "(unknown)".to_string())
}

pub fn run_debug() {
    let use_err = crate::color_enabled_stderr();
    eprintln!("dogi debug");
    eprintln!();
    row(use_err, "version:", &format!("v{}", env!("CARGO_PKG_VERSION")));
    row(use_err, "build date:", env!("DOGI_BUILD_DATE"));
    row(use_err, "build target:", env!("DOGI_BUILD_TARGET"));
    row(use_err, "build profile:", env!("DOGI_BUILD_PROFILE"));
    row(use_err, "rustc:", env!("DOGI_RUSTC_VERSION"));
    row(
        use_err,
        "host:",
        &format!("{} / {}", env::consts::OS, env::consts::ARCH),
    );
    row(
        use_err,
        "container:",
        if inside_container() { "INSIDE" } else { "OUTSIDE" },
    );
    eprintln!();

    let docker = Docker::locate().ok();
    match &docker {
        Some(d) => {
            row(use_err, "docker:", &d.program().display().to_string());
            let version = d
                .capture(&["version", "--format", "{{.Server.Version}}"])
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|e| format!("(unavailable: {e})"));
            row(use_err, "docker server:", &version);
        }
        None => row(use_err, "docker:", "(not found)"),
    }
    eprintln!();

    match Identity::current() {
        Ok(id) => {
            row(use_err, "user:", &format!("{} ({}:{})", id.username, id.uid, id.gid));
            row(use_err, "home:", &id.home.display().to_string());
            let groups = id
                .groups
                .iter()
                .map(|g| format!("{}({})", g.name, g.gid))
                .collect::<Vec<_>>()
                .join(" ");
            row(use_err, "groups:", &groups);
            match GroupReconciliationPlan::for_identity(&id, GROUPS_OF_INTEREST) {
                Ok(plan) => {
                    let rules = plan
                        .rules()
                        .iter()
                        .map(|r| format!("{}({})", r.name, r.gid))
                        .collect::<Vec<_>>()
                        .join(" ");
                    row(use_err, "replicated groups:", &rules);
                }
                Err(e) => row(use_err, "replicated groups:", &format!("(error: {e})")),
            }
        }
        Err(e) => row(use_err, "user:", &format!("(error: {e:#})")),
    }
    eprintln!();

    row(
        use_err,
        "DISPLAY:",
        &env::var("DISPLAY").unwrap_or_else(|_| "(unset)".to_string()),
    );
    row(
        use_err,
        "xauth:",
        &XauthForwarder::locate()
            .map(|x| x.path().display().to_string())
            .unwrap_or_else(|_| "(not found)".to_string()),
    );
    row(
        use_err,
        "time zone:",
        &timezone_label(host_timezone()),
    );
    eprintln!();

    if let Some(d) = &docker {
        match AptCacheManager::new(d).inspect() {
            Ok(s) if s.exists => {
                let state = if s.running { "running" } else { "stopped" };
                let ip = if s.ip_address.is_empty() { "-" } else { s.ip_address.as_str() };
                row(
                    use_err,
                    "apt cacher:",
                    &format!("{CACHER_CONTAINER} {state} ip={ip} image={}", s.image_id),
                );
            }
            Ok(_) => row(use_err, "apt cacher:", "(absent)"),
            Err(e) => row(use_err, "apt cacher:", &format!("(error: {e})")),
        }
    }
}
