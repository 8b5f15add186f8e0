//! The entrypoint wrapper that recreates the host user inside a fresh container.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use super::groups::GroupReconciliationPlan;
use crate::docker::distro::Distro;
use crate::identity::Identity;
use crate::util::{is_safe_account_name, shell_escape, ShellFile};

/// Where the script is mounted inside the container.
pub const CREATE_USER_SCRIPT_PATH: &str = "/dogi_create_user.sh";

const SUDOERS_FILE: &str = "/etc/sudoers.d/dogi";

pub struct UserScriptInputs<'a> {
    pub identity: &'a Identity,
    pub groups: &'a GroupReconciliationPlan,
    /// Home directory inside the container (normally the host path).
    pub home: &'a Path,
    pub distro: Distro,
    /// Mount points docker creates as root (cache volumes) that the user must own.
    pub owned_dirs: &'a [PathBuf],
}

/// Render the complete script.
///
/// Group mismatches only warn; a failure to create a group or the user aborts the container
/// with a non-zero status, since the command could not run as the intended identity.
pub fn render_create_user_script(inputs: &UserScriptInputs<'_>) -> Result<String> {
    let id = inputs.identity;
    let user = id.username.as_str();
    if !is_safe_account_name(user) {
        bail!("user name {user:?} cannot be replicated into a container");
    }
    let (uid, gid) = (id.uid, id.gid);
    let home = shell_escape(&inputs.home.to_string_lossy());
    let comment = match id.full_name.trim() {
        "" => String::new(),
        name => format!(" --comment {}", shell_escape(name)),
    };

    let mut sf = ShellFile::bash();
    sf.push("# generated by dogi; runs as root, then drops to the host user");
    sf.push("set -u");
    sf.push(r#"fail() { echo "dogi: error: $*" >&2; exit 1; }"#);
    sf.blank();
    sf.append(&inputs.groups.render());
    sf.blank();

    sf.push(format!("# user {user} ({uid}:{gid})"));
    sf.push(format!(
        r#"owner_of_uid="$(getent passwd {uid} | cut -d: -f1)""#
    ));
    sf.push(format!(
        r#"if [ -n "$owner_of_uid" ] && [ "$owner_of_uid" != "{user}" ]; then"#
    ));
    sf.indent();
    sf.push(format!(
        r#"echo "dogi: warning: uid {uid} is '$owner_of_uid' inside the container, renaming it to '{user}'" >&2"#
    ));
    sf.push(format!(
        r#"usermod --login {user} --home {home} --gid {gid} "$owner_of_uid" || fail "could not rename '$owner_of_uid' to '{user}'""#
    ));
    sf.dedent();
    sf.push(format!("elif id -u {user} >/dev/null 2>&1; then"));
    sf.indent();
    sf.push(format!(
        r#"usermod --uid {uid} --gid {gid} --home {home} {user} || fail "could not change the uid of '{user}' to {uid}""#
    ));
    sf.dedent();
    sf.push(r#"elif [ -z "$owner_of_uid" ]; then"#);
    sf.indent();
    sf.push(format!(
        r#"useradd --uid {uid} --gid {gid} --home-dir {home} --no-create-home --shell /bin/bash{comment} {user} || fail "could not create user '{user}'""#
    ));
    sf.dedent();
    sf.push("fi");

    let names = inputs.groups.joined_names();
    if !names.is_empty() {
        let gids = inputs
            .groups
            .supplementary()
            .map(|r| r.gid.to_string())
            .collect::<Vec<_>>()
            .join(",");
        sf.push(format!(
            r#"usermod --append --groups {gids} {user} || fail "could not add '{user}' to {names}""#
        ));
    }
    sf.blank();

    sf.push(format!("mkdir -p {home} {home}/.cache"));
    sf.push(format!("chown {uid}:{gid} {home} {home}/.cache"));
    for dir in inputs.owned_dirs {
        let d = shell_escape(&dir.to_string_lossy());
        sf.push(format!("mkdir -p {d} && chown {uid}:{gid} {d}"));
    }
    sf.blank();

    sf.push("if ! command -v sudo >/dev/null 2>&1; then");
    sf.indent();
    match inputs.distro.install_command("sudo") {
        Some(install) => {
            sf.push(r#"echo "dogi: installing sudo..." >&2"#);
            sf.push(format!(
                r#"{install} >/dev/null 2>&1 || echo "dogi: warning: could not install sudo" >&2"#
            ));
        }
        None => {
            sf.push(r#"echo "dogi: warning: sudo is not available in this image" >&2"#);
        }
    }
    sf.dedent();
    sf.push("fi");
    sf.push("if [ -d /etc/sudoers.d ]; then");
    sf.indent();
    sf.push(format!(
        r#"echo "{user} ALL=(ALL) NOPASSWD:ALL" > {SUDOERS_FILE} && chmod 0440 {SUDOERS_FILE}"#
    ));
    sf.dedent();
    sf.push("fi");
    sf.blank();

    sf.push(format!("export HOME={home} USER={user} LOGNAME={user}"));
    sf.push(r#"if [ "$#" -eq 0 ]; then set -- bash; fi"#);
    sf.push("if command -v setpriv >/dev/null 2>&1; then");
    sf.indent();
    sf.push(format!(
        r#"exec setpriv --reuid={uid} --regid={gid} --init-groups -- "$@""#
    ));
    sf.dedent();
    sf.push("fi");
    sf.push(format!(
        r#"exec su --preserve-environment {user} -c "$(printf '%q ' "$@")""#
    ));

    sf.build()
        .context("failed to render the user creation script")
}
