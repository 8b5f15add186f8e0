#![allow(clippy::module_name_repetitions)]
//! `--env`/`--volume` argument helpers. Flags use the single-token `--flag=value` form so the
//! assembled vector stays readable when echoed.

use std::path::Path;

pub(crate) fn push_env_kv(args: &mut Vec<String>, key: &str, val: &str) {
    args.push(format!("--env={key}={val}"));
}

/// Forward the caller's value of `key` (docker reads it from its own environment).
pub(crate) fn push_env_passthrough(args: &mut Vec<String>, key: &str) {
    args.push(format!("--env={key}"));
}

pub(crate) fn push_volume(args: &mut Vec<String>, src: impl AsRef<str>, dest: &Path) {
    args.push(format!("--volume={}:{}", src.as_ref(), dest.display()));
}

pub(crate) fn push_volume_ro(args: &mut Vec<String>, src: impl AsRef<str>, dest: &Path) {
    args.push(format!("--volume={}:{}:ro", src.as_ref(), dest.display()));
}

/// Mount a host path at the same path inside the container.
pub(crate) fn push_bind_same(args: &mut Vec<String>, path: &Path) {
    push_volume(args, path.to_string_lossy(), path);
}
