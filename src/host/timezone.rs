//! Host time zone, forwarded to the container as `TZ`.

use std::fs;
use std::process::{Command, Stdio};

use which::which;

/// Time zone from `timedatectl show`, whose first line is `Timezone=<zone>`.
pub fn parse_timedatectl(out: &str) -> Option<String> {
    let first = out.lines().next()?.trim();
    let tz = first.strip_prefix("Timezone=")?.trim();
    (!tz.is_empty()).then(|| tz.to_string())
}

pub fn parse_etc_timezone(contents: &str) -> Option<String> {
    let tz = contents.lines().next()?.trim();
    (!tz.is_empty()).then(|| tz.to_string())
}

fn timedatectl_output() -> Option<String> {
    let bin = which("timedatectl").ok()?;
    let out = Command::new(bin)
        .arg("show")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&out.stdout).into_owned())
}

/// First answer from `timedatectl` output, then `/etc/timezone` contents.
pub fn resolve_timezone(timedatectl: Option<&str>, etc_timezone: Option<&str>) -> Option<String> {
    timedatectl
        .and_then(parse_timedatectl)
        .or_else(|| etc_timezone.and_then(parse_etc_timezone))
}

/// The host time zone, or None. Silent; `debug` reports the absence itself.
pub fn host_timezone() -> Option<String> {
    let timedatectl = timedatectl_output();
    let etc = fs::read_to_string("/etc/timezone").ok();
    resolve_timezone(timedatectl.as_deref(), etc.as_deref())
}

/// Like `host_timezone`, warning that `TZ` will not be set when nothing answers.
pub fn detect_timezone() -> Option<String> {
    let tz = host_timezone();
    if tz.is_none() {
        crate::warn_print("could not determine the host time zone; TZ is not set in the container");
    }
    tz
}
