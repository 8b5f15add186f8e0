//! Facts about the host: container detection, devices, X11 and time zone.

pub mod timezone;
pub mod xauth;

use std::fs;
use std::path::Path;

/// Marker file docker creates in every container.
pub const DOCKERENV: &str = "/.dockerenv";

pub fn inside_container() -> bool {
    Path::new(DOCKERENV).exists()
}

/// Short (12 character) container id from a `--cidfile` marker.
pub fn read_container_marker(path: &Path) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    let id = raw.trim();
    if id.is_empty() {
        return None;
    }
    Some(id.chars().take(12).collect())
}

pub fn has_dri_device() -> bool {
    Path::new("/dev/dri").exists()
}

/// A second DRI card usually means a discrete (often NVIDIA) GPU next to the integrated one.
pub fn has_second_dri_card() -> bool {
    Path::new("/dev/dri/card1").exists()
}
