//! Named volumes that keep download caches across throwaway containers.
//!
//! Toolchain caches are detected from the image's declared environment: an image that sets
//! `CARGO_HOME` gets a persistent registry cache at that location, and so on.

use std::path::{Path, PathBuf};

use super::images::ImageConfig;

/// Generic cache volume mounted at `<home>/.cache`.
pub const HOME_CACHE_VOLUME: &str = "dogi_cache_vol";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolchainCache {
    /// Image env var naming the toolchain's home.
    pub env_var: &'static str,
    pub volume: &'static str,
    /// Cache location below the env var's value; empty means the value itself.
    pub subdir: &'static str,
}

pub const TOOLCHAIN_CACHES: &[ToolchainCache] = &[
    ToolchainCache {
        env_var: "CARGO_HOME",
        volume: "dogi_cargo-cache_vol",
        subdir: "registry",
    },
    ToolchainCache {
        env_var: "GOPATH",
        volume: "dogi_go-cache_vol",
        subdir: "pkg/mod",
    },
    ToolchainCache {
        env_var: "PIP_CACHE_DIR",
        volume: "dogi_pip-cache_vol",
        subdir: "",
    },
];

/// A cache volume to mount: `<volume>:<target>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheMount {
    pub volume: String,
    pub target: PathBuf,
}

pub fn home_cache(home: &Path) -> CacheMount {
    CacheMount {
        volume: HOME_CACHE_VOLUME.to_string(),
        target: home.join(".cache"),
    }
}

/// Toolchain caches whose env var the image declares with an absolute path.
pub fn toolchain_caches(config: &ImageConfig) -> Vec<CacheMount> {
    TOOLCHAIN_CACHES
        .iter()
        .filter_map(|c| {
            let base = config.env_var(c.env_var)?.trim();
            if !base.starts_with('/') {
                return None;
            }
            let base = Path::new(base);
            let target = if c.subdir.is_empty() {
                base.to_path_buf()
            } else {
                base.join(c.subdir)
            };
            Some(CacheMount {
                volume: c.volume.to_string(),
                target,
            })
        })
        .collect()
}
