#![allow(clippy::module_name_repetitions)]
//! Everything that talks to docker: runtime discovery, inspection, argument assembly, the APT
//! sidecar and the `run`/`exec`/`prune` flows.

pub mod apt_cache;
pub mod args;
pub mod caches;
pub mod containers;
pub mod distro;
pub mod env;
pub mod exec;
pub mod images;
pub mod prune;
pub mod run;
pub mod runtime;

pub use apt_cache::{AptCacheManager, AptCacheSidecarState, SidecarAction, SidecarStatus};
pub use args::{assemble, AuxiliaryFiles, ContainerLaunchSpec, LaunchInputs};
pub use distro::Distro;
pub use exec::{exec, plan_exec, resolve_container};
pub use prune::prune;
pub use run::{prepare_launch, resolve_image, run, HostFacts, LaunchPlan};
pub use runtime::{container_runtime_path, CmdOutput, Docker, DockerCli};
