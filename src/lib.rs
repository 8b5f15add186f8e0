//! dogi: a minimalist wrapper around `docker run` / `docker exec`.
//!
//! The library owns everything that is not argument parsing: host identity lookup, script
//! generation for in-container user replication, X11 cookie export, image classification,
//! the APT caching sidecar, docker argument assembly and the final process replacement.
//! The `dogi` binary (`src/main.rs`) is a thin clap front end over these modules.

pub mod color;
pub mod config;
pub mod diagnostics;
pub mod docker;
pub mod errors;
pub mod host;
pub mod identity;
pub mod process;
pub mod script;
pub mod telemetry;
pub mod ui;
pub mod update;
pub mod util;

pub use color::{
    color_enabled_stderr, color_enabled_stdout, log_error_stderr, log_info_stderr,
    log_warn_stderr, paint, set_color_mode, ColorMode,
};
pub use docker::runtime::{container_runtime_path, CmdOutput, Docker, DockerCli};
pub use errors::{hint_for_error, report_error, DogiError, EXIT_FAILURE};
pub use identity::{GroupEntry, Identity};
pub use process::{replace_process, ExecPlan, Outcome};
pub use ui::select::{Chooser, TerminalChooser};
pub use ui::warn::warn_print;
pub use util::{shell_escape, shell_join};

/// Program name used for log prefixes, volume names and in-container paths.
pub const APP_NAME: &str = "dogi";
