use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nbuild date: ",
    env!("DOGI_BUILD_DATE"),
    "\ntarget:     ",
    env!("DOGI_BUILD_TARGET"),
    "\nrustc:      ",
    env!("DOGI_RUSTC_VERSION"),
);

const AFTER_HELP: &str = "\
Examples:
  dogi run ubuntu                       shell in an ubuntu container as yourself
  dogi run ubuntu -- xeyes              run a GUI application
  dogi run --no-user alpine             images without a supported distro run as root
  dogi exec --recent                    another shell in the latest container
  dogi                                  tell whether you are inside a dogi container";

#[derive(Parser, Debug)]
#[command(
    name = "dogi",
    version,
    long_version = LONG_VERSION,
    about = "Run docker containers that feel like your host: working directory, X11 GUI apps and your own user inside",
    after_help = AFTER_HELP
)]
pub(crate) struct Cli {
    /// Print debug logs (same as DOGI_LOG=debug)
    #[arg(long, global = true)]
    pub(crate) verbose: bool,

    /// Print the docker commands that would run, without creating containers
    #[arg(long = "dry-run", global = true)]
    pub(crate) dry_run: bool,

    /// Colorize output: auto|always|never
    #[arg(long = "color", value_enum, global = true)]
    pub(crate) color: Option<dogi::ColorMode>,

    #[command(subcommand)]
    pub(crate) command: Option<Cmd>,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Cmd {
    /// Create a container from an image and go inside (the image is asked for when omitted)
    Run(RunArgs),
    /// Open a new shell in a running container (the container is asked for when omitted)
    Exec(ExecArgs),
    /// Remove stopped containers, dangling images and unused volumes
    Prune,
    /// Update dogi to the latest upstream commit
    Update,
    /// Print internal dogi information
    Debug,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct RunArgs {
    /// Image to run
    #[arg(value_name = "IMAGE")]
    pub(crate) targets: Vec<String>,

    /// Command to run instead of the image's default (after --)
    #[arg(last = true, value_name = "COMMAND")]
    pub(crate) command: Vec<String>,

    /// Run as the image's default user instead of replicating yours
    #[arg(long = "no-user")]
    pub(crate) no_user: bool,

    /// Working directory to share (default: current directory)
    #[arg(long)]
    pub(crate) workdir: Option<PathBuf>,

    /// Also share your complete home directory
    #[arg(long = "home")]
    pub(crate) home: bool,

    /// Container name
    #[arg(long)]
    pub(crate) name: Option<String>,

    /// Run a privileged container
    #[arg(long)]
    pub(crate) privileged: bool,

    /// Do not use the APT caching container
    #[arg(long = "no-cacher", env = "DOGI_NO_CACHER", value_parser = FalseyValueParser::new())]
    pub(crate) no_cacher: bool,

    /// Keep the container after it exits
    #[arg(long = "no-rm")]
    pub(crate) no_rm: bool,

    /// Do not use the host network
    #[arg(long = "no-nethost", env = "DOGI_NO_NETHOST", value_parser = FalseyValueParser::new())]
    pub(crate) no_nethost: bool,

    /// Use the nvidia container runtime
    #[arg(long = "runtime-nvidia", env = "DOGI_RUNTIME_NVIDIA", value_parser = FalseyValueParser::new())]
    pub(crate) runtime_nvidia: bool,

    /// Expose all GPUs (--gpus=all)
    #[arg(long = "gpus-all", env = "DOGI_GPUS_ALL", value_parser = FalseyValueParser::new())]
    pub(crate) gpus_all: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ExecArgs {
    /// Container id or name
    #[arg(value_name = "CONTAINER")]
    pub(crate) targets: Vec<String>,

    /// Command to run instead of bash (after --)
    #[arg(last = true, value_name = "COMMAND")]
    pub(crate) command: Vec<String>,

    /// Run as root even in containers dogi started with your user
    #[arg(long = "no-user")]
    pub(crate) no_user: bool,

    /// Working directory inside the container (default: the container's)
    #[arg(long)]
    pub(crate) workdir: Option<String>,

    /// Use the most recently created running container
    #[arg(long)]
    pub(crate) recent: bool,
}
