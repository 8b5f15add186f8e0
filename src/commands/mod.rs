use std::path::Path;

use anyhow::Result;
use clap::CommandFactory;

use dogi::config::{ExecConfig, RunConfig};
use dogi::docker::args::CID_FILE_PATH;
use dogi::host::{inside_container, read_container_marker};
use dogi::{Docker, DogiError, Outcome, TerminalChooser};

use crate::cli::{Cli, Cmd, ExecArgs, RunArgs};

/// At most one positional argument before `--`.
fn single_target(targets: &[String], sub: &str, what: &str) -> Result<Option<String>> {
    if targets.len() <= 1 {
        return Ok(targets.first().cloned());
    }
    let mut cmd = Cli::command();
    if let Some(sc) = cmd.find_subcommand_mut(sub) {
        let _ = sc.print_help();
    }
    eprintln!();
    Err(DogiError::usage(format!(
        "dogi {sub} accepts a single {what}, got {}; separate the command with --, \
         e.g. dogi {sub} {} -- {}",
        targets.len(),
        targets[0],
        targets[1..].join(" ")
    ))
    .into())
}

fn run_config(cli: &Cli, args: &RunArgs) -> Result<RunConfig> {
    Ok(RunConfig {
        image: single_target(&args.targets, "run", "image")?,
        command: args.command.clone(),
        no_user: args.no_user,
        workdir: args.workdir.clone(),
        mount_home: args.home,
        name: args.name.clone(),
        privileged: args.privileged,
        no_cacher: args.no_cacher,
        no_rm: args.no_rm,
        no_nethost: args.no_nethost,
        runtime_nvidia: args.runtime_nvidia,
        gpus_all: args.gpus_all,
        dry_run: cli.dry_run,
    })
}

fn exec_config(cli: &Cli, args: &ExecArgs) -> Result<ExecConfig> {
    Ok(ExecConfig {
        container: single_target(&args.targets, "exec", "container")?,
        command: args.command.clone(),
        no_user: args.no_user,
        workdir: args.workdir.clone(),
        recent: args.recent,
        dry_run: cli.dry_run,
    })
}

/// `dogi` without a subcommand: where am I?
fn print_status() {
    let use_out = dogi::color_enabled_stdout();
    if inside_container() {
        println!(
            "dogi: {} container",
            dogi::paint(use_out, dogi::color::GREEN, "INSIDE")
        );
        if let Some(id) = read_container_marker(Path::new(CID_FILE_PATH)) {
            println!("  container id: {id}");
            println!(
                "  open another shell from the host with: {}",
                dogi::paint(use_out, dogi::color::GRAY, &format!("dogi exec {id}"))
            );
        }
    } else {
        println!(
            "dogi: {} container",
            dogi::paint(use_out, dogi::color::YELLOW, "OUTSIDE")
        );
        println!("  try: dogi --help");
    }
}

/// A subcommand with its validated configuration.
enum Planned {
    Run(RunConfig),
    Exec(ExecConfig),
    Prune,
    Update,
    Debug,
}

pub(crate) fn dispatch(cli: &Cli) -> Result<Outcome> {
    let Some(cmd) = &cli.command else {
        print_status();
        return Ok(Outcome::Done);
    };

    // validate arguments before touching the host
    let planned = match cmd {
        Cmd::Run(args) => Planned::Run(run_config(cli, args)?),
        Cmd::Exec(args) => Planned::Exec(exec_config(cli, args)?),
        Cmd::Prune => Planned::Prune,
        Cmd::Update => Planned::Update,
        Cmd::Debug => Planned::Debug,
    };

    if inside_container() {
        return Err(DogiError::usage("dogi cannot run inside a container").into());
    }

    match planned {
        Planned::Run(cfg) => {
            let docker = Docker::locate()?;
            dogi::docker::run(&cfg, &docker, &TerminalChooser)
        }
        Planned::Exec(cfg) => {
            let docker = Docker::locate()?;
            dogi::docker::exec(&cfg, &docker, &TerminalChooser)
        }
        Planned::Prune => {
            let docker = Docker::locate()?;
            for (what, summary) in dogi::docker::prune(&docker)? {
                println!("{what}: {summary}");
            }
            Ok(Outcome::Done)
        }
        Planned::Update => {
            dogi::update::update(cli.dry_run)?;
            Ok(Outcome::Done)
        }
        Planned::Debug => {
            dogi::diagnostics::run_debug();
            Ok(Outcome::Done)
        }
    }
}
