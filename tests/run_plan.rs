mod support;

use std::path::PathBuf;

use dogi::config::RunConfig;
use dogi::docker::args::{APT_PROXY_CONF_PATH, DOGI_BIN_PATH, XAUTH_PATH};
use dogi::docker::run::{launch, DRY_RUN_PROXY_CONF};
use dogi::docker::{prepare_launch, resolve_image, HostFacts, LaunchPlan};
use dogi::script::CREATE_USER_SCRIPT_PATH;
use dogi::{CmdOutput, DogiError, Outcome};

use support::{alice, FakeDocker, PanicChooser, ScriptedChooser};

const UBUNTU_CONFIG: &str =
    r#"{"Env":["PATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin"],"Cmd":["/bin/bash"],"WorkingDir":"","Entrypoint":null}"#;

const UBUNTU_OS_RELEASE: &str = "PRETTY_NAME=\"Ubuntu 22.04.3 LTS\"\nNAME=\"Ubuntu\"\nID=ubuntu\n";

fn host() -> HostFacts {
    HostFacts {
        workdir: PathBuf::from("/home/alice/src/app"),
        display: ":1".into(),
        timezone: Some("Europe/Madrid".into()),
        dri_device: false,
        ssh_dir: None,
        cid_file: PathBuf::from("/tmp/.dogitest.cid"),
        xauth_file: Some(PathBuf::from("/tmp/.dogitest.xauth")),
        dogi_exe: None,
    }
}

fn ubuntu_docker() -> FakeDocker {
    let docker = FakeDocker::new();
    docker
        .on(
            "image inspect --format {{json .Config}} ubuntu",
            CmdOutput::ok(UBUNTU_CONFIG),
        )
        .on(
            "run --rm --entrypoint cat ubuntu /etc/os-release",
            CmdOutput::ok(UBUNTU_OS_RELEASE),
        );
    docker
}

#[test]
fn no_user_no_cacher_runs_image_default_command() {
    let docker = ubuntu_docker();
    let cfg = RunConfig {
        image: Some("ubuntu".into()),
        no_user: true,
        no_cacher: true,
        ..RunConfig::default()
    };
    let plan = prepare_launch(&cfg, &docker, &alice(), "ubuntu", &host()).unwrap();

    let args = plan.spec.docker_args();
    assert!(
        !args.iter().any(|a| a.contains(CREATE_USER_SCRIPT_PATH)),
        "unexpected user script in {args:?}"
    );
    assert!(!plan.aux.has_dest(APT_PROXY_CONF_PATH));
    assert!(plan.aux.has_dest(XAUTH_PATH));
    assert_eq!(plan.spec.entrypoint, ["/bin/bash"]);
    assert_eq!(&args[args.len() - 2..], ["ubuntu", "/bin/bash"]);
    assert!(!plan.replicate_user);
    // neither replication nor the cacher needs the distro
    assert!(plan.distro.is_none());
    assert!(!docker.called("run "));
}

#[test]
fn image_is_immediately_before_entrypoint() {
    let docker = ubuntu_docker();
    let cfg = RunConfig {
        image: Some("ubuntu".into()),
        no_cacher: true,
        command: vec!["echo".into(), "--rm".into()],
        ..RunConfig::default()
    };
    let plan = prepare_launch(&cfg, &docker, &alice(), "ubuntu", &host()).unwrap();
    let args = plan.spec.docker_args();

    let image_pos = args.iter().position(|a| a == "ubuntu").unwrap();
    assert_eq!(image_pos, plan.spec.flags.len());
    assert_eq!(
        &args[image_pos + 1..],
        ["bash", CREATE_USER_SCRIPT_PATH, "echo", "--rm"]
    );
    assert!(plan.spec.flags.iter().all(|f| f.starts_with("--")));

    let script_mount = plan
        .spec
        .flags
        .iter()
        .find(|f| f.ends_with(":/dogi_create_user.sh:ro"))
        .expect("user script mount");
    let host_path = script_mount
        .trim_start_matches("--volume=")
        .trim_end_matches(":/dogi_create_user.sh:ro");
    let script = std::fs::read_to_string(host_path).unwrap();
    assert!(script.contains("useradd --uid 1000 --gid 1000"));
    assert!(script.contains("groupadd --gid 44 video"));
    let _ = std::fs::remove_file(host_path);
}

#[test]
fn unsupported_distro_with_user_offers_no_user() {
    let docker = FakeDocker::new();
    docker
        .on(
            "image inspect --format {{json .Config}} alpine",
            CmdOutput::ok(r#"{"Cmd":["/bin/sh"]}"#),
        )
        .on(
            "run --rm --entrypoint cat alpine /etc/os-release",
            CmdOutput::ok("NAME=\"Alpine Linux\"\nID=alpine\n"),
        );
    let cfg = RunConfig {
        image: Some("alpine".into()),
        ..RunConfig::default()
    };
    let err = prepare_launch(&cfg, &docker, &alice(), "alpine", &host()).unwrap_err();
    let de = err.downcast_ref::<DogiError>().expect("DogiError");
    assert!(matches!(de, DogiError::Unsupported { .. }));
    assert_eq!(
        de.hint().as_deref(),
        Some("you can still run it with: dogi run --no-user alpine")
    );
    // the apt cacher is never prepared for an unsupported image
    assert!(!docker.called("build"));
}

#[test]
fn unsupported_distro_without_user_skips_cacher() {
    let docker = FakeDocker::new();
    docker
        .on(
            "image inspect --format {{json .Config}} alpine",
            CmdOutput::ok(r#"{"Cmd":["/bin/sh"]}"#),
        )
        .on(
            "run --rm --entrypoint cat alpine /etc/os-release",
            CmdOutput::ok("NAME=\"Alpine Linux\"\n"),
        );
    let cfg = RunConfig {
        image: Some("alpine".into()),
        no_user: true,
        ..RunConfig::default()
    };
    let plan = prepare_launch(&cfg, &docker, &alice(), "alpine", &host()).unwrap();
    assert!(!plan.aux.has_dest(APT_PROXY_CONF_PATH));
    assert!(!docker.called("build"));
    assert_eq!(plan.spec.entrypoint, ["/bin/sh"]);
}

#[test]
fn root_user_is_not_replicated() {
    let docker = ubuntu_docker();
    let mut root = alice();
    root.username = "root".into();
    root.uid = 0;
    root.gid = 0;
    let cfg = RunConfig {
        image: Some("ubuntu".into()),
        no_cacher: true,
        ..RunConfig::default()
    };
    let plan = prepare_launch(&cfg, &docker, &root, "ubuntu", &host()).unwrap();
    assert!(!plan.replicate_user);
    assert_eq!(plan.spec.entrypoint, ["/bin/bash"]);
}

#[test]
fn image_without_cmd_falls_back_to_bash() {
    let docker = FakeDocker::new();
    docker.on(
        "image inspect --format {{json .Config}} scratchy",
        CmdOutput::ok(r#"{"Cmd":null}"#),
    );
    let cfg = RunConfig {
        image: Some("scratchy".into()),
        no_user: true,
        no_cacher: true,
        ..RunConfig::default()
    };
    let plan = prepare_launch(&cfg, &docker, &alice(), "scratchy", &host()).unwrap();
    assert_eq!(plan.spec.entrypoint, ["bash"]);
}

#[test]
fn missing_image_list_is_a_usage_error() {
    let docker = FakeDocker::new();
    docker.on(
        "images",
        CmdOutput::ok("REPOSITORY   TAG   IMAGE ID   CREATED   SIZE\n"),
    );
    let err = resolve_image(&RunConfig::default(), &docker, &PanicChooser).unwrap_err();
    assert_eq!(err.to_string(), "no images locally available");
}

#[test]
fn image_is_picked_by_id_column() {
    let docker = FakeDocker::new();
    docker.on(
        "images",
        CmdOutput::ok(
            "REPOSITORY   TAG     IMAGE ID       CREATED       SIZE\n\
             ubuntu       22.04   3db8720ecbf5   2 weeks ago   77.9MB\n\
             fedora       39      8f1e2d3c4b5a   3 weeks ago   190MB\n",
        ),
    );
    let chooser = ScriptedChooser::new(1);
    let image = resolve_image(&RunConfig::default(), &docker, &chooser).unwrap();
    assert_eq!(image, "8f1e2d3c4b5a");
    let (prompt, items) = chooser.seen.borrow().clone().unwrap();
    assert!(prompt.starts_with("REPOSITORY"));
    assert_eq!(items.len(), 2);
}

const SIDECAR_INSPECT: &str = "container inspect --format {{.Id}} {{.Image}}";

/// `ubuntu_docker` plus an up-to-date, running apt cacher.
fn ubuntu_docker_with_cacher() -> FakeDocker {
    let docker = ubuntu_docker();
    docker
        .on("build --quiet --tag dogi/apt-cacher", CmdOutput::ok("sha256:new\n"))
        .on(
            "image inspect --format {{.Id}} dogi/apt-cacher",
            CmdOutput::ok("sha256:new\n"),
        )
        .on(SIDECAR_INSPECT, CmdOutput::ok("c1 sha256:new true 172.17.0.2\n"));
    docker
}

fn aux_source(plan: &LaunchPlan, dest: &str) -> PathBuf {
    plan.aux
        .iter()
        .find(|a| a.dest == dest)
        .map(|a| a.src.clone())
        .unwrap_or_else(|| panic!("no auxiliary file for {dest}"))
}

#[test]
fn apt_image_with_cacher_registers_proxy_config() {
    let docker = ubuntu_docker_with_cacher();
    let cfg = RunConfig {
        image: Some("ubuntu".into()),
        no_user: true,
        ..RunConfig::default()
    };
    let plan = prepare_launch(&cfg, &docker, &alice(), "ubuntu", &host()).unwrap();

    let conf = aux_source(&plan, APT_PROXY_CONF_PATH);
    let text = std::fs::read_to_string(&conf).unwrap();
    assert_eq!(text, "Acquire::http::Proxy \"http://172.17.0.2:3142\";\n");
    let _ = std::fs::remove_file(conf);

    let dests: Vec<_> = plan.aux.iter().map(|a| a.dest.as_str()).collect();
    assert_eq!(dests, [XAUTH_PATH, APT_PROXY_CONF_PATH]);
}

#[test]
fn fedora_with_cacher_skips_the_sidecar() {
    let docker = FakeDocker::new();
    docker
        .on(
            "image inspect --format {{json .Config}} fedora",
            CmdOutput::ok(r#"{"Cmd":["/bin/bash"]}"#),
        )
        .on(
            "run --rm --entrypoint cat fedora /etc/os-release",
            CmdOutput::ok("NAME=\"Fedora Linux\"\nID=fedora\n"),
        );
    let cfg = RunConfig {
        image: Some("fedora".into()),
        no_user: true,
        ..RunConfig::default()
    };
    let plan = prepare_launch(&cfg, &docker, &alice(), "fedora", &host()).unwrap();
    assert!(!plan.aux.has_dest(APT_PROXY_CONF_PATH));
    assert!(!docker.called("build"));
    assert!(!docker.called("container inspect"));
}

#[test]
fn dry_run_leaves_a_stale_sidecar_alone() {
    let docker = ubuntu_docker();
    docker
        .on(
            "image inspect --format {{.Id}} dogi/apt-cacher",
            CmdOutput::ok("sha256:new\n"),
        )
        .on(SIDECAR_INSPECT, CmdOutput::ok("c1 sha256:old true 172.17.0.2\n"));
    let cfg = RunConfig {
        image: Some("ubuntu".into()),
        no_user: true,
        dry_run: true,
        ..RunConfig::default()
    };
    let plan = prepare_launch(&cfg, &docker, &alice(), "ubuntu", &host()).unwrap();

    assert_eq!(
        aux_source(&plan, APT_PROXY_CONF_PATH),
        PathBuf::from(DRY_RUN_PROXY_CONF)
    );
    for mutating in ["build", "stop", "rm", "run -d"] {
        assert!(!docker.called(mutating), "{mutating} issued: {:#?}", docker.calls());
    }

    let outcome = launch(&cfg, &docker, &alice(), &plan, &host()).unwrap();
    assert!(matches!(outcome, Outcome::Done));
    assert!(!docker.called("create"));
    assert!(!docker.called("cp"));
}

#[test]
fn launch_creates_copies_then_hands_over_to_start() {
    let docker = ubuntu_docker_with_cacher();
    docker
        .on("create", CmdOutput::ok("c0ffee123456\n"))
        .on("cp -aL", CmdOutput::ok(""));
    let mut facts = host();
    facts.dogi_exe = Some(PathBuf::from("/usr/local/bin/dogi"));
    let cfg = RunConfig {
        image: Some("ubuntu".into()),
        no_user: true,
        ..RunConfig::default()
    };
    let plan = prepare_launch(&cfg, &docker, &alice(), "ubuntu", &facts).unwrap();
    let conf = aux_source(&plan, APT_PROXY_CONF_PATH);

    let outcome = launch(&cfg, &docker, &alice(), &plan, &facts).unwrap();
    let Outcome::Exec(handover) = outcome else {
        panic!("expected a process hand-over");
    };
    assert_eq!(handover.program, PathBuf::from("/usr/bin/docker"));
    assert_eq!(handover.args, ["start", "-ai", "c0ffee123456"]);

    let calls = docker.calls();
    let create = calls.iter().position(|c| c.starts_with("create ")).unwrap();
    assert!(calls[create].ends_with("ubuntu /bin/bash"), "{}", calls[create]);
    let copies: Vec<&String> = calls[create + 1..]
        .iter()
        .filter(|c| c.starts_with("cp -aL "))
        .collect();
    assert_eq!(
        copies,
        [
            &format!("cp -aL /tmp/.dogitest.xauth c0ffee123456:{XAUTH_PATH}"),
            &format!("cp -aL {} c0ffee123456:{APT_PROXY_CONF_PATH}", conf.display()),
            &format!("cp -aL /usr/local/bin/dogi c0ffee123456:{DOGI_BIN_PATH}"),
        ]
    );
    assert!(!calls[..create].iter().any(|c| c.starts_with("cp ")));
    let _ = std::fs::remove_file(conf);
}
