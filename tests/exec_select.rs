mod support;

use dogi::config::ExecConfig;
use dogi::docker::exec::exec_as;
use dogi::docker::{plan_exec, resolve_container};
use dogi::{CmdOutput, DogiError, Outcome};

use support::{FakeDocker, PanicChooser, ScriptedChooser};

const PS_HEADER: &str = "CONTAINER ID   IMAGE     COMMAND   CREATED   STATUS    PORTS     NAMES\n";

#[test]
fn no_running_containers_never_prompts() {
    let docker = FakeDocker::new();
    docker.on("ps", CmdOutput::ok(PS_HEADER));

    let err = resolve_container(&ExecConfig::default(), &docker, &PanicChooser).unwrap_err();
    assert_eq!(err.to_string(), "no containers running");
    assert!(matches!(
        err.downcast_ref::<DogiError>(),
        Some(DogiError::Usage(_))
    ));
}

#[test]
fn recent_without_containers_fails_the_same_way() {
    let docker = FakeDocker::new();
    docker.on("ps --quiet --filter status=running", CmdOutput::ok("\n"));
    let cfg = ExecConfig {
        recent: true,
        ..ExecConfig::default()
    };
    let err = resolve_container(&cfg, &docker, &PanicChooser).unwrap_err();
    assert_eq!(err.to_string(), "no containers running");
}

#[test]
fn recent_ignores_exited_containers() {
    let docker = FakeDocker::new();
    // the exited 0badc0ffee00 is newer but only running containers are listed
    docker.on(
        "ps --quiet --filter status=running",
        CmdOutput::ok("9a8b7c6d5e4f\n4f1c2a9b7d3e\n"),
    );
    let cfg = ExecConfig {
        recent: true,
        ..ExecConfig::default()
    };
    let id = resolve_container(&cfg, &docker, &PanicChooser).unwrap();
    assert_eq!(id, "9a8b7c6d5e4f");
    assert!(!docker.called("ps --latest"));
}

#[test]
fn selection_uses_container_id_column() {
    let docker = FakeDocker::new();
    docker.on(
        "ps",
        CmdOutput::ok(format!(
            "{PS_HEADER}\
             4f1c2a9b7d3e   ubuntu    \"bash\"    1 min     Up 1 min            festive_hopper\n\
             9a8b7c6d5e4f   fedora    \"bash\"    2 min     Up 2 min            brave_curie\n"
        )),
    );
    let chooser = ScriptedChooser::new(1);
    let id = resolve_container(&ExecConfig::default(), &docker, &chooser).unwrap();
    assert_eq!(id, "9a8b7c6d5e4f");
}

#[test]
fn dogi_container_gets_user_and_configured_workdir() {
    let docker = FakeDocker::new();
    docker
        .on("ps --quiet --filter status=running", CmdOutput::ok("4f1c2a9b7d3e\n"))
        .on(
            "container inspect --format {{json .Args}} 4f1c2a9b7d3e",
            CmdOutput::ok(r#"["/dogi_create_user.sh","bash"]"#),
        )
        .on(
            "container inspect --format {{.Config.WorkingDir}} 4f1c2a9b7d3e",
            CmdOutput::ok("/home/alice/src\n"),
        );
    let cfg = ExecConfig {
        recent: true,
        ..ExecConfig::default()
    };
    let plan = plan_exec(&cfg, &docker, &PanicChooser, Some("alice")).unwrap();
    assert_eq!(
        plan.args,
        [
            "exec",
            "--interactive",
            "--tty",
            "--user=alice",
            "--workdir=/home/alice/src",
            "4f1c2a9b7d3e",
            "bash"
        ]
    );
}

#[test]
fn foreign_container_runs_as_root_in_slash() {
    let docker = FakeDocker::new();
    docker
        .on(
            "container inspect --format {{.Id}} web",
            CmdOutput::ok("sha256:abc\n"),
        )
        .on(
            "container inspect --format {{json .Args}} web",
            CmdOutput::ok("null"),
        )
        .on(
            "container inspect --format {{.Config.WorkingDir}} web",
            CmdOutput::ok("\n"),
        );
    let cfg = ExecConfig {
        container: Some("web".into()),
        command: vec!["sh".into(), "-l".into()],
        ..ExecConfig::default()
    };
    let plan = plan_exec(&cfg, &docker, &PanicChooser, Some("alice")).unwrap();
    assert_eq!(
        plan.args,
        ["exec", "--interactive", "--tty", "--workdir=/", "web", "sh", "-l"]
    );
}

#[test]
fn explicit_workdir_and_no_user_win() {
    let docker = FakeDocker::new();
    docker
        .on(
            "container inspect --format {{.Id}} dev",
            CmdOutput::ok("sha256:abc\n"),
        )
        .on(
            "container inspect --format {{json .Args}} dev",
            CmdOutput::ok(r#"["/dogi_create_user.sh","bash"]"#),
        );
    let cfg = ExecConfig {
        container: Some("dev".into()),
        no_user: true,
        workdir: Some("/opt".into()),
        ..ExecConfig::default()
    };
    let plan = plan_exec(&cfg, &docker, &PanicChooser, Some("alice")).unwrap();
    assert!(!plan.args.iter().any(|a| a.starts_with("--user")));
    assert!(plan.args.iter().any(|a| a == "--workdir=/opt"));
    assert!(!docker.called("container inspect --format {{.Config.WorkingDir}}"));
}

#[test]
fn unknown_container_suggests_listing() {
    let docker = FakeDocker::new();
    let cfg = ExecConfig {
        container: Some("ghost".into()),
        ..ExecConfig::default()
    };
    let err = resolve_container(&cfg, &docker, &PanicChooser).unwrap_err();
    assert_eq!(err.to_string(), "container 'ghost' does not exist");
    assert_eq!(
        dogi::hint_for_error(&err).as_deref(),
        Some("try: docker ps --all")
    );
}

#[test]
fn no_user_exec_skips_the_identity_lookup() {
    let docker = FakeDocker::new();
    docker
        .on(
            "container inspect --format {{.Id}} dev",
            CmdOutput::ok("sha256:abc\n"),
        )
        .on(
            "container inspect --format {{json .Args}} dev",
            CmdOutput::ok(r#"["/dogi_create_user.sh","bash"]"#),
        )
        .on(
            "container inspect --format {{.Config.WorkingDir}} dev",
            CmdOutput::ok("/src\n"),
        );
    let cfg = ExecConfig {
        container: Some("dev".into()),
        no_user: true,
        ..ExecConfig::default()
    };
    let outcome = exec_as(&cfg, &docker, &PanicChooser, || {
        Err(anyhow::anyhow!("no passwd entry for uid 4242"))
    })
    .unwrap();
    let Outcome::Exec(plan) = outcome else {
        panic!("expected a process hand-over");
    };
    assert_eq!(
        plan.args,
        ["exec", "--interactive", "--tty", "--workdir=/src", "dev", "bash"]
    );
}

#[test]
fn exec_reports_a_missing_passwd_entry_when_the_user_is_needed() {
    let docker = FakeDocker::new();
    let cfg = ExecConfig {
        container: Some("dev".into()),
        ..ExecConfig::default()
    };
    let err = exec_as(&cfg, &docker, &PanicChooser, || {
        Err(anyhow::anyhow!("no passwd entry for uid 4242"))
    })
    .unwrap_err();
    assert!(err.to_string().contains("no passwd entry"));
    assert!(docker.calls().is_empty());
}
