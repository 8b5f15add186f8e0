/*!
Test doubles shared across integration tests.

- FakeDocker: scripted `DockerCli` that records every invocation
- ScriptedChooser / PanicChooser: `Chooser` implementations
- alice(): a fixed non-root identity
*/

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};

use dogi::{CmdOutput, Chooser, DockerCli, GroupEntry, Identity};

struct Rule {
    prefix: String,
    out: CmdOutput,
    remaining: Option<usize>,
}

/// Responds to docker invocations whose space-joined argv starts with a registered prefix.
/// Rules are tried in registration order; unmatched calls fail with exit 1.
#[derive(Default)]
#[allow(dead_code)]
pub struct FakeDocker {
    rules: RefCell<Vec<Rule>>,
    calls: RefCell<Vec<Vec<String>>>,
}

#[allow(dead_code)]
impl FakeDocker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, prefix: &str, out: CmdOutput) -> &Self {
        self.rules.borrow_mut().push(Rule {
            prefix: prefix.to_string(),
            out,
            remaining: None,
        });
        self
    }

    /// Like `on`, but the rule is used up after `times` matches.
    pub fn on_times(&self, prefix: &str, times: usize, out: CmdOutput) -> &Self {
        self.rules.borrow_mut().push(Rule {
            prefix: prefix.to_string(),
            out,
            remaining: Some(times),
        });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.join(" ")).collect()
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }

    fn respond(&self, args: &[&str]) -> CmdOutput {
        let joined = args.join(" ");
        self.calls
            .borrow_mut()
            .push(args.iter().map(|s| s.to_string()).collect());
        let mut rules = self.rules.borrow_mut();
        for r in rules.iter_mut() {
            if !joined.starts_with(&r.prefix) || r.remaining == Some(0) {
                continue;
            }
            if let Some(n) = r.remaining.as_mut() {
                *n -= 1;
            }
            return r.out.clone();
        }
        CmdOutput::failed(1, format!("no fake response for: docker {joined}"))
    }
}

impl DockerCli for FakeDocker {
    fn program(&self) -> &Path {
        Path::new("/usr/bin/docker")
    }

    fn invoke(&self, args: &[&str]) -> io::Result<CmdOutput> {
        Ok(self.respond(args))
    }
}

/// Always picks the given index and remembers the prompt it was shown.
#[allow(dead_code)]
pub struct ScriptedChooser {
    pub pick: usize,
    pub seen: RefCell<Option<(String, Vec<String>)>>,
}

#[allow(dead_code)]
impl ScriptedChooser {
    pub fn new(pick: usize) -> Self {
        ScriptedChooser {
            pick,
            seen: RefCell::new(None),
        }
    }
}

impl Chooser for ScriptedChooser {
    fn choose(&self, prompt: &str, items: &[String]) -> anyhow::Result<usize> {
        *self.seen.borrow_mut() = Some((prompt.to_string(), items.to_vec()));
        Ok(self.pick)
    }
}

/// Fails the test if a selection prompt is ever shown.
#[allow(dead_code)]
pub struct PanicChooser;

impl Chooser for PanicChooser {
    fn choose(&self, prompt: &str, _items: &[String]) -> anyhow::Result<usize> {
        panic!("selector must not be shown (prompt: {prompt})");
    }
}

#[allow(dead_code)]
pub fn alice() -> Identity {
    Identity {
        username: "alice".into(),
        full_name: "Alice".into(),
        uid: 1000,
        gid: 1000,
        home: PathBuf::from("/home/alice"),
        primary_group: GroupEntry::new("alice", 1000),
        groups: vec![
            GroupEntry::new("alice", 1000),
            GroupEntry::new("video", 44),
            GroupEntry::new("docker", 998),
        ],
    }
}
