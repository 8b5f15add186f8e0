//! Group reconciliation: which host groups must exist inside the container, and the shell
//! text that makes them exist.
//!
//! Rule selection (`GroupReconciliationPlan::for_identity`) is kept apart from rendering
//! (`GroupReconciliationPlan::render`) so the plan can be inspected and tested on its own.

use anyhow::{bail, Result};

use crate::identity::Identity;
use crate::util::{is_safe_account_name, ShellFile};

/// Host groups (besides the primary one) that are replicated when the user belongs to them.
pub const GROUPS_OF_INTEREST: &[&str] = &["video", "realtime"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRule {
    pub gid: u32,
    pub name: String,
    /// False for the primary group, which `useradd --gid` consumes instead of `usermod -aG`.
    pub supplementary: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupReconciliationPlan {
    rules: Vec<GroupRule>,
}

impl GroupReconciliationPlan {
    /// Primary group first, then the allow-listed groups the user belongs to, in allow-list order.
    ///
    /// At most one rule per group name and per gid.
    pub fn for_identity(identity: &Identity, allow_list: &[&str]) -> Result<Self> {
        let mut rules: Vec<GroupRule> = Vec::new();
        let primary = &identity.primary_group;
        rules.push(GroupRule {
            gid: primary.gid,
            name: primary.name.clone(),
            supplementary: false,
        });

        for wanted in allow_list {
            let Some(entry) = identity.group_named(wanted) else {
                continue;
            };
            if rules
                .iter()
                .any(|r| r.name == entry.name || r.gid == entry.gid)
            {
                continue;
            }
            rules.push(GroupRule {
                gid: entry.gid,
                name: entry.name.clone(),
                supplementary: true,
            });
        }

        for r in &rules {
            if !is_safe_account_name(&r.name) {
                bail!("group name {:?} cannot be replicated into a container", r.name);
            }
        }
        Ok(GroupReconciliationPlan { rules })
    }

    pub fn rules(&self) -> &[GroupRule] {
        &self.rules
    }

    pub fn supplementary(&self) -> impl Iterator<Item = &GroupRule> {
        self.rules.iter().filter(|r| r.supplementary)
    }

    /// Comma-joined supplementary group names, as handed to `usermod -aG`.
    pub fn joined_names(&self) -> String {
        self.supplementary()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// One reconciliation block per rule.
    ///
    /// Inside the container a mismatch between the host's gid/name pairing and the container's
    /// only warns; a group is created (with the host gid) only when neither its gid nor its name
    /// is taken, and a failed `groupadd` aborts the script.
    pub fn render(&self) -> ShellFile {
        let mut sf = ShellFile::new();
        for r in &self.rules {
            let (gid, name) = (r.gid, r.name.as_str());
            sf.push(format!("# group {name} ({gid})"));
            sf.push(format!(
                r#"name_of_gid="$(getent group {gid} | cut -d: -f1)""#
            ));
            sf.push(format!(
                r#"gid_of_name="$(getent group {name} | cut -d: -f3)""#
            ));
            sf.push(format!(
                r#"if [ -n "$name_of_gid" ] && [ "$name_of_gid" != "{name}" ]; then"#
            ));
            sf.indent().push(format!(
                r#"echo "dogi: warning: gid {gid} is '$name_of_gid' inside the container but '{name}' outside" >&2"#
            ));
            sf.dedent().push("fi");
            sf.push(format!(
                r#"if [ -n "$gid_of_name" ] && [ "$gid_of_name" != "{gid}" ]; then"#
            ));
            sf.indent().push(format!(
                r#"echo "dogi: warning: group '{name}' has gid $gid_of_name inside the container but {gid} outside" >&2"#
            ));
            sf.dedent().push("fi");
            sf.push(r#"if [ -z "$name_of_gid" ] && [ -z "$gid_of_name" ]; then"#);
            sf.indent().push(format!(
                r#"groupadd --gid {gid} {name} || fail "could not create group '{name}' ({gid})""#
            ));
            sf.dedent().push("fi");
        }
        sf
    }
}
