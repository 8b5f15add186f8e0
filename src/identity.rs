//! Invoking user's identity as recorded in the host's passwd/group databases.

use std::ffi::CString;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use nix::unistd::{getgrouplist, getuid, Gid, Group, Uid, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    pub name: String,
    pub gid: u32,
}

impl GroupEntry {
    pub fn new(name: impl Into<String>, gid: u32) -> Self {
        GroupEntry {
            name: name.into(),
            gid,
        }
    }
}

/// Read once per invocation and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    /// GECOS full name; may be empty.
    pub full_name: String,
    pub uid: u32,
    pub gid: u32,
    pub home: PathBuf,
    pub primary_group: GroupEntry,
    /// Every group the user belongs to, primary included, in the order the OS reported them.
    pub groups: Vec<GroupEntry>,
}

impl Identity {
    /// Look up the real uid of this process.
    ///
    /// A missing passwd entry or a group id without a name is an environment error.
    pub fn current() -> Result<Self> {
        Self::for_uid(getuid())
    }

    pub fn for_uid(uid: Uid) -> Result<Self> {
        let user = User::from_uid(uid)
            .with_context(|| format!("failed to look up user {uid}"))?
            .ok_or_else(|| anyhow!("no passwd entry for uid {uid}"))?;

        let primary_group = resolve_group(user.gid)?;
        let cname = CString::new(user.name.clone())
            .with_context(|| format!("invalid user name {:?}", user.name))?;
        let gids = getgrouplist(&cname, user.gid)
            .with_context(|| format!("failed to list groups of {}", user.name))?;

        let mut groups = Vec::with_capacity(gids.len());
        for gid in gids {
            let entry = resolve_group(gid)?;
            if !groups.contains(&entry) {
                groups.push(entry);
            }
        }

        Ok(Identity {
            username: user.name,
            full_name: user
                .gecos
                .to_string_lossy()
                .split(',')
                .next()
                .unwrap_or("")
                .to_string(),
            uid: user.uid.as_raw(),
            gid: user.gid.as_raw(),
            home: user.dir,
            primary_group,
            groups,
        })
    }

    pub fn is_root(&self) -> bool {
        self.uid == 0
    }

    pub fn group_named(&self, name: &str) -> Option<&GroupEntry> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn belongs_to(&self, name: &str) -> bool {
        self.group_named(name).is_some()
    }
}

fn resolve_group(gid: Gid) -> Result<GroupEntry> {
    let group = Group::from_gid(gid)
        .with_context(|| format!("failed to look up group {gid}"))?
        .ok_or_else(|| anyhow!("group id {gid} has no name on this host"))?;
    Ok(GroupEntry {
        name: group.name,
        gid: group.gid.as_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Identity {
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

    #[test]
    fn membership_lookup() {
        let id = sample();
        assert!(id.belongs_to("video"));
        assert!(!id.belongs_to("realtime"));
        assert_eq!(id.group_named("docker").map(|g| g.gid), Some(998));
        assert!(!id.is_root());
    }

    #[test]
    fn current_user_resolves() {
        let Ok(id) = Identity::current() else {
            eprintln!("skipping: current uid has no passwd entry");
            return;
        };
        assert_eq!(id.uid, getuid().as_raw());
        assert!(id.groups.iter().any(|g| g.gid == id.gid));
        assert_eq!(id.primary_group.gid, id.gid);
    }
}
