#![allow(clippy::module_name_repetitions)]
//! Small utilities: shell escaping, scraping of docker's text output, temp files.

pub mod fs;
pub mod id;
pub mod shell_file;
pub mod table;

pub use shell_file::ShellFile;

pub fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|a| shell_escape(a))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn shell_escape(s: &str) -> String {
    if s.is_empty() {
        "''".to_string()
    } else if s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_=./:@,+".contains(c))
    {
        s.to_string()
    } else {
        let escaped = s.replace('\'', "'\"'\"'");
        format!("'{}'", escaped)
    }
}

/// Last non-empty line of a command's output (docker prints its summary there).
pub fn last_line(out: &str) -> &str {
    out.trim()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .unwrap_or("")
}

/// Account and group names are embedded in generated shell scripts verbatim.
pub fn is_safe_account_name(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._-".contains(c))
}
