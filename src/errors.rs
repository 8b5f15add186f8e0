//! Error mapping guide:
//! - Operations return `anyhow::Result` and attach context with `.context(..)`.
//! - Conditions the user can act on are raised as `DogiError` so `main` can print the
//!   remediation (or escape hatch) beneath the message.
//! - Every failure exits with status 1; soft inconsistencies are warnings, never errors.
use std::fmt;

/// Exit status for validation errors, missing resources and docker failures alike.
pub const EXIT_FAILURE: u8 = 1;

#[derive(Debug)]
pub enum DogiError {
    /// A host binary (docker, xauth, git, ...) is not on PATH.
    MissingTool { tool: String, hint: Option<String> },
    /// The docker daemon or a docker subcommand failed.
    Docker {
        message: String,
        remediation: Option<String>,
    },
    /// The requested setup is not supported, but an escape hatch exists.
    Unsupported {
        message: String,
        escape_hatch: String,
    },
    /// Invalid invocation or nothing to operate on.
    Usage(String),
}

impl DogiError {
    pub fn missing_tool(tool: &str) -> Self {
        DogiError::MissingTool {
            tool: tool.to_string(),
            hint: None,
        }
    }

    pub fn docker(message: impl Into<String>) -> Self {
        DogiError::Docker {
            message: message.into(),
            remediation: None,
        }
    }

    pub fn docker_with(message: impl Into<String>, remediation: impl Into<String>) -> Self {
        DogiError::Docker {
            message: message.into(),
            remediation: Some(remediation.into()),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        DogiError::Usage(message.into())
    }

    /// Follow-up line printed beneath the error, if any.
    pub fn hint(&self) -> Option<String> {
        match self {
            DogiError::MissingTool { tool, hint } => Some(
                hint.clone()
                    .unwrap_or_else(|| format!("install {tool} and make sure it is on PATH")),
            ),
            DogiError::Docker { remediation, .. } => {
                remediation.as_ref().map(|r| format!("try: {r}"))
            }
            DogiError::Unsupported { escape_hatch, .. } => {
                Some(format!("you can still run it with: {escape_hatch}"))
            }
            DogiError::Usage(_) => None,
        }
    }
}

impl fmt::Display for DogiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DogiError::MissingTool { tool, .. } => write!(f, "{tool} was not found in PATH"),
            DogiError::Docker { message, .. } => f.write_str(message),
            DogiError::Unsupported { message, .. } => f.write_str(message),
            DogiError::Usage(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for DogiError {}

/// Find the first `DogiError` in the chain and return its hint line.
pub fn hint_for_error(err: &anyhow::Error) -> Option<String> {
    err.chain()
        .find_map(|c| c.downcast_ref::<DogiError>())
        .and_then(DogiError::hint)
}

/// Render a fatal error (and its hint) on stderr.
pub fn report_error(err: &anyhow::Error) {
    let use_err = crate::color_enabled_stderr();
    crate::log_error_stderr(use_err, &format!("dogi: error: {err:#}"));
    if let Some(hint) = hint_for_error(err) {
        crate::log_warn_stderr(use_err, &format!("dogi: {hint}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn hint_survives_added_context() {
        let res: anyhow::Result<()> = Err(DogiError::docker_with(
            "docker image 'nope' does not exist",
            "docker pull nope",
        ))
        .context("resolving image");
        let err = res.unwrap_err();
        assert_eq!(hint_for_error(&err).as_deref(), Some("try: docker pull nope"));
    }

    #[test]
    fn unsupported_hint_names_escape_hatch() {
        let e = DogiError::Unsupported {
            message: "alpine is not based on a supported distro".into(),
            escape_hatch: "dogi run --no-user alpine".into(),
        };
        assert_eq!(
            e.hint().as_deref(),
            Some("you can still run it with: dogi run --no-user alpine")
        );
    }

    #[test]
    fn usage_has_no_hint() {
        assert!(DogiError::usage("no containers running").hint().is_none());
        assert!(hint_for_error(&anyhow::anyhow!("plain")).is_none());
    }

    #[test]
    fn missing_tool_defaults_to_install_hint() {
        let e = DogiError::missing_tool("xauth");
        assert_eq!(e.to_string(), "xauth was not found in PATH");
        assert_eq!(
            e.hint().as_deref(),
            Some("install xauth and make sure it is on PATH")
        );
    }
}
