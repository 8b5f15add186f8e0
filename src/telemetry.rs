//! Diagnostic logging via `tracing`.
//!
//! The filter comes from `DOGI_LOG` (any `EnvFilter` directive, default `warn`); `--verbose`
//! raises the default to `debug`. Output goes to stderr without timestamps so it interleaves
//! with the `dogi: ...` progress lines.

use std::env;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

pub const LOG_ENV: &str = "DOGI_LOG";

fn filter_directive(verbose: bool) -> String {
    match env::var(LOG_ENV) {
        Ok(v) if !v.trim().is_empty() => v,
        _ if verbose => "debug".to_string(),
        _ => "warn".to_string(),
    }
}

/// Idempotent; a subscriber installed elsewhere (tests) is left alone.
pub fn init_tracing(verbose: bool) {
    if INIT.get().is_some() {
        return;
    }
    let directive = filter_directive(verbose);
    let env_filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| {
        eprintln!("dogi: ignoring invalid {LOG_ENV}={directive}");
        EnvFilter::new("warn")
    });
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();
    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
    {
        let _ = INIT.set(());
    }
}
