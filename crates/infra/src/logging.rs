//! Tracing subscriber setup
//!
//! Libraries only emit `tracing` events; binaries and tests call
//! [`init_tracing`] once to see them.

use ledgerlink_domain::{LedgerLinkError, Result};
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `default_directives` (e.g.
/// `"info,ledgerlink_core=debug"`). With `json` set, events are written as
/// one JSON object per line.
///
/// # Errors
/// Returns `LedgerLinkError::Config` for invalid directives and
/// `LedgerLinkError::Internal` when a global subscriber is already set.
pub fn init_tracing(default_directives: &str, json: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives).map_err(|e| {
            LedgerLinkError::Config(format!("invalid log directives `{default_directives}`: {e}"))
        })?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if json { builder.json().try_init() } else { builder.try_init() };

    installed.map_err(|e| {
        LedgerLinkError::Internal(format!("failed to install tracing subscriber: {e}"))
    })
}
