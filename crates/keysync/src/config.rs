//! CLI configuration -- thin wrapper around `keysync_config`.
//!
//! Adds `GlobalOpts`-aware resolution: `--config` picks the file and
//! `--timeout` overrides the configured request timeout.

use std::path::PathBuf;
use std::time::Duration;

use keysync_core::{ConnectionConfig, SyncConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use keysync_config::Config;

/// The config file in effect: `--config` if given, else the platform default.
pub fn active_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(keysync_config::config_path)
}

/// Load the config file and environment overlay.
///
/// An explicitly requested file must exist; the default one may be absent.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = active_path(global);
    if global.config.is_some() && !path.exists() {
        return Err(CliError::NoConfig {
            path: path.display().to_string(),
        });
    }
    Ok(keysync_config::load_config_from(&path)?)
}

/// Everything needed to build a `Synchronizer`.
pub fn resolve(global: &GlobalOpts) -> Result<(ConnectionConfig, SyncConfig), CliError> {
    let cfg = load(global)?;
    let sync = cfg.sync_config()?;
    let mut conn = cfg.connection_config()?;
    if let Some(secs) = global.timeout {
        conn.timeout = Duration::from_secs(secs);
    }
    Ok((conn, sync))
}
