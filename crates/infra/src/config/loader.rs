//! Configuration loader
//!
//! Loads the service configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `LEDGERLINK_REALM_ID` is missing, falls back to loading from file
//! 3. Searches several paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `LEDGERLINK_REALM_ID`: Company (realm) id, required
//! - `LEDGERLINK_BASE_URL`: API base URL
//! - `LEDGERLINK_MINOR_VERSION`: API minor version
//! - `LEDGERLINK_COMPRESSION`: `none`, `gzip` or `deflate`
//! - `LEDGERLINK_TAG_NAMESPACE`: Prefix rendered in front of entity tags
//! - `LEDGERLINK_HTTP_TIMEOUT_SECS`: Request timeout in seconds
//! - `LEDGERLINK_HTTP_MAX_ATTEMPTS`: Total HTTP attempts per request
//! - `LEDGERLINK_USER_AGENT`: `User-Agent` header value
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./ledgerlink.json` or `./ledgerlink.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent and grandparent directories
//! 4. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ledgerlink_domain::{CompressionFormat, LedgerLinkError, Result, ServiceConfig};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["ledgerlink.json", "ledgerlink.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the realm id is not
/// set there, falls back to loading from a config file.
///
/// # Errors
/// Returns `LedgerLinkError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load() -> Result<ServiceConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `LEDGERLINK_REALM_ID` is required; every other setting falls back to
/// its default.
///
/// # Errors
/// Returns `LedgerLinkError::Config` if the realm id is missing or a
/// variable has an invalid value.
pub fn load_from_env() -> Result<ServiceConfig> {
    let mut config = ServiceConfig::new(env_var("LEDGERLINK_REALM_ID")?);

    if let Some(base_url) = env_opt("LEDGERLINK_BASE_URL") {
        config.base_url = base_url;
    }
    config.minor_version = env_parse::<u32>("LEDGERLINK_MINOR_VERSION")?;
    if let Some(compression) = env_opt("LEDGERLINK_COMPRESSION") {
        config.compression = CompressionFormat::from_str(&compression)
            .map_err(|e| LedgerLinkError::Config(format!("LEDGERLINK_COMPRESSION: {e}")))?;
    }
    config.tag_namespace = env_opt("LEDGERLINK_TAG_NAMESPACE");
    if let Some(timeout) = env_parse::<u64>("LEDGERLINK_HTTP_TIMEOUT_SECS")? {
        config.http.timeout_secs = timeout;
    }
    if let Some(attempts) = env_parse::<usize>("LEDGERLINK_HTTP_MAX_ATTEMPTS")? {
        config.http.max_attempts = attempts;
    }
    if let Some(user_agent) = env_opt("LEDGERLINK_USER_AGENT") {
        config.http.user_agent = user_agent;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches several locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `LedgerLinkError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<ServiceConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(LedgerLinkError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            LedgerLinkError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| LedgerLinkError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ServiceConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| LedgerLinkError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| LedgerLinkError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(LedgerLinkError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Search several paths for a configuration file
///
/// Searches the current working directory, its parent and grandparent, then
/// the executable's directory, trying `ledgerlink.{json,toml}` before
/// `config.{json,toml}` in each.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `LedgerLinkError::Config` if the variable is not set or blank.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        LedgerLinkError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Optional environment variable; blank values count as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse an optional environment variable.
///
/// # Errors
/// Returns `LedgerLinkError::Config` if the variable is set but does not
/// parse.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| LedgerLinkError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}
