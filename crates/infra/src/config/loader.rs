//! Configuration loader
//!
//! Loads the client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `LAPI_SCENARIOS` is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `LAPI_SCENARIOS`: Comma-separated scenario list (required)
//! - `LAPI_API_URL`: Base url of the API
//! - `LAPI_AUTH_TYPE`: `api_key` or `tls`
//! - `LAPI_API_KEY`: Pre-shared key sent as `X-Api-Key`
//! - `LAPI_TLS_CERT_PATH` / `LAPI_TLS_KEY_PATH`: Client certificate and key
//! - `LAPI_TLS_VERIFY_PEER`: Whether to verify the server (true/false, 1/0,
//!   yes/no, on/off; anything else is rejected)
//! - `LAPI_TLS_CA_CERT_PATH`: CA bundle used when verifying the server
//! - `LAPI_API_TIMEOUT`: Request timeout in seconds (0 disables it)
//! - `LAPI_USER_AGENT_SUFFIX`: Appended to the user agent prefix
//! - `LAPI_MACHINE_ID_PREFIX`: Prefix of generated machine ids
//! - `LAPI_ENV`: `dev` or `prod`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./lapi.toml` or `./lapi.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};

use lapi_domain::constants::SEP;
use lapi_domain::{Configuration, LapiError, RawConfig, Result};

const CONFIG_FILE_NAMES: [&str; 4] = ["lapi.toml", "lapi.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If `LAPI_SCENARIOS`
/// is not set, falls back to loading from a probed config file.
///
/// # Errors
/// Returns `LapiError::Configuration` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Validation fails
pub fn load() -> Result<Configuration> {
    if std::env::var_os("LAPI_SCENARIOS").is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    tracing::debug!("LAPI_SCENARIOS not set, trying config file");
    load_from_file(None)
}

/// Load configuration from environment variables
///
/// Only `LAPI_SCENARIOS` is required; every other option falls back to its
/// default.
///
/// # Errors
/// Returns `LapiError::Configuration` if a variable is missing, unparsable
/// or fails validation.
pub fn load_from_env() -> Result<Configuration> {
    let scenarios = env_var("LAPI_SCENARIOS")?
        .split(SEP)
        .map(str::trim)
        .map(ToString::to_string)
        .collect();

    let api_timeout = optional_env("LAPI_API_TIMEOUT")
        .map(|value| {
            value.parse::<u64>().map_err(|e| {
                LapiError::configuration("api_timeout", format!("Invalid timeout {value:?}: {e}"))
            })
        })
        .transpose()?;

    let raw = RawConfig {
        api_url: optional_env("LAPI_API_URL"),
        auth_type: optional_env("LAPI_AUTH_TYPE"),
        api_key: optional_env("LAPI_API_KEY"),
        tls_cert_path: optional_env("LAPI_TLS_CERT_PATH").map(PathBuf::from),
        tls_key_path: optional_env("LAPI_TLS_KEY_PATH").map(PathBuf::from),
        tls_verify_peer: env_bool("LAPI_TLS_VERIFY_PEER", "tls_verify_peer")?,
        tls_ca_cert_path: optional_env("LAPI_TLS_CA_CERT_PATH").map(PathBuf::from),
        api_timeout,
        user_agent_suffix: optional_env("LAPI_USER_AGENT_SUFFIX"),
        machine_id_prefix: optional_env("LAPI_MACHINE_ID_PREFIX"),
        scenarios: Some(scenarios),
        env: optional_env("LAPI_ENV"),
    };

    raw.validate()
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `LapiError::Configuration` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Validation fails
pub fn load_from_file(path: Option<PathBuf>) -> Result<Configuration> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(LapiError::configuration(
                    "file",
                    format!("Config file not found: {}", p.display()),
                ));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            LapiError::configuration("file", "No config file found in any of the standard locations")
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path).map_err(|e| {
        LapiError::configuration("file", format!("Failed to read config file: {e}"))
    })?;

    parse_config(&contents, &config_path)?.validate()
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `LapiError::Configuration` if format is invalid or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<RawConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| LapiError::configuration("file", format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| LapiError::configuration("file", format!("Invalid JSON format: {e}"))),
        _ => Err(LapiError::configuration(
            "file",
            format!("Unsupported config format: {extension}"),
        )),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut directories = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        directories.push(cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            directories.push(exe_dir.to_path_buf());
        }
    }

    directories
        .iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `LapiError::Configuration` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        LapiError::configuration("environment", format!("Missing required environment variable: {key}"))
    })
}

/// Non-empty value of an optional environment variable.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
/// Unset or empty yields `None`.
///
/// # Errors
/// Returns `LapiError::Configuration` naming `option` for any other value.
fn env_bool(key: &str, option: &str) -> Result<Option<bool>> {
    optional_env(key)
        .map(|value| match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(LapiError::configuration(
                option,
                format!("{key}={value:?} is not a boolean (expected true/false, 1/0, yes/no, on/off)"),
            )),
        })
        .transpose()
}
