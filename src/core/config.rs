//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.peerdeck/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::sync::ReconnectPolicy;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PeerdeckConfig {
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub files: FilesConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NodeConfig {
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SyncConfig {
    pub poll_interval_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub reconnect: Option<ReconnectPolicy>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SearchConfig {
    pub default_budget: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FilesConfig {
    pub download_dir: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_NODE_URL: &str = "http://localhost:8080";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;
/// Zero asks the node to grow the budget on its own.
pub const DEFAULT_SEARCH_BUDGET: u32 = 0;
pub const DEFAULT_DOWNLOAD_DIR: &str = "_Downloads";

/// Anything faster than this hammers the node without making the panel
/// noticeably more live.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

pub const ENV_NODE_URL: &str = "PEERDECK_NODE_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "PEERDECK_POLL_INTERVAL_MS";
pub const ENV_DOWNLOAD_DIR: &str = "PEERDECK_DOWNLOAD_DIR";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub node_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub reconnect: ReconnectPolicy,
    pub default_budget: u32,
    pub download_dir: PathBuf,
}

/// Values given on the command line. `None` means "not specified".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub node_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub download_dir: Option<PathBuf>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.peerdeck/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".peerdeck").join("config.toml"))
}

/// Load config from `~/.peerdeck/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `PeerdeckConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<PeerdeckConfig, ConfigError> {
    let Some(path) = config_path() else {
        warn!("Could not determine home directory, using default config");
        return Ok(PeerdeckConfig::default());
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<PeerdeckConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(PeerdeckConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: PeerdeckConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# peerdeck configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [node]
# url = "http://localhost:8080"      # Or PEERDECK_NODE_URL / --node

# [sync]
# poll_interval_ms = 1000            # Or PEERDECK_POLL_INTERVAL_MS / --poll-interval-ms
# request_timeout_ms = 5000
# reconnect = "auto"                 # "auto" keeps polling while down, "manual" waits for Ctrl+R

# [search]
# default_budget = 0                 # 0 lets the node expand the budget itself

# [files]
# download_dir = "_Downloads"        # Or PEERDECK_DOWNLOAD_DIR / --download-dir
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG_TEMPLATE) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &PeerdeckConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with_env(
    config: &PeerdeckConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Node URL: CLI → env → config → default
    let node_url = cli
        .node_url
        .clone()
        .or_else(|| env(ENV_NODE_URL))
        .or_else(|| config.node.url.clone())
        .unwrap_or_else(|| DEFAULT_NODE_URL.to_string());

    // Poll interval: CLI → env → config → default, clamped from below
    let poll_interval_ms = cli
        .poll_interval_ms
        .or_else(|| parse_env_number(&env, ENV_POLL_INTERVAL_MS))
        .or(config.sync.poll_interval_ms)
        .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
    if poll_interval_ms < MIN_POLL_INTERVAL_MS {
        warn!(
            "Poll interval {}ms is below the minimum, using {}ms",
            poll_interval_ms, MIN_POLL_INTERVAL_MS
        );
    }

    // Download dir: CLI → env → config → default
    let download_dir = cli
        .download_dir
        .clone()
        .or_else(|| env(ENV_DOWNLOAD_DIR).map(PathBuf::from))
        .or_else(|| config.files.download_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_DIR));

    ResolvedConfig {
        node_url,
        poll_interval: Duration::from_millis(poll_interval_ms.max(MIN_POLL_INTERVAL_MS)),
        request_timeout: Duration::from_millis(
            config
                .sync
                .request_timeout_ms
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
        ),
        reconnect: config.sync.reconnect.unwrap_or_default(),
        default_budget: config
            .search
            .default_budget
            .unwrap_or(DEFAULT_SEARCH_BUDGET),
        download_dir,
    }
}

fn parse_env_number(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = env(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a number", key, raw);
            None
        }
    }
}
