//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.relay/config.json`) and environment.
//! The upstream API key is the only required setting; everything else has a default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Env var holding the upstream API key. Overrides `upstream.apiKey`.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Inbound HTTP server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Generative-text API settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 5000).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

/// Upstream endpoint, model, credential and timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamConfig {
    /// Models collection URL; the request goes to `{baseUrl}/{model}:generateContent`.
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,

    #[serde(default = "default_upstream_model")]
    pub model: String,

    /// API key sent as the `key` query parameter. Overridden by GEMINI_API_KEY env.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Whole-request timeout for the upstream call, in seconds (0 means default).
    #[serde(default = "default_upstream_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_gateway_port() -> u16 {
    5000
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_upstream_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

fn default_upstream_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base_url(),
            model: default_upstream_model(),
            api_key: None,
            timeout_secs: default_upstream_timeout_secs(),
        }
    }
}

/// Resolve the upstream API key: env GEMINI_API_KEY overrides config.
pub fn resolve_api_key(config: &Config) -> Option<String> {
    pick_secret(
        std::env::var(API_KEY_ENV).ok(),
        config.upstream.api_key.as_deref(),
    )
}

/// First non-blank of the env value and the configured value, trimmed.
fn pick_secret(env_value: Option<String>, configured: Option<&str>) -> Option<String> {
    env_value
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            configured
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Timeout for the outbound call. Never unbounded: 0 falls back to the default.
pub fn upstream_timeout(config: &Config) -> Duration {
    let secs = match config.upstream.timeout_secs {
        0 => default_upstream_timeout_secs(),
        n => n,
    };
    Duration::from_secs(secs)
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("RELAY_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".relay").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the given path, the default path, or RELAY_CONFIG_PATH.
/// Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
