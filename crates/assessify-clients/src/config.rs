//! Runtime configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level assessify configuration.
///
/// Note: Custom Debug impl masks the auth token to prevent accidental
/// exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct AssessifyConfig {
    /// Base URL of the knowledge platform.
    #[serde(default = "default_base_url")]
    pub knowledge_base_url: String,
    /// Bearer token for the knowledge platform, if it requires one.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// How long assembled evidence stays cached.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Maximum number of cached question sets.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

impl std::fmt::Debug for AssessifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssessifyConfig")
            .field("knowledge_base_url", &self.knowledge_base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "***"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("cache_capacity", &self.cache_capacity)
            .finish()
    }
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_cache_ttl() -> u64 {
    43_200
}
fn default_cache_capacity() -> u64 {
    10_000
}

impl Default for AssessifyConfig {
    fn default() -> Self {
        Self {
            knowledge_base_url: default_base_url(),
            auth_token: None,
            request_timeout_secs: default_timeout(),
            cache_ttl_secs: default_cache_ttl(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `assessify.toml` in the current directory
/// 2. `~/.config/assessify/config.toml`
///
/// Environment variable overrides: `ASSESSIFY_BASE_URL`, `ASSESSIFY_AUTH_TOKEN`.
pub fn load_config() -> Result<AssessifyConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AssessifyConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("assessify.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<AssessifyConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => AssessifyConfig::default(),
    };

    // Apply env var overrides
    if let Ok(url) = std::env::var("ASSESSIFY_BASE_URL") {
        config.knowledge_base_url = url;
    }
    if let Ok(token) = std::env::var("ASSESSIFY_AUTH_TOKEN") {
        config.auth_token = Some(token);
    }

    config.knowledge_base_url = resolve_env_vars(&config.knowledge_base_url);
    config.auth_token = config.auth_token.as_deref().map(resolve_env_vars);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("assessify"))
}
