//! Configuration types and loading.
//!
//! Config is loaded from an optional JSON file (e.g. `~/.relay/config.json`), then
//! overridden by environment variables. A `.env` file in the working directory is
//! loaded into the environment first, so secrets can live there during development.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_CHANNEL_ACCESS_TOKEN: &str = "CHANNEL_ACCESS_TOKEN";
pub const ENV_CHANNEL_SECRET: &str = "CHANNEL_SECRET";
pub const ENV_PORT: &str = "PORT";
pub const ENV_CONFIG_PATH: &str = "RELAY_CONFIG_PATH";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// LINE Messaging API channel.
    #[serde(default)]
    pub line: LineConfig,

    /// Gemini generation settings.
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Bind address and port for the webhook server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for HTTP (default 8080). Overridden by PORT env.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0"; the platform must be able to reach the webhook).
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_port() -> u16 {
    8080
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

/// LINE channel config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    /// Channel secret used to verify X-Line-Signature. Overridden by CHANNEL_SECRET env.
    pub channel_secret: Option<String>,
    /// Long-lived channel access token for the reply API. Overridden by CHANNEL_ACCESS_TOKEN env.
    pub channel_access_token: Option<String>,
    /// Messaging API base URL (default https://api.line.me).
    #[serde(default = "default_line_api_base")]
    pub api_base: String,
}

fn default_line_api_base() -> String {
    "https://api.line.me".to_string()
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_secret: None,
            channel_access_token: None,
            api_base: default_line_api_base(),
        }
    }
}

/// Gemini config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiConfig {
    /// API key. Overridden by GEMINI_API_KEY env.
    pub api_key: Option<String>,
    /// Model id passed to generateContent (default "gemini-2.0-flash").
    #[serde(default = "default_gemini_model")]
    pub model: String,
    /// Generative Language API base URL.
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            api_base: default_gemini_api_base(),
        }
    }
}

/// The three secrets the relay needs, resolved once at startup.
#[derive(Clone)]
pub struct Credentials {
    pub gemini_api_key: String,
    pub channel_access_token: String,
    pub channel_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

impl Credentials {
    /// Take the secrets out of an already env-overridden config. Fails listing every missing one.
    pub fn resolve(config: &Config) -> Result<Self> {
        let gemini_api_key = non_empty(config.gemini.api_key.as_deref());
        let channel_access_token = non_empty(config.line.channel_access_token.as_deref());
        let channel_secret = non_empty(config.line.channel_secret.as_deref());

        let mut missing = Vec::new();
        if gemini_api_key.is_none() {
            missing.push(ENV_GEMINI_API_KEY);
        }
        if channel_access_token.is_none() {
            missing.push(ENV_CHANNEL_ACCESS_TOKEN);
        }
        if channel_secret.is_none() {
            missing.push(ENV_CHANNEL_SECRET);
        }
        match (gemini_api_key, channel_access_token, channel_secret) {
            (Some(gemini_api_key), Some(channel_access_token), Some(channel_secret)) => Ok(Self {
                gemini_api_key,
                channel_access_token,
                channel_secret,
            }),
            _ => anyhow::bail!("missing credentials: set {}", missing.join(", ")),
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

impl Config {
    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` (env-like). Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_empty(lookup(key).as_deref());
        if let Some(key) = get(ENV_GEMINI_API_KEY) {
            self.gemini.api_key = Some(key);
        }
        if let Some(token) = get(ENV_CHANNEL_ACCESS_TOKEN) {
            self.line.channel_access_token = Some(token);
        }
        if let Some(secret) = get(ENV_CHANNEL_SECRET) {
            self.line.channel_secret = Some(secret);
        }
        if let Some(port) = get(ENV_PORT) {
            self.server.port = port
                .parse()
                .with_context(|| format!("invalid {} value: {:?}", ENV_PORT, port))?;
        }
        Ok(())
    }
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".relay").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load `.env` (if any), then config from `path` (or the default path), then env overrides.
/// Missing file => default config. Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    load_config_with_env_file(path, None)
}

/// Like [`load_config`], reading environment from `env_file` instead of searching for `.env`.
/// A missing env file is not an error.
pub fn load_config_with_env_file(
    path: Option<PathBuf>,
    env_file: Option<&Path>,
) -> Result<(Config, PathBuf)> {
    let loaded = match env_file {
        Some(f) => dotenvy::from_path(f).map(|_| f.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match loaded {
        Ok(p) => log::debug!("loaded environment from {}", p.display()),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(e).context("reading .env"),
    }
    let path = path.unwrap_or_else(default_config_path);
    let mut config = read_config_file(&path)?;
    config.apply_env()?;
    Ok((config, path))
}

fn read_config_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        return Ok(Config::default());
    }
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing config from {}", path.display()))
}

/// Write a default config file at `path` if none exists. Returns true when a file was written.
pub fn init_config_file(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating config directory {}", dir.display()))?;
    }
    let body = serde_json::to_string_pretty(&Config::default())?;
    std::fs::write(path, body)
        .with_context(|| format!("writing default config to {}", path.display()))?;
    log::info!("created default config at {}", path.display());
    Ok(true)
}
