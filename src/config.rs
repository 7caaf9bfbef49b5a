//! Configuration for Medchat.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::persona::PersonaId;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Medchat configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Persona a new conversation starts with.
    pub default_persona: PersonaId,
    /// Enable debug mode.
    pub debug: bool,
    /// API configuration.
    pub api: ApiSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_persona: PersonaId::GeneralChat,
            debug: false,
            api: ApiSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/medchat/medchat.yml
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join("medchat").join("medchat.yml");
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./medchat.yml
        let fallback_config = PathBuf::from("medchat.yml");
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// API settings for the Gemini provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Gemini API key (or use GEMINI_API_KEY env var).
    pub gemini_key: Option<String>,
    /// Model to use.
    pub model: String,
    /// Base URL override (for gateways and tests).
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Maximum tokens to generate per reply.
    pub max_output_tokens: u32,
    /// Temperature for generation.
    pub temperature: f32,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            gemini_key: None,
            model: "gemini-1.5-flash".to_string(),
            base_url: None,
            request_timeout_secs: 30,
            max_output_tokens: 1024,
            temperature: 0.7,
        }
    }
}

impl ApiSettings {
    /// Resolve the API key: config file first, then the environment.
    ///
    /// Fails fast with a configuration error before any remote call is made.
    pub fn resolve_key(&self) -> crate::error::Result<String> {
        if let Some(key) = self.gemini_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.clone());
        }
        env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "no Gemini API key: set api.gemini_key in the config file or the {} environment variable",
                    API_KEY_ENV
                ))
            })
    }

    /// Get the request timeout as a Duration.
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}
