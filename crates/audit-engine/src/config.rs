//! Audit configuration
//!
//! The API key comes from a local `secrets.toml` file (`[openai]` table),
//! with an `OPENAI_API_KEY` environment override. Model and token limits
//! carry defaults matching the production prompt setup.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_MAX_TOKENS: u32 = 4000;
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for the audit client.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
}

/// On-disk shape of `secrets.toml`.
#[derive(Debug, Deserialize)]
struct SecretsFile {
    openai: OpenAiSecrets,
}

#[derive(Debug, Deserialize)]
struct OpenAiSecrets {
    api_key: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    max_tokens: Option<u32>,
    #[serde(default)]
    base_url: Option<String>,
}

impl AuditConfig {
    /// Build a config with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Load from a `secrets.toml` file.
    ///
    /// ```toml
    /// [openai]
    /// api_key = "sk-..."
    /// model = "gpt-4o"       # optional
    /// max_tokens = 4000      # optional
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read secrets file: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Parse from a TOML string.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let secrets: SecretsFile = toml::from_str(s).context("Failed to parse secrets TOML")?;
        Ok(Self {
            api_key: secrets.openai.api_key,
            model: secrets.openai.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: secrets.openai.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            base_url: secrets
                .openai
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    /// Load from `secrets.toml` if present, letting `OPENAI_API_KEY`
    /// override the file's key. Errors if neither source supplies a key.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let mut config = match Self::from_file(&path) {
            Ok(config) => config,
            Err(file_err) => match env::var("OPENAI_API_KEY") {
                Ok(key) => Self::new(key),
                Err(_) => return Err(file_err.context("and OPENAI_API_KEY is not set")),
            },
        };

        if let Ok(key) = env::var("OPENAI_API_KEY") {
            config.api_key = key;
        }

        Ok(config)
    }
}
