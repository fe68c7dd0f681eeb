use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::moderation::race::RaceSettings;

/// Front-end origins allowed by CORS when POSTCHECK_ALLOWED_ORIGINS is unset.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://work-advisor.vercel.app",
    "https://work-advisor-seven.vercel.app",
];

/// Connection details for one OpenAI-compatible chat backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub api_key: String,
    /// Base URL up to and including the API version, e.g. https://api.openai.com/v1
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Completion token cap (only set where the backend needs one)
    pub max_tokens: Option<u32>,
}

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Primary feedback backend (OPENAI_* env vars)
    pub openai: ProviderConfig,
    /// Delayed feedback backend and structured-output backend (NVIDIA_* env vars)
    pub nvidia: ProviderConfig,
    /// Race deadline, secondary pre-delay and structured-call timeout
    pub race: RaceSettings,
    /// Origins allowed to call the HTTP API from a browser
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default except the API keys, which are checked
    /// separately by `require_providers` so `categories` works without them.
    pub fn load() -> Result<Self> {
        let temperature: f32 = parse_var("POSTCHECK_TEMPERATURE", 0.5)?;
        let max_tokens: u32 = parse_var("POSTCHECK_MAX_TOKENS", 500)?;

        let defaults = RaceSettings::default();
        let race = RaceSettings {
            deadline: Duration::from_secs(parse_var(
                "POSTCHECK_RACE_DEADLINE_SECS",
                defaults.deadline.as_secs(),
            )?),
            secondary_delay: Duration::from_secs(parse_var(
                "POSTCHECK_SECONDARY_DELAY_SECS",
                defaults.secondary_delay.as_secs(),
            )?),
            extract_timeout: Duration::from_secs(parse_var(
                "POSTCHECK_EXTRACT_TIMEOUT_SECS",
                defaults.extract_timeout.as_secs(),
            )?),
        };

        let allowed_origins = match env::var("POSTCHECK_ALLOWED_ORIGINS") {
            Ok(list) => parse_origins(&list),
            Err(_) => DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        Ok(Self {
            openai: ProviderConfig {
                api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                base_url: env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                temperature,
                max_tokens: None,
            },
            nvidia: ProviderConfig {
                api_key: env::var("NVIDIA_API_KEY").unwrap_or_default(),
                base_url: env::var("NVIDIA_BASE_URL")
                    .unwrap_or_else(|_| "https://integrate.api.nvidia.com/v1".to_string()),
                model: env::var("NVIDIA_MODEL")
                    .unwrap_or_else(|_| "meta/llama-3.1-70b-instruct".to_string()),
                temperature,
                max_tokens: Some(max_tokens),
            },
            race,
            allowed_origins,
        })
    }

    /// Check that both provider API keys are configured.
    /// Call this before serving or checking a post.
    pub fn require_providers(&self) -> Result<()> {
        if self.openai.api_key.is_empty() {
            anyhow::bail!(
                "OPENAI_API_KEY not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        if self.nvidia.api_key.is_empty() {
            anyhow::bail!(
                "NVIDIA_API_KEY not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        if self.race.secondary_delay >= self.race.deadline {
            tracing::warn!(
                delay_secs = self.race.secondary_delay.as_secs(),
                deadline_secs = self.race.deadline.as_secs(),
                "Secondary delay is not shorter than the race deadline; \
                 the secondary provider will never be called"
            );
        }
        Ok(())
    }
}

/// Read and parse an env var, falling back to `default` when unset.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {name}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn parse_origins(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
