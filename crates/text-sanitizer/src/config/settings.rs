use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::document::TextEncoding;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub chunk_retry: ChunkRetryConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub encoding: EncodingConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChunkingConfig {
    /// Soft target in bytes; a single long line may exceed it
    #[serde(default = "default_chunk_size")]
    pub size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            size: default_chunk_size(),
        }
    }
}

fn default_chunk_size() -> usize {
    200
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_calls")]
    pub max_calls: usize,
    #[serde(default = "default_period_seconds")]
    pub period_seconds: u64,
}

impl RateLimitConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_seconds)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls: default_max_calls(),
            period_seconds: default_period_seconds(),
        }
    }
}

fn default_max_calls() -> usize {
    999
}

fn default_period_seconds() -> u64 {
    60
}

/// Per-call retry around the transformation service
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RetryConfig {
    #[serde(default = "default_retry_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay")]
    pub initial_delay_seconds: u64,
    #[serde(default = "default_max_delay")]
    pub max_delay_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_retry_attempts(),
            initial_delay_seconds: default_initial_delay(),
            max_delay_seconds: default_max_delay(),
        }
    }
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_initial_delay() -> u64 {
    4
}

fn default_max_delay() -> u64 {
    10
}

/// What the file processor does when a chunk still fails after the
/// per-call retries are used up.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChunkRetryConfig {
    #[serde(default = "default_chunk_pause")]
    pub pause_seconds: u64,
    /// `None` retries the chunk forever
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl Default for ChunkRetryConfig {
    fn default() -> Self {
        Self {
            pause_seconds: default_chunk_pause(),
            max_attempts: None,
        }
    }
}

fn default_chunk_pause() -> u64 {
    5
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WorkerConfig {
    /// `None` runs one worker per input document
    #[serde(default)]
    pub max_concurrency: Option<usize>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: None,
            extensions: default_extensions(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["txt".to_string()]
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir_name: String,
    #[serde(default = "default_log_dir")]
    pub log_dir_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir_name: default_output_dir(),
            log_dir_name: default_log_dir(),
        }
    }
}

fn default_output_dir() -> String {
    "cleaned_text".to_string()
}

fn default_log_dir() -> String {
    "processing_logs".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EncodingConfig {
    #[serde(default = "default_fallbacks")]
    pub fallbacks: Vec<String>,
}

impl EncodingConfig {
    pub fn encodings(&self) -> crate::utils::Result<Vec<TextEncoding>> {
        self.fallbacks.iter().map(|label| label.parse()).collect()
    }
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            fallbacks: default_fallbacks(),
        }
    }
}

fn default_fallbacks() -> Vec<String> {
    ["utf-8", "latin-1", "ascii", "utf-16"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            timeout_seconds: default_timeout(),
            api_version: default_api_version(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_timeout() -> u64 {
    300
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

impl Settings {
    pub fn load() -> Result<Self> {
        // Load from environment first
        dotenvy::dotenv().ok();

        let settings = Self::from_sources()?;
        settings.validate()?;

        Ok(settings)
    }

    /// Layers `config/settings.toml` and `APP_*` environment overrides
    /// without validating the result.
    fn from_sources() -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/settings").required(false))
            // Override with environment variables (prefix: APP)
            // Example: APP_RATE_LIMIT__MAX_CALLS=500
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;

        // ANTHROPIC_API_KEY is the conventional place for the key
        if settings.service.api_key.is_empty() {
            if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
                settings.service.api_key = key;
            }
        }

        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunking.size == 0 {
            anyhow::bail!("chunking.size must be greater than zero");
        }

        if self.rate_limit.max_calls == 0 {
            anyhow::bail!("rate_limit.max_calls must be greater than zero");
        }

        if self.retry.max_attempts == 0 {
            anyhow::bail!("retry.max_attempts must be at least 1");
        }

        if self.worker.max_concurrency == Some(0) {
            anyhow::bail!("worker.max_concurrency must be greater than zero when set");
        }

        if self.service.api_key.is_empty() {
            anyhow::bail!(
                "The Anthropic API key is not set (APP_SERVICE__API_KEY or ANTHROPIC_API_KEY)"
            );
        }

        self.encoding.encodings()?;

        Ok(())
    }
}
