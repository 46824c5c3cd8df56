use anyhow::{Context, Result};
use std::env;

/// Configuration for any OpenAI-compatible chat completions host
#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
}

impl OpenAiProviderConfig {
    /// Build from the environment: `OPENAI_API_KEY` is required,
    /// `TANDEM_HOST` overrides the default host.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY environment variable must be set")?;
        let host =
            env::var("TANDEM_HOST").unwrap_or_else(|_| "https://api.openai.com".to_string());
        Ok(OpenAiProviderConfig { host, api_key })
    }
}
