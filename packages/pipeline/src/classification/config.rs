use std::fmt;
use std::time::Duration;

use strum::{Display, EnumString};

use crate::error::{PipelineError, Result};

/// Which chat API the classifier talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LlmProvider {
    #[strum(serialize = "openai")]
    OpenAi,
    Anthropic,
}

impl LlmProvider {
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-5",
            Self::Anthropic => "claude-sonnet-4-5-20250929",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com",
            Self::Anthropic => "https://api.anthropic.com",
        }
    }
}

/// Configuration for the document classifier's LLM backend.
#[derive(Clone)]
pub struct ClassifierConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub api_key: String,
    pub api_base_url: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// First backoff; doubled on every further retry.
    pub retry_base_delay: Duration,
}

impl fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay", &self.retry_base_delay)
            .finish()
    }
}

impl ClassifierConfig {
    /// Load configuration from environment variables.
    ///
    /// `LLM_API_KEY` is required, with `OPENAI_API_KEY` accepted as a fallback.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| PipelineError::Config("LLM_API_KEY not set".into()))?;

        let provider = match std::env::var("LLM_PROVIDER") {
            Ok(v) => v
                .parse::<LlmProvider>()
                .map_err(|_| PipelineError::Config(format!("unknown LLM_PROVIDER '{v}'")))?,
            Err(_) => LlmProvider::OpenAi,
        };

        let mut builder = Self::builder(api_key).provider(provider);

        if let Ok(model) = std::env::var("LLM_MODEL") {
            builder = builder.model(model);
        }
        if let Ok(url) = std::env::var("LLM_API_BASE_URL") {
            builder = builder.api_base_url(url);
        }
        if let Some(max_tokens) = std::env::var("LLM_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            builder = builder.max_tokens(max_tokens);
        }
        if let Some(timeout_secs) = std::env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            builder = builder.timeout_secs(timeout_secs);
        }

        Ok(builder.build())
    }

    /// Create a config builder for testing.
    pub fn builder(api_key: impl Into<String>) -> ClassifierConfigBuilder {
        ClassifierConfigBuilder {
            api_key: api_key.into(),
            provider: LlmProvider::OpenAi,
            model: None,
            api_base_url: None,
            max_tokens: 1000,
            timeout_secs: 120,
            max_retries: 3,
            retry_base_delay: Duration::from_secs(1),
        }
    }
}

/// Builder for constructing `ClassifierConfig`.
///
/// Model and base URL default to the chosen provider's values.
pub struct ClassifierConfigBuilder {
    api_key: String,
    provider: LlmProvider,
    model: Option<String>,
    api_base_url: Option<String>,
    max_tokens: u32,
    timeout_secs: u64,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl ClassifierConfigBuilder {
    pub fn provider(mut self, provider: LlmProvider) -> Self {
        self.provider = provider;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = Some(api_base_url.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_base_delay = base_delay;
        self
    }

    pub fn build(self) -> ClassifierConfig {
        ClassifierConfig {
            provider: self.provider,
            model: self
                .model
                .unwrap_or_else(|| self.provider.default_model().to_string()),
            api_key: self.api_key,
            api_base_url: self
                .api_base_url
                .unwrap_or_else(|| self.provider.default_base_url().to_string())
                .trim_end_matches('/')
                .to_string(),
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
            retry_base_delay: self.retry_base_delay,
        }
    }
}
