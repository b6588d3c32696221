use std::sync::Arc;

use crate::classification::client::{AnthropicClient, LlmClient, OpenAiClient};
use crate::classification::config::{ClassifierConfig, LlmProvider};
use crate::classification::prompt::build_request;
use crate::classification::response::{parse_classification, Classification};
use crate::error::Result;

/// Default completion budget for one classification.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Classifies document text into one of the fixed categories.
#[derive(Clone)]
pub struct Classifier {
    client: Arc<dyn LlmClient>,
    max_tokens: u32,
}

impl Classifier {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Build a classifier backed by the configured provider.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        let client: Arc<dyn LlmClient> = match config.provider {
            LlmProvider::OpenAi => Arc::new(OpenAiClient::new(config)?),
            LlmProvider::Anthropic => Arc::new(AnthropicClient::new(config)?),
        };
        tracing::info!(provider = %config.provider, model = %config.model, "classifier ready");
        Ok(Self::new(client).with_max_tokens(config.max_tokens))
    }

    /// Classify `text`. Never fails: an unreachable model yields
    /// [`Classification::llm_error`].
    #[tracing::instrument(skip_all, fields(chars = text.len()))]
    pub async fn classify(&self, text: &str) -> Classification {
        let request = build_request(text, self.max_tokens);

        match self.client.complete(&request).await {
            Ok(response) => {
                tracing::debug!(
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    "LLM responded"
                );
                let classification = parse_classification(&response.content);
                tracing::info!(
                    doc_type = %classification.doc_type,
                    confidence = classification.confidence,
                    "document classified"
                );
                classification
            }
            Err(e) => {
                tracing::warn!(error = %e, "LLM request failed, using fallback");
                Classification::llm_error()
            }
        }
    }
}
