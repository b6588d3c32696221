//! LLM-backed document classification.

mod classifier;
mod client;
mod config;
mod prompt;
mod response;

pub use classifier::{Classifier, DEFAULT_MAX_TOKENS};
#[cfg(any(test, feature = "test-utils"))]
pub use client::test_support::MockLlmClient;
pub use client::{AnthropicClient, LlmClient, LlmRequest, LlmResponse, Message, OpenAiClient, Role};
pub use config::{ClassifierConfig, ClassifierConfigBuilder, LlmProvider};
pub use prompt::{build_prompt, build_request, PROMPT_TEXT_LIMIT, SYSTEM_PROMPT};
pub use response::{parse_classification, Classification};
