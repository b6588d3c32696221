use std::time::Duration;

use serde_json::{json, Value};
use sqlx::SqlitePool;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doclens_pipeline::classification::{ClassifierConfig, LlmProvider};
use doclens_pipeline::config::PipelineConfig;
use doclens_pipeline::db;

/// Fresh in-memory database with migrations applied.
pub async fn test_pool() -> SqlitePool {
    let config = PipelineConfig::new("sqlite::memory:").with_max_connections(1);
    let pool = db::create_pool(&config).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

/// Classifier config pointing at a mock server, with instant retries.
pub fn classifier_config(server: &MockServer, provider: LlmProvider) -> ClassifierConfig {
    ClassifierConfig::builder("test-key")
        .provider(provider)
        .api_base_url(server.uri())
        .timeout_secs(5)
        .retries(2, Duration::ZERO)
        .build()
}

/// OpenAI chat-completions body whose message content is `content`.
pub fn openai_completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150}
    })
}

/// Anthropic messages body whose text is `content`.
pub fn anthropic_completion(content: &str) -> Value {
    json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": content}],
        "model": "claude-sonnet-4-5-20250929",
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 120, "output_tokens": 30}
    })
}

pub async fn mount_openai(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_completion(content)))
        .mount(server)
        .await;
}
