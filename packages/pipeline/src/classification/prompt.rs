use crate::categories::categories_block;
use crate::classification::client::{LlmRequest, Message};

pub const SYSTEM_PROMPT: &str = "You classify documents accurately and return valid JSON only.";

/// Characters of document text included in the prompt.
pub const PROMPT_TEXT_LIMIT: usize = 3000;

/// Build the user prompt for classifying `text`.
pub fn build_prompt(text: &str) -> String {
    let excerpt: String = text.chars().take(PROMPT_TEXT_LIMIT).collect();

    format!(
        r#"You are an assistant that CLASSIFIES enterprise and business documents (in any language).
You MUST choose exactly ONE category from the list below (use the category key).
Do NOT invent new categories.

Categories:
{categories}

Task:
1) Read the document.
2) Choose one category key from above.
3) Produce a short 1-2 sentence summary.
4) Give a confidence between 0 and 100 (integer).

Return ONLY valid JSON with keys: type, summary, confidence

DOCUMENT (first {PROMPT_TEXT_LIMIT} chars):
{excerpt}
"#,
        categories = categories_block(),
    )
}

pub fn build_request(text: &str, max_tokens: u32) -> LlmRequest {
    LlmRequest {
        system: SYSTEM_PROMPT.to_string(),
        messages: vec![Message::user(build_prompt(text))],
        max_tokens,
    }
}
