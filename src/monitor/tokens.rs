// Heuristic token estimation
//
// Ollama reports no token usage, so counts are estimated at a flat
// 4 characters per token, rounding up.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CHARS_PER_TOKEN: usize = 4;

/// Token usage attached to a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Estimate usage from prompt and completion text.
    ///
    /// The total is computed over the combined length, so it can be one less
    /// than `prompt_tokens + completion_tokens`.
    pub fn estimate(prompt: &str, completion: &str) -> Self {
        let prompt_chars = char_len(prompt);
        let completion_chars = char_len(completion);
        Self {
            prompt_tokens: estimate_tokens(prompt_chars),
            completion_tokens: estimate_tokens(completion_chars),
            total_tokens: estimate_tokens(prompt_chars + completion_chars),
        }
    }

    /// Read an OpenAI-style `usage` object (`prompt_tokens`, `completion_tokens`, `total_tokens`).
    pub fn from_openai_usage(usage: &Value) -> Option<Self> {
        let object = usage.as_object().filter(|o| !o.is_empty())?;
        let field = |name: &str| object.get(name).and_then(Value::as_u64);

        let prompt_tokens = field("prompt_tokens").unwrap_or(0);
        let completion_tokens = field("completion_tokens").unwrap_or(0);
        let total_tokens = field("total_tokens")
            .filter(|total| *total > 0)
            .unwrap_or(prompt_tokens + completion_tokens);

        Some(Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        })
    }
}

/// Tokens for `chars` characters, rounded up.
pub fn estimate_tokens(chars: usize) -> u64 {
    chars.div_ceil(CHARS_PER_TOKEN) as u64
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_estimate_rounds_up() {
        assert_eq!(estimate_tokens(0), 0);
        assert_eq!(estimate_tokens(1), 1);
        assert_eq!(estimate_tokens(4), 1);
        assert_eq!(estimate_tokens(5), 2);
    }

    #[test]
    fn test_total_uses_combined_length() {
        let usage = TokenUsage::estimate("Hi", "Hello!");
        assert_eq!(usage.prompt_tokens, 1);
        assert_eq!(usage.completion_tokens, 2);
        assert_eq!(usage.total_tokens, 2);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 4 characters, 12 bytes
        let usage = TokenUsage::estimate("日本語で", "");
        assert_eq!(usage.prompt_tokens, 1);
    }

    #[test]
    fn test_openai_usage() {
        let usage = TokenUsage::from_openai_usage(&json!({
            "prompt_tokens": 12,
            "completion_tokens": 30,
            "total_tokens": 42
        }))
        .unwrap();
        assert_eq!(usage.total_tokens, 42);

        let partial = TokenUsage::from_openai_usage(&json!({ "prompt_tokens": 3, "completion_tokens": 4 })).unwrap();
        assert_eq!(partial.total_tokens, 7);

        assert!(TokenUsage::from_openai_usage(&json!(null)).is_none());
        assert!(TokenUsage::from_openai_usage(&json!({})).is_none());
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(TokenUsage::estimate("abcd", "")).unwrap();
        assert_eq!(value, json!({ "promptTokens": 1, "completionTokens": 0, "totalTokens": 1 }));
    }
}
