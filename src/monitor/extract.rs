// Prompt, completion and usage extraction for completion-style endpoints

use crate::monitor::tokens::TokenUsage;
use crate::upstream::Provider;
use serde_json::Value;

/// Fields derived from a completion-style exchange.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub prompt: String,
    pub system_message: Option<String>,
    pub completion: Option<String>,
    pub token_usage: Option<TokenUsage>,
}

/// Derive prompt/completion fields for the endpoints that carry them.
///
/// Returns `None` for every other endpoint; those records stay generic.
pub fn extract(provider: Provider, endpoint: &str, request: &Value, response: &Value) -> Option<Extraction> {
    match (provider, endpoint) {
        (Provider::Ollama, "generate") => Some(ollama_generate(request, response)),
        (Provider::Ollama, "chat") => Some(ollama_chat(request, response)),
        (p, "completions") if p.is_openai_compatible() => Some(openai_completions(request, response)),
        _ => None,
    }
}

fn ollama_generate(request: &Value, response: &Value) -> Extraction {
    let raw_prompt = request.get("prompt").and_then(Value::as_str).unwrap_or_default();
    let (system_message, prompt) = split_system_prompt(raw_prompt);
    let completion = response
        .get("response")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Extraction {
        token_usage: Some(TokenUsage::estimate(&prompt, &completion)),
        prompt,
        system_message,
        completion: Some(completion),
    }
}

fn ollama_chat(request: &Value, response: &Value) -> Extraction {
    let (prompt, system_message) = chat_prompt(request);
    let completion = response
        .pointer("/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Extraction {
        token_usage: Some(TokenUsage::estimate(&prompt, &completion)),
        prompt,
        system_message,
        completion: Some(completion),
    }
}

fn openai_completions(request: &Value, response: &Value) -> Extraction {
    let (prompt, system_message) = if request.get("messages").is_some() {
        chat_prompt(request)
    } else {
        let prompt = match request.get("prompt") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        (prompt, None)
    };

    let first_choice = response.pointer("/choices/0");
    let completion = first_choice.and_then(|choice| {
        choice
            .pointer("/message/content")
            .or_else(|| choice.get("text"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    let token_usage = response
        .get("usage")
        .and_then(TokenUsage::from_openai_usage)
        .unwrap_or_else(|| TokenUsage::estimate(&prompt, completion.as_deref().unwrap_or_default()));

    Extraction {
        prompt,
        system_message,
        completion,
        token_usage: Some(token_usage),
    }
}

/// Split a `System: ... User: ...` prompt into its system message and user part.
///
/// The split applies only when text after the first `System:` contains
/// `User:`; the user part is the text between the first and second `User:`.
pub fn split_system_prompt(prompt: &str) -> (Option<String>, String) {
    let Some((_, after_system)) = prompt.split_once("System:") else {
        return (None, prompt.to_string());
    };

    let system_segment = after_system.split("System:").next().unwrap_or_default();
    let Some((system, _)) = system_segment.split_once("User:") else {
        return (None, prompt.to_string());
    };

    let user = prompt
        .split("User:")
        .nth(1)
        .map(|part| part.trim().to_string())
        .unwrap_or_else(|| prompt.to_string());

    (Some(system.trim().to_string()), user)
}

/// User messages joined by newlines, plus the first system message.
fn chat_prompt(request: &Value) -> (String, Option<String>) {
    let messages = request
        .get("messages")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let with_role = |role: &'static str| {
        messages
            .iter()
            .filter(move |m| m.get("role").and_then(Value::as_str) == Some(role))
            .filter_map(|m| m.get("content").and_then(message_text))
    };

    let prompt = with_role("user").collect::<Vec<_>>().join("\n");
    let system = with_role("system").next();
    (prompt, system)
}

/// Text of a message `content`: a plain string or an array of text parts.
fn message_text(content: &Value) -> Option<String> {
    match content {
        Value::String(text) => Some(text.clone()),
        Value::Array(parts) => {
            let texts: Vec<&str> = parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect();
            (!texts.is_empty()).then(|| texts.join("\n"))
        }
        _ => None,
    }
}
