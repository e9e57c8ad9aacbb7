// Folding streamed responses into a single value for the log record

use serde_json::{json, Map, Value};

/// Wire format of a streamed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFormat {
    /// Newline-delimited JSON, as Ollama streams.
    Ndjson,
    /// Server-sent events with `data:` lines, as OpenAI-compatible APIs stream.
    Sse,
}

impl StreamFormat {
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "application/x-ndjson" | "application/ndjson" => Some(StreamFormat::Ndjson),
            "text/event-stream" => Some(StreamFormat::Sse),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamFormat::Ndjson => "ndjson",
            StreamFormat::Sse => "sse",
        }
    }
}

/// Aggregate a captured stream into the shape of the equivalent non-streamed response.
///
/// Falls back to the raw text when no chunk parses.
pub fn aggregate(format: StreamFormat, raw: &[u8]) -> Value {
    let text = String::from_utf8_lossy(raw);
    let folded = match format {
        StreamFormat::Ndjson => fold_ndjson(&text),
        StreamFormat::Sse => fold_sse(&text),
    };
    folded.unwrap_or_else(|| Value::String(text.into_owned()))
}

/// Ollama chunks: the final one carries the stats; text is spread over
/// `response` (generate) or `message.content` (chat).
fn fold_ndjson(text: &str) -> Option<Value> {
    let chunks: Vec<Value> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();

    let mut last = chunks.last()?.clone();

    let is_chat = chunks.iter().any(|c| c.get("message").is_some());
    if is_chat {
        let content: String = chunks
            .iter()
            .filter_map(|c| c.pointer("/message/content").and_then(Value::as_str))
            .collect();
        if let Some(object) = last.as_object_mut() {
            let message = object
                .entry("message")
                .or_insert_with(|| json!({ "role": "assistant" }));
            if let Some(message) = message.as_object_mut() {
                message.insert("content".to_string(), Value::String(content));
            }
        }
    } else {
        let response: String = chunks
            .iter()
            .filter_map(|c| c.get("response").and_then(Value::as_str))
            .collect();
        if let Some(object) = last.as_object_mut() {
            object.insert("response".to_string(), Value::String(response));
        }
    }

    Some(last)
}

/// OpenAI-style `chat.completion.chunk` events folded into a `chat.completion`.
fn fold_sse(text: &str) -> Option<Value> {
    let chunks: Vec<Value> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .filter(|data| !data.is_empty() && *data != "[DONE]")
        .filter_map(|data| serde_json::from_str(data).ok())
        .collect();

    if chunks.is_empty() {
        return None;
    }

    let mut content = String::new();
    let mut finish_reason = Value::Null;
    let mut usage = Value::Null;
    for chunk in &chunks {
        if let Some(choice) = chunk.pointer("/choices/0") {
            let piece = choice
                .pointer("/delta/content")
                .or_else(|| choice.get("text"))
                .and_then(Value::as_str);
            if let Some(piece) = piece {
                content.push_str(piece);
            }
            if let Some(reason) = choice.get("finish_reason").filter(|r| !r.is_null()) {
                finish_reason = reason.clone();
            }
        }
        if let Some(reported) = chunk.get("usage").filter(|u| !u.is_null()) {
            usage = reported.clone();
        }
    }

    let first = &chunks[0];
    let mut folded = Map::new();
    for field in ["id", "model", "created"] {
        if let Some(value) = first.get(field) {
            folded.insert(field.to_string(), value.clone());
        }
    }
    folded.insert("object".to_string(), json!("chat.completion"));
    folded.insert(
        "choices".to_string(),
        json!([{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": finish_reason,
        }]),
    );
    if !usage.is_null() {
        folded.insert("usage".to_string(), usage);
    }

    Some(Value::Object(folded))
}
