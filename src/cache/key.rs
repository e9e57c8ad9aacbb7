// Cache key derivation

use axum::http::Uri;
use serde_json::{Map, Value};

/// Build the cache key for a request: `path + ":" + canonical query`.
///
/// The query is rendered as a JSON object whose keys are sorted, so
/// `?b=2&a=1` and `?a=1&b=2` share a key. Repeated parameters become arrays
/// in request order, since `?a=1&a=2` and `?a=2&a=1` may mean different things.
pub fn cache_key(uri: &Uri) -> String {
    format!("{}:{}", uri.path(), canonical_query(uri.query()))
}

/// Canonical JSON serialization of a raw query string.
pub fn canonical_query(query: Option<&str>) -> String {
    // serde_json's default map is ordered by key
    let mut params: Map<String, Value> = Map::new();

    for pair in query.unwrap_or_default().split('&').filter(|p| !p.is_empty()) {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = decode_component(name);
        let value = Value::String(decode_component(value));

        match params.get_mut(&name) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                params.insert(name, value);
            }
        }
    }

    Value::Object(params).to_string()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        // Malformed escapes are keyed verbatim
        Err(_) => spaced,
    }
}
