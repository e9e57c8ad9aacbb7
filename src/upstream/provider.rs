// Upstream provider descriptions

use crate::error::{ProxyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// LLM provider sitting behind the proxy. One proxy instance fronts exactly one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Ollama,
    #[serde(rename = "openai")]
    OpenAi,
    Mistral,
    #[serde(rename = "openrouter")]
    OpenRouter,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::Ollama,
        Provider::OpenAi,
        Provider::Mistral,
        Provider::OpenRouter,
    ];

    /// Name used in log records and metrics labels.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Ollama => "ollama",
            Provider::OpenAi => "openai",
            Provider::Mistral => "mistral",
            Provider::OpenRouter => "openrouter",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Ollama => "http://localhost:11434",
            Provider::OpenAi => "https://api.openai.com",
            Provider::Mistral => "https://api.mistral.ai",
            Provider::OpenRouter => "https://openrouter.ai/api",
        }
    }

    /// Path fragment marking a request as monitored.
    pub fn default_monitored_prefix(&self) -> &'static str {
        match self {
            Provider::Ollama => "/api/",
            _ => "/v1/",
        }
    }

    /// Whether the provider speaks the OpenAI wire format.
    pub fn is_openai_compatible(&self) -> bool {
        !matches!(self, Provider::Ollama)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Provider::ALL
            .iter()
            .copied()
            .find(|p| p.name() == needle)
            .ok_or_else(|| {
                ProxyError::Config(format!(
                    "Unsupported provider: {}. Supported providers: {}",
                    s,
                    Provider::ALL.map(|p| p.name()).join(", ")
                ))
            })
    }
}
