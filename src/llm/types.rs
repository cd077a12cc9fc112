use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Provider family, resolved from the model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    OpenAi,
    DeepSeek,
    Gemini,
}

impl ModelFamily {
    /// Case-insensitive substring match; anything unrecognised is served by OpenAI.
    pub fn from_model_name(model: &str) -> Self {
        let model = model.to_lowercase();
        if model.contains("deepseek") {
            Self::DeepSeek
        } else if model.contains("gemini") {
            Self::Gemini
        } else {
            Self::OpenAi
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::DeepSeek => "DeepSeek",
            Self::Gemini => "Gemini",
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reasoning models may prepend free-form thinking, so they are not asked for JSON mode.
pub fn is_reasoning_model(model: &str) -> bool {
    model.to_lowercase().contains("reasoner")
}

/// Credential values as found in the environment. Kept separate from lookup so
/// endpoint resolution is testable without touching process state.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub deepseek_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            openai_api_key: var("OPENAI_API_KEY"),
            openai_base_url: var("OPENAI_BASE_URL"),
            deepseek_api_key: var("DEEPSEEK_API_KEY"),
            gemini_api_key: var("GEMINI_API_KEY"),
        }
    }
}

/// Base URL and key for one provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub family: ModelFamily,
    pub base_url: String,
    pub api_key: String,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("family", &self.family)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Endpoint {
    /// Picks the endpoint for `model`. Missing credentials fail here, before any request.
    pub fn resolve(model: &str, credentials: &Credentials) -> Result<Self> {
        let family = ModelFamily::from_model_name(model);
        let (base_url, api_key, variable) = match family {
            ModelFamily::DeepSeek => (
                credentials
                    .openai_base_url
                    .clone()
                    .unwrap_or_else(|| DEEPSEEK_BASE_URL.to_string()),
                credentials
                    .openai_api_key
                    .clone()
                    .or_else(|| credentials.deepseek_api_key.clone()),
                "OPENAI_API_KEY or DEEPSEEK_API_KEY",
            ),
            ModelFamily::Gemini => (
                GEMINI_BASE_URL.to_string(),
                credentials
                    .gemini_api_key
                    .clone()
                    .or_else(|| credentials.openai_api_key.clone()),
                "GEMINI_API_KEY or OPENAI_API_KEY",
            ),
            ModelFamily::OpenAi => (
                credentials
                    .openai_base_url
                    .clone()
                    .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
                credentials.openai_api_key.clone(),
                "OPENAI_API_KEY",
            ),
        };

        let api_key = api_key.ok_or(ReportError::MissingCredentials {
            family: family.name(),
            variable,
        })?;

        Ok(Self {
            family,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

/// One request to the language-model collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_message: String,
    pub temperature: f32,
    /// Ask the provider to constrain output to a JSON object.
    pub json_mode: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionEvent {
    Starting { model: String, characters: usize },
    Requesting { attempt: u32 },
    ProcessingResponse { characters: usize },
    DroppedPeriod { period: String, missing: Vec<String> },
    Retry { attempt: u32, delay: Duration, error: String },
    Success { periods: usize },
    Failed { reason: String },
}

// OpenAI-compatible chat-completions wire format.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl From<&CompletionRequest> for ChatCompletionRequest {
    fn from(request: &CompletionRequest) -> Self {
        Self {
            model: request.model.clone(),
            messages: vec![
                ChatMessage::system(request.system_prompt.clone()),
                ChatMessage::user(request.user_message.clone()),
            ],
            temperature: request.temperature,
            response_format: request.json_mode.then(|| ResponseFormat {
                kind: "json_object".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}
