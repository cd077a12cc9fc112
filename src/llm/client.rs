use crate::error::Result;
use crate::llm::types::CompletionRequest;
use std::future::Future;

#[cfg(feature = "http")]
use crate::error::ReportError;
#[cfg(feature = "http")]
use crate::llm::types::*;
#[cfg(feature = "http")]
use reqwest::Client;
#[cfg(feature = "http")]
use std::time::Duration;

/// The language-model collaborator: one system instruction and one user message in,
/// one text completion out.
pub trait LanguageModel {
    fn complete(&self, request: &CompletionRequest) -> impl Future<Output = Result<String>>;
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
#[cfg(feature = "http")]
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: Endpoint,
}

#[cfg(feature = "http")]
impl ChatClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

    pub fn new(endpoint: Endpoint) -> Result<Self> {
        Self::with_timeout(endpoint, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: Endpoint, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// Resolves the endpoint for `model` from `credentials` and builds a client for it.
    pub fn for_model(model: &str, credentials: &Credentials) -> Result<Self> {
        let endpoint = Endpoint::resolve(model, credentials)?;
        log::info!(
            "Using {} endpoint {} for model {}",
            endpoint.family,
            endpoint.base_url,
            model
        );
        Self::new(endpoint)
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

#[cfg(feature = "http")]
impl LanguageModel for ChatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.endpoint.base_url);
        let payload = ChatCompletionRequest::from(request);

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.endpoint.api_key)
            .json(&payload)
            .send()
            .await?;
        let status = res.status();

        if !status.is_success() {
            let body = res.text().await?;
            return Err(ReportError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatCompletionResponse = res.json().await?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ReportError::EmptyResponse)
    }
}
