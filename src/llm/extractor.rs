use crate::config::ExtractionConfig;
use crate::error::{ReportError, Result};
use crate::llm::client::LanguageModel;
use crate::llm::prompts::{build_system_prompt, build_user_message};
use crate::llm::retry::RetryPolicy;
use crate::llm::types::{is_reasoning_model, CompletionRequest, ExtractionEvent};
use crate::llm::utils::{clean_json_output, retain_complete_periods};
use crate::schema::{CompanyReport, ExtractionPayload, REQUIRED_PERIOD_FIELDS};
use log::{debug, info, warn};
use tokio::sync::mpsc::Sender;

/// Turns report text into a validated [`CompanyReport`] through a language model.
///
/// Transient failures (network, empty or unparsable responses) are retried according
/// to the [`RetryPolicy`]. Periods missing a required field are dropped. A period that
/// violates the accounting identity fails the whole extraction and is never retried.
pub struct FinancialExtractor<M> {
    model: M,
    model_name: String,
    system_prompt: String,
    retry: RetryPolicy,
    required_fields: Vec<String>,
}

impl<M: LanguageModel> FinancialExtractor<M> {
    pub fn new(model: M, model_name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            model,
            model_name: model_name.into(),
            system_prompt: build_system_prompt()?,
            retry: RetryPolicy::default(),
            required_fields: REQUIRED_PERIOD_FIELDS
                .iter()
                .map(|f| f.to_string())
                .collect(),
        })
    }

    pub fn from_config(model: M, config: &ExtractionConfig) -> Result<Self> {
        Ok(Self::new(model, config.model.clone())?
            .with_retry(config.retry.clone())
            .with_required_fields(config.required_fields.clone()))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_required_fields(mut self, fields: Vec<String>) -> Self {
        self.required_fields = fields;
        self
    }

    /// Allow a different instruction set (e.g. for another reporting language).
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn build_request(&self, document_text: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.model_name.clone(),
            system_prompt: self.system_prompt.clone(),
            user_message: build_user_message(document_text),
            temperature: 0.0,
            json_mode: !is_reasoning_model(&self.model_name),
        }
    }

    pub async fn extract(
        &self,
        document_text: &str,
        progress: Option<Sender<ExtractionEvent>>,
    ) -> Result<CompanyReport> {
        self.send_event(
            &progress,
            ExtractionEvent::Starting {
                model: self.model_name.clone(),
                characters: document_text.len(),
            },
        )
        .await;
        info!(
            "Sending {} characters to {}",
            document_text.len(),
            self.model_name
        );

        let request = self.build_request(document_text);
        let request = &request;
        let events = &progress;

        let payload = self
            .retry
            .run(
                move |attempt| self.request_payload(request, attempt, events),
                move |attempt, delay, err| {
                    let event = ExtractionEvent::Retry {
                        attempt,
                        delay,
                        error: err.to_string(),
                    };
                    self.send_event(events, event)
                },
            )
            .await;

        let payload = match payload {
            Ok(payload) => payload,
            Err(err) => {
                self.send_event(
                    &progress,
                    ExtractionEvent::Failed {
                        reason: err.to_string(),
                    },
                )
                .await;
                return Err(err);
            }
        };

        match CompanyReport::try_from_payload(payload) {
            Ok(report) => {
                info!(
                    "Extracted {} periods for {}",
                    report.periods().len(),
                    report.company_name()
                );
                self.send_event(
                    &progress,
                    ExtractionEvent::Success {
                        periods: report.periods().len(),
                    },
                )
                .await;
                Ok(report)
            }
            Err(err) => {
                warn!("Extracted data failed validation: {}", err);
                self.send_event(
                    &progress,
                    ExtractionEvent::Failed {
                        reason: err.to_string(),
                    },
                )
                .await;
                Err(err)
            }
        }
    }

    /// One model round-trip: request, sanitize, parse, drop incomplete periods.
    async fn request_payload(
        &self,
        request: &CompletionRequest,
        attempt: u32,
        progress: &Option<Sender<ExtractionEvent>>,
    ) -> Result<ExtractionPayload> {
        self.send_event(progress, ExtractionEvent::Requesting { attempt }).await;

        let raw = self.model.complete(request).await?;
        if raw.trim().is_empty() {
            return Err(ReportError::EmptyResponse);
        }
        self.send_event(
            progress,
            ExtractionEvent::ProcessingResponse {
                characters: raw.len(),
            },
        )
        .await;

        let cleaned = clean_json_output(&raw);
        debug!(
            "Cleaned model output (first 500 chars): {}",
            cleaned.chars().take(500).collect::<String>()
        );

        let mut value: serde_json::Value = serde_json::from_str(&cleaned)
            .map_err(|e| ReportError::MalformedJson(format!("{} in response", e)))?;

        for dropped in retain_complete_periods(&mut value, &self.required_fields) {
            warn!(
                "Dropping incomplete period {}. Missing: {:?}",
                dropped.period, dropped.missing
            );
            self.send_event(
                progress,
                ExtractionEvent::DroppedPeriod {
                    period: dropped.period,
                    missing: dropped.missing,
                },
            )
            .await;
        }

        serde_json::from_value(value)
            .map_err(|e| ReportError::MalformedJson(format!("Response does not match schema: {}", e)))
    }

    async fn send_event(&self, sender: &Option<Sender<ExtractionEvent>>, event: ExtractionEvent) {
        if let Some(tx) = sender {
            let _ = tx.send(event).await;
        }
    }
}
