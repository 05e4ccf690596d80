//! Remote summarization boundary.
//!
//! The orchestrator only sees the [`Summarizer`] trait; the shipped
//! implementation calls the OpenAI chat-completions API. Throttled calls
//! are retried with exponential backoff and jitter; every other failure
//! surfaces immediately.

use crate::config::ModelSettings;
use crate::error::{ReferatError, Result};
use crate::stats::CallStats;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Result of one remote summarization call.
#[derive(Debug, Clone)]
pub struct SummaryOutput {
    pub text: String,
    /// Token usage for the call. Estimated when the API omitted usage
    /// data.
    pub usage: CallStats,
}

/// Text in, generated text out. The only external service boundary in
/// the pipeline.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Generate a summary for the given prompt. `context_label` names the
    /// work item (folder name or "global_summary") for logging.
    async fn generate(&self, prompt: &str, context_label: &str) -> Result<SummaryOutput>;
}

/// OpenAI chat-completions implementation of [`Summarizer`].
///
/// Reads `OPENAI_API_KEY` from the environment.
pub struct OpenAiSummarizer {
    client: Client<OpenAIConfig>,
    model: ModelSettings,
}

impl OpenAiSummarizer {
    /// Create a summarizer with a request timeout from configuration.
    pub fn new(model: &ModelSettings) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(model.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client: Client::with_config(OpenAIConfig::default()).with_http_client(http_client),
            model: model.clone(),
        }
    }

    async fn call_once(&self, prompt: &str) -> std::result::Result<SummaryOutput, OpenAIError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model.model_id)
            .messages(vec![ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()])
            .temperature(self.model.temperature)
            .max_tokens(self.model.max_tokens)
            .build()?;

        let started = Instant::now();
        let response = self.client.chat().create(request).await?;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        let usage = match response.usage {
            Some(u) => CallStats {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
                latency_ms,
                model_id: self.model.model_id.clone(),
                estimated: false,
            },
            None => CallStats::estimated_from_text(&text, latency_ms, &self.model.model_id),
        };

        Ok(SummaryOutput { text, usage })
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn generate(&self, prompt: &str, context_label: &str) -> Result<SummaryOutput> {
        for attempt in 0..=self.model.max_retries {
            if attempt > 0 {
                info!(
                    "Retry attempt {}/{} for {}",
                    attempt, self.model.max_retries, context_label
                );
            }

            match self.call_once(prompt).await {
                Ok(output) if output.text.is_empty() => {
                    return Err(ReferatError::Summarization(format!(
                        "empty response for {}",
                        context_label
                    )));
                }
                Ok(output) => return Ok(output),
                Err(e) if is_throttled(&e) && attempt < self.model.max_retries => {
                    let delay = backoff_delay(self.model.retry_base_delay_seconds, attempt);
                    warn!(
                        "Throttled on {}. Waiting {:.1}s before retry",
                        context_label,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    return Err(ReferatError::Summarization(format!(
                        "{}: {}",
                        context_label, e
                    )));
                }
            }
        }

        Err(ReferatError::Summarization(format!(
            "{}: retries exhausted",
            context_label
        )))
    }
}

fn is_throttled(err: &OpenAIError) -> bool {
    match err {
        OpenAIError::ApiError(api) => {
            api.code.as_deref() == Some("rate_limit_exceeded")
                || api.message.to_lowercase().contains("rate limit")
        }
        OpenAIError::Reqwest(e) => {
            e.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS)
        }
        _ => false,
    }
}

/// Exponential backoff with up to 10 s of jitter drawn from the system
/// clock's subsecond nanos.
fn backoff_delay(base_seconds: u64, attempt: u32) -> Duration {
    let base = base_seconds.saturating_mul(1u64 << attempt.min(16));
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let jitter_ms = u64::from(nanos) % 10_000;
    Duration::from_secs(base) + Duration::from_millis(jitter_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::error::ApiError;

    #[test]
    fn test_backoff_grows_exponentially() {
        let d0 = backoff_delay(60, 0);
        let d1 = backoff_delay(60, 1);
        let d2 = backoff_delay(60, 2);
        assert!(d0 >= Duration::from_secs(60) && d0 < Duration::from_secs(70));
        assert!(d1 >= Duration::from_secs(120) && d1 < Duration::from_secs(130));
        assert!(d2 >= Duration::from_secs(240) && d2 < Duration::from_secs(250));
    }

    #[test]
    fn test_throttle_detection() {
        let throttled = OpenAIError::ApiError(ApiError {
            message: "Rate limit reached for gpt-4o".to_string(),
            r#type: Some("requests".to_string()),
            param: None,
            code: Some("rate_limit_exceeded".to_string()),
        });
        assert!(is_throttled(&throttled));

        let other = OpenAIError::ApiError(ApiError {
            message: "Invalid API key".to_string(),
            r#type: None,
            param: None,
            code: Some("invalid_api_key".to_string()),
        });
        assert!(!is_throttled(&other));
    }
}
