//! Adapter to the external generative text service.
//!
//! [`ResponseGenerator::generate`] never fails: service errors become an
//! inline reply (`<marker>: <detail>`) so the conversation keeps going.

pub mod gemini;
pub mod openai;

use crate::error::ServiceError;
use crate::prompt::Prompt;
use crate::retry::{with_retry_if, RetryConfig};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// A generative text service: submit a prompt, receive text.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    async fn submit(&self, prompt: &str) -> Result<String, ServiceError>;
}

/// Failure-handling policy for generation calls.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// Upper bound for a single attempt
    pub timeout: Duration,
    pub retry: RetryConfig,
    /// Prefix of the inline reply used when generation fails
    pub error_marker: String,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryConfig::single_attempt(),
            error_marker: "❌ Generation error".to_string(),
        }
    }
}

/// Text to show for a turn. `failure` is set when `text` is error text.
#[derive(Debug)]
pub struct Reply {
    pub text: String,
    pub failure: Option<ServiceError>,
}

impl Reply {
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

#[derive(Clone)]
pub struct ResponseGenerator {
    client: Arc<dyn GenerationClient>,
    settings: GeneratorSettings,
}

impl ResponseGenerator {
    pub fn new(client: Arc<dyn GenerationClient>, settings: GeneratorSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Call the service, returning the trimmed reply or the error kind.
    pub async fn try_generate(&self, prompt: &Prompt) -> Result<String, ServiceError> {
        let timeout = self.settings.timeout;
        let operation = format!("Generation via {}", self.client.name());

        let reply = with_retry_if(
            &self.settings.retry,
            &operation,
            || async {
                match tokio::time::timeout(timeout, self.client.submit(prompt.as_str())).await {
                    Ok(result) => result,
                    Err(_) => Err(ServiceError::Timeout(timeout)),
                }
            },
            ServiceError::is_retryable,
        )
        .await?;

        let reply = reply.trim();
        if reply.is_empty() {
            return Err(ServiceError::EmptyReply);
        }
        debug!("{} returned {} chars", self.client.name(), reply.len());
        Ok(reply.to_string())
    }

    /// Call the service; on failure the reply text is `<marker>: <error>`.
    pub async fn generate(&self, prompt: &Prompt) -> Reply {
        match self.try_generate(prompt).await {
            Ok(text) => Reply {
                text,
                failure: None,
            },
            Err(e) => {
                warn!("{} generation failed, replying with error text: {}", self.client.name(), e);
                Reply {
                    text: self.failure_reply(&e),
                    failure: Some(e),
                }
            }
        }
    }

    /// The inline reply shown for a failed generation.
    pub fn failure_reply(&self, error: &ServiceError) -> String {
        format!("{}: {}", self.settings.error_marker, error)
    }
}
