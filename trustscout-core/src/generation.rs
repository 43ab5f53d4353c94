//! Text-generation capability consumed by the literature stage.
//!
//! `TextGenerator` is the seam between the pipeline and any LLM backend.
//! The pipeline holds it as `Option<Arc<dyn TextGenerator>>`: absent means the
//! literature stage goes straight to its fallback finding.

use crate::error::LlmError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// A backend that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Return the model name.
    fn model_name(&self) -> &str;
}

enum MockReply {
    Text(String),
    Fail(LlmError),
}

/// A scripted generator for tests.
///
/// Queued replies are consumed in order; once the queue is empty every call
/// returns the sticky reply, or a placeholder text if none was set.
pub struct MockTextGenerator {
    model: String,
    queue: Mutex<VecDeque<MockReply>>,
    sticky: Mutex<Option<MockReply>>,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockTextGenerator {
    pub fn new() -> Self {
        Self {
            model: "mock-model".to_string(),
            queue: Mutex::new(VecDeque::new()),
            sticky: Mutex::new(None),
            delay: None,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A generator that always returns `text`.
    pub fn with_response(text: &str) -> Self {
        let generator = Self::new();
        *generator.sticky.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(MockReply::Text(text.to_string()));
        generator
    }

    /// A generator whose every call fails with an `ApiRequest` error.
    pub fn failing(message: &str) -> Self {
        let generator = Self::new();
        *generator.sticky.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(MockReply::Fail(LlmError::ApiRequest {
                message: message.to_string(),
            }));
        generator
    }

    /// Sleep for `delay` before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a text reply for the next call.
    pub fn queue_response(&self, text: &str) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(MockReply::Text(text.to_string()));
    }

    /// Queue a failure for the next call.
    pub fn queue_error(&self, error: LlmError) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(MockReply::Fail(error));
    }

    /// Number of `generate` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next_reply(&self) -> Result<String, LlmError> {
        if let Some(reply) = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
        {
            return match reply {
                MockReply::Text(text) => Ok(text),
                MockReply::Fail(err) => Err(err),
            };
        }
        match &*self.sticky.lock().unwrap_or_else(PoisonError::into_inner) {
            Some(MockReply::Text(text)) => Ok(text.clone()),
            Some(MockReply::Fail(err)) => Err(clone_error(err)),
            None => Ok("I'm a mock generator. No queued responses available.".to_string()),
        }
    }
}

/// `LlmError` is not `Clone`; rebuild the sticky failure for each call.
fn clone_error(err: &LlmError) -> LlmError {
    match err {
        LlmError::ApiRequest { message } => LlmError::ApiRequest {
            message: message.clone(),
        },
        LlmError::ResponseParse { message } => LlmError::ResponseParse {
            message: message.clone(),
        },
        LlmError::EmptyResponse => LlmError::EmptyResponse,
        LlmError::AuthFailed { provider } => LlmError::AuthFailed {
            provider: provider.clone(),
        },
        LlmError::RateLimited { retry_after_secs } => LlmError::RateLimited {
            retry_after_secs: *retry_after_secs,
        },
        LlmError::Timeout { timeout_secs } => LlmError::Timeout {
            timeout_secs: *timeout_secs,
        },
        LlmError::Connection { message } => LlmError::Connection {
            message: message.clone(),
        },
    }
}

impl Default for MockTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_reply()
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
