use async_trait::async_trait;
use pulse_common::Result;
use std::time::Duration;

/// Tuning knobs for one completion call.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 1400,
            timeout: Duration::from_secs(90),
        }
    }
}

impl CompletionOptions {
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A text-in/text-out completion service.
///
/// Implementations own their transport; callers only see the response text
/// or one of the upstream error variants of
/// [`pulse_common::PulseError`] (timeout / HTTP / network).
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one prompt and return the raw response text.
    async fn send(
        &self,
        system_prompt: &str,
        prompt: &str,
        opts: CompletionOptions,
    ) -> Result<String>;

    /// The model name requests are issued against.
    fn model_name(&self) -> &str;
}
