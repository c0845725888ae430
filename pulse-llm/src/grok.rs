use crate::traits::{CompletionClient, CompletionOptions};
use crate::DEFAULT_GROK_MODEL;
use async_trait::async_trait;
use pulse_common::{PulseError, Result};
use pulse_http::{HttpClient, HttpError};
use serde::Serialize;
use serde_json::Value;

pub const XAI_API_BASE: &str = "https://api.x.ai/v1/";

/// Chat-completions client for the xAI Grok endpoint.
#[derive(Debug)]
pub struct GrokClient {
    http: HttpClient,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl GrokClient {
    /// Create a client for the default Grok endpoint.
    ///
    /// Fails fast with a configuration error when the credential is absent,
    /// before any network call can be attempted.
    pub fn new(api_key: String, model: Option<String>) -> Result<Self> {
        Self::with_endpoint(api_key, model, XAI_API_BASE)
    }

    pub fn with_endpoint(api_key: String, model: Option<String>, base: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(PulseError::Config(
                "completion API key not configured (set PULSE__LLM__API_KEY)".into(),
            ));
        }
        let http = HttpClient::new(base)
            .map_err(|e| PulseError::Config(format!("invalid completion endpoint: {e}")))?;
        Ok(Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_GROK_MODEL.to_string()),
        })
    }
}

#[async_trait]
impl CompletionClient for GrokClient {
    async fn send(
        &self,
        system_prompt: &str,
        prompt: &str,
        opts: CompletionOptions,
    ) -> Result<String> {
        let req = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            temperature: opts.temperature,
            max_tokens: opts.max_tokens,
        };

        tracing::debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            max_tokens = opts.max_tokens,
            timeout_ms = opts.timeout.as_millis() as u64,
            "grok.send"
        );

        let resp: Value = self
            .http
            .post_json_timeout("chat/completions", Some(self.api_key.as_str()), &req, opts.timeout)
            .await
            .map_err(http_to_pulse)?;

        Ok(extract_content(&resp))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Polymorphic decode over the closed set of known upstream response
/// shapes: OpenAI-style `choices`, then `output`, else the whole payload
/// stringified. Never a crash on an unknown shape.
pub fn extract_content(v: &Value) -> String {
    if let Value::Object(map) = v {
        if let Some(first) = map
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|c| c.first())
        {
            if let Some(content) = first
                .get("message")
                .and_then(|m| m.get("content"))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
            {
                return content.to_string();
            }
            return first
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
        }
        if let Some(output) = map.get("output") {
            return match output {
                Value::Array(items) => items
                    .iter()
                    .map(value_to_text)
                    .collect::<Vec<_>>()
                    .join(" "),
                other => value_to_text(other),
            };
        }
        return v.to_string();
    }
    value_to_text(v)
}

fn value_to_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn http_to_pulse(e: HttpError) -> PulseError {
    match e {
        HttpError::Timeout(_) => PulseError::UpstreamTimeout,
        HttpError::Api { status, body } => PulseError::UpstreamHttp {
            status: status.as_u16(),
            body,
        },
        HttpError::Network(msg) => PulseError::UpstreamNetwork(msg),
        other => PulseError::UpstreamNetwork(other.to_string()),
    }
}
