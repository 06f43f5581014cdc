use serde::{Deserialize, Serialize};
use shared::agent_api::ChatMessage;
use shared::settings::{Endpoint, GenerationConfig};

use crate::error::TransportError;
use crate::format::{endpoint_url, require_key, UpstreamFormat};
use crate::transport::UpstreamRequest;

// ── Request types ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    temperature: f64,
    top_p: f64,
    max_tokens: u32,
}

// ── Streaming response types ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct OpenAIStreamResponse {
    #[serde(default)]
    choices: Vec<OpenAIStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIStreamChoice {
    #[serde(default)]
    delta: Option<OpenAIStreamDelta>,
}

#[derive(Debug, Deserialize)]
struct OpenAIStreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completions: `choices[0].delta.content`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChatCompletionsFormat;

impl UpstreamFormat for ChatCompletionsFormat {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn build_request(
        &self,
        endpoint: &Endpoint,
        conversation: &[ChatMessage],
        generation: &GenerationConfig,
    ) -> Result<UpstreamRequest, TransportError> {
        let key = require_key(endpoint)?;
        let url = endpoint_url(&endpoint.base_url, "v1/chat/completions")?;
        let req = OpenAIRequest {
            model: &endpoint.model,
            messages: conversation,
            stream: true,
            temperature: generation.temperature,
            top_p: generation.top_p,
            max_tokens: generation.max_output_tokens,
        };
        let body = serde_json::to_value(&req)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        Ok(UpstreamRequest {
            url,
            headers: vec![("Authorization".into(), format!("Bearer {}", key))],
            body,
        })
    }

    fn extract_delta(&self, frame: &serde_json::Value) -> Option<String> {
        let resp = OpenAIStreamResponse::deserialize(frame).ok()?;
        resp.choices.into_iter().next()?.delta?.content
    }
}
