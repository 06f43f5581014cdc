use serde::{Deserialize, Serialize};
use shared::agent_api::{ChatMessage, Role};
use shared::settings::{Endpoint, GenerationConfig};

use crate::error::TransportError;
use crate::format::{endpoint_url, require_key, UpstreamFormat};
use crate::transport::UpstreamRequest;

/// One `contents[]` turn: `{"role": "user" | "model", "parts": [{"text": ...}]}`.
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f64,
    top_k: u32,
    top_p: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct GeminiSafetySetting<'a> {
    category: &'a str,
    threshold: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<GeminiSafetySetting<'a>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

/// Google Gemini `streamGenerateContent`: `candidates[0].content.parts[0].text`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeminiFormat;

impl UpstreamFormat for GeminiFormat {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn build_request(
        &self,
        endpoint: &Endpoint,
        conversation: &[ChatMessage],
        generation: &GenerationConfig,
    ) -> Result<UpstreamRequest, TransportError> {
        let key = require_key(endpoint)?;
        let mut url = endpoint_url(
            &endpoint.base_url,
            &format!("v1beta/models/{}:streamGenerateContent", endpoint.model),
        )?;
        url.query_pairs_mut().append_pair("alt", "sse");

        // Gemini expects roles: "user" | "model".
        let contents = conversation
            .iter()
            .map(|m| GeminiContent {
                role: match m.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                }
                .to_string(),
                parts: vec![GeminiPart {
                    text: m.content.clone(),
                }],
            })
            .collect();

        let req = GeminiRequest {
            contents,
            generation_config: GeminiGenerationConfig {
                temperature: generation.temperature,
                top_k: generation.top_k,
                top_p: generation.top_p,
                max_output_tokens: generation.max_output_tokens,
            },
            safety_settings: generation
                .safety
                .iter()
                .map(|s| GeminiSafetySetting {
                    category: &s.category,
                    threshold: &s.threshold,
                })
                .collect(),
        };
        let body = serde_json::to_value(&req)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        Ok(UpstreamRequest {
            url,
            headers: vec![("x-goog-api-key".into(), key.to_string())],
            body,
        })
    }

    fn extract_delta(&self, frame: &serde_json::Value) -> Option<String> {
        let resp = GeminiResponse::deserialize(frame).ok()?;
        resp.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}
