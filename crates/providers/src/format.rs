use shared::agent_api::ChatMessage;
use shared::settings::{Endpoint, GenerationConfig};
use url::Url;

use crate::error::TransportError;
use crate::transport::UpstreamRequest;

/// Per-provider wire shape: how a conversation becomes a request, and where
/// the text sits inside each streamed JSON frame.
pub trait UpstreamFormat: Send + Sync {
    fn name(&self) -> &'static str;

    fn build_request(
        &self,
        endpoint: &Endpoint,
        conversation: &[ChatMessage],
        generation: &GenerationConfig,
    ) -> Result<UpstreamRequest, TransportError>;

    /// The incremental text carried by one parsed frame, if any.
    fn extract_delta(&self, frame: &serde_json::Value) -> Option<String>;
}

pub(crate) fn endpoint_url(base_url: &str, path: &str) -> Result<Url, TransportError> {
    let raw = format!("{}/{}", base_url.trim_end_matches('/'), path);
    Url::parse(&raw).map_err(|e| TransportError::InvalidRequest(format!("{}: {}", raw, e)))
}

pub(crate) fn require_key(endpoint: &Endpoint) -> Result<&str, TransportError> {
    endpoint
        .credential()
        .ok_or_else(|| TransportError::InvalidRequest("no API key configured".into()))
}
