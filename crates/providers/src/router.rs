use crate::error::TransportError;
use crate::format::UpstreamFormat;
use crate::gemini::GeminiFormat;
use crate::ingest::StreamIngestor;
use crate::mock::Pacing;
use crate::openai::ChatCompletionsFormat;
use crate::transport::HttpTransport;
use shared::settings::{ProviderKind, StreamSettings};
use std::sync::Arc;
use std::time::Duration;

/// Picks the wire format for the configured provider and wires up an
/// ingestor over HTTP.
pub struct ProviderRouter {
    config: StreamSettings,
}

impl ProviderRouter {
    pub fn new(config: StreamSettings) -> Self {
        Self { config }
    }

    pub fn active_provider(&self) -> &'static str {
        self.config.provider.as_str()
    }

    pub fn format(&self) -> Arc<dyn UpstreamFormat> {
        match self.config.provider {
            ProviderKind::OpenAI => Arc::new(ChatCompletionsFormat),
            ProviderKind::Gemini => Arc::new(GeminiFormat),
        }
    }

    pub fn ingestor(&self, pacing: Pacing) -> Result<StreamIngestor, TransportError> {
        let timeout = self.config.request_timeout_secs.map(Duration::from_secs);
        let transport = HttpTransport::new(timeout)?;
        let endpoint = self.config.active_endpoint().clone();
        if endpoint.credential().is_none() {
            tracing::warn!(
                provider = self.active_provider(),
                "no API key configured; replies will be scripted"
            );
        }
        tracing::info!(
            provider = self.active_provider(),
            model = %endpoint.model,
            "stream ingestor ready"
        );
        Ok(StreamIngestor::new(
            Arc::new(transport),
            self.format(),
            endpoint,
            self.config.generation.clone(),
        )
        .with_pacing(pacing))
    }
}
