//! Turns a streaming completion response into an ordered sequence of text
//! deltas, falling back to the scripted reply when the upstream is unusable.

use futures::{Stream, StreamExt};
use shared::agent_api::{ChatMessage, TextDelta};
use shared::settings::{Endpoint, GenerationConfig};
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::IngestError;
use crate::format::UpstreamFormat;
use crate::mock::{produce_mock_deltas, Pacing};
use crate::sse::{FrameDecoder, StreamFrame};
use crate::transport::Transport;

/// Lazy, finite, single-use sequence of deltas. Dropping it closes the
/// upstream connection.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<TextDelta, IngestError>> + Send>>;

#[derive(Clone)]
pub struct StreamIngestor {
    transport: Arc<dyn Transport>,
    format: Arc<dyn UpstreamFormat>,
    endpoint: Endpoint,
    generation: GenerationConfig,
    pacing: Pacing,
}

impl StreamIngestor {
    pub fn new(
        transport: Arc<dyn Transport>,
        format: Arc<dyn UpstreamFormat>,
        endpoint: Endpoint,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            transport,
            format,
            endpoint,
            generation,
            pacing: Pacing::typing(),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn format_name(&self) -> &'static str {
        self.format.name()
    }

    /// Stream the assistant reply to `conversation`.
    ///
    /// Nothing is sent until the stream is first polled. Transport failures
    /// switch to the scripted reply; the only error item is
    /// [`IngestError::MissingBody`].
    pub fn produce_deltas(&self, conversation: &[ChatMessage]) -> DeltaStream {
        let seed = conversation
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let request = self
            .format
            .build_request(&self.endpoint, conversation, &self.generation);
        let transport = Arc::clone(&self.transport);
        let format = Arc::clone(&self.format);
        let pacing = self.pacing;

        Box::pin(async_stream::stream! {
            let mut produced = 0usize;

            let response = match request {
                Ok(request) => transport.send(request).await,
                Err(e) => Err(e),
            };

            match response {
                Ok(response) => {
                    let Some(mut body) = response.body else {
                        yield Err(IngestError::MissingBody { status: response.status });
                        return;
                    };

                    let mut decoder = FrameDecoder::new();
                    'read: loop {
                        let (frames, at_end) = match body.next().await {
                            Some(Ok(chunk)) => (decoder.feed(&chunk), false),
                            Some(Err(e)) => {
                                warn!(provider = format.name(), error = %e, "upstream stream interrupted");
                                (Vec::new(), true)
                            }
                            None => (decoder.finish(), true),
                        };

                        for frame in frames {
                            let payload = match frame {
                                StreamFrame::Done => break 'read,
                                StreamFrame::Payload(payload) => payload,
                            };
                            let parsed = match serde_json::from_str::<serde_json::Value>(&payload) {
                                Ok(value) => value,
                                Err(e) => {
                                    debug!(error = %e, "skipping malformed frame");
                                    continue;
                                }
                            };
                            match format.extract_delta(&parsed) {
                                Some(text) if !text.is_empty() => {
                                    produced += 1;
                                    yield Ok(text);
                                }
                                _ => debug!("frame carried no text"),
                            }
                        }

                        if at_end {
                            break;
                        }
                    }
                    drop(body);

                    if produced == 0 {
                        warn!(provider = format.name(), "upstream produced no text, using scripted reply");
                    }
                }
                Err(e) => {
                    warn!(provider = format.name(), error = %e, "upstream unavailable, using scripted reply");
                }
            }

            if produced == 0 {
                let mut fallback = std::pin::pin!(produce_mock_deltas(&seed, pacing));
                while let Some(delta) = fallback.next().await {
                    yield Ok(delta);
                }
            }
        })
    }
}
