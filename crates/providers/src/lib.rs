pub mod error;
pub mod format;
pub mod gemini;
pub mod ingest;
pub mod mock;
pub mod openai;
pub mod router;
pub mod sse;
pub mod transport;

pub use error::{IngestError, TransportError};
pub use ingest::{DeltaStream, StreamIngestor};
pub use mock::{produce_mock_deltas, Pacing};
pub use router::ProviderRouter;
