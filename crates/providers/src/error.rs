use thiserror::Error;

/// Failures talking to the upstream. Every variant is recovered by falling
/// back to the scripted reply.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("upstream returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("stream read error: {0}")]
    Read(String),
}

/// Failures surfaced to the consumer of a delta stream.
#[derive(Debug, Clone, Error)]
pub enum IngestError {
    #[error("upstream response ({status}) had no readable body")]
    MissingBody { status: u16 },
}
