use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::{Client, StatusCode};
use std::pin::Pin;
use std::time::Duration;
use url::Url;

use crate::error::TransportError;

/// Raw response body chunks. Dropping it releases the connection.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, TransportError>> + Send>>;

#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

impl UpstreamRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub struct UpstreamResponse {
    pub status: u16,
    /// `None` when the response carries nothing to read.
    pub body: Option<ByteStream>,
}

/// Sends one streaming request. Non-success statuses are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError>;
}

pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = Client::builder().pool_max_idle_per_host(2);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| TransportError::InvalidRequest(format!("http client: {}", e)))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        let mut builder = self
            .http
            .post(request.url)
            .header("Accept", "text/event-stream")
            .json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail: String = body.trim().chars().take(800).collect();
            return Err(TransportError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        if matches!(status, StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT) {
            return Ok(UpstreamResponse {
                status: status.as_u16(),
                body: None,
            });
        }

        let body = resp.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| TransportError::Read(e.to_string()))
        });
        Ok(UpstreamResponse {
            status: status.as_u16(),
            body: Some(Box::pin(body)),
        })
    }
}
