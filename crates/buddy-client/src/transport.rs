//! The raw HTTP exchange underneath [`RemoteStore`](crate::remote::RemoteStore).

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};

use crate::error::ClientError;

#[derive(Debug, Clone)]
pub struct RemoteRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl RemoteRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// Status and undecoded body of a completed exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Sends one request. Implementations do not retry and do not time out on
/// their own; the caller bounds them.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: RemoteRequest) -> Result<RawResponse, ClientError>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: RemoteRequest) -> Result<RawResponse, ClientError> {
        tracing::debug!("HTTP {} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!("HTTP response status: {status}, {} bytes", body.len());
        Ok(RawResponse { status, body })
    }
}
