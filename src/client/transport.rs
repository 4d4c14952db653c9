//! The HTTP transport collaborator.
//!
//! The engine never touches sockets or TLS itself. Everything outbound
//! goes through the [`Transport`] trait: one request in, one parsed
//! response out. [`HttpTransport`] is the production implementation on
//! top of reqwest; tests substitute an in-memory implementation.
//!
//! The transport reports the response status faithfully — mapping
//! non-2xx statuses to errors is the engine's job, not the transport's.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use url::Url;

use super::config::ClientConfig;
use crate::Result;

/// HTTP method of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl Method {
    /// The method's canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One outbound request handed to the transport.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Fully resolved request URL.
    pub url: Url,
    /// Request headers, authentication included.
    pub headers: HeaderMap,
    /// JSON body, if any.
    pub body: Option<Value>,
}

/// The transport's view of a response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Parsed JSON body; `Null` when the body was empty.
    pub body: Value,
}

impl TransportResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The external HTTP collaborator contract.
///
/// Implementations issue exactly one request per call and suspend until
/// response or failure. Timeouts and connection management live here,
/// not in the engine; the engine adds no retries on top.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a single request and return the parsed response.
    async fn request(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// Production transport backed by reqwest.
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport from the client configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, request: TransportRequest) -> Result<TransportResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .http
            .request(method, request.url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
