//! HTTP transport interface

use crate::{Config, Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::warn;

/// Content type of every request body sent to Saferpay
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Outbound request handed to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP method
    pub method: String,
    /// Absolute URL
    pub url: String,
    /// Header name/value pairs
    pub headers: Vec<(String, String)>,
    /// Encoded body
    pub body: String,
}

impl HttpRequest {
    /// Form POST to `url`
    pub fn form_post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: "POST".to_string(),
            url: url.into(),
            headers: vec![("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string())],
            body: body.into(),
        }
    }
}

/// Response returned by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Body as text
    pub body: String,
}

/// Sends requests to the gateway.
///
/// Implementations report connection-level failures as [`Error::Connection`];
/// status codes are returned as-is and judged by the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and wait for the full response
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Transport backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport honouring the configured timeout
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Connection(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| Error::Configuration(format!("invalid HTTP method: {}", e)))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.body(request.body).send().await.map_err(|e| {
            warn!("Saferpay request to {} failed: {}", request.url, e);
            Error::Connection(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            warn!("Reading Saferpay response from {} failed: {}", request.url, e);
            Error::Connection(e.to_string())
        })?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_post_shape() {
        let request = HttpRequest::form_post("https://gw.example/CreatePayInit.asp", "AMOUNT=100");
        assert_eq!(request.method, "POST");
        assert_eq!(
            request.headers,
            vec![(
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string()
            )]
        );
        assert_eq!(request.body, "AMOUNT=100");
    }

    #[test]
    fn test_transport_from_config() {
        let config = Config {
            timeout_seconds: 5,
            ..Config::default()
        };
        assert!(ReqwestTransport::new(&config).is_ok());
    }
}
