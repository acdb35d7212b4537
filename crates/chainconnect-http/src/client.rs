//! HTTP JSON-RPC transport backed by `reqwest`.
//!
//! One POST per request, no retry, no timeout. The reply body is handed
//! back as JSON whatever the HTTP status, since nodes commonly put error
//! envelopes in 4xx/5xx bodies.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use chainconnect_core::connector::Connector;
use chainconnect_core::error::TransportError;
use chainconnect_core::request::JsonRpcRequest;
use chainconnect_core::transport::RpcTransport;

/// Configuration for [`HttpTransport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTransportConfig {
    /// JSON-RPC endpoint, e.g. "https://cloudflare-eth.com"
    pub url: String,
    /// Extra headers sent with every request (API keys, auth tokens)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl HttpTransportConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// HTTP JSON-RPC transport.
pub struct HttpTransport {
    url: Url,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport from a full configuration.
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let url = Url::parse(&config.url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", config.url)))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::Other(format!("invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::Other(format!("invalid header value: {e}")))?;
            headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self { url, http })
    }

    /// Create a transport for `url` with no extra headers.
    pub fn from_url(url: impl Into<String>) -> Result<Self, TransportError> {
        Self::new(HttpTransportConfig::new(url))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn send(&self, req: JsonRpcRequest) -> Result<Value, TransportError> {
        let resp = self
            .http
            .post(self.url.clone())
            .json(&req)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!(
                status = status.as_u16(),
                url = %self.url,
                error = %e,
                "non-JSON reply"
            );
            if status.is_success() {
                TransportError::Deserialization(e)
            } else {
                TransportError::Http(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    String::from_utf8_lossy(&body)
                ))
            }
        })
    }

    fn target(&self) -> &str {
        self.url.as_str()
    }
}

/// Build a validating connector over an HTTP endpoint.
pub fn http_connector(url: impl Into<String>) -> Result<Connector, TransportError> {
    Ok(Connector::new(Arc::new(HttpTransport::from_url(url)?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_url() {
        let err = HttpTransport::from_url("not a url").err().unwrap();
        assert!(matches!(err, TransportError::InvalidUrl(_)));
    }

    #[test]
    fn config_headers_default_to_empty() {
        let config: HttpTransportConfig =
            serde_json::from_str(r#"{"url": "http://localhost:8545"}"#).unwrap();
        assert!(config.headers.is_empty());
        assert!(HttpTransport::new(config).is_ok());
    }

    #[test]
    fn rejects_invalid_header() {
        let config =
            HttpTransportConfig::new("http://localhost:8545").with_header("bad header", "x");
        assert!(HttpTransport::new(config).is_err());
    }
}
