//! The network boundary.
//!
//! # Design
//! The dispatcher only needs "send this request, give me status, headers and
//! body back". Anything that can do that implements `Transport`, so tests can
//! swap in an in-memory double and applications can bring their own HTTP
//! stack. Non-2xx responses are data here, not errors; only a request that
//! never got a response is an `Err`.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Execute `request` once and return whatever the server answered.
    ///
    /// Implementations return `ApiError::Transport` when no response was
    /// received and must not retry.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[cfg(feature = "reqwest-client")]
pub use reqwest_impl::ReqwestTransport;

#[cfg(feature = "reqwest-client")]
mod reqwest_impl {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::Method;

    use super::Transport;
    use crate::error::ApiError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// `Transport` backed by a shared `reqwest::Client`.
    ///
    /// The core has no timeout of its own; use [`ReqwestTransport::with_timeout`]
    /// to bound how long a request may take.
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_timeout(timeout: Duration) -> Result<Self, ApiError> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| ApiError::Configuration(e.to_string()))?;
            Ok(Self { client })
        }

        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            let mut builder = self.client.request(method(request.method), request.full_url());
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }

            let response = builder
                .send()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response
                .text()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}
