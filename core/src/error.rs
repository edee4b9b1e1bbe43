//! Error types for the Web API client.
//!
//! # Design
//! Every non-2xx response lands in `Http` with the raw status code and body,
//! so callers can branch on `status()` without the client guessing which codes
//! deserve their own variant. Failures that never produced a response are
//! `Transport`; misconfiguration is reported by the setter that caused it.

use serde::Deserialize;
use thiserror::Error;

/// Errors delivered through a callback, a `Pending` future, or a setter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a status outside 200..300.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never received a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// A 2xx response body was not valid JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The client was handed an unusable promise implementation.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// No async runtime was available to drive a callback-style request.
    #[error("no async runtime available to send the request")]
    NoRuntime,

    /// The request task ended without producing a result.
    #[error("request was canceled before completion")]
    Canceled,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorObject,
}

#[derive(Deserialize)]
struct ErrorObject {
    message: String,
}

impl ApiError {
    /// HTTP status code for `Http` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// The `error.message` field of a Web API error body, if the body has one.
    pub fn api_message(&self) -> Option<String> {
        match self {
            ApiError::Http { body, .. } => serde_json::from_str::<ErrorEnvelope>(body)
                .ok()
                .map(|envelope| envelope.error.message),
            _ => None,
        }
    }
}
