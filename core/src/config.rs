//! Client configuration.

use std::env;

/// Public Web API origin and version prefix.
pub const API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Overrides the API base URL, e.g. to point at a local mock server.
pub const API_URL_ENV: &str = "SPOTIFY_API_URL";

/// Bearer token picked up by [`ClientConfig::from_env`].
pub const ACCESS_TOKEN_ENV: &str = "SPOTIFY_ACCESS_TOKEN";

/// Settings a client starts with. The access token can still be changed
/// later through the client's setter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub access_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            access_token: None,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            access_token: None,
        }
    }

    /// Read `SPOTIFY_API_URL` and `SPOTIFY_ACCESS_TOKEN`, falling back to the
    /// public origin and an anonymous client. Empty values count as unset.
    pub fn from_env() -> Self {
        let base_url = env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| API_BASE_URL.to_string());
        let access_token = env::var(ACCESS_TOKEN_ENV).ok().filter(|v| !v.is_empty());
        Self {
            base_url,
            access_token,
        }
    }
}
