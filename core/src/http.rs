//! HTTP request descriptors and raw responses.
//!
//! # Design
//! A request is described as plain data before anything touches the network.
//! `RequestBuilder` produces `HttpRequest` values, a `Transport` executes them
//! and hands back an `HttpResponse`, and the dispatcher turns that response
//! into the caller's result. Query values are stored raw and only
//! percent-encoded when the final URL is rendered, so tests can inspect both.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fully-built outgoing request.
///
/// `url` is absolute and carries no query string; `query` keeps the
/// parameters in the order the endpoint defines them. Use
/// [`HttpRequest::full_url`] for the URL actually sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// The request URL with its query string appended, every value
    /// percent-encoded.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.url)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A raw HTTP response as returned by a `Transport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(query: Vec<(&str, &str)>) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: "https://api.spotify.com/v1/search/".to_string(),
            query: query
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            headers: vec![("Authorization".to_string(), "Bearer abc".to_string())],
            body: None,
        }
    }

    #[test]
    fn full_url_without_query_is_the_bare_url() {
        let req = request(Vec::new());
        assert_eq!(req.full_url(), "https://api.spotify.com/v1/search/");
    }

    #[test]
    fn full_url_keeps_parameter_order_and_encodes_values() {
        let req = request(vec![("q", "Mr. Brightside"), ("type", "track")]);
        assert_eq!(
            req.full_url(),
            "https://api.spotify.com/v1/search/?q=Mr.%20Brightside&type=track"
        );
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = request(Vec::new());
        assert_eq!(req.header("authorization"), Some("Bearer abc"));
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn success_range_is_2xx_only() {
        let mut resp = HttpResponse {
            status: 201,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(resp.is_success());
        resp.status = 304;
        assert!(!resp.is_success());
        resp.status = 199;
        assert!(!resp.is_success());
    }
}
