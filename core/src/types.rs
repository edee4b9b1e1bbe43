//! Typed request parameters and payloads.
//!
//! # Design
//! Responses are handed back as `serde_json::Value` so every endpoint's
//! payload reaches the caller untouched. Only the inputs are typed: optional
//! query parameters and the playlist-creation body.

use serde::{Deserialize, Serialize};

/// Optional query parameters shared by the collection endpoints.
///
/// Unset fields are left out of the query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn market(mut self, market: &str) -> Self {
        self.market = Some(market.to_string());
        self
    }

    pub fn country(mut self, country: &str) -> Self {
        self.country = Some(country.to_string());
        self
    }

    pub fn album_type(mut self, album_type: &str) -> Self {
        self.album_type = Some(album_type.to_string());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Present options as raw query pairs in a fixed order.
    pub(crate) fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(market) = &self.market {
            query.push(("market".to_string(), market.clone()));
        }
        if let Some(country) = &self.country {
            query.push(("country".to_string(), country.clone()));
        }
        if let Some(album_type) = &self.album_type {
            query.push(("album_type".to_string(), album_type.clone()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            query.push(("offset".to_string(), offset.to_string()));
        }
        query
    }
}

/// The kind of catalog object a search looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Album,
    Artist,
    Track,
}

impl SearchType {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::Album => "album",
            SearchType::Artist => "artist",
            SearchType::Track => "track",
        }
    }
}

/// Request payload for creating a playlist. Omitted fields keep the server
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlaylist {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
}

impl NewPlaylist {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            public: None,
        }
    }
}
