//! Request builder for the Web API endpoints.
//!
//! # Design
//! `RequestBuilder` holds the base URL and the current access token and
//! nothing else. Each endpoint has a `build_*` method that deterministically
//! produces an `HttpRequest`; nothing here touches the network. The only
//! state read while building is the token, which becomes an `Authorization`
//! header on every request built while it is set.

use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{NewPlaylist, QueryOptions, SearchType};

/// Builds `HttpRequest` values for every supported endpoint.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    access_token: Option<String>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

impl RequestBuilder {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let mut builder = Self::new(&config.base_url);
        builder.access_token = config.access_token.clone();
        builder
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Set or clear the bearer token used for requests built afterwards.
    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }

    // --- generic ---

    /// Request an absolute URL as-is, e.g. a paging object's `next` link.
    pub fn build_generic(&self, method: HttpMethod, url: &str) -> HttpRequest {
        self.request(method, url.to_string(), Vec::new())
    }

    // --- tracks ---

    pub fn build_get_track(&self, track_id: &str, options: &QueryOptions) -> HttpRequest {
        self.get(&format!("/tracks/{}", segment(track_id)), options.to_query())
    }

    pub fn build_get_tracks(&self, track_ids: &[&str], options: &QueryOptions) -> HttpRequest {
        self.get("/tracks/", with_ids(track_ids, options))
    }

    // --- albums ---

    pub fn build_get_album(&self, album_id: &str, options: &QueryOptions) -> HttpRequest {
        self.get(&format!("/albums/{}", segment(album_id)), options.to_query())
    }

    pub fn build_get_albums(&self, album_ids: &[&str], options: &QueryOptions) -> HttpRequest {
        self.get("/albums/", with_ids(album_ids, options))
    }

    pub fn build_get_album_tracks(&self, album_id: &str, options: &QueryOptions) -> HttpRequest {
        self.get(
            &format!("/albums/{}/tracks", segment(album_id)),
            options.to_query(),
        )
    }

    // --- artists ---

    pub fn build_get_artist(&self, artist_id: &str, options: &QueryOptions) -> HttpRequest {
        self.get(&format!("/artists/{}", segment(artist_id)), options.to_query())
    }

    pub fn build_get_artists(&self, artist_ids: &[&str], options: &QueryOptions) -> HttpRequest {
        self.get("/artists/", with_ids(artist_ids, options))
    }

    pub fn build_get_artist_albums(&self, artist_id: &str, options: &QueryOptions) -> HttpRequest {
        self.get(
            &format!("/artists/{}/albums", segment(artist_id)),
            options.to_query(),
        )
    }

    pub fn build_get_artist_top_tracks(&self, artist_id: &str, country: &str) -> HttpRequest {
        self.get(
            &format!("/artists/{}/top-tracks", segment(artist_id)),
            vec![("country".to_string(), country.to_string())],
        )
    }

    pub fn build_get_artist_related_artists(&self, artist_id: &str) -> HttpRequest {
        self.get(
            &format!("/artists/{}/related-artists", segment(artist_id)),
            Vec::new(),
        )
    }

    // --- search ---

    pub fn build_search(&self, query: &str, kind: SearchType, options: &QueryOptions) -> HttpRequest {
        let mut params = vec![
            ("q".to_string(), query.to_string()),
            ("type".to_string(), kind.as_str().to_string()),
        ];
        params.extend(options.to_query());
        self.get("/search/", params)
    }

    // --- users ---

    pub fn build_get_user(&self, user_id: &str) -> HttpRequest {
        self.get(&format!("/users/{}", segment(user_id)), Vec::new())
    }

    pub fn build_get_me(&self) -> HttpRequest {
        self.get("/me", Vec::new())
    }

    // --- playlists ---

    pub fn build_get_user_playlists(&self, user_id: &str, options: &QueryOptions) -> HttpRequest {
        self.get(
            &format!("/users/{}/playlists", segment(user_id)),
            options.to_query(),
        )
    }

    pub fn build_get_playlist(
        &self,
        user_id: &str,
        playlist_id: &str,
        options: &QueryOptions,
    ) -> HttpRequest {
        self.get(&playlist_path(user_id, playlist_id), options.to_query())
    }

    pub fn build_get_playlist_tracks(
        &self,
        user_id: &str,
        playlist_id: &str,
        options: &QueryOptions,
    ) -> HttpRequest {
        self.get(
            &format!("{}/tracks", playlist_path(user_id, playlist_id)),
            options.to_query(),
        )
    }

    pub fn build_create_playlist(
        &self,
        user_id: &str,
        playlist: &NewPlaylist,
    ) -> Result<HttpRequest, ApiError> {
        self.post_json(&format!("/users/{}/playlists", segment(user_id)), playlist)
    }

    /// `uris` are Spotify URIs such as `spotify:track:2Oehrcv4Kov0SuIgWyQY9e`;
    /// they are sent as a JSON array body.
    pub fn build_add_tracks_to_playlist(
        &self,
        user_id: &str,
        playlist_id: &str,
        uris: &[&str],
    ) -> Result<HttpRequest, ApiError> {
        self.post_json(
            &format!("{}/tracks", playlist_path(user_id, playlist_id)),
            &uris,
        )
    }

    fn get(&self, path: &str, query: Vec<(String, String)>) -> HttpRequest {
        self.request(HttpMethod::Get, format!("{}{path}", self.base_url), query)
    }

    fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut req = self.request(HttpMethod::Post, format!("{}{path}", self.base_url), Vec::new());
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }

    fn request(&self, method: HttpMethod, url: String, query: Vec<(String, String)>) -> HttpRequest {
        let mut headers = Vec::new();
        if let Some(token) = &self.access_token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            url,
            query,
            headers,
            body: None,
        }
    }
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn playlist_path(user_id: &str, playlist_id: &str) -> String {
    format!(
        "/users/{}/playlists/{}",
        segment(user_id),
        segment(playlist_id)
    )
}

/// `ids` goes first as a single comma-joined value; the comma is encoded
/// along with the rest when the URL is rendered.
fn with_ids(ids: &[&str], options: &QueryOptions) -> Vec<(String, String)> {
    let mut query = vec![("ids".to_string(), ids.join(","))];
    query.extend(options.to_query());
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    #[test]
    fn build_get_track_produces_correct_request() {
        let req = builder().build_get_track("3Qm86XLflmIXVm1wcwkgDK", &QueryOptions::default());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.full_url(),
            "https://api.spotify.com/v1/tracks/3Qm86XLflmIXVm1wcwkgDK"
        );
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn build_get_tracks_joins_ids_into_one_parameter() {
        let req = builder().build_get_tracks(
            &["0eGsygTp906u18L0Oimnem", "1lDWb6b6ieDQ2xT7ewTC3G"],
            &QueryOptions::default(),
        );
        assert_eq!(
            req.full_url(),
            "https://api.spotify.com/v1/tracks/?ids=0eGsygTp906u18L0Oimnem%2C1lDWb6b6ieDQ2xT7ewTC3G"
        );
        assert_eq!(req.query.len(), 1);
    }

    #[test]
    fn build_get_albums_appends_market_after_ids() {
        let req = builder().build_get_albums(&["A", "B"], &QueryOptions::new().market("ES"));
        assert_eq!(
            req.full_url(),
            "https://api.spotify.com/v1/albums/?ids=A%2CB&market=ES"
        );
    }

    #[test]
    fn build_get_artist_top_tracks_requires_country() {
        let req = builder().build_get_artist_top_tracks("5YyScSZOuBHpoFhGvHFedc", "ES");
        assert_eq!(
            req.full_url(),
            "https://api.spotify.com/v1/artists/5YyScSZOuBHpoFhGvHFedc/top-tracks?country=ES"
        );
    }

    #[test]
    fn build_get_artist_albums_omits_absent_paging() {
        let req = builder().build_get_artist_albums("5YyScSZOuBHpoFhGvHFedc", &QueryOptions::default());
        assert_eq!(
            req.full_url(),
            "https://api.spotify.com/v1/artists/5YyScSZOuBHpoFhGvHFedc/albums"
        );

        let req = builder().build_get_artist_albums(
            "5YyScSZOuBHpoFhGvHFedc",
            &QueryOptions::new().album_type("single").limit(5),
        );
        assert_eq!(
            req.full_url(),
            "https://api.spotify.com/v1/artists/5YyScSZOuBHpoFhGvHFedc/albums?album_type=single&limit=5"
        );
    }

    #[test]
    fn build_search_encodes_spaces_and_keeps_dots() {
        let req = builder().build_search("Mr. Brightside", SearchType::Track, &QueryOptions::default());
        assert_eq!(
            req.full_url(),
            "https://api.spotify.com/v1/search/?q=Mr.%20Brightside&type=track"
        );
    }

    #[test]
    fn path_parameters_are_escaped() {
        let req = builder().build_get_user("user name/1");
        assert_eq!(req.full_url(), "https://api.spotify.com/v1/users/user%20name%2F1");
    }

    #[test]
    fn token_adds_bearer_header_and_clearing_removes_it() {
        let mut b = builder();
        b.set_access_token(Some("Some access token".to_string()));
        let req = b.build_get_track("3Qm86XLflmIXVm1wcwkgDK", &QueryOptions::default());
        assert_eq!(req.header("Authorization"), Some("Bearer Some access token"));

        b.set_access_token(None);
        let req = b.build_get_me();
        assert_eq!(req.header("Authorization"), None);
    }

    #[test]
    fn build_create_playlist_produces_json_body() {
        let req = builder()
            .build_create_playlist("jmperezperez", &NewPlaylist::named("A name for the playlist"))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.full_url(),
            "https://api.spotify.com/v1/users/jmperezperez/playlists"
        );
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "name": "A name for the playlist" }));
    }

    #[test]
    fn build_add_tracks_sends_uri_array() {
        let req = builder()
            .build_add_tracks_to_playlist(
                "jmperezperez",
                "7Kud0O2IdWLbEGgvBkW9di",
                &["spotify:track:2Oehrcv4Kov0SuIgWyQY9e"],
            )
            .unwrap();
        assert_eq!(
            req.full_url(),
            "https://api.spotify.com/v1/users/jmperezperez/playlists/7Kud0O2IdWLbEGgvBkW9di/tracks"
        );
        assert_eq!(
            req.body.as_deref(),
            Some(r#"["spotify:track:2Oehrcv4Kov0SuIgWyQY9e"]"#)
        );
    }

    #[test]
    fn build_generic_uses_url_verbatim() {
        let url = "https://api.spotify.com/v1/users/wizzler/playlists?offset=20&limit=20";
        let req = builder().build_generic(HttpMethod::Get, url);
        assert_eq!(req.url, url);
        assert!(req.query.is_empty());
        assert_eq!(req.full_url(), url);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let b = RequestBuilder::new("http://localhost:3000/v1/");
        assert_eq!(b.build_get_me().full_url(), "http://localhost:3000/v1/me");
    }

    #[test]
    fn from_config_carries_token() {
        let config = ClientConfig {
            base_url: "http://localhost:3000/v1".to_string(),
            access_token: Some("tok".to_string()),
        };
        let b = RequestBuilder::from_config(&config);
        assert_eq!(b.access_token(), Some("tok"));
        assert_eq!(b.build_get_me().header("Authorization"), Some("Bearer tok"));
    }
}
