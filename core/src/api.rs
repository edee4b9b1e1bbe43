//! The public client: one method per Web API operation.
//!
//! Every operation takes an optional [`Callback`]. Pass one to receive the
//! result through it (the method then returns `None`); pass `None` to get a
//! [`Pending`] future instead.
//!
//! ```ignore
//! let api = SpotifyWebApi::new();
//! let track = api.get_track("3Qm86XLflmIXVm1wcwkgDK", None).unwrap().await?;
//!
//! api.get_album("0sNOF9WDwhWunNAHPD3Baj", callback(|result| match result {
//!     Ok(album) => println!("{}", album["name"]),
//!     Err(err) => eprintln!("lookup failed: {err}"),
//! }));
//! ```

use serde_json::Value;
use tokio::runtime::Handle;

use crate::client::RequestBuilder;
use crate::config::ClientConfig;
use crate::dispatch::{Callback, Dispatcher, Pending};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::transport::Transport;
use crate::types::{NewPlaylist, QueryOptions, SearchType};

#[cfg(feature = "reqwest-client")]
use crate::transport::ReqwestTransport;

pub struct SpotifyWebApi<T: Transport> {
    builder: RequestBuilder,
    dispatcher: Dispatcher<T>,
}

#[cfg(feature = "reqwest-client")]
impl SpotifyWebApi<ReqwestTransport> {
    /// Anonymous client for the public API over `reqwest`.
    pub fn new() -> Self {
        Self::with_transport(&ClientConfig::default(), ReqwestTransport::new())
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }
}

#[cfg(feature = "reqwest-client")]
impl Default for SpotifyWebApi<ReqwestTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> SpotifyWebApi<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Self {
        Self {
            builder: RequestBuilder::from_config(config),
            dispatcher: Dispatcher::new(transport),
        }
    }

    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    pub fn transport(&self) -> &T {
        self.dispatcher.transport()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.builder.access_token()
    }

    /// Set or clear the bearer token. Requests built afterwards carry
    /// `Authorization: Bearer <token>` only while a token is set.
    pub fn set_access_token(&mut self, token: Option<String>) {
        self.builder.set_access_token(token);
    }

    /// Use `runtime` to drive requests and settle returned futures.
    pub fn set_promise_implementation(&mut self, runtime: Handle) {
        self.dispatcher.set_promise_implementation(runtime);
    }

    /// Pin the current tokio runtime; fails outside one.
    pub fn use_current_runtime(&mut self) -> Result<(), ApiError> {
        self.dispatcher.use_current_runtime()
    }

    /// Send an already-built request.
    pub fn dispatch(&self, request: HttpRequest, callback: Option<Callback>) -> Option<Pending> {
        self.dispatcher.dispatch(request, callback)
    }

    fn dispatch_built(
        &self,
        request: Result<HttpRequest, ApiError>,
        callback: Option<Callback>,
    ) -> Option<Pending> {
        match request {
            Ok(request) => self.dispatcher.dispatch(request, callback),
            Err(err) => self.dispatcher.deliver(Err(err), callback),
        }
    }

    /// Request an absolute URL, typically a paging object's `next` link.
    pub fn get_generic(
        &self,
        method: HttpMethod,
        url: &str,
        callback: Option<Callback>,
    ) -> Option<Pending> {
        self.dispatch(self.builder.build_generic(method, url), callback)
    }

    /// Fetch the page after `page`.
    ///
    /// On the last page nothing is sent, the callback is not invoked and
    /// `None` is returned.
    pub fn get_next_page(&self, page: &Value, callback: Option<Callback>) -> Option<Pending> {
        let url = next_page(page)?;
        self.get_generic(HttpMethod::Get, url, callback)
    }

    /// Fetch the page before `page`; `None` on the first page.
    pub fn get_previous_page(&self, page: &Value, callback: Option<Callback>) -> Option<Pending> {
        let url = previous_page(page)?;
        self.get_generic(HttpMethod::Get, url, callback)
    }

    pub fn get_track(&self, track_id: &str, callback: Option<Callback>) -> Option<Pending> {
        self.get_track_with(track_id, &QueryOptions::default(), callback)
    }

    pub fn get_track_with(
        &self,
        track_id: &str,
        options: &QueryOptions,
        callback: Option<Callback>,
    ) -> Option<Pending> {
        self.dispatch(self.builder.build_get_track(track_id, options), callback)
    }

    pub fn get_tracks(&self, track_ids: &[&str], callback: Option<Callback>) -> Option<Pending> {
        self.get_tracks_with(track_ids, &QueryOptions::default(), callback)
    }

    pub fn get_tracks_with(
        &self,
        track_ids: &[&str],
        options: &QueryOptions,
        callback: Option<Callback>,
    ) -> Option<Pending> {
        self.dispatch(self.builder.build_get_tracks(track_ids, options), callback)
    }

    pub fn get_album(&self, album_id: &str, callback: Option<Callback>) -> Option<Pending> {
        self.get_album_with(album_id, &QueryOptions::default(), callback)
    }

    pub fn get_album_with(
        &self,
        album_id: &str,
        options: &QueryOptions,
        callback: Option<Callback>,
    ) -> Option<Pending> {
        self.dispatch(self.builder.build_get_album(album_id, options), callback)
    }

    pub fn get_albums(&self, album_ids: &[&str], callback: Option<Callback>) -> Option<Pending> {
        self.get_albums_with(album_ids, &QueryOptions::default(), callback)
    }

    pub fn get_albums_with(
        &self,
        album_ids: &[&str],
        options: &QueryOptions,
        callback: Option<Callback>,
    ) -> Option<Pending> {
        self.dispatch(self.builder.build_get_albums(album_ids, options), callback)
    }

    pub fn get_album_tracks(
        &self,
        album_id: &str,
        options: &QueryOptions,
        callback: Option<Callback>,
    ) -> Option<Pending> {
        self.dispatch(self.builder.build_get_album_tracks(album_id, options), callback)
    }

    pub fn get_artist(&self, artist_id: &str, callback: Option<Callback>) -> Option<Pending> {
        self.get_artist_with(artist_id, &QueryOptions::default(), callback)
    }

    pub fn get_artist_with(
        &self,
        artist_id: &str,
        options: &QueryOptions,
        callback: Option<Callback>,
    ) -> Option<Pending> {
        self.dispatch(self.builder.build_get_artist(artist_id, options), callback)
    }

    pub fn get_artists(&self, artist_ids: &[&str], callback: Option<Callback>) -> Option<Pending> {
        self.get_artists_with(artist_ids, &QueryOptions::default(), callback)
    }

    pub fn get_artists_with(
        &self,
        artist_ids: &[&str],
        options: &QueryOptions,
        callback: Option<Callback>,
    ) -> Option<Pending> {
        self.dispatch(self.builder.build_get_artists(artist_ids, options), callback)
    }

    pub fn get_artist_albums(
        &self,
        artist_id: &str,
        options: &QueryOptions,
        callback: Option<Callback>,
    ) -> Option<Pending> {
        self.dispatch(self.builder.build_get_artist_albums(artist_id, options), callback)
    }

    pub fn get_artist_top_tracks(
        &self,
        artist_id: &str,
        country: &str,
        callback: Option<Callback>,
    ) -> Option<Pending> {
        self.dispatch(
            self.builder.build_get_artist_top_tracks(artist_id, country),
            callback,
        )
    }

    pub fn get_artist_related_artists(
        &self,
        artist_id: &str,
        callback: Option<Callback>,
    ) -> Option<Pending> {
        self.dispatch(self.builder.build_get_artist_related_artists(artist_id), callback)
    }

    pub fn search(
        &self,
        query: &str,
        kind: SearchType,
        options: &QueryOptions,
        callback: Option<Callback>,
    ) -> Option<Pending> {
        self.dispatch(self.builder.build_search(query, kind, options), callback)
    }

    pub fn search_albums(&self, query: &str, callback: Option<Callback>) -> Option<Pending> {
        self.search(query, SearchType::Album, &QueryOptions::default(), callback)
    }

    pub fn search_artists(&self, query: &str, callback: Option<Callback>) -> Option<Pending> {
        self.search(query, SearchType::Artist, &QueryOptions::default(), callback)
    }

    pub fn search_tracks(&self, query: &str, callback: Option<Callback>) -> Option<Pending> {
        self.search(query, SearchType::Track, &QueryOptions::default(), callback)
    }

    pub fn get_user(&self, user_id: &str, callback: Option<Callback>) -> Option<Pending> {
        self.dispatch(self.builder.build_get_user(user_id), callback)
    }

    pub fn get_me(&self, callback: Option<Callback>) -> Option<Pending> {
        self.dispatch(self.builder.build_get_me(), callback)
    }

    pub fn get_user_playlists(
        &self,
        user_id: &str,
        options: &QueryOptions,
        callback: Option<Callback>,
    ) -> Option<Pending> {
        self.dispatch(self.builder.build_get_user_playlists(user_id, options), callback)
    }

    pub fn get_playlist(
        &self,
        user_id: &str,
        playlist_id: &str,
        callback: Option<Callback>,
    ) -> Option<Pending> {
        self.get_playlist_with(user_id, playlist_id, &QueryOptions::default(), callback)
    }

    pub fn get_playlist_with(
        &self,
        user_id: &str,
        playlist_id: &str,
        options: &QueryOptions,
        callback: Option<Callback>,
    ) -> Option<Pending> {
        self.dispatch(
            self.builder.build_get_playlist(user_id, playlist_id, options),
            callback,
        )
    }

    pub fn get_playlist_tracks(
        &self,
        user_id: &str,
        playlist_id: &str,
        options: &QueryOptions,
        callback: Option<Callback>,
    ) -> Option<Pending> {
        self.dispatch(
            self.builder
                .build_get_playlist_tracks(user_id, playlist_id, options),
            callback,
        )
    }

    pub fn create_playlist(
        &self,
        user_id: &str,
        playlist: &NewPlaylist,
        callback: Option<Callback>,
    ) -> Option<Pending> {
        self.dispatch_built(self.builder.build_create_playlist(user_id, playlist), callback)
    }

    pub fn add_tracks_to_playlist(
        &self,
        user_id: &str,
        playlist_id: &str,
        uris: &[&str],
        callback: Option<Callback>,
    ) -> Option<Pending> {
        self.dispatch_built(
            self.builder
                .build_add_tracks_to_playlist(user_id, playlist_id, uris),
            callback,
        )
    }
}

/// The `next` link of a paging object, if there is another page.
pub fn next_page(page: &Value) -> Option<&str> {
    page.get("next").and_then(Value::as_str)
}

/// The `previous` link of a paging object, if there is an earlier page.
pub fn previous_page(page: &Value) -> Option<&str> {
    page.get("previous").and_then(Value::as_str)
}
