//! Client core for the Spotify Web API.
//!
//! # Overview
//! Builds request descriptors for catalog lookup, search and playlist
//! endpoints, sends them through a pluggable `Transport`, and hands the
//! outcome back either to a callback or through a `Pending` future.
//!
//! # Design
//! - `RequestBuilder` is pure: endpoint + parameters in, `HttpRequest` out.
//!   The bearer token is the only state it reads.
//! - `Dispatcher` owns the transport and the runtime that drives requests,
//!   and delivers each outcome through exactly one channel.
//! - `SpotifyWebApi` pairs the two and exposes one method per operation.
//! - Response payloads stay `serde_json::Value`; only inputs are typed.

pub mod api;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use api::{next_page, previous_page, SpotifyWebApi};
pub use client::RequestBuilder;
pub use config::{ClientConfig, API_BASE_URL};
pub use dispatch::{callback, parse_response, ApiResult, Callback, Dispatcher, Pending};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::Transport;
#[cfg(feature = "reqwest-client")]
pub use transport::ReqwestTransport;
pub use types::{NewPlaylist, QueryOptions, SearchType};
