use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{
        header::{AUTHORIZATION, HOST},
        HeaderMap, StatusCode, Uri,
    },
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

/// User returned by `/me` for any bearer token.
pub const CURRENT_USER: &str = "jmperezperez";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub public: bool,
    pub owner: String,
    pub tracks: Vec<String>,
}

#[derive(Deserialize)]
pub struct NewPlaylist {
    pub name: String,
    #[serde(default = "default_public")]
    pub public: bool,
}

fn default_public() -> bool {
    true
}

#[derive(Deserialize, Default)]
pub struct CatalogQuery {
    pub ids: Option<String>,
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub country: Option<String>,
    pub market: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// In-memory catalog. Tracks, albums, artists and users are fixed fixtures;
/// playlists can be created and extended.
#[derive(Debug, Default)]
pub struct Catalog {
    pub tracks: HashMap<String, Value>,
    pub albums: HashMap<String, Value>,
    pub artists: HashMap<String, Value>,
    pub users: HashMap<String, Value>,
    pub playlists: HashMap<String, Playlist>,
}

impl Catalog {
    pub fn seeded() -> Self {
        let mut catalog = Catalog::default();

        for (id, name) in [
            ("0LcJLqbBmaGUft1e9Mm8HV", "ABBA"),
            ("5YyScSZOuBHpoFhGvHFedc", "Keane"),
            ("6J6yx1t3nwIDyPXk5xa7O8", "Vetusta Morla"),
            ("0C0XlULifJtAgn6ZNCW2eu", "The Killers"),
        ] {
            catalog.artists.insert(
                id.to_string(),
                json!({ "id": id, "name": name, "type": "artist", "uri": format!("spotify:artist:{id}") }),
            );
        }

        for (id, name, artist) in [
            ("0sNOF9WDwhWunNAHPD3Baj", "She's So Unusual", "0LcJLqbBmaGUft1e9Mm8HV"),
            ("41MnTivkwTO3UUJ8DrqEJJ", "The Best Of Keane", "5YyScSZOuBHpoFhGvHFedc"),
            ("6JWc4iAiJ9FjyK0B59ABb4", "Hot Fuss", "0C0XlULifJtAgn6ZNCW2eu"),
        ] {
            catalog.albums.insert(
                id.to_string(),
                json!({ "id": id, "name": name, "type": "album", "artist_id": artist }),
            );
        }

        for (id, name, album, popularity) in [
            ("3Qm86XLflmIXVm1wcwkgDK", "Time After Time", "0sNOF9WDwhWunNAHPD3Baj", 71),
            ("0eGsygTp906u18L0Oimnem", "Mr. Brightside", "6JWc4iAiJ9FjyK0B59ABb4", 87),
            ("1lDWb6b6ieDQ2xT7ewTC3G", "Somebody Told Me", "6JWc4iAiJ9FjyK0B59ABb4", 76),
            ("2Oehrcv4Kov0SuIgWyQY9e", "Somewhere Only We Know", "41MnTivkwTO3UUJ8DrqEJJ", 80),
        ] {
            catalog.tracks.insert(
                id.to_string(),
                json!({
                    "id": id,
                    "name": name,
                    "type": "track",
                    "album_id": album,
                    "popularity": popularity,
                    "uri": format!("spotify:track:{id}"),
                }),
            );
        }

        for (id, name) in [(CURRENT_USER, "JM Pérez"), ("wizzler", "Wizzler")] {
            catalog.users.insert(
                id.to_string(),
                json!({ "id": id, "display_name": name, "type": "user", "uri": format!("spotify:user:{id}") }),
            );
        }

        catalog.playlists.insert(
            "7Kud0O2IdWLbEGgvBkW9di".to_string(),
            Playlist {
                id: "7Kud0O2IdWLbEGgvBkW9di".to_string(),
                name: "Road trip".to_string(),
                public: true,
                owner: CURRENT_USER.to_string(),
                tracks: vec!["spotify:track:0eGsygTp906u18L0Oimnem".to_string()],
            },
        );
        catalog.playlists.insert(
            "0EIVqzEcrY2a8vO0AUJar2".to_string(),
            Playlist {
                id: "0EIVqzEcrY2a8vO0AUJar2".to_string(),
                name: "Indie".to_string(),
                public: true,
                owner: "wizzler".to_string(),
                tracks: vec![
                    "spotify:track:3Qm86XLflmIXVm1wcwkgDK".to_string(),
                    "spotify:track:2Oehrcv4Kov0SuIgWyQY9e".to_string(),
                ],
            },
        );

        catalog
    }

    fn by_ids(items: &HashMap<String, Value>, ids: &str) -> Vec<Value> {
        ids.split(',')
            .map(|id| items.get(id).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

pub type Db = Arc<RwLock<Catalog>>;

type ApiResponse = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({ "error": { "status": status.as_u16(), "message": message } })),
    )
}

fn not_found() -> (StatusCode, Json<Value>) {
    error(StatusCode::NOT_FOUND, "non existing id")
}

fn require_token(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| !token.is_empty());
    if authorized {
        Ok(())
    } else {
        Err(error(StatusCode::UNAUTHORIZED, "No token provided"))
    }
}

/// Absolute URL of the current request without its paging parameters.
///
/// The scheme is always `http`; the mock server does not terminate TLS.
fn page_base(headers: &HeaderMap, uri: &Uri) -> String {
    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    let kept: Vec<&str> = uri
        .query()
        .unwrap_or("")
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or("");
            key != "offset" && key != "limit"
        })
        .collect();
    if kept.is_empty() {
        format!("http://{host}{}?", uri.path())
    } else {
        format!("http://{host}{}?{}&", uri.path(), kept.join("&"))
    }
}

/// Wrap `items` in a paging object honouring `limit` and `offset`.
///
/// `base` comes from [`page_base`]; the `next` and `previous` links append
/// the offset and limit of the neighbouring pages to it.
fn paging(items: Vec<Value>, query: &CatalogQuery, base: &str) -> Value {
    let total = items.len();
    let offset = query.offset.unwrap_or(0).min(total);
    let limit = query.limit.unwrap_or(20);
    let page: Vec<Value> = items.into_iter().skip(offset).take(limit).collect();
    let next = if offset + page.len() < total {
        Value::String(format!("{base}offset={}&limit={limit}", offset + page.len()))
    } else {
        Value::Null
    };
    let previous = if offset > 0 {
        Value::String(format!("{base}offset={}&limit={limit}", offset.saturating_sub(limit)))
    } else {
        Value::Null
    };
    json!({
        "items": page,
        "limit": limit,
        "offset": offset,
        "total": total,
        "next": next,
        "previous": previous,
    })
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Catalog::seeded()));
    Router::new()
        .route("/v1/tracks/", get(get_tracks))
        .route("/v1/tracks/{id}", get(get_track))
        .route("/v1/albums/", get(get_albums))
        .route("/v1/albums/{id}", get(get_album))
        .route("/v1/albums/{id}/tracks", get(get_album_tracks))
        .route("/v1/artists/", get(get_artists))
        .route("/v1/artists/{id}", get(get_artist))
        .route("/v1/artists/{id}/albums", get(get_artist_albums))
        .route("/v1/artists/{id}/top-tracks", get(get_artist_top_tracks))
        .route("/v1/artists/{id}/related-artists", get(get_related_artists))
        .route("/v1/search/", get(search))
        .route("/v1/me", get(get_me))
        .route("/v1/users/{user_id}", get(get_user))
        .route(
            "/v1/users/{user_id}/playlists",
            get(list_playlists).post(create_playlist),
        )
        .route("/v1/users/{user_id}/playlists/{playlist_id}", get(get_playlist))
        .route(
            "/v1/users/{user_id}/playlists/{playlist_id}/tracks",
            get(get_playlist_tracks).post(add_tracks),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn get_track(State(db): State<Db>, Path(id): Path<String>) -> ApiResponse {
    let catalog = db.read().await;
    catalog.tracks.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn get_tracks(State(db): State<Db>, Query(query): Query<CatalogQuery>) -> ApiResponse {
    let ids = query
        .ids
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "missing ids"))?;
    let catalog = db.read().await;
    Ok(Json(json!({ "tracks": Catalog::by_ids(&catalog.tracks, &ids) })))
}

async fn get_album(State(db): State<Db>, Path(id): Path<String>) -> ApiResponse {
    let catalog = db.read().await;
    catalog.albums.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn get_albums(State(db): State<Db>, Query(query): Query<CatalogQuery>) -> ApiResponse {
    let ids = query
        .ids
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "missing ids"))?;
    let catalog = db.read().await;
    Ok(Json(json!({ "albums": Catalog::by_ids(&catalog.albums, &ids) })))
}

async fn get_album_tracks(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(query): Query<CatalogQuery>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> ApiResponse {
    let catalog = db.read().await;
    if !catalog.albums.contains_key(&id) {
        return Err(not_found());
    }
    let mut tracks: Vec<Value> = catalog
        .tracks
        .values()
        .filter(|track| track["album_id"] == id.as_str())
        .cloned()
        .collect();
    tracks.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));
    Ok(Json(paging(tracks, &query, &page_base(&headers, &uri))))
}

async fn get_artist(State(db): State<Db>, Path(id): Path<String>) -> ApiResponse {
    let catalog = db.read().await;
    catalog.artists.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn get_artists(State(db): State<Db>, Query(query): Query<CatalogQuery>) -> ApiResponse {
    let ids = query
        .ids
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "missing ids"))?;
    let catalog = db.read().await;
    Ok(Json(json!({ "artists": Catalog::by_ids(&catalog.artists, &ids) })))
}

async fn get_artist_albums(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(query): Query<CatalogQuery>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> ApiResponse {
    let catalog = db.read().await;
    if !catalog.artists.contains_key(&id) {
        return Err(not_found());
    }
    let albums: Vec<Value> = catalog
        .albums
        .values()
        .filter(|album| album["artist_id"] == id.as_str())
        .cloned()
        .collect();
    Ok(Json(paging(albums, &query, &page_base(&headers, &uri))))
}

async fn get_artist_top_tracks(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(query): Query<CatalogQuery>,
) -> ApiResponse {
    if query.country.is_none() {
        return Err(error(StatusCode::BAD_REQUEST, "missing country"));
    }
    let catalog = db.read().await;
    if !catalog.artists.contains_key(&id) {
        return Err(not_found());
    }
    let mut tracks: Vec<Value> = catalog
        .tracks
        .values()
        .filter(|track| {
            track["album_id"]
                .as_str()
                .and_then(|album| catalog.albums.get(album))
                .is_some_and(|album| album["artist_id"] == id.as_str())
        })
        .cloned()
        .collect();
    tracks.sort_by_key(|track| std::cmp::Reverse(track["popularity"].as_u64()));
    Ok(Json(json!({ "tracks": tracks })))
}

async fn get_related_artists(State(db): State<Db>, Path(id): Path<String>) -> ApiResponse {
    let catalog = db.read().await;
    if !catalog.artists.contains_key(&id) {
        return Err(not_found());
    }
    let artists: Vec<Value> = catalog
        .artists
        .iter()
        .filter(|(artist_id, _)| **artist_id != id)
        .map(|(_, artist)| artist.clone())
        .collect();
    Ok(Json(json!({ "artists": artists })))
}

async fn search(
    State(db): State<Db>,
    Query(query): Query<CatalogQuery>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> ApiResponse {
    let (Some(q), Some(kind)) = (query.q.as_deref(), query.kind.as_deref()) else {
        return Err(error(StatusCode::BAD_REQUEST, "missing q or type"));
    };
    debug!(q, kind, "search");
    let needle = q.to_lowercase();
    let catalog = db.read().await;
    let (key, items) = match kind {
        "album" => ("albums", &catalog.albums),
        "artist" => ("artists", &catalog.artists),
        "track" => ("tracks", &catalog.tracks),
        _ => return Err(error(StatusCode::BAD_REQUEST, "unsupported type")),
    };
    let mut matches: Vec<Value> = items
        .values()
        .filter(|item| {
            item["name"]
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect();
    matches.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));
    let mut body = serde_json::Map::new();
    body.insert(key.to_string(), paging(matches, &query, &page_base(&headers, &uri)));
    Ok(Json(Value::Object(body)))
}

async fn get_me(State(db): State<Db>, headers: HeaderMap) -> ApiResponse {
    require_token(&headers)?;
    let catalog = db.read().await;
    catalog
        .users
        .get(CURRENT_USER)
        .cloned()
        .map(Json)
        .ok_or_else(not_found)
}

async fn get_user(State(db): State<Db>, Path(user_id): Path<String>) -> ApiResponse {
    let catalog = db.read().await;
    catalog.users.get(&user_id).cloned().map(Json).ok_or_else(not_found)
}

async fn list_playlists(
    State(db): State<Db>,
    Path(user_id): Path<String>,
    Query(query): Query<CatalogQuery>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> ApiResponse {
    require_token(&headers)?;
    let catalog = db.read().await;
    if !catalog.users.contains_key(&user_id) {
        return Err(not_found());
    }
    let mut playlists: Vec<&Playlist> = catalog
        .playlists
        .values()
        .filter(|playlist| playlist.owner == user_id)
        .collect();
    playlists.sort_by(|a, b| a.name.cmp(&b.name));
    let items = playlists
        .into_iter()
        .map(|playlist| json!(playlist))
        .collect();
    Ok(Json(paging(items, &query, &page_base(&headers, &uri))))
}

async fn create_playlist(
    State(db): State<Db>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<NewPlaylist>,
) -> Result<(StatusCode, Json<Playlist>), (StatusCode, Json<Value>)> {
    require_token(&headers)?;
    let mut catalog = db.write().await;
    if !catalog.users.contains_key(&user_id) {
        return Err(not_found());
    }
    let playlist = Playlist {
        id: Uuid::new_v4().simple().to_string(),
        name: input.name,
        public: input.public,
        owner: user_id,
        tracks: Vec::new(),
    };
    catalog.playlists.insert(playlist.id.clone(), playlist.clone());
    Ok((StatusCode::CREATED, Json(playlist)))
}

async fn get_playlist(
    State(db): State<Db>,
    Path((user_id, playlist_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResponse {
    require_token(&headers)?;
    let catalog = db.read().await;
    catalog
        .playlists
        .get(&playlist_id)
        .filter(|playlist| playlist.owner == user_id)
        .map(|playlist| Json(json!(playlist)))
        .ok_or_else(not_found)
}

async fn get_playlist_tracks(
    State(db): State<Db>,
    Path((user_id, playlist_id)): Path<(String, String)>,
    Query(query): Query<CatalogQuery>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> ApiResponse {
    require_token(&headers)?;
    let catalog = db.read().await;
    let playlist = catalog
        .playlists
        .get(&playlist_id)
        .filter(|playlist| playlist.owner == user_id)
        .ok_or_else(not_found)?;
    let items = playlist
        .tracks
        .iter()
        .map(|uri| {
            let track = uri
                .strip_prefix("spotify:track:")
                .and_then(|id| catalog.tracks.get(id))
                .cloned()
                .unwrap_or(Value::Null);
            json!({ "track": track })
        })
        .collect();
    Ok(Json(paging(items, &query, &page_base(&headers, &uri))))
}

async fn add_tracks(
    State(db): State<Db>,
    Path((user_id, playlist_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(uris): Json<Vec<String>>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    require_token(&headers)?;
    let mut catalog = db.write().await;
    let playlist = catalog
        .playlists
        .get_mut(&playlist_id)
        .filter(|playlist| playlist.owner == user_id)
        .ok_or_else(not_found)?;
    playlist.tracks.extend(uris);
    Ok(StatusCode::CREATED)
}
