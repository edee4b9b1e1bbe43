//! Verify request building and response parsing against the JSON test
//! vectors in `test-vectors/`.
//!
//! Request bodies are compared as parsed JSON, not raw strings, so field order
//! in the serializer cannot cause false failures.

use serde_json::Value;
use spotify_core::{
    parse_response, HttpMethod, HttpRequest, HttpResponse, NewPlaylist, QueryOptions,
    RequestBuilder, SearchType,
};

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn str_arg<'a>(args: &'a Value, key: &str) -> &'a str {
    args[key]
        .as_str()
        .unwrap_or_else(|| panic!("missing string argument {key}"))
}

fn list_arg<'a>(args: &'a Value, key: &str) -> Vec<&'a str> {
    args[key]
        .as_array()
        .unwrap_or_else(|| panic!("missing list argument {key}"))
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect()
}

fn options_arg(args: &Value) -> QueryOptions {
    match args.get("options") {
        Some(options) => serde_json::from_value(options.clone()).unwrap(),
        None => QueryOptions::default(),
    }
}

fn search_type(s: &str) -> SearchType {
    serde_json::from_value(Value::String(s.to_string())).unwrap()
}

/// Run the builder method a vector names.
fn build(builder: &RequestBuilder, operation: &str, args: &Value) -> HttpRequest {
    match operation {
        "get_track" => builder.build_get_track(str_arg(args, "id"), &options_arg(args)),
        "get_tracks" => builder.build_get_tracks(&list_arg(args, "ids"), &options_arg(args)),
        "get_album" => builder.build_get_album(str_arg(args, "id"), &options_arg(args)),
        "get_albums" => builder.build_get_albums(&list_arg(args, "ids"), &options_arg(args)),
        "get_album_tracks" => builder.build_get_album_tracks(str_arg(args, "id"), &options_arg(args)),
        "get_artist" => builder.build_get_artist(str_arg(args, "id"), &options_arg(args)),
        "get_artists" => builder.build_get_artists(&list_arg(args, "ids"), &options_arg(args)),
        "get_artist_albums" => builder.build_get_artist_albums(str_arg(args, "id"), &options_arg(args)),
        "get_artist_top_tracks" => {
            builder.build_get_artist_top_tracks(str_arg(args, "id"), str_arg(args, "country"))
        }
        "get_artist_related_artists" => builder.build_get_artist_related_artists(str_arg(args, "id")),
        "search" => builder.build_search(
            str_arg(args, "q"),
            search_type(str_arg(args, "type")),
            &options_arg(args),
        ),
        "get_user" => builder.build_get_user(str_arg(args, "user_id")),
        "get_me" => builder.build_get_me(),
        "get_user_playlists" => {
            builder.build_get_user_playlists(str_arg(args, "user_id"), &options_arg(args))
        }
        "get_playlist" => builder.build_get_playlist(
            str_arg(args, "user_id"),
            str_arg(args, "playlist_id"),
            &options_arg(args),
        ),
        "get_playlist_tracks" => builder.build_get_playlist_tracks(
            str_arg(args, "user_id"),
            str_arg(args, "playlist_id"),
            &options_arg(args),
        ),
        "create_playlist" => {
            let playlist: NewPlaylist = serde_json::from_value(args["playlist"].clone()).unwrap();
            builder
                .build_create_playlist(str_arg(args, "user_id"), &playlist)
                .unwrap()
        }
        "add_tracks_to_playlist" => builder
            .build_add_tracks_to_playlist(
                str_arg(args, "user_id"),
                str_arg(args, "playlist_id"),
                &list_arg(args, "uris"),
            )
            .unwrap(),
        other => panic!("unknown operation: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let base_url = vectors["base_url"].as_str().unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let mut builder = RequestBuilder::new(base_url);
        builder.set_access_token(case.get("token").and_then(Value::as_str).map(str::to_string));

        let req = build(&builder, case["operation"].as_str().unwrap(), &case["args"]);
        let expected = &case["expected_request"];

        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(
            req.full_url(),
            format!("{base_url}{}", expected["url"].as_str().unwrap()),
            "{name}: url"
        );

        let expected_headers: Vec<(String, String)> = expected["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        match expected.get("body") {
            Some(expected_body) => {
                let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(&body, expected_body, "{name}: body");
            }
            None => assert!(req.body.is_none(), "{name}: body should be None"),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        };
        let result = parse_response(response);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(
                err.status().map(u64::from),
                expected_error["status"].as_u64(),
                "{name}: status"
            );
            assert_eq!(
                err.api_message().as_deref(),
                expected_error["message"].as_str(),
                "{name}: message"
            );
        } else {
            assert_eq!(result.unwrap(), case["expected_result"], "{name}: parsed result");
        }
    }
}
