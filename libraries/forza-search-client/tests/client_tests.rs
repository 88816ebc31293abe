//! Search client tests against a mock search service.

use forza_core::{ArtSearch, PlayerError, PreferenceStore, TrackQuery};
use forza_search_client::{
    SearchClient, SearchClientError, SearchConfig, TOKEN_EXPIRY_KEY, TOKEN_KEY,
};
use forza_storage::MemoryPreferences;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> SearchConfig {
    SearchConfig::with_credentials("id", "secret")
        .with_endpoints(format!("{}/api/token", server.uri()), format!("{}/v1", server.uri()))
}

async fn mount_token(server: &MockServer, token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn track_page() -> serde_json::Value {
    json!({
        "tracks": {
            "items": [
                {
                    "name": "Kerosene",
                    "explicit": false,
                    "popularity": 61,
                    "album": {
                        "name": "Crystal Castles (II)",
                        "album_type": "album",
                        "images": [
                            {"url": "https://img.example/640.jpg", "width": 640},
                            {"url": "https://img.example/300.jpg", "width": 300}
                        ]
                    }
                }
            ]
        }
    })
}

// =============================================================================
// Client Creation Tests
// =============================================================================

mod client_creation {
    use super::*;

    #[test]
    fn test_default_endpoints_accepted() {
        let client = SearchClient::new(SearchConfig::with_credentials("id", "secret")).unwrap();
        assert!(client.has_credentials());
    }

    #[test]
    fn test_relative_endpoint_rejected() {
        let config = SearchConfig::default().with_endpoints("/token", "https://api.example");
        match SearchClient::new(config) {
            Err(SearchClientError::InvalidUrl(msg)) => assert!(msg.contains("/token")),
            other => panic!("Expected InvalidUrl, got {:?}", other.err()),
        }
    }
}

// =============================================================================
// Token Tests
// =============================================================================

mod token {
    use super::*;

    #[tokio::test]
    async fn test_token_reused_across_searches() {
        let server = MockServer::start().await;
        mount_token(&server, "tok-1", 1).await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(track_page()))
            .expect(2)
            .mount(&server)
            .await;

        let client = SearchClient::new(config_for(&server)).unwrap();
        let query = TrackQuery::Title("Kerosene".into());
        client.search_tracks(&query).await.unwrap();
        client.search_tracks(&query).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_credentials_never_calls_network() {
        let server = MockServer::start().await;
        mount_token(&server, "unused", 0).await;

        let config = SearchConfig::default()
            .with_endpoints(format!("{}/api/token", server.uri()), format!("{}/v1", server.uri()));
        let client = SearchClient::new(config).unwrap();

        let err = client
            .search_tracks(&TrackQuery::Title("Kerosene".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, PlayerError::AuthFailure(_)));
    }

    #[tokio::test]
    async fn test_rejected_exchange_is_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_client"
            })))
            .mount(&server)
            .await;

        let client = SearchClient::new(config_for(&server)).unwrap();
        let err = client.find_artists("Crystal Castles").await.unwrap_err();
        assert!(err.is_auth());
        assert!(PlayerError::from(err).is_auth());
    }

    #[tokio::test]
    async fn test_token_persisted_and_reused() {
        let server = MockServer::start().await;
        mount_token(&server, "tok-persist", 1).await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(track_page()))
            .mount(&server)
            .await;

        let prefs = Arc::new(MemoryPreferences::new());
        let first = SearchClient::with_preferences(config_for(&server), prefs.clone()).unwrap();
        first.find_tracks(&TrackQuery::Title("a".into())).await.unwrap();

        assert_eq!(prefs.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-persist"));
        let expiry: i64 = prefs.get(TOKEN_EXPIRY_KEY).unwrap().unwrap().parse().unwrap();
        assert!(expiry > chrono::Utc::now().timestamp_millis());

        // A fresh client (new session) picks up the stored token
        let second = SearchClient::with_preferences(config_for(&server), prefs.clone()).unwrap();
        second.find_tracks(&TrackQuery::Title("b".into())).await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_persisted_token_is_replaced() {
        let server = MockServer::start().await;
        mount_token(&server, "tok-new", 1).await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(header("authorization", "Bearer tok-new"))
            .respond_with(ResponseTemplate::new(200).set_body_json(track_page()))
            .expect(1)
            .mount(&server)
            .await;

        let prefs = Arc::new(MemoryPreferences::new());
        prefs.set(TOKEN_KEY, "tok-old").unwrap();
        prefs.set(TOKEN_EXPIRY_KEY, "1000").unwrap();

        let client = SearchClient::with_preferences(config_for(&server), prefs.clone()).unwrap();
        client.find_tracks(&TrackQuery::Title("a".into())).await.unwrap();
        assert_eq!(prefs.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-new"));
    }

    #[tokio::test]
    async fn test_revoked_token_cleared() {
        let server = MockServer::start().await;
        mount_token(&server, "tok-revoked", 1).await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let prefs = Arc::new(MemoryPreferences::new());
        let client = SearchClient::with_preferences(config_for(&server), prefs.clone()).unwrap();
        let err = client.find_tracks(&TrackQuery::Title("a".into())).await.unwrap_err();

        assert!(matches!(err, SearchClientError::AuthFailed(_)));
        assert_eq!(prefs.get(TOKEN_KEY).unwrap(), None);
    }
}

// =============================================================================
// Search Tests
// =============================================================================

mod search {
    use super::*;

    #[tokio::test]
    async fn test_track_and_artist_query() {
        let server = MockServer::start().await;
        mount_token(&server, "tok", 1).await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("q", "track:Kerosene artist:Crystal Castles"))
            .and(query_param("type", "track"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(track_page()))
            .expect(1)
            .mount(&server)
            .await;

        let client = SearchClient::new(config_for(&server)).unwrap();
        let candidates = client
            .search_tracks(&TrackQuery::TrackAndArtist {
                title: "Kerosene".into(),
                artist: "Crystal Castles".into(),
            })
            .await
            .unwrap();

        assert_eq!(candidates.len(), 1);
        let top = &candidates[0];
        assert_eq!(top.name, "Kerosene");
        assert_eq!(top.album_name, "Crystal Castles (II)");
        assert_eq!(top.album_type.as_deref(), Some("album"));
        assert_eq!(top.popularity, 61);
        assert_eq!(top.best_image(), Some("https://img.example/640.jpg"));
    }

    #[tokio::test]
    async fn test_artist_query() {
        let server = MockServer::start().await;
        mount_token(&server, "tok", 1).await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("q", "artist:Grimes"))
            .and(query_param("type", "artist"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "artists": {"items": [
                    {"name": "Grimes", "popularity": 70, "images": [{"url": "https://img.example/g.jpg"}]}
                ]}
            })))
            .mount(&server)
            .await;

        let client = SearchClient::new(config_for(&server)).unwrap();
        let artists = client.search_artists("Grimes").await.unwrap();
        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0].best_image(), Some("https://img.example/g.jpg"));
    }

    #[tokio::test]
    async fn test_missing_section_is_empty() {
        let server = MockServer::start().await;
        mount_token(&server, "tok", 1).await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = SearchClient::new(config_for(&server)).unwrap();
        assert!(client.find_tracks(&TrackQuery::Title("x".into())).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_art_failure() {
        let server = MockServer::start().await;
        mount_token(&server, "tok", 1).await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .mount(&server)
            .await;

        let client = SearchClient::new(config_for(&server)).unwrap();
        let err = client.find_tracks(&TrackQuery::Title("x".into())).await.unwrap_err();
        assert!(matches!(err, SearchClientError::RateLimited { retry_after_secs: 7 }));
        assert!(matches!(
            PlayerError::from(err),
            PlayerError::ArtResolutionFailure(_)
        ));
    }

    #[tokio::test]
    async fn test_server_error_reported() {
        let server = MockServer::start().await;
        mount_token(&server, "tok", 1).await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let client = SearchClient::new(config_for(&server)).unwrap();
        match client.find_artists("x").await {
            Err(SearchClientError::ServerError { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "unavailable");
            }
            other => panic!("Expected ServerError, got {:?}", other),
        }
    }
}
