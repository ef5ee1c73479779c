mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

use highlight_reel::error::ProviderError;
use highlight_reel::modules::api::models::Category;
use highlight_reel::modules::api::stats_client_fl::{StatsClient, StatsProvider};

use common::game;

type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// Answers `videodetailsasset` by context measure: BLK gets an HTML error page,
/// STL a non-JSON body, anything else a two-clip payload.
async fn video_details(
    State(seen): State<Seen>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let measure = params.get("ContextMeasure").cloned().unwrap_or_default();
    seen.lock().unwrap().push(params);

    match measure.as_str() {
        "BLK" => (StatusCode::FORBIDDEN, "<html>denied</html>").into_response(),
        "STL" => (StatusCode::OK, "rate limited, try later").into_response(),
        _ => Json(json!({
            "resultSets": {
                "Meta": { "videoUrls": [
                    { "lurl": null, "murl": "https://videos.nba.com/nba/pbp/media/2024/10/22/0022400001/12/b_960x540.mp4", "surl": null },
                    { "lurl": "", "murl": null, "surl": "https://videos.nba.com/nba/pbp/media/2024/10/22/0022400001/40/c_320x180.mp4" }
                ]},
                "playlist": [
                    { "ei": 12.0, "p": 1.0, "dsc": "Brunson 12' Pullup Jump Shot (2 AST)" },
                    { "ei": 40.0, "p": 2.0, "dsc": "Brunson Driving Layup (3 AST)" }
                ]
            }
        }))
        .into_response(),
    }
}

async fn spawn_stats_server() -> (StatsClient, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/videodetailsasset", get(video_details))
        .with_state(Arc::clone(&seen));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = StatsClient::new()
        .unwrap()
        .with_base_url(format!("http://{addr}/"));
    (client, seen)
}

#[tokio::test]
async fn html_error_page_is_malformed() {
    let (client, _) = spawn_stats_server().await;
    let err = client
        .fetch_category_assets(&game(&[(Category::Blocks, 1)]), Category::Blocks)
        .await
        .unwrap_err();

    match err {
        ProviderError::Malformed { endpoint, detail } => {
            assert_eq!(endpoint, "videodetailsasset");
            assert!(detail.contains("received html response (403"), "{detail}");
            assert!(detail.ends_with("expected json"), "{detail}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn plain_text_body_is_malformed_json() {
    let (client, _) = spawn_stats_server().await;
    let err = client
        .fetch_category_assets(&game(&[(Category::Steals, 1)]), Category::Steals)
        .await
        .unwrap_err();

    match err {
        ProviderError::Malformed { detail, .. } => {
            assert!(detail.starts_with("invalid json (200"), "{detail}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn video_details_become_assets_and_carry_the_game_query() {
    let (client, seen) = spawn_stats_server().await;
    let assets = client
        .fetch_category_assets(&game(&[(Category::Assists, 2)]), Category::Assists)
        .await
        .unwrap();

    assert_eq!(assets.len(), 2);
    assert_eq!(assets[0].event_id, Some(12));
    assert_eq!(assets[1].period, Some(2));
    assert_eq!(
        assets[0].best_url(),
        Some("https://videos.nba.com/nba/pbp/media/2024/10/22/0022400001/12/b_960x540.mp4")
    );
    assert_eq!(
        assets[1].best_url(),
        Some("https://videos.nba.com/nba/pbp/media/2024/10/22/0022400001/40/c_320x180.mp4")
    );

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let query = &seen[0];
    assert_eq!(query["ContextMeasure"], "AST");
    assert_eq!(query["GameID"], "0022400001");
    assert_eq!(query["PlayerID"], "1628973");
    assert_eq!(query["TeamID"], "1610612752");
    assert_eq!(query["Season"], "2024-25");
    assert_eq!(query["SeasonType"], "Regular Season");
}
