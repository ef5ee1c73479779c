#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::NaiveDate;
use tokio::net::TcpListener;

use highlight_reel::error::ProviderError;
use highlight_reel::modules::api::models::{Category, GameContext, RawAsset, StatLine};
use highlight_reel::modules::api::stats_client_fl::StatsProvider;
use highlight_reel::modules::components::sort_assets::sort_assets_fl::{
    OrderingKey, OrderingStrategy,
};

pub enum Scripted {
    Assets(Vec<RawAsset>),
    HtmlPage,
}

/// Provider double answering from a fixed table and recording every query.
#[derive(Default)]
pub struct ScriptedProvider {
    responses: HashMap<Category, Scripted>,
    calls: Mutex<Vec<Category>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: Category, response: Scripted) -> Self {
        self.responses.insert(category, response);
        self
    }

    pub fn calls(&self) -> Vec<Category> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort();
        calls
    }
}

impl StatsProvider for ScriptedProvider {
    async fn fetch_category_assets(
        &self,
        _game: &GameContext,
        category: Category,
    ) -> Result<Vec<RawAsset>, ProviderError> {
        self.calls.lock().unwrap().push(category);
        match self.responses.get(&category) {
            Some(Scripted::Assets(assets)) => Ok(assets.clone()),
            Some(Scripted::HtmlPage) => Err(ProviderError::Malformed {
                endpoint: "videodetailsasset".into(),
                detail: "received html response (403 Forbidden), expected json".into(),
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_game_context(
        &self,
        player_id: u64,
        game_id: Option<&str>,
    ) -> Result<GameContext, ProviderError> {
        Err(ProviderError::GameNotFound {
            player_id,
            game_id: game_id.map(str::to_string),
        })
    }
}

pub fn game(totals: &[(Category, u32)]) -> GameContext {
    GameContext {
        game_id: "0022400001".into(),
        player_id: 1628973,
        team_id: 1610612752,
        player_name: "Jalen Brunson".into(),
        team_name: "New York Knicks".into(),
        matchup: "NYK @ BOS".into(),
        game_date: NaiveDate::from_ymd_opt(2024, 10, 22).unwrap(),
        totals: totals.iter().copied().collect::<BTreeMap<_, _>>(),
        line: StatLine::default(),
    }
}

/// A clip whose small URL has the real play-by-play media shape.
pub fn pbp_clip(coarse: u64, fine: u64, label: &str) -> RawAsset {
    RawAsset {
        event_id: Some(fine),
        period: Some(1),
        description: label.to_string(),
        small_url: Some(format!(
            "https://videos.nba.com/nba/pbp/media/2024/10/22/{coarse}/{fine}/0a1b2c_320x180.mp4"
        )),
        ..Default::default()
    }
}

/// A clip served by the local clip server as `<base>/clips/<name>`.
pub fn served_clip(base: &str, name: &str) -> RawAsset {
    RawAsset {
        description: name.to_string(),
        medium_url: Some(format!("{base}/clips/{name}")),
        ..Default::default()
    }
}

pub fn descriptions(assets: &[RawAsset]) -> Vec<&str> {
    assets.iter().map(|a| a.description.as_str()).collect()
}

/// Orders `.../clips/[label-]<coarse>-<fine>.mp4` URLs.
pub struct LocalClipOrder;

impl OrderingStrategy for LocalClipOrder {
    fn name(&self) -> &'static str {
        "local-clips"
    }

    fn key(&self, url: &str) -> Option<OrderingKey> {
        let name = url.rsplit_once("/clips/")?.1.strip_suffix(".mp4")?;
        let (rest, fine) = name.rsplit_once('-')?;
        let coarse = rest.rsplit('-').next()?;
        Some(OrderingKey::new(coarse.parse().ok()?, fine.parse().ok()?))
    }
}

#[derive(Default)]
pub struct ServerStats {
    pub in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub served: AtomicUsize,
}

/// Serves `<name>` wrapped in angle brackets; names starting with `broken` get a 500.
pub async fn spawn_clip_server() -> (String, Arc<ServerStats>) {
    let stats = Arc::new(ServerStats::default());
    let app = Router::new()
        .route("/clips/:name", get(serve_clip))
        .with_state(Arc::clone(&stats));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), stats)
}

async fn serve_clip(State(stats): State<Arc<ServerStats>>, UrlPath(name): UrlPath<String>) -> Response {
    let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    stats.peak.fetch_max(now, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(20)).await;
    stats.in_flight.fetch_sub(1, Ordering::SeqCst);

    if name.starts_with("broken") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    stats.served.fetch_add(1, Ordering::SeqCst);
    (StatusCode::OK, format!("<{name}>")).into_response()
}

pub fn write_trailer(dir: &Path) -> PathBuf {
    let trailer = dir.join("end_screen.mp4");
    std::fs::write(&trailer, "TRAILER").unwrap();
    trailer
}

/// Stand-in for the concat tool: concatenates the manifest's files into the
/// last argument.
#[cfg(unix)]
pub fn write_fake_concat_tool(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let tool = dir.join("fake-ffmpeg");
    std::fs::write(
        &tool,
        r#"#!/bin/sh
prev=""
manifest=""
for arg in "$@"; do
  if [ "$prev" = "-i" ]; then manifest="$arg"; fi
  prev="$arg"
done
out="$prev"
dir=$(dirname "$manifest")
: > "$out"
sed -n "s/^file '\(.*\)'\$/\1/p" "$manifest" | while read -r seg; do
  cat "$dir/$seg" >> "$out"
done
"#,
    )
    .unwrap();
    std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
    tool
}

pub fn entries(dir: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    entries.sort();
    entries
}
