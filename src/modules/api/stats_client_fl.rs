use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ProviderError;
use crate::modules::api::models::{Category, GameContext, RawAsset, StatLine};

pub const DEFAULT_STATS_URL: &str = "https://stats.nba.com/stats";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.3 Safari/605.1.15";

/// Source of per-game totals and per-category clip lists.
pub trait StatsProvider: Send + Sync {
    fn fetch_category_assets(
        &self,
        game: &GameContext,
        category: Category,
    ) -> impl Future<Output = Result<Vec<RawAsset>, ProviderError>> + Send;

    /// Totals for `game_id`, or for the player's most recent game when `None`.
    fn fetch_game_context(
        &self,
        player_id: u64,
        game_id: Option<&str>,
    ) -> impl Future<Output = Result<GameContext, ProviderError>> + Send;
}

pub struct StatsClient {
    client: Client,
    base_url: String,
}

impl StatsClient {
    pub fn new() -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_STATS_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("GET {} {:?}", url, query);

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            let detail = if body.trim_start().starts_with('<') {
                format!("received html response ({status}), expected json")
            } else {
                format!("invalid json ({status}): {e}")
            };
            ProviderError::Malformed {
                endpoint: endpoint.to_string(),
                detail,
            }
        })
    }
}

impl StatsProvider for StatsClient {
    async fn fetch_category_assets(
        &self,
        game: &GameContext,
        category: Category,
    ) -> Result<Vec<RawAsset>, ProviderError> {
        let mut query: Vec<(&str, String)> = VIDEO_DETAILS_BLANK_PARAMS
            .iter()
            .map(|name| (*name, String::new()))
            .collect();
        query.extend([
            ("ContextMeasure", category.context_measure().to_string()),
            ("GameID", game.game_id.clone()),
            ("PlayerID", game.player_id.to_string()),
            ("TeamID", game.team_id.to_string()),
            ("Season", game.season()),
            ("SeasonType", "Regular Season".to_string()),
            ("LastNGames", "0".to_string()),
            ("Month", "0".to_string()),
            ("OpponentTeamID", "0".to_string()),
            ("Period", "0".to_string()),
        ]);

        let response: VideoDetailsResponse = self.get_json("videodetailsasset", &query).await?;
        let assets = response.into_assets()?;
        info!(
            "{} {}: provider listed {} clip(s)",
            game.player_name,
            category,
            assets.len()
        );
        Ok(assets)
    }

    async fn fetch_game_context(
        &self,
        player_id: u64,
        game_id: Option<&str>,
    ) -> Result<GameContext, ProviderError> {
        let query = [
            ("PlayerOrTeam", "P".to_string()),
            ("PlayerID", player_id.to_string()),
        ];
        let response: ResultSetsResponse = self.get_json("leaguegamefinder", &query).await?;
        response.into_game_context(player_id, game_id)
    }
}

const VIDEO_DETAILS_BLANK_PARAMS: &[&str] = &[
    "AheadBehind",
    "ClutchTime",
    "ContextFilter",
    "DateFrom",
    "DateTo",
    "EndPeriod",
    "EndRange",
    "GameSegment",
    "LeagueID",
    "Location",
    "Outcome",
    "PointDiff",
    "Position",
    "RangeType",
    "RookieYear",
    "SeasonSegment",
    "StartPeriod",
    "StartRange",
    "VsConference",
    "VsDivision",
];

#[derive(Debug, Deserialize)]
struct VideoDetailsResponse {
    #[serde(rename = "resultSets")]
    result_sets: VideoDetailsResultSets,
}

#[derive(Debug, Deserialize)]
struct VideoDetailsResultSets {
    #[serde(rename = "Meta", default)]
    meta: VideoDetailsMeta,
    #[serde(default)]
    playlist: Vec<PlaylistEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct VideoDetailsMeta {
    #[serde(rename = "videoUrls", default)]
    video_urls: Vec<VideoUrlEntry>,
}

#[derive(Debug, Deserialize)]
struct VideoUrlEntry {
    #[serde(rename = "lurl")]
    large: Option<String>,
    #[serde(rename = "murl")]
    medium: Option<String>,
    #[serde(rename = "surl")]
    small: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistEntry {
    #[serde(rename = "ei")]
    event_id: Option<f64>,
    #[serde(rename = "p")]
    period: Option<f64>,
    #[serde(rename = "dsc")]
    description: Option<String>,
}

impl VideoDetailsResponse {
    fn into_assets(self) -> Result<Vec<RawAsset>, ProviderError> {
        let VideoDetailsResultSets { meta, playlist } = self.result_sets;
        if playlist.len() != meta.video_urls.len() {
            return Err(ProviderError::Inconsistent {
                endpoint: "videodetailsasset".to_string(),
                detail: format!(
                    "{} playlist entries but {} url entries",
                    playlist.len(),
                    meta.video_urls.len()
                ),
            });
        }

        Ok(playlist
            .into_iter()
            .zip(meta.video_urls)
            .map(|(entry, urls)| RawAsset {
                event_id: entry.event_id.map(|n| n as u64),
                period: entry.period.map(|n| n as u32),
                description: entry.description.unwrap_or_default(),
                large_url: urls.large,
                medium_url: urls.medium,
                small_url: urls.small,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct ResultSetsResponse {
    #[serde(rename = "resultSets")]
    result_sets: Vec<ResultSet>,
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    headers: Vec<String>,
    #[serde(rename = "rowSet")]
    row_set: Vec<Vec<Value>>,
}

const GAME_FINDER_COLUMNS: &[&str] = &[
    "PLAYER_ID",
    "PLAYER_NAME",
    "TEAM_ID",
    "TEAM_NAME",
    "GAME_ID",
    "GAME_DATE",
    "MATCHUP",
    "MIN",
    "PTS",
    "FGM",
    "FGA",
    "FG3M",
    "FG3A",
    "FTM",
    "FTA",
    "REB",
    "AST",
    "STL",
    "BLK",
    "TOV",
    "PF",
    "PLUS_MINUS",
];

struct Row<'a> {
    columns: &'a HashMap<&'a str, usize>,
    cells: &'a [Value],
}

impl Row<'_> {
    fn cell(&self, name: &str) -> Option<&Value> {
        self.columns.get(name).and_then(|&i| self.cells.get(i))
    }

    fn text(&self, name: &str) -> String {
        match self.cell(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    fn number(&self, name: &str) -> f64 {
        self.cell(name).and_then(Value::as_f64).unwrap_or(0.0)
    }

    fn count(&self, name: &str) -> u32 {
        self.number(name).max(0.0) as u32
    }
}

impl ResultSetsResponse {
    fn into_game_context(
        self,
        player_id: u64,
        game_id: Option<&str>,
    ) -> Result<GameContext, ProviderError> {
        let malformed = |detail: String| ProviderError::Malformed {
            endpoint: "leaguegamefinder".to_string(),
            detail,
        };

        let set = self
            .result_sets
            .into_iter()
            .next()
            .ok_or_else(|| malformed("response has no result sets".to_string()))?;

        let columns: HashMap<&str, usize> = set
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();
        if let Some(missing) = GAME_FINDER_COLUMNS.iter().find(|c| !columns.contains_key(*c)) {
            return Err(malformed(format!("missing column {missing}")));
        }

        let row = set
            .row_set
            .iter()
            .map(|cells| Row {
                columns: &columns,
                cells,
            })
            .find(|row| game_id.map_or(true, |id| row.text("GAME_ID") == id))
            .ok_or_else(|| ProviderError::GameNotFound {
                player_id,
                game_id: game_id.map(str::to_string),
            })?;

        let date_text = row.text("GAME_DATE");
        let game_date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d")
            .map_err(|e| malformed(format!("bad GAME_DATE '{date_text}': {e}")))?;

        let totals = BTreeMap::from([
            (Category::FieldGoalAttempts, row.count("FGA")),
            (Category::Rebounds, row.count("REB")),
            (Category::Assists, row.count("AST")),
            (Category::Steals, row.count("STL")),
            (Category::Turnovers, row.count("TOV")),
            (Category::Blocks, row.count("BLK")),
            (Category::PersonalFouls, row.count("PF")),
            (Category::FreeThrowAttempts, row.count("FTA")),
        ]);

        Ok(GameContext {
            game_id: row.text("GAME_ID"),
            player_id: row.number("PLAYER_ID") as u64,
            team_id: row.number("TEAM_ID") as u64,
            player_name: row.text("PLAYER_NAME"),
            team_name: row.text("TEAM_NAME"),
            matchup: row.text("MATCHUP"),
            game_date,
            totals,
            line: StatLine {
                minutes: row.number("MIN"),
                points: row.count("PTS"),
                field_goals_made: row.count("FGM"),
                threes_made: row.count("FG3M"),
                threes_attempted: row.count("FG3A"),
                free_throws_made: row.count("FTM"),
                plus_minus: row.number("PLUS_MINUS").round() as i32,
            },
        })
    }
}
