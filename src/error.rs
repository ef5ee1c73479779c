use std::fmt::Display;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::modules::api::models::Category;

/// Failures surfaced by a stats provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{endpoint}: {detail}")]
    Malformed { endpoint: String, detail: String },
    #[error("{endpoint} returned an inconsistent payload: {detail}")]
    Inconsistent { endpoint: String, detail: String },
    #[error("no game found for player {player_id}{}", game_suffix(.game_id))]
    GameNotFound {
        player_id: u64,
        game_id: Option<String>,
    },
}

/// Per-category failure. Recoverable at the aggregation boundary.
#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("expected {expected} {category} assets, have {actual}")]
    CountMismatch {
        category: Category,
        expected: u32,
        actual: usize,
    },
    #[error("{category}: malformed response: {detail}")]
    MalformedResponse { category: Category, detail: String },
    #[error("{category}: {source}")]
    Provider {
        category: Category,
        #[source]
        source: ProviderError,
    },
}

impl CategoryError {
    pub fn category(&self) -> Category {
        match self {
            CategoryError::CountMismatch { category, .. }
            | CategoryError::MalformedResponse { category, .. }
            | CategoryError::Provider { category, .. } => *category,
        }
    }
}

#[derive(Debug, Error)]
pub enum OrderingError {
    #[error("highlight lacks a usable url: {description}")]
    NoUsableUrl { description: String },
    #[error("url does not match the {strategy} shape: {url} ({description})")]
    UnrecognizedUrl {
        strategy: &'static str,
        url: String,
        description: String,
    },
    #[error("ordering key for {url} does not fit in an integer ({description})")]
    KeyOverflow { url: String, description: String },
}

#[derive(Debug, Error)]
#[error("segment {index:06} from {url}: {reason}")]
pub struct DownloadError {
    pub index: usize,
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("failed to write concat manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{tool} exited with {status}")]
    Exit { tool: PathBuf, status: ExitStatus },
}

/// Run-level failure of a highlight compilation.
#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("aborted after {} category failure(s):\n{}", .0.len(), join_lines(.0))]
    CategoryFailures(Vec<CategoryError>),
    #[error("no assets found")]
    NothingToCompile,
    #[error("could not order {} highlight(s):\n{}", .0.len(), join_lines(.0))]
    Ordering(Vec<OrderingError>),
    #[error("{} of {total} downloads failed:\n{}", .failures.len(), join_lines(.failures))]
    Download {
        failures: Vec<DownloadError>,
        total: usize,
    },
    #[error("failed to link trailer {path}: {source}")]
    Trailer {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn game_suffix(game_id: &Option<String>) -> String {
    match game_id {
        Some(id) => format!(" with game id {id}"),
        None => String::new(),
    }
}

fn join_lines<E: Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
