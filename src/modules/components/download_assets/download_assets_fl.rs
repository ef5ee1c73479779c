use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use reqwest::Client;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::{DownloadError, HighlightError};
use crate::modules::api::download::download_clip;
use crate::modules::api::models::RawAsset;
use crate::modules::components::scratch_dir::scratch_dir_fl::ScratchDir;

pub const DEFAULT_MAX_DOWNLOADS: usize = 50;

/// Caps simultaneous clip transfers. Owned by whoever runs downloads.
#[derive(Debug, Clone)]
pub struct DownloadPool {
    client: Client,
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl DownloadPool {
    pub fn new(capacity: usize, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(client, capacity))
    }

    pub fn with_client(client: Client, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            client,
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Download every clip into `scratch` as `000000.mp4`, `000001.mp4`, ... in the
/// given order, then link `trailer` in as the segment after the last clip.
///
/// Every transfer finishes before the outcome is judged. On any failure the
/// scratch directory is removed and all failures are reported together.
pub async fn download_assets(
    pool: &DownloadPool,
    assets: &[RawAsset],
    scratch: ScratchDir,
    trailer: &Path,
) -> Result<ScratchDir, HighlightError> {
    let total = assets.len();
    info!(
        "Downloading {} clip(s), up to {} at a time",
        total,
        pool.capacity()
    );

    let mut failures = Vec::new();
    let mut tasks = JoinSet::new();
    for (index, asset) in assets.iter().enumerate() {
        let Some(url) = asset.best_url().map(str::to_string) else {
            failures.push(DownloadError {
                index,
                url: String::new(),
                reason: format!("no playable url for '{}'", asset.description),
            });
            continue;
        };
        let dest = scratch.segment_path(index);
        let client = pool.client.clone();
        let permits = Arc::clone(&pool.permits);

        tasks.spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return (index, url, Err(e.to_string())),
            };
            let outcome = download_clip(&client, &url, &dest)
                .await
                .map_err(|e| format!("{e:#}"));
            (index, url, outcome)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, _, Ok(_))) => {}
            Ok((index, url, Err(reason))) => failures.push(DownloadError { index, url, reason }),
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => failures.push(DownloadError {
                index: usize::MAX,
                url: String::new(),
                reason: e.to_string(),
            }),
        }
    }

    if !failures.is_empty() {
        failures.sort_by_key(|f| f.index);
        for failure in &failures {
            error!("{}", failure);
        }
        scratch.remove();
        return Err(HighlightError::Download { failures, total });
    }

    let link = scratch.segment_path(total);
    if let Err(source) = link_trailer(trailer, &link).await {
        scratch.remove();
        return Err(HighlightError::Trailer {
            path: trailer.to_path_buf(),
            source,
        });
    }

    info!("✅ Downloaded {} clip(s) plus trailer", total);
    Ok(scratch)
}

async fn link_trailer(trailer: &Path, link: &Path) -> io::Result<()> {
    let target = tokio::fs::canonicalize(trailer).await?;
    symlink_segment(&target, link).await
}

#[cfg(unix)]
async fn symlink_segment(target: &Path, link: &Path) -> io::Result<()> {
    tokio::fs::symlink(target, link).await
}

#[cfg(windows)]
async fn symlink_segment(target: &Path, link: &Path) -> io::Result<()> {
    tokio::fs::symlink_file(target, link).await
}
