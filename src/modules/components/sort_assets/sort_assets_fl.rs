use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{HighlightError, OrderingError};
use crate::modules::api::models::RawAsset;

/// Chronological position of a clip, read out of its URL.
///
/// Compares on `(coarse, fine)`. `composite()` is the flat integer form
/// `coarse ++ fine` with `fine` zero-padded to three digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderingKey {
    pub coarse: u64,
    pub fine: u64,
}

impl OrderingKey {
    pub fn new(coarse: u64, fine: u64) -> Self {
        Self { coarse, fine }
    }

    pub fn composite(&self) -> Option<u64> {
        format!("{}{:03}", self.coarse, self.fine).parse().ok()
    }
}

/// Extracts an [`OrderingKey`] from a playback URL.
pub trait OrderingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` when the URL does not have the expected shape.
    fn key(&self, url: &str) -> Option<OrderingKey>;
}

static PBP_MEDIA_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https://videos\.nba\.com/nba/pbp/media/\d+/\d+/\d+/(\d+)/(\d+)")
        .expect("play-by-play url pattern is valid")
});

/// `https://videos.nba.com/nba/pbp/media/<yyyy>/<mm>/<dd>/<game>/<event>/...`
#[derive(Debug, Default, Clone, Copy)]
pub struct PbpMediaUrl;

impl OrderingStrategy for PbpMediaUrl {
    fn name(&self) -> &'static str {
        "pbp-media-v1"
    }

    fn key(&self, url: &str) -> Option<OrderingKey> {
        let caps = PBP_MEDIA_URL.captures(url)?;
        let coarse = caps.get(1)?.as_str().parse().ok()?;
        let fine = caps.get(2)?.as_str().parse().ok()?;
        Some(OrderingKey::new(coarse, fine))
    }
}

/// Order clips by their key, stable for equal keys.
///
/// Every asset is keyed before anything is sorted; if any cannot be keyed the
/// whole sort fails with one error per offending asset.
pub fn sort_assets(
    assets: Vec<RawAsset>,
    strategy: &dyn OrderingStrategy,
) -> Result<Vec<RawAsset>, HighlightError> {
    let mut errors = Vec::new();
    let mut keyed = Vec::with_capacity(assets.len());

    for asset in assets {
        let Some(url) = asset.best_url() else {
            errors.push(OrderingError::NoUsableUrl {
                description: asset.description.clone(),
            });
            continue;
        };
        let Some(key) = strategy.key(url) else {
            errors.push(OrderingError::UnrecognizedUrl {
                strategy: strategy.name(),
                url: url.to_string(),
                description: asset.description.clone(),
            });
            continue;
        };
        if key.composite().is_none() {
            errors.push(OrderingError::KeyOverflow {
                url: url.to_string(),
                description: asset.description.clone(),
            });
            continue;
        }
        keyed.push((key, asset));
    }

    if !errors.is_empty() {
        return Err(HighlightError::Ordering(errors));
    }

    keyed.sort_by_key(|(key, _)| *key);
    debug!("sorted {} clip(s) with {}", keyed.len(), strategy.name());
    Ok(keyed.into_iter().map(|(_, asset)| asset).collect())
}
