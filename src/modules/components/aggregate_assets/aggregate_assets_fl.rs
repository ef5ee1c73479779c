use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::{self, JoinSet};

use crate::error::{CategoryError, HighlightError};
use crate::modules::api::models::{Category, GameContext, RawAsset};
use crate::modules::api::stats_client_fl::StatsProvider;
use crate::modules::components::aggregate_assets::components::failure_policy_fl::{
    Decision, FailureDecider,
};
use crate::modules::components::category_fetch::category_fetch_fl::fetch_category;

#[derive(Debug)]
pub struct AggregatedAssets {
    /// Merged clips, first occurrence wins, in category then retrieval order.
    pub assets: Vec<RawAsset>,
    /// Categories the decider chose to go on without.
    pub skipped: Vec<CategoryError>,
}

/// Fetch every category with a non-zero total concurrently and merge the results.
///
/// All fetches run to completion before any failure is looked at. Failures are
/// handed to `decider` as one batch; an abort returns them all. Nothing touches
/// the filesystem here.
pub async fn aggregate_assets<P: StatsProvider + 'static>(
    provider: Arc<P>,
    game: Arc<GameContext>,
    categories: &[Category],
    decider: &mut dyn FailureDecider,
) -> Result<AggregatedAssets, HighlightError> {
    let mut queried: Vec<Category> = Vec::with_capacity(categories.len());
    for &category in categories {
        if queried.contains(&category) {
            continue;
        }
        if game.total(category) == 0 {
            debug!("{}: total is zero, not querying", category);
            continue;
        }
        queried.push(category);
    }

    info!(
        "Fetching {} categor{} for {} ({})",
        queried.len(),
        if queried.len() == 1 { "y" } else { "ies" },
        game.player_name,
        game.game_id
    );

    let mut tasks = JoinSet::new();
    for (slot, category) in queried.iter().copied().enumerate() {
        let provider = Arc::clone(&provider);
        let game = Arc::clone(&game);
        tasks.spawn(async move { (slot, fetch_category(provider.as_ref(), &game, category).await) });
    }

    let mut results: Vec<Option<Result<Vec<RawAsset>, CategoryError>>> =
        queried.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((slot, result)) => results[slot] = Some(result),
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => return Err(std::io::Error::other(e).into()),
        }
    }

    let mut seen = HashSet::new();
    let mut assets = Vec::new();
    let mut failures = Vec::new();
    for result in results.into_iter().flatten() {
        match result {
            Ok(category_assets) => {
                for asset in category_assets {
                    let key = asset.best_url().map(str::to_string);
                    if let Some(key) = key {
                        if !seen.insert(key) {
                            debug!("skipping duplicate clip: {}", asset.description);
                            continue;
                        }
                    }
                    assets.push(asset);
                }
            }
            Err(e) => failures.push(e),
        }
    }

    if !failures.is_empty() {
        for failure in &failures {
            warn!("category failed: {}", failure);
        }
        match decide_off_worker(decider, &failures) {
            Decision::Abort => return Err(HighlightError::CategoryFailures(failures)),
            Decision::Proceed => {
                let names: Vec<String> = failures.iter().map(|f| f.category().to_string()).collect();
                warn!("continuing without {}", names.join(", "));
            }
        }
    }

    if assets.is_empty() {
        return Err(HighlightError::NothingToCompile);
    }

    info!("Collected {} clip(s)", assets.len());
    Ok(AggregatedAssets {
        assets,
        skipped: failures,
    })
}

/// Deciders may block on operator input. `block_in_place` is only allowed on the
/// multi-threaded runtime.
fn decide_off_worker(decider: &mut dyn FailureDecider, failures: &[CategoryError]) -> Decision {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            task::block_in_place(|| decider.decide(failures))
        }
        _ => decider.decide(failures),
    }
}
