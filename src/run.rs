use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};

use crate::config::HighlightConfig;
use crate::error::{CategoryError, HighlightError};
use crate::modules::api::models::GameContext;
use crate::modules::api::stats_client_fl::{StatsClient, StatsProvider};
use crate::modules::components::aggregate_assets::aggregate_assets_fl::aggregate_assets;
use crate::modules::components::aggregate_assets::components::failure_policy_fl::FailureDecider;
use crate::modules::components::download_assets::download_assets_fl::{
    download_assets, DownloadPool,
};
use crate::modules::components::scratch_dir::scratch_dir_fl::ScratchDir;
use crate::modules::components::sort_assets::sort_assets_fl::{
    sort_assets, OrderingStrategy, PbpMediaUrl,
};
use crate::modules::components::statline::statline_fl::{stat_line, title};
use crate::modules::components::video_compilation::video_compilation_fl::{
    assemble_compilation, relocate_artifact,
};

/// A finished compilation. The caller owns `output`.
#[derive(Debug)]
pub struct Highlights {
    pub output: PathBuf,
    pub clip_count: usize,
    /// Category failures the run was told to continue past.
    pub skipped: Vec<CategoryError>,
}

pub struct HighlightPipeline<P> {
    provider: Arc<P>,
    pool: DownloadPool,
    ordering: Box<dyn OrderingStrategy>,
    config: HighlightConfig,
}

impl<P: StatsProvider + 'static> HighlightPipeline<P> {
    pub fn new(provider: Arc<P>, pool: DownloadPool, config: HighlightConfig) -> Self {
        Self {
            provider,
            pool,
            ordering: Box::new(PbpMediaUrl),
            config,
        }
    }

    pub fn from_config(provider: Arc<P>, config: HighlightConfig) -> Result<Self, reqwest::Error> {
        let pool = DownloadPool::new(config.max_concurrent_downloads, config.download_timeout)?;
        Ok(Self::new(provider, pool, config))
    }

    pub fn with_ordering(mut self, ordering: impl OrderingStrategy + 'static) -> Self {
        self.ordering = Box::new(ordering);
        self
    }

    /// Compile every tracked category of `game` into one video.
    ///
    /// Fetch, merge and sort happen before anything is written to disk. From the
    /// moment the scratch directory exists, every exit path removes it.
    pub async fn compile(
        &self,
        game: Arc<GameContext>,
        decider: &mut dyn FailureDecider,
    ) -> Result<Highlights, HighlightError> {
        let aggregated = aggregate_assets(
            Arc::clone(&self.provider),
            Arc::clone(&game),
            &self.config.categories,
            decider,
        )
        .await?;

        let ordered = sort_assets(aggregated.assets, self.ordering.as_ref())?;

        let scratch = ScratchDir::create(&self.config.scratch_root, &game)?;
        let scratch =
            download_assets(&self.pool, &ordered, scratch, &self.config.trailer_path).await?;

        let artifact = assemble_compilation(
            scratch,
            ordered.len(),
            &self.config.ffmpeg_path,
            &self.config.scratch_root,
        )
        .await?;

        let output = match &self.config.output_dir {
            Some(dir) => match relocate_artifact(&artifact, dir, None).await {
                Ok(dest) => dest,
                Err(e) => {
                    warn!(
                        "⚠️ Could not move compilation into {}: {} (kept at {})",
                        dir.display(),
                        e,
                        artifact.display()
                    );
                    artifact
                }
            },
            None => artifact,
        };

        Ok(Highlights {
            output,
            clip_count: ordered.len(),
            skipped: aggregated.skipped,
        })
    }
}

/// Look up the player's game, compile its highlights unless `statline_only`,
/// and print the title and statline.
pub async fn process_player_highlights(
    player_id: u64,
    game_id: Option<&str>,
    config: HighlightConfig,
    statline_only: bool,
) -> anyhow::Result<()> {
    let client = Arc::new(StatsClient::new()?);
    let game = Arc::new(client.fetch_game_context(player_id, game_id).await?);
    info!(
        "{} ({}) {} on {}",
        game.player_name, game.team_name, game.matchup, game.game_date
    );
    println!("GameID: {}", game.game_id);
    println!("PlayerID: {}", game.player_id);

    if !statline_only {
        let config = config.validate()?;
        let mut decider = config.on_category_failure.decider();
        let pipeline = HighlightPipeline::from_config(Arc::clone(&client), config)?;

        let highlights = pipeline.compile(Arc::clone(&game), decider.as_mut()).await?;
        if !highlights.skipped.is_empty() {
            let names: Vec<String> = highlights
                .skipped
                .iter()
                .map(|e| e.category().to_string())
                .collect();
            println!("⚠️ Compiled without: {}", names.join(", "));
        }
        println!(
            "🎞️ {} clip(s) compiled: {}",
            highlights.clip_count,
            highlights.output.display()
        );
    }

    println!("{}", title(&game));
    println!("{}", stat_line(&game));
    Ok(())
}
