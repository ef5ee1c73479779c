use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use highlight_reel::config::{default_trailer_path, HighlightConfig};
use highlight_reel::modules::api::models::Category;
use highlight_reel::modules::components::aggregate_assets::components::failure_policy_fl::OnCategoryFailure;
use highlight_reel::modules::components::download_assets::download_assets_fl::DEFAULT_MAX_DOWNLOADS;
use highlight_reel::run::process_player_highlights;

/// Compile one player's game highlights into a single video.
#[derive(Debug, Parser)]
#[command(name = "highlight-reel", version)]
struct Cli {
    /// Stats provider id of the player
    #[arg(short, long, env = "HIGHLIGHTS_PLAYER_ID")]
    player_id: u64,

    /// Game to compile; defaults to the player's most recent game
    #[arg(short, long, env = "HIGHLIGHTS_GAME_ID")]
    game_id: Option<String>,

    /// Categories to include (FGA, REB, AST, STL, TOV, BLK, PF, FTA)
    #[arg(short, long = "category", value_delimiter = ',', env = "HIGHLIGHTS_CATEGORIES")]
    categories: Vec<Category>,

    /// What to do when a category cannot be retrieved: prompt, abort or proceed
    #[arg(long, env = "HIGHLIGHTS_ON_CATEGORY_FAILURE", default_value_t = OnCategoryFailure::Prompt)]
    on_category_failure: OnCategoryFailure,

    /// End-screen clip appended after the highlights
    #[arg(long, env = "HIGHLIGHTS_TRAILER")]
    trailer: Option<PathBuf>,

    #[arg(long, env = "HIGHLIGHTS_FFMPEG", default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    #[arg(long, env = "HIGHLIGHTS_MAX_DOWNLOADS", default_value_t = DEFAULT_MAX_DOWNLOADS)]
    max_downloads: usize,

    #[arg(long, env = "HIGHLIGHTS_DOWNLOAD_TIMEOUT_SECS", default_value_t = 120)]
    download_timeout_secs: u64,

    /// Where scratch directories are created; defaults to the OS temp dir
    #[arg(long, env = "HIGHLIGHTS_SCRATCH_ROOT")]
    scratch_root: Option<PathBuf>,

    /// Where the finished video is moved; defaults to the Downloads folder
    #[arg(short, long, env = "HIGHLIGHTS_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Leave the finished video in the scratch root
    #[arg(long)]
    keep_in_temp: bool,

    /// Only print the title and statline
    #[arg(long)]
    statline_only: bool,
}

impl Cli {
    fn config(&self) -> HighlightConfig {
        let defaults = HighlightConfig::default();
        let output_dir = if self.keep_in_temp {
            None
        } else {
            self.output_dir.clone().or_else(dirs::download_dir)
        };

        HighlightConfig {
            categories: if self.categories.is_empty() {
                defaults.categories
            } else {
                self.categories.clone()
            },
            trailer_path: self.trailer.clone().unwrap_or_else(default_trailer_path),
            ffmpeg_path: self.ffmpeg.clone(),
            max_concurrent_downloads: self.max_downloads,
            download_timeout: Duration::from_secs(self.download_timeout_secs),
            scratch_root: self.scratch_root.clone().unwrap_or(defaults.scratch_root),
            output_dir,
            on_category_failure: self.on_category_failure,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.config();

    if let Err(e) = process_player_highlights(
        cli.player_id,
        cli.game_id.as_deref(),
        config,
        cli.statline_only,
    )
    .await
    {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
