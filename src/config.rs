use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};

use crate::modules::api::models::Category;
use crate::modules::components::aggregate_assets::components::failure_policy_fl::OnCategoryFailure;
use crate::modules::components::download_assets::download_assets_fl::DEFAULT_MAX_DOWNLOADS;

/// Everything a compilation run needs besides the game itself.
#[derive(Debug, Clone)]
pub struct HighlightConfig {
    /// Categories to compile, in merge order.
    pub categories: Vec<Category>,
    /// End-screen clip linked in after the last highlight.
    pub trailer_path: PathBuf,
    /// Concatenation tool executable.
    pub ffmpeg_path: PathBuf,
    pub max_concurrent_downloads: usize,
    pub download_timeout: Duration,
    /// Parent of the per-run scratch directory and of the un-relocated artifact.
    pub scratch_root: PathBuf,
    /// Where finished compilations are moved. `None` leaves them in `scratch_root`.
    pub output_dir: Option<PathBuf>,
    pub on_category_failure: OnCategoryFailure,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            categories: Category::DEFAULT_TRACKED.to_vec(),
            trailer_path: default_trailer_path(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            max_concurrent_downloads: DEFAULT_MAX_DOWNLOADS,
            download_timeout: Duration::from_secs(120),
            scratch_root: std::env::temp_dir(),
            output_dir: None,
            on_category_failure: OnCategoryFailure::default(),
        }
    }
}

impl HighlightConfig {
    /// Checks the config and drops repeated categories.
    pub fn validate(mut self) -> Result<Self> {
        let mut unique = Vec::with_capacity(self.categories.len());
        for category in self.categories {
            if !unique.contains(&category) {
                unique.push(category);
            }
        }
        self.categories = unique;

        if self.categories.is_empty() {
            bail!("at least one category must be tracked");
        }
        if self.max_concurrent_downloads == 0 {
            bail!("max concurrent downloads must be at least 1");
        }
        if !self.trailer_path.is_file() {
            bail!("trailer clip not found at {}", self.trailer_path.display());
        }
        Ok(self)
    }
}

/// `<exe_dir>/assets/end_screen.mp4`, or a relative path if the exe dir is unknown.
pub fn default_trailer_path() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
        .unwrap_or_default();
    exe_dir.join("assets").join("end_screen.mp4")
}
