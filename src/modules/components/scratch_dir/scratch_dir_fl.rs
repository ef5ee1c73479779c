use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::TempDir;

use crate::modules::api::models::GameContext;

/// File name of the segment at `index` in play order.
pub fn segment_file_name(index: usize) -> String {
    format!("{index:06}.mp4")
}

/// Run-scoped working directory holding segments and the concat manifest.
///
/// Removed by [`ScratchDir::remove`]; dropping it removes it too.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Creates `<Player_Name>_<MM.DD.YYYY>_<random>` under `root`.
    pub fn create(root: &Path, game: &GameContext) -> io::Result<Self> {
        let player: String = game
            .player_name
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let prefix = format!("{}_{}_", player, game.game_date.format("%m.%d.%Y"));

        fs::create_dir_all(root)?;
        let dir = tempfile::Builder::new().prefix(&prefix).tempdir_in(root)?;
        info!("Created scratch directory {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn segment_path(&self, index: usize) -> PathBuf {
        self.path().join(segment_file_name(index))
    }

    pub fn remove(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!("Removed scratch directory {}", path.display()),
            Err(e) => warn!(
                "Failed to remove scratch directory {}: {}",
                path.display(),
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::modules::api::models::StatLine;

    #[test]
    fn named_after_player_and_date_and_removed_on_request() {
        let root = tempfile::tempdir().unwrap();
        let game = GameContext {
            game_id: "0022400001".into(),
            player_id: 1,
            team_id: 2,
            player_name: "Miles McBride".into(),
            team_name: "Knicks".into(),
            matchup: "NYK vs. MIA".into(),
            game_date: NaiveDate::from_ymd_opt(2024, 11, 3).unwrap(),
            totals: BTreeMap::new(),
            line: StatLine::default(),
        };

        let scratch = ScratchDir::create(root.path(), &game).unwrap();
        let path = scratch.path().to_path_buf();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("Miles_McBride_11.03.2024_"), "{name}");
        assert_eq!(scratch.segment_path(7), path.join("000007.mp4"));

        scratch.remove();
        assert!(!path.exists());
    }
}
