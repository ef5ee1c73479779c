use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, info, warn};
use sha2::{Digest, Sha256};

use crate::error::HighlightError;
use crate::modules::components::scratch_dir::scratch_dir_fl::ScratchDir;
use crate::modules::components::video_compilation::components::join_mp4_files_fl::{
    join_mp4_files, write_manifest,
};

/// 32 hex chars derived from the current time and a random salt.
pub fn unique_stem() -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let salt: u64 = rand::random();
    let digest = Sha256::digest(format!("{nanos}{salt}").as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(32);
    hex
}

/// Concatenate `asset_count` clips plus the trailer from `scratch` into a new
/// file under `output_root`.
///
/// The scratch directory is removed whatever the outcome. A failed run also
/// removes whatever the tool managed to write.
pub async fn assemble_compilation(
    scratch: ScratchDir,
    asset_count: usize,
    tool: &Path,
    output_root: &Path,
) -> Result<PathBuf, HighlightError> {
    let output = output_root.join(format!("{}.mp4", unique_stem()));

    let manifest = match write_manifest(scratch.path(), asset_count).await {
        Ok(path) => path,
        Err(e) => {
            scratch.remove();
            return Err(e.into());
        }
    };

    if let Err(e) = join_mp4_files(tool, &manifest, &output).await {
        scratch.remove();
        remove_partial_output(&output).await;
        return Err(e.into());
    }

    scratch.remove();
    Ok(output)
}

async fn remove_partial_output(output: &Path) {
    match tokio::fs::remove_file(output).await {
        Ok(()) => debug!("Removed partial output {}", output.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            "⚠️ Failed to delete partial output {}: {}",
            output.display(),
            e
        ),
    }
}

/// Move a finished artifact into `final_dir`, falling back to copy + delete
/// when a rename is not possible (e.g. across filesystems).
pub async fn relocate_artifact(
    artifact: &Path,
    final_dir: &Path,
    file_name: Option<&str>,
) -> io::Result<PathBuf> {
    tokio::fs::create_dir_all(final_dir).await?;
    let name = match file_name {
        Some(name) => name.to_string(),
        None => format!("{}.mp4", unique_stem()),
    };
    let dest = final_dir.join(name);

    if let Err(e) = tokio::fs::rename(artifact, &dest).await {
        debug!("rename to {} failed ({}), copying", dest.display(), e);
        if let Err(e) = tokio::fs::copy(artifact, &dest).await {
            remove_partial_output(&dest).await;
            return Err(e);
        }
        tokio::fs::remove_file(artifact).await?;
    }

    info!("Moved compilation to {}", dest.display());
    Ok(dest)
}
