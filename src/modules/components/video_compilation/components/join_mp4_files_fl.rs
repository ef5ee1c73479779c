use std::path::{Path, PathBuf};
use std::process::Stdio;

use log::{debug, info};
use tokio::process::Command;

use crate::error::AssemblyError;
use crate::modules::components::scratch_dir::scratch_dir_fl::segment_file_name;

pub const MANIFEST_FILE_NAME: &str = "files.txt";

/// Concat-demuxer listing of segments `0..=last_index`, one `file '<name>'` per line.
pub fn manifest_contents(last_index: usize) -> String {
    (0..=last_index)
        .map(|i| format!("file '{}'\n", segment_file_name(i)))
        .collect()
}

/// Write the manifest into `dir`; names in it are relative to `dir`.
pub async fn write_manifest(dir: &Path, last_index: usize) -> Result<PathBuf, AssemblyError> {
    let path = dir.join(MANIFEST_FILE_NAME);
    tokio::fs::write(&path, manifest_contents(last_index))
        .await
        .map_err(|source| AssemblyError::Manifest {
            path: path.clone(),
            source,
        })?;
    debug!("Wrote concat manifest with {} entries", last_index + 1);
    Ok(path)
}

/// Run `<tool> -f concat -safe 0 -i <manifest> -c copy <output>` with the
/// operator's terminal attached.
pub async fn join_mp4_files(
    tool: &Path,
    manifest: &Path,
    output_path: &Path,
) -> Result<(), AssemblyError> {
    info!("Joining segments with {}", tool.display());

    let status = Command::new(tool)
        .args(["-f", "concat", "-safe", "0", "-i"])
        .arg(manifest)
        .args(["-c", "copy"])
        .arg(output_path)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|source| AssemblyError::Spawn {
            tool: tool.to_path_buf(),
            source,
        })?;

    if !status.success() {
        return Err(AssemblyError::Exit {
            tool: tool.to_path_buf(),
            status,
        });
    }

    info!("✅ Joined video created at: {}", output_path.display());
    Ok(())
}
