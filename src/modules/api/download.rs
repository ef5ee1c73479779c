use anyhow::{bail, Result};
use futures_util::TryStreamExt;
use log::debug;
use reqwest::Client;
use std::{io::ErrorKind, path::Path};
use tokio::{
    fs::File,
    io::{AsyncWriteExt, BufWriter},
};
use tokio_util::io::StreamReader;

/// Stream `url` into `dest`, returning the number of bytes written.
pub async fn download_clip(client: &Client, url: &str, dest: &Path) -> Result<u64> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        bail!("Failed to download clip: {}", response.status());
    }

    let byte_stream = response
        .bytes_stream()
        .map_err(|e| std::io::Error::new(ErrorKind::Other, e));
    let mut reader = StreamReader::new(byte_stream);

    let mut writer = BufWriter::new(File::create(dest).await?);

    let written = tokio::io::copy(&mut reader, &mut writer).await?;
    writer.flush().await?;

    debug!("Downloaded {} bytes to {}", written, dest.display());
    Ok(written)
}
