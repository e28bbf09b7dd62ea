use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::cli::SourceArgs;
use crate::storage::{StoragePaths, file_present_nonempty};

/// Returns the path of a local payload, downloading it first when needed.
pub async fn ensure_payload(opts: &SourceArgs) -> anyhow::Result<PathBuf> {
    if let Some(p) = opts.payload_file.as_ref() {
        return Ok(PathBuf::from(p));
    }

    let paths = StoragePaths::new(&opts.data_dir);
    paths.ensure_dirs().context("create data directory")?;

    let dest = paths.payload_path;
    if !opts.force_download && file_present_nonempty(&dest) {
        return Ok(dest);
    }

    if opts.offline {
        return Err(anyhow!(
            "Missing doctor payload at {} (use --payload-file or run without --offline).",
            dest.display()
        ));
    }

    ensure_download(&opts.source_url, &dest, opts.force_download).await?;
    Ok(dest)
}

/// Fetches (or reuses) the payload and parses it as JSON.
pub async fn load_payload(opts: &SourceArgs) -> anyhow::Result<Value> {
    let path = ensure_payload(opts).await?;
    read_payload(&path).await
}

pub async fn read_payload(path: &Path) -> anyhow::Result<Value> {
    let data = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    let v: Value =
        serde_json::from_str(&data).with_context(|| format!("parse JSON in {}", path.display()))?;
    Ok(v)
}

async fn ensure_download(url: &str, dest: &Path, force: bool) -> anyhow::Result<()> {
    if !force && file_present_nonempty(dest) {
        return Ok(());
    }

    let tmp = tmp_path(dest);
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    tracing::info!("Downloading {} -> {}", url, dest.display());

    let client = reqwest::Client::new();
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;

    if !resp.status().is_success() {
        return Err(anyhow!("Download failed ({}): {}", resp.status(), url));
    }

    let mut file = tokio::fs::File::create(&tmp)
        .await
        .with_context(|| format!("create {}", tmp.display()))?;

    let mut downloaded: u64 = 0;
    let mut stream = resp.bytes_stream();
    use futures_util::StreamExt;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.with_context(|| format!("read body chunk from {url}"))?;
        downloaded += chunk.len() as u64;
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, dest)
        .await
        .with_context(|| format!("rename {} -> {}", tmp.display(), dest.display()))?;

    tracing::info!("Downloaded {} bytes", downloaded);
    Ok(())
}

fn tmp_path(dest: &Path) -> PathBuf {
    let fname = dest
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("download");
    dest.with_file_name(format!("{fname}.part"))
}
