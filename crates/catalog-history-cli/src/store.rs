//! Snapshot persistence.
//!
//! Snapshots live in `<root>/<year>/<epoch-millis>.json`, one pretty-printed
//! JSON array of catalog entries per file. A snapshot's id is its path
//! relative to `<root>`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use catalog_history::Snapshot;
use chrono::{DateTime, Datelike, Utc};
use serde_json::Value;
use tracing::{info, warn};

/// Ids of every `*/*.json` file below `root`, sorted.
///
/// A missing `root` yields no ids.
pub async fn snapshot_ids(root: &Path) -> Result<Vec<String>> {
    let mut years = match tokio::fs::read_dir(root).await {
        Ok(years) => years,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!(dir = %root.display(), "snapshot directory does not exist");
            return Ok(Vec::new());
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read snapshot directory {}", root.display()))
        }
    };

    let mut ids = Vec::new();
    while let Some(year) = years.next_entry().await? {
        if !year.file_type().await?.is_dir() {
            continue;
        }
        let year_name = year.file_name();
        let mut entries = tokio::fs::read_dir(year.path())
            .await
            .with_context(|| format!("failed to read {}", year.path().display()))?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() && is_json(&entry.path()) {
                ids.push(format!(
                    "{}/{}",
                    year_name.to_string_lossy(),
                    entry.file_name().to_string_lossy()
                ));
            }
        }
    }
    ids.sort();
    Ok(ids)
}

/// Read and parse every snapshot below `root` concurrently, then order them
/// by timestamp for the fold.
pub async fn load_snapshots(root: &Path) -> Result<Vec<Snapshot>> {
    let ids = snapshot_ids(root).await?;
    let reads = ids.into_iter().map(|id| {
        let path = root.join(&id);
        tokio::spawn(async move {
            let text = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read snapshot {}", path.display()))?;
            Snapshot::from_json(&id, &text).map_err(anyhow::Error::from)
        })
    });

    let mut snapshots = futures::future::try_join_all(reads)
        .await
        .context("snapshot reader task failed")?
        .into_iter()
        .collect::<Result<Vec<_>>>()?;
    snapshots.sort_by_key(|snapshot| snapshot.timestamp);

    info!(count = snapshots.len(), dir = %root.display(), "loaded snapshots");
    Ok(snapshots)
}

/// The newest listing in one year directory.
///
/// Files are ranked by their numeric stem; stems that are not numbers rank
/// below every number. Returns `None` when the directory does not exist or
/// holds no snapshot.
pub fn latest_listing(year_dir: &Path) -> Result<Option<Value>> {
    let entries = match fs::read_dir(year_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", year_dir.display()))
        }
    };

    let mut latest: Option<(i64, PathBuf)> = None;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() || !is_json(&path) {
            continue;
        }
        let rank = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.parse::<i64>().ok())
            .unwrap_or(-1);
        if latest.as_ref().is_none_or(|(best, _)| rank >= *best) {
            latest = Some((rank, path));
        }
    }

    let Some((_, path)) = latest else {
        return Ok(None);
    };
    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let listing = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))?;
    Ok(Some(listing))
}

/// Store `listing` as the snapshot taken at `now`, unless it is identical to
/// the latest snapshot of the same year.
///
/// Returns the path written, or `None` when nothing changed.
pub fn record_listing(root: &Path, now: DateTime<Utc>, listing: &Value) -> Result<Option<PathBuf>> {
    if !listing.is_array() {
        bail!("catalog listing must be a JSON array");
    }

    let year_dir = root.join(now.year().to_string());
    if latest_listing(&year_dir)?.as_ref() == Some(listing) {
        info!(dir = %year_dir.display(), "listing unchanged since latest snapshot");
        return Ok(None);
    }

    fs::create_dir_all(&year_dir)
        .with_context(|| format!("failed to create {}", year_dir.display()))?;
    let path = year_dir.join(format!("{}.json", now.timestamp_millis()));
    let mut text = serde_json::to_string_pretty(listing)?;
    text.push('\n');
    fs::write(&path, text).with_context(|| format!("failed to write snapshot {}", path.display()))?;

    info!(path = %path.display(), "recorded snapshot");
    Ok(Some(path))
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn snapshot_ids_lists_json_files_one_level_down() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("2021")).unwrap();
        fs::create_dir_all(root.join("2022")).unwrap();
        fs::write(root.join("2022/3000.json"), "[]").unwrap();
        fs::write(root.join("2021/2000.json"), "[]").unwrap();
        fs::write(root.join("2021/notes.txt"), "").unwrap();
        fs::write(root.join("stray.json"), "[]").unwrap();

        let ids = snapshot_ids(root).await.unwrap();
        assert_eq!(ids, vec!["2021/2000.json", "2022/3000.json"]);
    }

    #[tokio::test]
    async fn missing_root_has_no_snapshots() {
        let dir = TempDir::new().unwrap();
        let snapshots = load_snapshots(&dir.path().join("nowhere")).await.unwrap();
        assert!(snapshots.is_empty());
    }

    #[tokio::test]
    async fn load_snapshots_orders_by_timestamp() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("2021")).unwrap();
        fs::write(root.join("2021/900.json"), "[]").unwrap();
        fs::write(root.join("2021/10000.json"), "[]").unwrap();

        let snapshots = load_snapshots(root).await.unwrap();
        let ids: Vec<&str> = snapshots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["2021/900.json", "2021/10000.json"]);
    }

    #[test]
    fn record_listing_skips_unchanged() {
        let dir = TempDir::new().unwrap();
        let now = Utc::now();
        let listing = json!([{ "human-name": "Alpha", "date-added": 1 }]);

        assert!(record_listing(dir.path(), now, &listing).unwrap().is_some());
        assert!(record_listing(dir.path(), now, &listing).unwrap().is_none());
    }
}
