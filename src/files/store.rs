use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use time::{macros::format_description, OffsetDateTime};
use tracing::info;

/// Storage for uploaded spreadsheets. Object-safe so the state can hold it
/// behind `Arc<dyn FileStore>` and tests can swap in a fake.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persists the body under a timestamped name; returns the stored name.
    async fn save(&self, original_name: &str, body: Bytes) -> anyhow::Result<String>;
    /// Display names of everything stored, timestamp prefix stripped.
    async fn list(&self) -> anyhow::Result<Vec<String>>;
}

/// Prefix uploads with the upload instant so repeated imports of the same
/// spreadsheet never collide.
pub fn stamped_name(now: OffsetDateTime, original_name: &str) -> anyhow::Result<String> {
    let fmt = format_description!("[year][month][day][hour][minute][second]");
    let stamp = now.format(&fmt)?;
    Ok(format!("{stamp}_{original_name}"))
}

/// Inverse of `stamped_name` for listings: drop the prefix and the
/// extension, leaving what the uploader called the file.
pub fn display_name(stored: &str) -> String {
    let name = stored.split_once('_').map(|(_, rest)| rest).unwrap_or(stored);
    let name = name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name);
    name.to_string()
}

pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Creates the backing directory when missing.
    pub async fn new(root: &Path) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(root).await?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }
}

#[async_trait]
impl FileStore for LocalStore {
    async fn save(&self, original_name: &str, body: Bytes) -> anyhow::Result<String> {
        // Only the final path component; an uploaded name must not walk
        // out of the store directory.
        let base = Path::new(original_name)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("invalid file name"))?;
        let stored = stamped_name(OffsetDateTime::now_utc(), base)?;
        tokio::fs::write(self.root.join(&stored), &body).await?;
        info!(file = %stored, bytes = body.len(), "file stored");
        Ok(stored)
    }

    async fn list(&self) -> anyhow::Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Some(stored) = entry.file_name().to_str() {
                    names.push(display_name(stored));
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
