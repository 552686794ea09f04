use std::{
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use futures::{stream, StreamExt};
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{debug, warn};

use super::{
    entities::{NewEntry, SourcedEntry},
    front_matter, EntryError,
};

/// Extension of entry files. Anything else in the content directory is ignored.
pub const ENTRY_EXTENSION: &str = "md";

const CONCURRENT_READS: usize = 4;

/// Everything read out of the content directory.
#[derive(Debug, Default)]
pub struct LoadedEntries {
    pub entries: Vec<SourcedEntry>,
    /// Files that were found but couldn't be parsed.
    pub rejected: Vec<EntryError>,
}

/// Interface for abstracting storage of entries.
pub trait EntryStorage {
    /// Reads every entry. A missing content directory means an empty journal.
    fn load_all(&self) -> impl Future<Output = Result<LoadedEntries>>;

    /// Writes a new entry file named after its timestamp. Existing entries are never overwritten.
    fn write_entry(&self, entry: &NewEntry) -> impl Future<Output = Result<PathBuf>>;
}

/// The main realization of [EntryStorage], one markdown file per entry in a single directory.
pub struct EntryStorageImpl {
    content_dir: PathBuf,
}

impl EntryStorageImpl {
    pub fn new(content_dir: PathBuf) -> Self {
        Self { content_dir }
    }

    async fn entry_paths(&self) -> Result<Option<Vec<PathBuf>>> {
        let mut dir = match tokio::fs::read_dir(&self.content_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read content directory {:?}", self.content_dir)
                })
            }
        };

        let mut paths = vec![];
        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if is_entry_file(&path) && item.file_type().await?.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(Some(paths))
    }
}

fn is_entry_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|v| v.eq_ignore_ascii_case(ENTRY_EXTENSION))
}

fn source_id(path: &Path) -> String {
    path.file_name()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

impl EntryStorage for EntryStorageImpl {
    async fn load_all(&self) -> Result<LoadedEntries> {
        let Some(paths) = self.entry_paths().await? else {
            warn!(
                "Content directory {:?} doesn't exist, the journal is empty",
                self.content_dir
            );
            return Ok(LoadedEntries::default());
        };

        let files = stream::iter(paths)
            .map(|path| async move {
                let text = tokio::fs::read_to_string(&path).await;
                (path, text)
            })
            .buffered(CONCURRENT_READS)
            .collect::<Vec<_>>()
            .await;

        let mut loaded = LoadedEntries::default();
        for (path, text) in files {
            debug!("Extracting {path:?}");
            let text = text.with_context(|| format!("Failed to read entry {path:?}"))?;
            let source_id = source_id(&path);
            match front_matter::parse(&text) {
                Ok(raw) => loaded.entries.push(SourcedEntry { source_id, raw }),
                Err(e) => {
                    warn!("Found illegal front matter in {path:?}: {e}");
                    loaded.rejected.push(EntryError::FrontMatter {
                        source_id,
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(loaded)
    }

    async fn write_entry(&self, entry: &NewEntry) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.content_dir)
            .await
            .with_context(|| format!("Failed to create {:?}", self.content_dir))?;

        let path = self
            .content_dir
            .join(format!("{}.{ENTRY_EXTENSION}", entry.file_stem()));
        let text = front_matter::render(entry, entry.journal.as_deref())?;

        let mut file = match File::options()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                bail!("An entry already exists at {path:?}")
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to create {path:?}")),
        };
        file.write_all(text.as_bytes()).await?;
        file.flush().await?;
        debug!("Wrote entry {path:?}");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use chrono::NaiveDate;
    use serde_json::json;
    use tempfile::tempdir;

    use super::{EntryStorage, EntryStorageImpl};
    use crate::{
        entries::{entities::NewEntry, EntryError},
        utils::logging::TEST_LOGGING,
    };

    #[tokio::test]
    async fn load_all_reads_markdown_files_in_order() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        fs::write(dir.path().join("202302011015.md"), "---\nsleep: true\n---\n")?;
        fs::write(
            dir.path().join("202301011015.md"),
            "---\nsleep: false\n---\nBody\n",
        )?;
        fs::write(dir.path().join("README.txt"), "not an entry")?;
        fs::create_dir(dir.path().join("drafts.md"))?;

        let storage = EntryStorageImpl::new(dir.path().to_path_buf());
        let loaded = storage.load_all().await?;

        let ids = loaded
            .entries
            .iter()
            .map(|v| v.source_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["202301011015.md", "202302011015.md"]);
        assert_eq!(loaded.entries[0].raw.data["sleep"], json!(false));
        assert_eq!(loaded.entries[0].raw.content.as_deref(), Some("Body\n"));
        assert!(loaded.rejected.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn load_all_rejects_broken_front_matter() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        fs::write(dir.path().join("202301011015.md"), "---\nsleep: true\n")?;

        let storage = EntryStorageImpl::new(dir.path().to_path_buf());
        let loaded = storage.load_all().await?;

        assert!(loaded.entries.is_empty());
        assert!(matches!(
            &loaded.rejected[..],
            [EntryError::FrontMatter { source_id, .. }] if source_id == "202301011015.md"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn load_all_missing_dir() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let storage = EntryStorageImpl::new(dir.path().join("entries"));

        let loaded = storage.load_all().await?;

        assert!(loaded.entries.is_empty());
        assert!(loaded.rejected.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn write_entry_creates_dir_and_refuses_overwrite() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let storage = EntryStorageImpl::new(dir.path().join("entries"));
        let moment = NaiveDate::from_ymd_opt(2023, 1, 15)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        let mut entry = NewEntry::new(moment, false);
        entry.journal = Some("Dark room helped.".into());

        let path = storage.write_entry(&entry).await?;
        assert_eq!(path, dir.path().join("entries").join("202301151230.md"));

        let loaded = storage.load_all().await?;
        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(
            loaded.entries[0].raw.data["date"],
            json!("2023-01-15T12:30")
        );
        assert_eq!(
            loaded.entries[0].raw.content.as_deref(),
            Some("Dark room helped.\n")
        );

        assert!(storage.write_entry(&entry).await.is_err());
        Ok(())
    }
}
