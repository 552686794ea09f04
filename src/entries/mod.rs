pub mod entities;
pub mod front_matter;
pub mod normalize;
pub mod storage;

use anyhow::Result;
use entities::CanonicalEntry;
use normalize::{normalize, NormalizeOptions};
use storage::EntryStorage;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Reasons a single entry file can't become a [CanonicalEntry]. These never abort a build, the
/// entry is skipped and reported instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error(
        "can't derive a date from {source_id:?}: expected 12 digits in YYYYMMDDHHMM format, found {digits:?}"
    )]
    MalformedSourceIdentifier { source_id: String, digits: String },
    #[error("front matter of {source_id:?} is invalid: {message}")]
    FrontMatter { source_id: String, message: String },
}

impl EntryError {
    pub fn source_id(&self) -> &str {
        match self {
            EntryError::MalformedSourceIdentifier { source_id, .. }
            | EntryError::FrontMatter { source_id, .. } => source_id,
        }
    }
}

/// Every entry of the journal that could be normalized, ordered by date, plus the ones that
/// couldn't.
#[derive(Debug, Default)]
pub struct Journal {
    pub entries: Vec<CanonicalEntry>,
    pub skipped: Vec<EntryError>,
}

/// Reads all entries from `storage` and normalizes them.
#[instrument(skip(storage))]
pub async fn load_journal(
    storage: &impl EntryStorage,
    options: NormalizeOptions,
) -> Result<Journal> {
    let loaded = storage.load_all().await?;
    let mut journal = Journal {
        entries: Vec::with_capacity(loaded.entries.len()),
        skipped: loaded.rejected,
    };

    for sourced in loaded.entries {
        match normalize(&sourced.raw, &sourced.source_id, options) {
            Ok(entry) => journal.entries.push(entry),
            Err(e) => {
                warn!("Skipping entry: {e}");
                journal.skipped.push(e);
            }
        }
    }

    // Canonical dates share one layout, so string order is chronological order.
    journal.entries.sort_by(|a, b| a.date.cmp(&b.date));
    debug!(
        "Loaded {} entries, skipped {}",
        journal.entries.len(),
        journal.skipped.len()
    );
    Ok(journal)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use tempfile::tempdir;

    use super::{load_journal, normalize::NormalizeOptions, storage::EntryStorageImpl, EntryError};
    use crate::utils::logging::TEST_LOGGING;

    #[tokio::test]
    async fn load_journal_skips_malformed_entries() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        fs::write(
            dir.path().join("202302011015.md"),
            "---\nsleep: false\ntriggers:\n  - Stress\n---\n",
        )?;
        fs::write(
            dir.path().join("notes.md"),
            "---\nsleep: true\n---\nno digits in this name\n",
        )?;
        fs::write(
            dir.path().join("202301151230.md"),
            "---\ndate: 2023-01-10T08:00\nsleep: true\n---\n",
        )?;
        fs::write(dir.path().join("202303011015.md"), "---\nsleep: [\n---\n")?;

        let storage = EntryStorageImpl::new(dir.path().to_path_buf());
        let journal = load_journal(&storage, NormalizeOptions::default()).await?;

        let dates = journal
            .entries
            .iter()
            .map(|v| v.date.as_str())
            .collect::<Vec<_>>();
        assert_eq!(dates, vec!["2023-01-10T08:00", "2023-02-01T10:15"]);

        assert_eq!(journal.skipped.len(), 2);
        assert!(journal.skipped.iter().any(|e| matches!(
            e,
            EntryError::MalformedSourceIdentifier { source_id, .. } if source_id == "notes.md"
        )));
        assert!(journal.skipped.iter().any(|e| matches!(
            e,
            EntryError::FrontMatter { source_id, .. } if source_id == "202303011015.md"
        )));
        Ok(())
    }

    #[tokio::test]
    async fn load_journal_without_content_dir_is_empty() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let storage = EntryStorageImpl::new(dir.path().join("missing"));

        let journal = load_journal(&storage, NormalizeOptions::default()).await?;

        assert!(journal.entries.is_empty());
        assert!(journal.skipped.is_empty());
        Ok(())
    }
}
