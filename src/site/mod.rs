//! Static dashboard output: the normalized journal, the chart configurations and a page that
//! draws them.

pub mod page;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    analysis::charts::{dashboard_charts, BarOrientation, ChartConfig, HeatmapTheme},
    config::Config,
    entries::{load_journal, storage::EntryStorage, EntryError},
};

pub const ENTRIES_FILE: &str = "headaches.json";
pub const INDEX_FILE: &str = "index.html";

#[derive(Debug, Default)]
pub struct BuildReport {
    /// Number of entries written to [ENTRIES_FILE].
    pub entries: usize,
    pub charts: usize,
    pub skipped: Vec<EntryError>,
}

async fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("Failed to write {path:?}"))
}

/// Loads the journal from `storage` and writes the dashboard into `out_dir`.
#[instrument(skip(storage, config))]
pub async fn build_site(
    storage: &impl EntryStorage,
    config: &Config,
    out_dir: &Path,
    theme: HeatmapTheme,
    orientation: BarOrientation,
) -> Result<BuildReport> {
    let journal = load_journal(storage, config.normalize_options()).await?;

    let charts = dashboard_charts(
        &journal.entries,
        &config.enabled_fields(),
        theme,
        orientation,
    )
    .iter()
    .map(|provider| {
        debug!("Computing chart {}", provider.id());
        provider
            .compute(&journal.entries)
            .with_context(|| format!("Failed to compute chart {}", provider.id()))
    })
    .collect::<Result<Vec<ChartConfig>>>()?;

    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("Failed to create {out_dir:?}"))?;
    write_json(&out_dir.join(ENTRIES_FILE), &journal.entries).await?;
    write_json(&out_dir.join(page::CHARTS_FILE), &charts).await?;
    let index = out_dir.join(INDEX_FILE);
    tokio::fs::write(&index, page::render_index(&config.html))
        .await
        .with_context(|| format!("Failed to write {index:?}"))?;

    info!(
        "Built {} entries and {} charts into {out_dir:?}",
        journal.entries.len(),
        charts.len()
    );
    Ok(BuildReport {
        entries: journal.entries.len(),
        charts: charts.len(),
        skipped: journal.skipped,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use serde_json::{json, Value};
    use tempfile::tempdir;

    use super::*;
    use crate::{
        entries::storage::EntryStorageImpl, site::page::CHARTS_FILE, utils::logging::TEST_LOGGING,
    };

    fn read_json(path: &Path) -> Result<Value> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    #[tokio::test]
    async fn build_site_writes_dashboard() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let content = dir.path().join("entries");
        fs::create_dir(&content)?;
        fs::write(
            content.join("202302011015.md"),
            "---\nsleep: false\ntriggers:\n  - Stress\n  - Weather\nmedications: []\n---\nRested.\n",
        )?;
        fs::write(
            content.join("202301011930.md"),
            "---\ndate: \"2023-01-01T19:30\"\nsleep: true\ntriggers:\n  - Stress\n---\n",
        )?;
        fs::write(content.join("2023010.md"), "---\nsleep: true\n---\n")?;

        let config = Config {
            disable_symptoms: true,
            ..Config::default()
        };
        let out = dir.path().join("dist");
        let report = build_site(
            &EntryStorageImpl::new(content),
            &config,
            &out,
            HeatmapTheme::default(),
            BarOrientation::default(),
        )
        .await?;

        assert_eq!(report.entries, 2);
        assert_eq!(report.charts, 6);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].source_id(), "2023010.md");

        let entries = read_json(&out.join(ENTRIES_FILE))?;
        assert_eq!(
            entries,
            json!([
                { "date": "2023-01-01T19:30", "sleep": true, "triggers": ["Stress"] },
                {
                    "date": "2023-02-01T10:15",
                    "sleep": false,
                    "triggers": ["Stress", "Weather"],
                    "medications": []
                }
            ])
        );

        let charts = read_json(&out.join(CHARTS_FILE))?;
        let ids = charts
            .as_array()
            .map(|v| v.iter().map(|c| c["id"].clone()).collect::<Vec<_>>())
            .unwrap_or_default();
        assert_eq!(
            ids,
            vec![
                json!("weekdays"),
                json!("hours"),
                json!("calendar-2023"),
                json!("pie-triggers"),
                json!("pie-pain-areas"),
                json!("pie-medications"),
            ]
        );

        let index = fs::read_to_string(out.join(INDEX_FILE))?;
        assert!(index.contains("<title>Aura Log</title>"));
        Ok(())
    }

    #[tokio::test]
    async fn build_site_keeps_journal_when_enabled() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let content = dir.path().join("entries");
        fs::create_dir(&content)?;
        fs::write(
            content.join("202302011015.md"),
            "---\nsleep: false\n---\nRested.\n",
        )?;

        let config = Config {
            parse_journal: true,
            ..Config::default()
        };
        let out = dir.path().join("dist");
        build_site(
            &EntryStorageImpl::new(content),
            &config,
            &out,
            HeatmapTheme::Blue,
            BarOrientation::Column,
        )
        .await?;

        let entries = read_json(&out.join(ENTRIES_FILE))?;
        assert_eq!(entries[0]["content"], json!("Rested.\n"));

        let charts = read_json(&out.join(CHARTS_FILE))?;
        assert_eq!(charts[0]["options"]["chart"]["type"], json!("column"));
        Ok(())
    }

    #[tokio::test]
    async fn build_site_empty_journal() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let out = dir.path().join("dist");

        let report = build_site(
            &EntryStorageImpl::new(dir.path().join("missing")),
            &Config::default(),
            &out,
            HeatmapTheme::default(),
            BarOrientation::default(),
        )
        .await?;

        assert_eq!(report.entries, 0);
        // Without entries there is no year to draw a calendar for.
        assert_eq!(report.charts, 6);
        assert!(report.skipped.is_empty());
        assert_eq!(read_json(&out.join(ENTRIES_FILE))?, json!([]));
        Ok(())
    }
}
