//! JSON file sink for finalized summaries.

use async_trait::async_trait;
use scriba_core::{Result, ScribaError, SummaryResponse, SummarySink};
use std::path::PathBuf;

/// Persists finalized rolling summaries as `<dir>/<meeting_id>.json`.
///
/// The engine never calls this itself; the caller of finalize does.
pub struct JsonSummarySink {
    dir: PathBuf,
}

impl JsonSummarySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path a meeting's summary is written to.
    pub fn summary_path(&self, meeting_id: &str) -> PathBuf {
        self.dir.join(format!("{meeting_id}.json"))
    }

    /// Reads a previously persisted summary back.
    pub async fn load(&self, meeting_id: &str) -> Result<SummaryResponse> {
        let content = tokio::fs::read_to_string(self.summary_path(meeting_id)).await?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl SummarySink for JsonSummarySink {
    async fn persist(&self, meeting_id: &str, summary: &SummaryResponse) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.summary_path(meeting_id);
        let json = serde_json::to_string_pretty(summary)?;
        tokio::fs::write(&path, json).await.map_err(|err| {
            ScribaError::io(format!("Failed to write summary to {}: {err}", path.display()))
        })?;

        tracing::info!(meeting_id, path = %path.display(), "persisted final summary");
        Ok(())
    }
}
