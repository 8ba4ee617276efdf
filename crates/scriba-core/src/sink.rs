//! Persistence seam for finalized summaries.

use crate::error::Result;
use crate::summary::SummaryResponse;
use async_trait::async_trait;

/// A sink accepting a finalized rolling summary.
///
/// The engine never persists anything itself: the caller of
/// `SessionRegistry::finalize` hands the returned summary to a sink of its
/// choosing. `scriba-infrastructure` provides a JSON file implementation.
#[async_trait]
pub trait SummarySink: Send + Sync {
    async fn persist(&self, meeting_id: &str, summary: &SummaryResponse) -> Result<()>;
}
