//! Per-meeting session engine.
//!
//! A [`MeetingSession`] owns the transcript buffer, the rolling summary,
//! and the completion backend for one meeting, and runs the
//! completion + normalize + merge cycle whenever the buffer crosses its
//! flush threshold.

use crate::backend::{BackendSelection, CompletionBackend, CompletionError, CompletionOutput};
use crate::buffer::TranscriptBuffer;
use crate::error::{Result, ScribaError};
use crate::summary::{SummaryResponse, repair_summary};
use tokio_util::sync::CancellationToken;

/// Builds the chunk prompt sent to every backend.
///
/// The instructions pin the wire contract: exactly one JSON object with
/// seven case-sensitive top-level keys, sections as `{title, blocks}`,
/// blocks as `{id, type, content, color}`. Any wording change here must
/// preserve that shape, because the merge engine depends on it.
pub fn build_chunk_prompt(custom_prompt: &str, chunk: &str) -> String {
    let mut prompt = String::new();
    if !custom_prompt.trim().is_empty() {
        prompt.push_str(custom_prompt.trim());
        prompt.push_str("\n\n");
    }
    prompt.push_str(
        "Analyze the following meeting transcript chunk. Your task is to extract key \
         information and format it as a single JSON object.\n\
         \n\
         Instructions:\n\
         - Your response MUST be a single, valid JSON object.\n\
         - The JSON object must have these keys: \"MeetingName\", \"People\", \
         \"SessionSummary\", \"CriticalDeadlines\", \"KeyItemsDecisions\", \
         \"ImmediateActionItems\", \"NextSteps\", \"MeetingNotes\".\n\
         - \"MeetingName\" should be a string or null.\n\
         - \"MeetingNotes\" should contain an object with a \"sections\" array of \
         {title, blocks} objects.\n\
         - The other top-level keys should contain an object with a \"title\" and a \
         \"blocks\" array.\n\
         - \"blocks\" must be an array of objects, where each object has \"id\" (string), \
         \"type\" (one of \"heading1\", \"heading2\", \"bullet\", \"text\"), \"content\" \
         (string), and \"color\" (string).\n\
         - If you cannot find any information for a key, its \"blocks\" array should be \
         empty.\n\
         - Respond ONLY with the JSON object.\n\
         \n\
         Transcript Chunk:\n\
         ---\n",
    );
    prompt.push_str(chunk);
    prompt.push_str("\n---\n");
    prompt
}

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Accepting fragment submissions.
    Accumulating,
    /// Finalized; rejects further fragments.
    Closed,
}

/// The per-meeting unit of state: buffer, rolling summary, and backend.
pub struct MeetingSession {
    meeting_id: String,
    selection: BackendSelection,
    custom_prompt: String,
    buffer: TranscriptBuffer,
    rolling: SummaryResponse,
    backend: Box<dyn CompletionBackend>,
    cancel: CancellationToken,
    status: SessionStatus,
    started_at: String,
}

impl MeetingSession {
    pub fn new(
        meeting_id: String,
        selection: BackendSelection,
        custom_prompt: String,
        backend: Box<dyn CompletionBackend>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            meeting_id,
            selection,
            custom_prompt,
            buffer: TranscriptBuffer::new(),
            rolling: SummaryResponse::empty(),
            backend,
            cancel,
            status: SessionStatus::Accumulating,
            started_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn meeting_id(&self) -> &str {
        &self.meeting_id
    }

    pub fn selection(&self) -> &BackendSelection {
        &self.selection
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn started_at(&self) -> &str {
        &self.started_at
    }

    /// The best-known-good rolling summary.
    pub fn rolling_summary(&self) -> &SummaryResponse {
        &self.rolling
    }

    /// Buffers a transcript fragment; a submission that crosses the flush
    /// threshold runs exactly one completion + normalize + merge cycle.
    ///
    /// Returns the current rolling summary even when the most recent chunk
    /// failed to merge: chunk-local failures are logged and dropped, never
    /// propagated. Only cancellation surfaces as an error.
    pub async fn push_fragment(
        &mut self,
        fragment: &str,
        threshold: usize,
    ) -> Result<&SummaryResponse> {
        if self.status == SessionStatus::Closed {
            return Err(ScribaError::NoSession(self.meeting_id.clone()));
        }

        tracing::debug!(
            meeting_id = %self.meeting_id,
            fragment_len = fragment.len(),
            buffered = self.buffer.len(),
            threshold,
            "buffering transcript fragment"
        );

        if let Some(chunk) = self.buffer.accumulate(fragment, threshold) {
            tracing::info!(
                meeting_id = %self.meeting_id,
                chunk_len = chunk.len(),
                "flush threshold reached, summarizing chunk"
            );
            self.run_flush_cycle(&chunk).await?;
        }

        Ok(&self.rolling)
    }

    /// Flushes any buffered remainder through one last cycle, releases the
    /// backend, and closes the session.
    ///
    /// The backend is released even when the final cycle is cancelled.
    pub async fn finalize(&mut self) -> Result<SummaryResponse> {
        let result = match self.buffer.flush_remainder() {
            Some(chunk) => {
                tracing::info!(
                    meeting_id = %self.meeting_id,
                    chunk_len = chunk.len(),
                    "processing final remaining chunk"
                );
                self.run_flush_cycle(&chunk).await
            }
            None => Ok(()),
        };

        self.backend.close().await;
        self.status = SessionStatus::Closed;
        result?;

        Ok(self.rolling.clone())
    }

    /// Releases the backend without running a final flush. Used when the
    /// registry shuts down with the session still live; buffered content
    /// is discarded.
    pub async fn release(&mut self) {
        self.backend.close().await;
        self.status = SessionStatus::Closed;
    }

    /// One completion + normalize + merge cycle over a flushed chunk.
    ///
    /// Error policy: cancellation propagates; every other failure (parse,
    /// validation, empty output, transport, anything unexpected) is logged
    /// with the meeting id and chunk size and the chunk is dropped. The
    /// rolling summary is only mutated by a fully validated chunk summary,
    /// so the caller always observes the best-known-good state.
    async fn run_flush_cycle(&mut self, chunk: &str) -> Result<()> {
        let prompt = build_chunk_prompt(&self.custom_prompt, chunk);

        let output = tokio::select! {
            _ = self.cancel.cancelled() => Err(CompletionError::Cancelled),
            output = self.backend.complete(&prompt) => output,
        };

        let chunk_summary = match output {
            Ok(CompletionOutput::Structured(summary)) => summary,
            Ok(CompletionOutput::Raw(text)) => match repair_summary(&text) {
                Ok(summary) => summary,
                Err(err) => {
                    tracing::error!(
                        meeting_id = %self.meeting_id,
                        chunk_len = chunk.len(),
                        error = %err,
                        "dropping chunk: raw output could not be repaired"
                    );
                    return Ok(());
                }
            },
            Err(CompletionError::Cancelled) => {
                tracing::info!(
                    meeting_id = %self.meeting_id,
                    "completion cancelled during shutdown"
                );
                return Err(ScribaError::Cancelled);
            }
            Err(err) => {
                tracing::error!(
                    meeting_id = %self.meeting_id,
                    chunk_len = chunk.len(),
                    error = %err,
                    "dropping chunk: completion failed"
                );
                return Ok(());
            }
        };

        self.rolling.merge_chunk(chunk_summary);
        tracing::debug!(
            meeting_id = %self.meeting_id,
            people = self.rolling.people.blocks.len(),
            session_summary = self.rolling.session_summary.blocks.len(),
            action_items = self.rolling.immediate_action_items.blocks.len(),
            "merged chunk into rolling summary"
        );
        Ok(())
    }
}
