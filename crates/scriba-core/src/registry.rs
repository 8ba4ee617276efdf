//! Session registry: the explicit session-manager object that owns every
//! live per-meeting session.
//!
//! Each session sits behind its own `Mutex`, so fragment submissions for
//! one meeting are processed strictly in order and the threshold check and
//! buffer reset form one atomic step; sessions for different meetings
//! progress independently while a completion call is in flight.

use crate::backend::{BackendFactory, BackendSelection, CredentialStore};
use crate::error::{Result, ScribaError};
use crate::session::MeetingSession;
use crate::summary::SummaryResponse;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

/// Outcome of a finalize call.
#[derive(Debug, Clone, PartialEq)]
pub enum FinalizeOutcome {
    /// The session was live; the final rolling summary is handed to the
    /// caller to persist.
    Finalized(SummaryResponse),
    /// No session for this meeting id. A repeated finalize lands here and
    /// is a benign success, not an error.
    AlreadyClosed,
}

/// Owns the live sessions, keyed by meeting id.
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Arc<Mutex<MeetingSession>>>>>,
    factory: Arc<dyn BackendFactory>,
    credentials: Arc<dyn CredentialStore>,
    shutdown: CancellationToken,
}

impl SessionRegistry {
    pub fn new(factory: Arc<dyn BackendFactory>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            factory,
            credentials,
            shutdown: CancellationToken::new(),
        }
    }

    /// Starts a new summarization session for a meeting.
    ///
    /// The credential resolution order is: explicit argument, then the
    /// credential store. Returns the effective backend selection so the
    /// caller can observe a provider substitution.
    ///
    /// # Errors
    ///
    /// - [`ScribaError::SessionExists`] when the meeting already has a
    ///   live session.
    /// - [`ScribaError::UnsupportedProvider`] /
    ///   [`ScribaError::MissingCredential`] on fatal initialization
    ///   failure; no session is registered.
    pub async fn start_session(
        &self,
        meeting_id: &str,
        provider_id: &str,
        model_id: &str,
        custom_prompt: &str,
        api_key: Option<String>,
    ) -> Result<BackendSelection> {
        tracing::info!(
            meeting_id,
            provider = provider_id,
            model = model_id,
            "starting summarization session"
        );

        // Cheap conflict check so a conflicting start performs no
        // credential IO. The authoritative check is under the write lock
        // below.
        if self.sessions.read().await.contains_key(meeting_id) {
            tracing::warn!(meeting_id, "summarization already in progress");
            return Err(ScribaError::SessionExists(meeting_id.to_string()));
        }

        let selection = BackendSelection::resolve(provider_id, model_id)?;

        // Credential resolution may touch the filesystem; keep it outside
        // the registry-wide lock so other meetings are not stalled.
        let credential = match api_key {
            Some(key) => Some(key),
            None => self.credentials.get_credential(selection.provider).await,
        };

        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(meeting_id) {
            tracing::warn!(meeting_id, "summarization already in progress");
            return Err(ScribaError::SessionExists(meeting_id.to_string()));
        }

        let backend = self.factory.create(&selection, credential).inspect_err(|err| {
            tracing::error!(meeting_id, error = %err, "failed to initialize backend");
        })?;

        let session = MeetingSession::new(
            meeting_id.to_string(),
            selection.clone(),
            custom_prompt.to_string(),
            backend,
            self.shutdown.child_token(),
        );
        sessions.insert(meeting_id.to_string(), Arc::new(Mutex::new(session)));

        tracing::info!(
            meeting_id,
            provider = %selection.provider,
            model = %selection.model,
            substituted = selection.substituted_from.is_some(),
            "summarization session initialized"
        );
        Ok(selection)
    }

    /// Submits a transcript fragment to a live session and returns the
    /// current rolling summary.
    ///
    /// # Errors
    ///
    /// [`ScribaError::NoSession`] when no session exists for the meeting;
    /// [`ScribaError::Cancelled`] when shutdown interrupts an in-flight
    /// completion. Chunk-local failures never surface here.
    pub async fn submit_fragment(
        &self,
        meeting_id: &str,
        fragment: &str,
        threshold: usize,
    ) -> Result<SummaryResponse> {
        let session = self.get_session(meeting_id).await?;

        // The per-session lock serializes submissions: no two flush cycles
        // for the same meeting can overlap, and a flush cannot race a
        // concurrent append.
        let mut session = session.lock().await;
        let rolling = session.push_fragment(fragment, threshold).await?;
        Ok(rolling.clone())
    }

    /// Finalizes a session: flushes the buffered remainder through one
    /// last cycle, releases backend resources, and removes the session.
    ///
    /// Finalize is terminal but benign to repeat: the session is removed
    /// from the registry before the final flush runs, so a second call
    /// observes absence and returns [`FinalizeOutcome::AlreadyClosed`]
    /// without any completion call or merge.
    pub async fn finalize(&self, meeting_id: &str) -> Result<FinalizeOutcome> {
        let removed = self.sessions.write().await.remove(meeting_id);
        let Some(session) = removed else {
            tracing::info!(meeting_id, "finalize for unknown session, treating as already closed");
            return Ok(FinalizeOutcome::AlreadyClosed);
        };

        tracing::info!(meeting_id, "finalizing summarization session");
        let mut session = session.lock().await;
        let final_summary = session.finalize().await?;
        Ok(FinalizeOutcome::Finalized(final_summary))
    }

    /// Meeting ids with a live session.
    pub async fn active_meetings(&self) -> Vec<String> {
        self.sessions.read().await.keys().cloned().collect()
    }

    /// Cancels all in-flight completion calls and releases every live
    /// session's backend resources.
    ///
    /// In-progress submissions surface [`ScribaError::Cancelled`]. The
    /// sessions are removed from the registry, so a later finalize
    /// observes [`FinalizeOutcome::AlreadyClosed`].
    pub async fn shutdown(&self) {
        tracing::info!("cancelling in-flight summarization work");
        self.shutdown.cancel();

        let drained: Vec<_> = self.sessions.write().await.drain().collect();
        for (meeting_id, session) in drained {
            let mut session = session.lock().await;
            session.release().await;
            tracing::info!(%meeting_id, "released session during shutdown");
        }
    }

    async fn get_session(&self, meeting_id: &str) -> Result<Arc<Mutex<MeetingSession>>> {
        let sessions = self.sessions.read().await;
        sessions
            .get(meeting_id)
            .cloned()
            .ok_or_else(|| ScribaError::NoSession(meeting_id.to_string()))
    }
}
