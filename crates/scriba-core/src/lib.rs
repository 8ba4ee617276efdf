//! scriba-core - incremental meeting summarization engine.
//!
//! Ingests a live transcript as short text fragments and maintains a
//! continuously updated, structured rolling summary without re-summarizing
//! the whole transcript on every fragment. The crate covers the buffering
//! and flush policy, the completion backend abstraction, the repair
//! pipeline that coerces loose backend text into the summary schema, the
//! merge engine, and the per-meeting session lifecycle.
//!
//! Concrete HTTP backends live in `scriba-completion`; credential and
//! summary storage live in `scriba-infrastructure`.

pub mod backend;
pub mod buffer;
pub mod error;
pub mod registry;
pub mod session;
pub mod sink;
pub mod summary;

pub use backend::{
    BackendFactory, BackendSelection, CompletionBackend, CompletionError, CompletionOutput,
    CredentialStore, Provider,
};
pub use buffer::{DEFAULT_FLUSH_THRESHOLD, TranscriptBuffer};
pub use error::{Result, ScribaError};
pub use registry::{FinalizeOutcome, SessionRegistry};
pub use session::{MeetingSession, SessionStatus};
pub use sink::SummarySink;
pub use summary::{
    BlockKind, ContentBlock, MeetingNotes, People, RepairError, Section, SummaryResponse,
};
