//! Summary schema, merge engine, and the repair pipeline for raw backend
//! output.

pub mod merge;
pub mod model;
pub mod repair;

pub use model::{BlockKind, ContentBlock, MeetingNotes, People, Section, SummaryResponse};
pub use repair::{RepairError, repair_summary};
