//! The typed shape of a meeting summary.
//!
//! These types pin the wire contract raw-text backends are prompted to
//! emit: one JSON object with seven PascalCase top-level keys, where each
//! section is `{title, blocks}` and each block is `{id, type, content,
//! color}`. The merge engine depends on this exact shape, so any prompt
//! change must preserve it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fixed enumeration of content block kinds.
///
/// Anything a backend emits outside this set is normalized to
/// [`BlockKind::Text`] by the repair pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Heading1,
    Heading2,
    Bullet,
    #[default]
    Text,
}

/// Atomic unit of summarized content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Opaque token, unique within a rolling summary. Synthesized when a
    /// backend omits it; never null.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub content: String,
    /// Optional display hint; empty string when absent.
    #[serde(default)]
    pub color: String,
}

impl ContentBlock {
    /// Creates a text block with a fresh synthesized id and no color hint.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            id: synthesize_block_id(),
            kind: BlockKind::Text,
            content: content.into(),
            color: String::new(),
        }
    }
}

/// Synthesizes a unique block id in the `block-<uuid8>` form.
pub fn synthesize_block_id() -> String {
    format!("block-{}", &Uuid::new_v4().simple().to_string()[..8])
}

/// A titled, ordered run of content blocks. Order is append-order and is
/// meaningful for display: most recent content last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub blocks: Vec<ContentBlock>,
}

impl Section {
    pub fn empty(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }
}

/// Participant entries. Same shape as [`Section`], different semantic
/// purpose.
pub type People = Section;

/// Free-form sub-sections for content that does not fit the fixed section
/// set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MeetingNotes {
    pub sections: Vec<Section>,
}

/// The rolling summary: the aggregate root holding everything known about
/// a meeting so far.
///
/// Invariant: once created it always has all six sections present
/// (possibly empty) and a meeting-notes container, so the merge engine
/// never has to handle a partially absent summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResponse {
    #[serde(rename = "MeetingName")]
    pub meeting_name: Option<String>,
    #[serde(rename = "People")]
    pub people: People,
    #[serde(rename = "SessionSummary")]
    pub session_summary: Section,
    #[serde(rename = "CriticalDeadlines")]
    pub critical_deadlines: Section,
    #[serde(rename = "KeyItemsDecisions")]
    pub key_items_decisions: Section,
    #[serde(rename = "ImmediateActionItems")]
    pub immediate_action_items: Section,
    #[serde(rename = "NextSteps")]
    pub next_steps: Section,
    #[serde(rename = "MeetingNotes")]
    pub meeting_notes: MeetingNotes,
}

impl SummaryResponse {
    /// Creates a rolling summary with all sections present and empty,
    /// titled with their canonical display names.
    pub fn empty() -> Self {
        Self {
            meeting_name: None,
            people: People::empty("People"),
            session_summary: Section::empty("Session Summary"),
            critical_deadlines: Section::empty("Critical Deadlines"),
            key_items_decisions: Section::empty("Key Items & Decisions"),
            immediate_action_items: Section::empty("Immediate Action Items"),
            next_steps: Section::empty("Next Steps"),
            meeting_notes: MeetingNotes::default(),
        }
    }

    /// True when the summary carries no name, no blocks anywhere, and no
    /// notes sub-sections. Merging such a summary is the identity.
    pub fn is_empty(&self) -> bool {
        self.meeting_name.is_none()
            && self.sections().iter().all(|s| s.blocks.is_empty())
            && self.meeting_notes.sections.is_empty()
    }

    /// The six named sections, in display order.
    pub fn sections(&self) -> [&Section; 6] {
        [
            &self.people,
            &self.session_summary,
            &self.critical_deadlines,
            &self.key_items_decisions,
            &self.immediate_action_items,
            &self.next_steps,
        ]
    }
}

impl Default for SummaryResponse {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_has_all_sections() {
        let summary = SummaryResponse::empty();
        assert!(summary.is_empty());
        assert_eq!(summary.people.title, "People");
        assert_eq!(summary.next_steps.title, "Next Steps");
        assert!(summary.meeting_notes.sections.is_empty());
    }

    #[test]
    fn wire_keys_are_pascal_case() {
        let json = serde_json::to_value(SummaryResponse::empty()).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "MeetingName",
            "People",
            "SessionSummary",
            "CriticalDeadlines",
            "KeyItemsDecisions",
            "ImmediateActionItems",
            "NextSteps",
            "MeetingNotes",
        ] {
            assert!(obj.contains_key(key), "missing wire key {key}");
        }
    }

    #[test]
    fn block_kind_wire_strings() {
        let block = ContentBlock {
            id: "block-1".into(),
            kind: BlockKind::Heading1,
            content: "Agenda".into(),
            color: String::new(),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "heading1");

        let parsed: ContentBlock =
            serde_json::from_value(serde_json::json!({
                "id": "b",
                "type": "bullet",
                "content": "point",
                "color": "red"
            }))
            .unwrap();
        assert_eq!(parsed.kind, BlockKind::Bullet);
    }

    #[test]
    fn synthesized_ids_are_unique() {
        let a = synthesize_block_id();
        let b = synthesize_block_id();
        assert!(a.starts_with("block-"));
        assert_ne!(a, b);
    }
}
