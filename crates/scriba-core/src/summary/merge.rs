//! Merge engine: folds a chunk summary into the rolling summary.

use super::model::{Section, SummaryResponse};

impl SummaryResponse {
    /// Merges a newly produced chunk summary into this rolling summary.
    ///
    /// Total, no failure path:
    /// - the meeting name is first-writer-wins: once set it is never
    ///   overwritten by a later chunk;
    /// - chunk blocks are appended to each named section in order, and the
    ///   rolling title is kept; an empty chunk section is a no-op;
    /// - meeting-notes sub-sections are appended, never merged by title;
    /// - no deduplication: overlapping content across chunks accumulates
    ///   as distinct blocks.
    ///
    /// Merging an all-empty chunk is the identity transformation.
    pub fn merge_chunk(&mut self, chunk: SummaryResponse) {
        if self.meeting_name.is_none() {
            if let Some(name) = chunk.meeting_name {
                self.meeting_name = Some(name);
            }
        }

        merge_section(&mut self.people, chunk.people);
        merge_section(&mut self.session_summary, chunk.session_summary);
        merge_section(&mut self.critical_deadlines, chunk.critical_deadlines);
        merge_section(&mut self.key_items_decisions, chunk.key_items_decisions);
        merge_section(
            &mut self.immediate_action_items,
            chunk.immediate_action_items,
        );
        merge_section(&mut self.next_steps, chunk.next_steps);

        self.meeting_notes
            .sections
            .extend(chunk.meeting_notes.sections);
    }
}

fn merge_section(rolling: &mut Section, chunk: Section) {
    rolling.blocks.extend(chunk.blocks);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::model::ContentBlock;

    fn chunk_with(name: Option<&str>, summary_lines: &[&str]) -> SummaryResponse {
        let mut chunk = SummaryResponse::empty();
        chunk.meeting_name = name.map(str::to_string);
        for line in summary_lines {
            chunk.session_summary.blocks.push(ContentBlock::text(*line));
        }
        chunk
    }

    #[test]
    fn merging_empty_chunk_is_identity() {
        let mut rolling = chunk_with(Some("Weekly Sync"), &["we discussed the roadmap"]);
        let before = rolling.clone();
        rolling.merge_chunk(SummaryResponse::empty());
        assert_eq!(rolling, before);
    }

    #[test]
    fn blocks_append_in_chunk_order() {
        let mut rolling = SummaryResponse::empty();
        rolling.merge_chunk(chunk_with(None, &["first", "second"]));
        rolling.merge_chunk(chunk_with(None, &["third"]));

        let contents: Vec<_> = rolling
            .session_summary
            .blocks
            .iter()
            .map(|b| b.content.as_str())
            .collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }

    #[test]
    fn meeting_name_is_first_writer_wins() {
        let mut rolling = SummaryResponse::empty();
        rolling.merge_chunk(chunk_with(Some("X"), &[]));
        rolling.merge_chunk(chunk_with(Some("Y"), &[]));
        assert_eq!(rolling.meeting_name.as_deref(), Some("X"));
    }

    #[test]
    fn rolling_titles_are_never_overwritten() {
        let mut rolling = SummaryResponse::empty();
        let mut chunk = SummaryResponse::empty();
        chunk.session_summary.title = "Zusammenfassung".into();
        chunk.session_summary.blocks.push(ContentBlock::text("x"));
        rolling.merge_chunk(chunk);
        assert_eq!(rolling.session_summary.title, "Session Summary");
        assert_eq!(rolling.session_summary.blocks.len(), 1);
    }

    #[test]
    fn notes_sub_sections_append_without_title_matching() {
        let mut rolling = SummaryResponse::empty();

        let mut chunk = SummaryResponse::empty();
        chunk.meeting_notes.sections.push(crate::summary::Section {
            title: "Budget".into(),
            blocks: vec![ContentBlock::text("Q3 numbers")],
        });
        rolling.merge_chunk(chunk.clone());
        rolling.merge_chunk(chunk);

        // Same title twice stays two distinct sub-sections.
        assert_eq!(rolling.meeting_notes.sections.len(), 2);
        assert_eq!(rolling.meeting_notes.sections[0].title, "Budget");
        assert_eq!(rolling.meeting_notes.sections[1].title, "Budget");
    }

    #[test]
    fn repeated_content_accumulates_as_distinct_blocks() {
        let mut rolling = SummaryResponse::empty();
        rolling.merge_chunk(chunk_with(None, &["same line"]));
        rolling.merge_chunk(chunk_with(None, &["same line"]));
        assert_eq!(rolling.session_summary.blocks.len(), 2);
    }
}
