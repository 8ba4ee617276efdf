//! Validation of structured-provider output.
//!
//! Structured providers are prompted for the exact summary schema and the
//! backend validates what comes back, re-requesting up to a small fixed
//! retry budget before surfacing failure. The only leniency granted here
//! is fence-stripping; casing and completeness must match the schema,
//! unlike raw-text output which goes through the full repair pipeline.

use scriba_core::CompletionError;
use scriba_core::SummaryResponse;
use scriba_core::summary::repair::strip_code_fence;

/// Extra attempts a structured backend makes when its output fails schema
/// validation.
pub(crate) const VALIDATION_RETRIES: u32 = 2;

/// Validates structured-provider text against the summary schema.
pub(crate) fn parse_structured(text: &str) -> Result<SummaryResponse, CompletionError> {
    let stripped = strip_code_fence(text);
    if stripped.trim().is_empty() {
        return Err(CompletionError::EmptyOutput);
    }
    serde_json::from_str(stripped).map_err(|err| CompletionError::InvalidOutput(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "MeetingName": "Sprint Review",
        "People": { "title": "People", "blocks": [] },
        "SessionSummary": { "title": "Session Summary", "blocks": [
            { "id": "b1", "type": "text", "content": "demoed the new flow", "color": "" }
        ] },
        "CriticalDeadlines": { "title": "Critical Deadlines", "blocks": [] },
        "KeyItemsDecisions": { "title": "Key Items & Decisions", "blocks": [] },
        "ImmediateActionItems": { "title": "Immediate Action Items", "blocks": [] },
        "NextSteps": { "title": "Next Steps", "blocks": [] },
        "MeetingNotes": { "sections": [] }
    }"#;

    #[test]
    fn accepts_exact_schema() {
        let summary = parse_structured(VALID).unwrap();
        assert_eq!(summary.meeting_name.as_deref(), Some("Sprint Review"));
        assert_eq!(summary.session_summary.blocks.len(), 1);
    }

    #[test]
    fn accepts_fenced_schema() {
        let fenced = format!("```json\n{VALID}\n```");
        assert!(parse_structured(&fenced).is_ok());
    }

    #[test]
    fn rejects_loose_casing() {
        // Structured providers do not get key repair.
        let loose = r#"{ "meetingname": "x" }"#;
        assert!(matches!(
            parse_structured(loose),
            Err(CompletionError::InvalidOutput(_))
        ));
    }

    #[test]
    fn empty_text_is_empty_output() {
        assert!(matches!(
            parse_structured("   "),
            Err(CompletionError::EmptyOutput)
        ));
    }
}
