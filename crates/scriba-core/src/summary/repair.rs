//! Structured-output normalizer/repairer.
//!
//! Raw-text backends are not contractually obligated to honor exact schema
//! casing or completeness, so their output goes through an ordered pipeline
//! of pure steps: fence-strip, parse, key-normalize, block-repair,
//! validate. The result is a guaranteed-valid [`SummaryResponse`] the merge
//! engine can fold in unconditionally, or a chunk-fatal failure.

use super::model::{BlockKind, SummaryResponse, synthesize_block_id};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// The seven required top-level keys of the wire contract, in canonical
/// casing. `MeetingName` is handled separately because it is a nullable
/// string rather than a section.
const REQUIRED_SECTION_KEYS: [&str; 7] = [
    "People",
    "SessionSummary",
    "CriticalDeadlines",
    "KeyItemsDecisions",
    "ImmediateActionItems",
    "NextSteps",
    "MeetingNotes",
];

/// Failure to coerce backend text into a schema-valid summary. Both
/// variants are chunk-fatal: the chunk is dropped, never re-queued.
#[derive(Error, Debug)]
pub enum RepairError {
    #[error("Chunk output is not valid JSON: {0}")]
    Parse(serde_json::Error),
    #[error("Normalized chunk failed schema validation: {0}")]
    Validate(serde_json::Error),
    #[error("Chunk output is not a JSON object")]
    NotAnObject,
}

/// Runs the full repair pipeline over raw backend text.
pub fn repair_summary(raw: &str) -> Result<SummaryResponse, RepairError> {
    let stripped = strip_code_fence(raw);
    let parsed: Value = serde_json::from_str(stripped).map_err(RepairError::Parse)?;
    let Value::Object(raw_obj) = parsed else {
        return Err(RepairError::NotAnObject);
    };

    let mut normalized = Value::Object(normalize_keys(raw_obj));
    repair_blocks(&mut normalized);

    serde_json::from_value(normalized).map_err(RepairError::Validate)
}

/// Strips a markdown code-fence wrapper if present.
///
/// Detection is by a fence marker at the start of the trimmed text; when
/// found, the substring between the first `{` and the last `}` is
/// extracted. Text without a fence passes through trimmed.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
            if start < end {
                return &trimmed[start..=end];
            }
        }
    }
    trimmed
}

/// Rebuilds the top-level object with canonical key casing, backfilling
/// the sections and notes container a sloppy backend left out.
///
/// A key in the raw object matches a required key case-insensitively; the
/// first match wins. Missing sections synthesize `{title: <key>, blocks:
/// []}`, missing notes synthesize `{sections: []}`, a missing name becomes
/// null. This guarantees the merge engine never sees a missing section.
pub fn normalize_keys(raw: Map<String, Value>) -> Map<String, Value> {
    let mut normalized = Map::new();

    for required in REQUIRED_SECTION_KEYS {
        let found = raw
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(required))
            .map(|(_, v)| v.clone());
        let value = match found {
            Some(v) => v,
            None if required == "MeetingNotes" => json!({ "sections": [] }),
            None => json!({ "title": required, "blocks": [] }),
        };
        normalized.insert(required.to_string(), value);
    }

    let name = raw
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("MeetingName"))
        .map(|(_, v)| v.clone())
        .unwrap_or(Value::Null);
    normalized.insert("MeetingName".to_string(), name);

    normalized
}

/// Recursively repairs anything that looks like a content block.
///
/// An object with a `content` key gets: a valid `type` (defaulted to
/// `text` when missing or outside the enumeration), a synthesized unique
/// `id` when missing or empty, and a `color` defaulted to the empty
/// string.
pub fn repair_blocks(value: &mut Value) {
    match value {
        Value::Object(obj) => {
            if obj.contains_key("content") {
                let kind_is_valid = obj
                    .get("type")
                    .and_then(Value::as_str)
                    .is_some_and(|s| serde_json::from_value::<BlockKind>(json!(s)).is_ok());
                if !kind_is_valid {
                    obj.insert("type".to_string(), json!("text"));
                }

                let id_missing = obj
                    .get("id")
                    .and_then(Value::as_str)
                    .is_none_or(str::is_empty);
                if id_missing {
                    obj.insert("id".to_string(), json!(synthesize_block_id()));
                }

                if !obj.contains_key("color") {
                    obj.insert("color".to_string(), json!(""));
                }

                // Coerce non-string content so validation stays total for
                // blocks a model filled with numbers or nulls.
                if let Some(content) = obj.get("content") {
                    if !content.is_string() {
                        let coerced = match content {
                            Value::Null => String::new(),
                            other => other.to_string(),
                        };
                        obj.insert("content".to_string(), json!(coerced));
                    }
                }
            }

            for (_, v) in obj.iter_mut() {
                repair_blocks(v);
            }
        }
        Value::Array(items) => {
            for item in items {
                repair_blocks(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fenced_json() {
        let fenced = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fence(fenced), "{\"a\": 1}");

        let bare = "  {\"a\": 1}  ";
        assert_eq!(strip_code_fence(bare), "{\"a\": 1}");
    }

    #[test]
    fn fence_without_braces_passes_through() {
        assert_eq!(strip_code_fence("```\nnot json\n```"), "```\nnot json\n```");
    }

    #[test]
    fn normalize_backfills_missing_keys() {
        let raw = serde_json::from_str::<Value>(r#"{"sessionsummary": {"title": "s", "blocks": []}}"#)
            .unwrap();
        let Value::Object(raw) = raw else { unreachable!() };
        let normalized = normalize_keys(raw);

        for key in REQUIRED_SECTION_KEYS {
            assert!(normalized.contains_key(key), "missing {key}");
        }
        assert_eq!(normalized["SessionSummary"]["title"], "s");
        assert_eq!(normalized["People"]["title"], "People");
        assert_eq!(normalized["MeetingNotes"], json!({ "sections": [] }));
        assert_eq!(normalized["MeetingName"], Value::Null);
    }

    #[test]
    fn normalize_matches_name_case_insensitively() {
        let raw = serde_json::from_str::<Value>(r#"{"meetingname": "Standup"}"#).unwrap();
        let Value::Object(raw) = raw else { unreachable!() };
        let normalized = normalize_keys(raw);
        assert_eq!(normalized["MeetingName"], "Standup");
    }

    #[test]
    fn repair_defaults_block_fields() {
        let mut value = json!({
            "blocks": [
                { "content": "no id or type" },
                { "id": "", "type": "h1", "content": "bad type, empty id" },
                { "id": "keep", "type": "bullet", "content": "already fine", "color": "red" }
            ]
        });
        repair_blocks(&mut value);

        let blocks = value["blocks"].as_array().unwrap();
        assert_eq!(blocks[0]["type"], "text");
        assert!(blocks[0]["id"].as_str().unwrap().starts_with("block-"));
        assert_eq!(blocks[0]["color"], "");

        assert_eq!(blocks[1]["type"], "text");
        assert!(!blocks[1]["id"].as_str().unwrap().is_empty());

        assert_eq!(blocks[2]["id"], "keep");
        assert_eq!(blocks[2]["type"], "bullet");
        assert_eq!(blocks[2]["color"], "red");
    }

    #[test]
    fn pipeline_is_total_for_any_json_object() {
        // One recognizable key, wrong casing, fenced, blocks missing
        // everything but content.
        let raw = r#"```json
        {
            "KEYITEMSDECISIONS": { "title": "decisions", "blocks": [ { "content": "ship it" } ] },
            "unrelated": 42
        }
        ```"#;

        let summary = repair_summary(raw).unwrap();
        assert_eq!(summary.key_items_decisions.blocks.len(), 1);
        assert_eq!(summary.key_items_decisions.blocks[0].content, "ship it");
        assert_eq!(summary.key_items_decisions.blocks[0].kind, BlockKind::Text);
        assert!(summary.meeting_name.is_none());
        assert!(summary.people.blocks.is_empty());
    }

    #[test]
    fn pipeline_rejects_non_json() {
        assert!(matches!(
            repair_summary("the meeting went well"),
            Err(RepairError::Parse(_))
        ));
        assert!(matches!(
            repair_summary("[1, 2, 3]"),
            Err(RepairError::NotAnObject)
        ));
    }
}
