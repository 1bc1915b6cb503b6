//! Parse LLM output into drafts and relation labels

use crate::LlmError;
use serde_json::Value;
use tracing::warn;
use vigil_domain::{Claim, ClaimDraft, RelationKind, RelationLabel};

/// Parse a drafting or revision response into claim drafts
///
/// Accepts a bare array or an object holding a `claims` (or `propositions`)
/// array. Items that are malformed or have blank text are skipped with a
/// warning.
pub fn parse_drafts(response: &str) -> Result<Vec<ClaimDraft>, LlmError> {
    let json = parse_json(response)?;
    let items = top_level_array(&json, &["claims", "propositions"])?;

    let mut drafts = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        match parse_draft_json(item) {
            Ok(draft) => drafts.push(draft),
            Err(e) => warn!("Failed to parse claim {}: {}", idx, e),
        }
    }
    Ok(drafts)
}

/// Parse a relation response against the pool it was asked about
///
/// `source` and `target` are 1-based positions in `pool`. Entries with an
/// unknown label or an out-of-range source are skipped; out-of-range targets
/// are dropped from their entry.
pub fn parse_relations(response: &str, pool: &[Claim]) -> Result<Vec<RelationLabel>, LlmError> {
    let json = parse_json(response)?;
    let items = top_level_array(&json, &["relations"])?;

    let resolve = |v: &Value| -> Option<vigil_domain::ClaimId> {
        let n = as_index(v)?;
        pool.get(n.checked_sub(1)?).map(|c| c.id)
    };

    let mut labels = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            warn!("Relation {} is not a JSON object", idx);
            continue;
        };

        let Some(kind) = obj.get("label").and_then(Value::as_str).and_then(RelationKind::parse)
        else {
            warn!("Relation {} has a missing or unknown label", idx);
            continue;
        };

        let Some(source) = obj.get("source").and_then(resolve) else {
            warn!("Relation {} refers to an unknown source", idx);
            continue;
        };

        let targets = match obj.get("target").or_else(|| obj.get("targets")) {
            Some(Value::Array(values)) => values.iter().filter_map(resolve).collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(single) => resolve(single).into_iter().collect(),
        };

        labels.push(RelationLabel::new(source, kind).with_targets(targets));
    }
    Ok(labels)
}

fn parse_json(response: &str) -> Result<Value, LlmError> {
    let json_str = extract_json(response)?;
    serde_json::from_str(&json_str)
        .map_err(|e| LlmError::InvalidResponse(format!("JSON parse error: {}", e)))
}

fn top_level_array<'a>(json: &'a Value, keys: &[&str]) -> Result<&'a Vec<Value>, LlmError> {
    if let Some(items) = json.as_array() {
        return Ok(items);
    }
    keys.iter()
        .find_map(|k| json.get(*k).and_then(Value::as_array))
        .ok_or_else(|| {
            LlmError::InvalidResponse(format!("Expected a JSON array or one of {:?}", keys))
        })
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, LlmError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(LlmError::InvalidResponse("Empty code block".to_string()));
        }

        // Skip the opening fence and, if present, the closing one
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        Ok(lines[1..end].join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

fn parse_draft_json(json: &Value) -> Result<ClaimDraft, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Claim is not a JSON object".to_string())?;

    let text = obj
        .get("claim")
        .or_else(|| obj.get("proposition"))
        .or_else(|| obj.get("text"))
        .and_then(Value::as_str)
        .map(str::trim)
        .ok_or_else(|| "Missing or invalid 'claim'".to_string())?;
    if text.is_empty() {
        return Err("Claim text is empty".to_string());
    }

    let reasoning = obj
        .get("reasoning")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim();

    Ok(ClaimDraft {
        text: text.to_string(),
        reasoning: reasoning.to_string(),
        confidence: obj.get("confidence").and_then(as_int),
        decay: obj.get("decay").and_then(as_int),
    })
}

/// Integers may arrive as JSON numbers, floats or numeric strings
fn as_int(v: &Value) -> Option<i32> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
            .map(|i| i.clamp(i32::MIN as i64, i32::MAX as i64) as i32),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

fn as_index(v: &Value) -> Option<usize> {
    match v {
        Value::Number(n) => n.as_u64().map(|u| u as usize),
        Value::String(s) => s.trim().trim_start_matches("id=").parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_domain::RevisionGroup;

    fn pool(n: usize) -> Vec<Claim> {
        (0..n)
            .map(|i| Claim::from_draft(ClaimDraft::new(format!("c{i}"), ""), RevisionGroup::new(), 0))
            .collect()
    }

    #[test]
    fn test_parse_drafts_object_form() {
        let response = r#"{"claims": [
            {"claim": "Writes Rust", "reasoning": "lib.rs open", "confidence": 8, "decay": 2}
        ]}"#;
        let drafts = parse_drafts(response).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].text, "Writes Rust");
        assert_eq!(drafts[0].confidence, Some(8));
        assert_eq!(drafts[0].decay, Some(2));
    }

    #[test]
    fn test_parse_drafts_proposition_alias_and_array() {
        let response = r#"[{"proposition": "Likes jazz", "reasoning": "music app"}]"#;
        let drafts = parse_drafts(response).unwrap();
        assert_eq!(drafts[0].text, "Likes jazz");
        assert_eq!(drafts[0].confidence, None);
    }

    #[test]
    fn test_parse_drafts_with_markdown_wrapper() {
        let response = "```json\n{\"claims\": [{\"claim\": \"Uses vim\"}]}\n```";
        let drafts = parse_drafts(response).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].reasoning, "");
    }

    #[test]
    fn test_parse_drafts_skips_invalid_items() {
        let response = r#"{"claims": [
            {"claim": "Valid"},
            {"reasoning": "no text"},
            {"claim": "   "},
            42,
            {"claim": "Also valid", "confidence": "7"}
        ]}"#;
        let drafts = parse_drafts(response).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[1].confidence, Some(7));
    }

    #[test]
    fn test_parse_drafts_float_confidence_rounds() {
        let drafts = parse_drafts(r#"[{"claim": "x", "confidence": 7.6}]"#).unwrap();
        assert_eq!(drafts[0].confidence, Some(8));
    }

    #[test]
    fn test_parse_drafts_rejects_non_json() {
        assert!(matches!(
            parse_drafts("This is not JSON"),
            Err(LlmError::InvalidResponse(_))
        ));
        assert!(parse_drafts(r#"{"other": []}"#).is_err());
    }

    #[test]
    fn test_parse_relations_maps_positions_to_ids() {
        let p = pool(3);
        let response = r#"{"relations": [
            {"source": 1, "label": "SIMILAR", "target": [2, 9]},
            {"source": "3", "label": "unrelated", "target": null},
            {"source": 7, "label": "IDENTICAL", "target": [1]},
            {"source": 2, "label": "MAYBE"}
        ]}"#;
        let labels = parse_relations(response, &p).unwrap();

        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].source, p[0].id);
        assert_eq!(labels[0].kind, RelationKind::Similar);
        assert_eq!(labels[0].targets, vec![p[1].id]);
        assert_eq!(labels[1].source, p[2].id);
        assert_eq!(labels[1].kind, RelationKind::Unrelated);
        assert!(labels[1].targets.is_empty());
    }

    #[test]
    fn test_parse_relations_single_target() {
        let p = pool(2);
        let labels =
            parse_relations(r#"[{"source": 2, "label": "IDENTICAL", "target": 1}]"#, &p).unwrap();
        assert_eq!(labels[0].targets, vec![p[0].id]);
    }

    #[test]
    fn test_parse_relations_zero_is_out_of_range() {
        let p = pool(1);
        let labels = parse_relations(r#"[{"source": 0, "label": "UNRELATED"}]"#, &p).unwrap();
        assert!(labels.is_empty());
    }

    #[test]
    fn test_extract_json_from_plain_json() {
        let json = r#"{"key": "value"}"#;
        assert_eq!(extract_json(json).unwrap(), json);
    }

    #[test]
    fn test_extract_json_unterminated_fence() {
        let response = "```\n{\"key\": \"value\"}";
        assert_eq!(extract_json(response).unwrap(), "{\"key\": \"value\"}");
    }
}
