//! Prompt construction for drafting, relation labeling and revision

use vigil_domain::{Claim, Observation};

/// Prompt asking for claims about the user from a block of observations
pub fn build_draft_prompt(user_name: &str, observations: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(&DRAFT_INSTRUCTIONS.replace("{user_name}", user_name));
    prompt.push_str("\n\nObservations:\n");
    prompt.push_str("---\n");
    prompt.push_str(observations.trim());
    prompt.push_str("\n---\n\n");
    prompt.push_str(CLAIMS_FORMAT);

    prompt
}

/// Prompt asking how the pool's claims relate to each other
///
/// Claims are numbered from 1 in pool order; the model answers with those
/// numbers, which [`crate::parser::parse_relations`] maps back to ids.
pub fn build_relation_prompt(pool: &[Claim]) -> String {
    let blocks: Vec<String> = pool
        .iter()
        .enumerate()
        .map(|(idx, c)| format!("[id={}] {}\n    Reasoning: {}", idx + 1, c.text, c.reasoning))
        .collect();

    let mut prompt = String::new();
    prompt.push_str(RELATION_INSTRUCTIONS);
    prompt.push_str("\n\nClaims:\n");
    prompt.push_str(&blocks.join("\n\n"));
    prompt.push_str("\n\n");
    prompt.push_str(RELATIONS_FORMAT);
    prompt
}

/// Prompt asking for a revised set of claims covering a similar cluster
///
/// Every supporting observation given is included; the caller decides how
/// many to show.
pub fn build_revision_prompt(cluster: &[Claim], observations: &[Observation]) -> String {
    let mut body: Vec<String> = cluster
        .iter()
        .enumerate()
        .map(|(idx, c)| format!("Claim {}: {}\nReasoning: {}", idx + 1, c.text, c.reasoning))
        .collect();

    if !observations.is_empty() {
        body.push("\nSupporting observations:".to_string());
        body.extend(observations.iter().map(|o| format!("- {}", o.content)));
    }

    let mut prompt = String::new();
    prompt.push_str(REVISION_INSTRUCTIONS);
    prompt.push_str("\n\n");
    prompt.push_str(&body.join("\n"));
    prompt.push_str("\n\n");
    prompt.push_str(CLAIMS_FORMAT);
    prompt
}

const DRAFT_INSTRUCTIONS: &str = r#"You are building a model of {user_name} from traces of their computer activity.
Read the observations below and propose claims about {user_name}: their goals,
habits, preferences, skills and current tasks.

Rules:
- One idea per claim
- Each claim must be supported by the observations; explain the support in "reasoning"
- "confidence" is an integer from 1 (weak guess) to 10 (certain)
- "decay" is an integer from 1 (true for years) to 10 (stale within the hour)
- Prefer a few well-supported claims over many speculative ones"#;

const RELATION_INSTRUCTIONS: &str = r#"Compare the numbered claims below and label how each relates to the others.

Labels:
- IDENTICAL: states the same thing as the target claims
- SIMILAR: overlaps with the target claims and should be merged with them
- UNRELATED: independent of every other claim

Give every claim exactly one entry. Targets are the ids it is IDENTICAL or SIMILAR to."#;

const REVISION_INSTRUCTIONS: &str = r#"The claims below overlap. Rewrite them into a smaller set of claims that
keeps every distinct idea, resolves contradictions using the supporting
observations, and adjusts confidence to the combined evidence."#;

const CLAIMS_FORMAT: &str = r#"Output format (JSON object only, no additional text):
{
  "claims": [
    {
      "claim": "statement about the user",
      "reasoning": "why the observations support it",
      "confidence": 1-10,
      "decay": 1-10
    }
  ]
}"#;

const RELATIONS_FORMAT: &str = r#"Output format (JSON object only, no additional text):
{
  "relations": [
    { "source": 1, "label": "IDENTICAL|SIMILAR|UNRELATED", "target": [2] }
  ]
}"#;
