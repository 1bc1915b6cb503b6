//! SemanticInference on top of any LlmProvider

use crate::parser::{parse_drafts, parse_relations};
use crate::prompt::{build_draft_prompt, build_relation_prompt, build_revision_prompt};
use crate::{LlmConfig, LlmError, LlmProvider};
use async_trait::async_trait;
use tracing::debug;
use vigil_domain::traits::SemanticInference;
use vigil_domain::{Claim, ClaimDraft, Observation, RelationLabel};

/// Inference service that prompts an LLM and parses its JSON replies
pub struct LlmInference<P> {
    provider: P,
    user_name: String,
}

impl<P: LlmProvider> LlmInference<P> {
    /// Wrap a provider with default prompt settings
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, &LlmConfig::default())
    }

    /// Wrap a provider using prompt settings from configuration
    pub fn with_config(provider: P, config: &LlmConfig) -> Self {
        Self {
            provider,
            user_name: config.user_name.clone(),
        }
    }

    /// The underlying provider
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P: LlmProvider> SemanticInference for LlmInference<P> {
    type Error = LlmError;

    async fn draft_claims(&self, observations: &str) -> Result<Vec<ClaimDraft>, Self::Error> {
        let prompt = build_draft_prompt(&self.user_name, observations);
        let response = self.provider.generate(&prompt).await?;
        let drafts = parse_drafts(&response)?;
        debug!("Drafted {} claims", drafts.len());
        Ok(drafts)
    }

    async fn classify_relations(&self, pool: &[Claim]) -> Result<Vec<RelationLabel>, Self::Error> {
        if pool.is_empty() {
            return Ok(Vec::new());
        }
        let prompt = build_relation_prompt(pool);
        let response = self.provider.generate(&prompt).await?;
        let labels = parse_relations(&response, pool)?;
        debug!("Labeled {} relations over a pool of {}", labels.len(), pool.len());
        Ok(labels)
    }

    async fn revise_cluster(
        &self,
        cluster: &[Claim],
        observations: &[Observation],
    ) -> Result<Vec<ClaimDraft>, Self::Error> {
        let prompt = build_revision_prompt(cluster, observations);
        let response = self.provider.generate(&prompt).await?;
        let drafts = parse_drafts(&response)?;
        debug!("Revised cluster of {} into {} claims", cluster.len(), drafts.len());
        Ok(drafts)
    }
}
