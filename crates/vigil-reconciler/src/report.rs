//! Outcome of one reconciliation cycle

use vigil_domain::{Claim, ClaimId, ObservationId};

/// What a committed batch changed in the corpus
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Observations persisted from the batch
    pub observations: Vec<ObservationId>,

    /// Drafts proposed by the inference service
    pub drafted: usize,

    /// Existing claims judged identical to a draft; they only gained links
    pub identical: Vec<ClaimId>,

    /// Drafts dropped because they restated a claim already known
    pub discarded: Vec<ClaimId>,

    /// Claims deleted by a similar-cluster merge
    pub merged: Vec<ClaimId>,

    /// Claims produced by the merge
    pub revised: Vec<Claim>,

    /// New claims kept as they were drafted
    pub unrelated: Vec<Claim>,

    /// Pre-existing claims labeled unrelated; they only gained links
    pub unrelated_existing: Vec<ClaimId>,

    /// Observation links added
    pub links_added: usize,

    /// The consolidation counter reached its trigger and was reset
    pub consolidation_due: bool,
}

impl ReconcileReport {
    /// Claims that go to the decision engine: revised first, then new
    pub fn claims_to_evaluate(&self) -> impl Iterator<Item = &Claim> {
        self.revised.iter().chain(self.unrelated.iter())
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{} observations, {} drafts: {} identical, {} merged into {}, {} new, {} links added",
            self.observations.len(),
            self.drafted,
            self.identical.len(),
            self.merged.len(),
            self.revised.len(),
            self.unrelated.len(),
            self.links_added
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_domain::{ClaimDraft, RevisionGroup};

    fn claim(text: &str) -> Claim {
        Claim::from_draft(ClaimDraft::new(text, ""), RevisionGroup::new(), 0)
    }

    #[test]
    fn test_revised_evaluated_before_new() {
        let report = ReconcileReport {
            revised: vec![claim("merged")],
            unrelated: vec![claim("fresh one"), claim("fresh two")],
            identical: vec![ClaimId::new()],
            ..Default::default()
        };
        let order: Vec<_> = report.claims_to_evaluate().map(|c| c.text.as_str()).collect();
        assert_eq!(order, ["merged", "fresh one", "fresh two"]);
    }

    #[test]
    fn test_empty_report_evaluates_nothing() {
        let report = ReconcileReport::default();
        assert_eq!(report.claims_to_evaluate().count(), 0);
        assert!(report.summary().starts_with("0 observations"));
    }
}
