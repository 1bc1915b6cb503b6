//! Expected-utility decision over a claim and an attention snapshot

use crate::config::{DecisionConfig, UtilityTable};
use crate::error::DecisionError;
use crate::outcome::{DecisionAction, DecisionOutcome, ExpectedUtilities};
use std::collections::HashSet;
use vigil_domain::{AttentionSnapshot, Claim, Confidence};

/// Decides whether to stay silent, ask, or act on a claim
///
/// Deciding is a pure function of the configuration, the claim and the
/// snapshot. Bad input never fails the caller: it yields a `no_action`
/// outcome that carries the error message.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    config: DecisionConfig,
    focus_apps: HashSet<String>,
}

impl DecisionEngine {
    /// Create an engine after validating the configuration
    pub fn new(config: DecisionConfig) -> Result<Self, DecisionError> {
        config.validate()?;
        let focus_apps = config.focus_apps.iter().map(|a| a.to_lowercase()).collect();
        Ok(Self { config, focus_apps })
    }

    /// Engine with default configuration
    pub fn with_defaults() -> Self {
        let config = DecisionConfig::default();
        let focus_apps = config.focus_apps.iter().map(|a| a.to_lowercase()).collect();
        Self { config, focus_apps }
    }

    /// Active configuration
    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    /// Decide for a persisted claim
    pub fn evaluate_claim(&self, claim: &Claim, attention: &AttentionSnapshot) -> DecisionOutcome {
        self.decide(&claim.text, claim.confidence, attention)
    }

    /// Decide for a claim given its text and reported confidence
    ///
    /// # Examples
    ///
    /// ```
    /// use vigil_decision::{DecisionAction, DecisionEngine};
    /// use vigil_domain::AttentionSnapshot;
    ///
    /// let engine = DecisionEngine::with_defaults();
    /// let busy = AttentionSnapshot::new(0.9, "vscode");
    /// let outcome = engine.decide("Is refactoring the parser", Some(9), &busy);
    /// assert_eq!(outcome.action, DecisionAction::NoAction);
    /// ```
    pub fn decide(
        &self,
        claim_text: &str,
        confidence: Option<i32>,
        attention: &AttentionSnapshot,
    ) -> DecisionOutcome {
        let prior = Confidence::from_reported(confidence).prior();
        match self.try_decide(claim_text, prior, attention) {
            Ok(outcome) => outcome,
            Err(e) => DecisionOutcome {
                action: DecisionAction::NoAction,
                expected_utilities: ExpectedUtilities::default(),
                utilities: self.config.utilities,
                effective_focus: 0.0,
                prior,
                error: Some(e.to_string()),
            },
        }
    }

    fn try_decide(
        &self,
        claim_text: &str,
        prior: f64,
        attention: &AttentionSnapshot,
    ) -> Result<DecisionOutcome, DecisionError> {
        if claim_text.trim().is_empty() {
            return Err(DecisionError::InvalidInput("claim text is empty".to_string()));
        }

        let effective_focus = self.effective_focus(attention)?;
        let utilities = self.adjusted_utilities(effective_focus);
        let expected_utilities = expected_utilities(&utilities, prior);

        Ok(DecisionOutcome {
            action: expected_utilities.best(),
            expected_utilities,
            utilities,
            effective_focus,
            prior,
            error: None,
        })
    }

    /// Focus after clamping and the focus-app bonus
    pub fn effective_focus(&self, attention: &AttentionSnapshot) -> Result<f64, DecisionError> {
        if !attention.focus_level.is_finite() {
            return Err(DecisionError::InvalidInput(format!(
                "focus level is not finite: {}",
                attention.focus_level
            )));
        }

        let mut focus = attention.focus_level.clamp(0.0, 1.0);
        if self.is_focus_app(&attention.active_application) {
            focus = (focus + self.config.focus_app_bonus).min(1.0);
        }
        Ok(focus)
    }

    /// Whether the application is a configured focus app
    pub fn is_focus_app(&self, application: &str) -> bool {
        self.focus_apps.contains(&application.trim().to_lowercase())
    }

    /// Utility table with interruption penalties scaled for the focus level
    pub fn adjusted_utilities(&self, focus: f64) -> UtilityTable {
        let multiplier = if focus > self.config.high_focus_threshold {
            self.config.high_focus_amplification
        } else if focus < self.config.low_focus_threshold {
            self.config.low_focus_dampening
        } else {
            1.0
        };
        self.config.utilities.with_penalty_multiplier(multiplier)
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// EU(A) = p·u(A,T) + (1−p)·u(A,F)
pub fn expected_utilities(table: &UtilityTable, prior: f64) -> ExpectedUtilities {
    let eu = |t: f64, f: f64| prior * t + (1.0 - prior) * f;
    ExpectedUtilities {
        no_action: eu(table.no_action_true, table.no_action_false),
        dialogue: eu(table.dialogue_true, table.dialogue_false),
        autonomous_action: eu(table.action_true, table.action_false),
    }
}
