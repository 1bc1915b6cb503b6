//! Decision engine configuration

use crate::error::DecisionError;
use serde::{Deserialize, Serialize};

/// Payoff of each action when the claimed goal is real (`*_true`) or not
/// (`*_false`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtilityTable {
    /// Staying silent while the user does need help
    pub no_action_true: f64,

    /// Staying silent when there was nothing to do
    pub no_action_false: f64,

    /// Asking a question that turns out useful
    pub dialogue_true: f64,

    /// Asking a question that was an interruption
    pub dialogue_false: f64,

    /// Acting on a goal the user really has
    pub action_true: f64,

    /// Acting on a goal the user does not have
    pub action_false: f64,
}

impl Default for UtilityTable {
    fn default() -> Self {
        Self {
            no_action_true: -0.6,
            no_action_false: 0.0,
            dialogue_true: 0.7,
            dialogue_false: -1.3,
            action_true: 1.0,
            action_false: -2.5,
        }
    }
}

impl UtilityTable {
    /// Copy of the table with both interruption penalties scaled
    pub fn with_penalty_multiplier(&self, multiplier: f64) -> Self {
        Self {
            dialogue_false: self.dialogue_false * multiplier,
            action_false: self.action_false * multiplier,
            ..*self
        }
    }

    /// Check the payoff ordering
    ///
    /// Acting must pay most when right and cost most when wrong, with
    /// dialogue strictly between silence and action on both axes.
    pub fn validate(&self) -> Result<(), DecisionError> {
        let all = [
            self.no_action_true,
            self.no_action_false,
            self.dialogue_true,
            self.dialogue_false,
            self.action_true,
            self.action_false,
        ];
        if all.iter().any(|u| !u.is_finite()) {
            return Err(DecisionError::Config("utilities must be finite".to_string()));
        }
        if !(self.no_action_true < self.dialogue_true && self.dialogue_true < self.action_true) {
            return Err(DecisionError::Config(
                "true-goal payoffs must increase from no_action to dialogue to action".to_string(),
            ));
        }
        if !(self.action_false < self.dialogue_false && self.dialogue_false < self.no_action_false)
        {
            return Err(DecisionError::Config(
                "false-goal penalties must be harshest for action, then dialogue".to_string(),
            ));
        }
        if self.dialogue_false > 0.0 || self.action_false > 0.0 {
            return Err(DecisionError::Config(
                "interruption penalties must not be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the mixed-initiative decision engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Base utility table
    pub utilities: UtilityTable,

    /// Focus above which interruptions are penalized harder (strict)
    pub high_focus_threshold: f64,

    /// Penalty multiplier applied above the high threshold (> 1)
    pub high_focus_amplification: f64,

    /// Focus below which interruptions are penalized less (strict)
    pub low_focus_threshold: f64,

    /// Penalty multiplier applied below the low threshold (0, 1]
    pub low_focus_dampening: f64,

    /// Added to focus when the frontmost app is a focus app (capped at 1.0)
    pub focus_app_bonus: f64,

    /// Applications that signal deep work (matched case-insensitively, exactly)
    pub focus_apps: Vec<String>,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            utilities: UtilityTable::default(),
            high_focus_threshold: 0.8,
            high_focus_amplification: 10.0,
            low_focus_threshold: 0.3,
            low_focus_dampening: 0.2,
            focus_app_bonus: 0.2,
            focus_apps: default_focus_apps(),
        }
    }
}

/// Default set of deep-work applications
pub fn default_focus_apps() -> Vec<String> {
    ["xcode", "vscode", "terminal", "intellij", "pycharm", "sublime"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl DecisionConfig {
    /// A configuration that interrupts less readily
    pub fn cautious() -> Self {
        Self {
            high_focus_threshold: 0.7,
            high_focus_amplification: 20.0,
            low_focus_threshold: 0.2,
            low_focus_dampening: 0.5,
            focus_app_bonus: 0.3,
            ..Default::default()
        }
    }

    /// A configuration that surfaces claims more readily
    pub fn eager() -> Self {
        Self {
            high_focus_threshold: 0.9,
            high_focus_amplification: 4.0,
            low_focus_threshold: 0.4,
            low_focus_dampening: 0.1,
            focus_app_bonus: 0.1,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), DecisionError> {
        self.utilities.validate()?;

        let unit = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(DecisionError::Config(format!("{} must be in [0, 1], got {}", name, v)))
            }
        };
        unit("high_focus_threshold", self.high_focus_threshold)?;
        unit("low_focus_threshold", self.low_focus_threshold)?;
        unit("focus_app_bonus", self.focus_app_bonus)?;

        if self.low_focus_threshold > self.high_focus_threshold {
            return Err(DecisionError::Config(
                "low_focus_threshold must not exceed high_focus_threshold".to_string(),
            ));
        }
        if !(self.high_focus_amplification.is_finite() && self.high_focus_amplification > 1.0) {
            return Err(DecisionError::Config(
                "high_focus_amplification must be greater than 1".to_string(),
            ));
        }
        if !(self.low_focus_dampening > 0.0 && self.low_focus_dampening <= 1.0) {
            return Err(DecisionError::Config(
                "low_focus_dampening must be in (0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse from TOML
    pub fn from_toml(s: &str) -> Result<Self, DecisionError> {
        toml::from_str(s).map_err(|e| DecisionError::Config(e.to_string()))
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String, DecisionError> {
        toml::to_string_pretty(self).map_err(|e| DecisionError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DecisionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.high_focus_threshold, 0.8);
        assert_eq!(config.focus_apps.len(), 6);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(DecisionConfig::cautious().validate().is_ok());
        assert!(DecisionConfig::eager().validate().is_ok());
    }

    #[test]
    fn test_rejects_misordered_utilities() {
        let mut config = DecisionConfig::default();
        config.utilities.dialogue_true = 2.0;
        assert!(config.validate().is_err());

        let mut config = DecisionConfig::default();
        config.utilities.action_false = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_multipliers() {
        let config = DecisionConfig {
            high_focus_amplification: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DecisionConfig {
            low_focus_dampening: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_crossed_thresholds() {
        let config = DecisionConfig {
            low_focus_threshold: 0.9,
            high_focus_threshold: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_penalty_multiplier_leaves_payoffs() {
        let table = UtilityTable::default().with_penalty_multiplier(10.0);
        assert!((table.dialogue_false + 13.0).abs() < 1e-12);
        assert_eq!(table.action_false, -25.0);
        assert_eq!(table.no_action_false, 0.0);
        assert_eq!(table.action_true, 1.0);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = DecisionConfig::cautious();
        let text = config.to_toml().unwrap();
        assert_eq!(DecisionConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = DecisionConfig::from_toml("focus_app_bonus = 0.1\n").unwrap();
        assert_eq!(config.focus_app_bonus, 0.1);
        assert_eq!(config.utilities, UtilityTable::default());
    }
}
