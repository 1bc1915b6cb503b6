//! Decision results

use crate::config::UtilityTable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do about a claim
///
/// Variants are declared in tie-break order: when expected utilities are
/// equal, the earlier (more conservative) action wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    /// Stay silent
    NoAction,

    /// Interrupt with a clarifying question
    Dialogue,

    /// Proactively surface the claim
    AutonomousAction,
}

impl DecisionAction {
    /// Every action, in tie-break order
    pub const ALL: [DecisionAction; 3] = [
        DecisionAction::NoAction,
        DecisionAction::Dialogue,
        DecisionAction::AutonomousAction,
    ];

    /// Stable name
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionAction::NoAction => "no_action",
            DecisionAction::Dialogue => "dialogue",
            DecisionAction::AutonomousAction => "autonomous_action",
        }
    }
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected utility of each action
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExpectedUtilities {
    /// EU of staying silent
    pub no_action: f64,

    /// EU of asking
    pub dialogue: f64,

    /// EU of acting
    pub autonomous_action: f64,
}

impl ExpectedUtilities {
    /// EU of one action
    pub fn get(&self, action: DecisionAction) -> f64 {
        match action {
            DecisionAction::NoAction => self.no_action,
            DecisionAction::Dialogue => self.dialogue,
            DecisionAction::AutonomousAction => self.autonomous_action,
        }
    }

    /// Highest-EU action, earliest in tie-break order on ties
    pub fn best(&self) -> DecisionAction {
        let mut best = DecisionAction::NoAction;
        for action in DecisionAction::ALL {
            if self.get(action) > self.get(best) {
                best = action;
            }
        }
        best
    }
}

/// Full result of one decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionOutcome {
    /// Chosen action
    pub action: DecisionAction,

    /// EU of every action
    pub expected_utilities: ExpectedUtilities,

    /// Utility table after the attention adjustment
    pub utilities: UtilityTable,

    /// Focus after the focus-app bonus
    pub effective_focus: f64,

    /// p(goal) derived from the claim's confidence
    pub prior: f64,

    /// Set when the engine fell back to `no_action` on bad input
    pub error: Option<String>,
}

impl DecisionOutcome {
    /// True when this outcome is an error fallback
    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}
