//! Vigil Decision Engine
//!
//! Mixed-initiative decisions for freshly created or revised claims: stay
//! silent, ask a clarifying question, or act. The choice maximizes expected
//! utility under uncertainty about whether the claimed goal is real, with
//! interruption penalties scaled by the user's current focus.
//!
//! # Examples
//!
//! ```
//! use vigil_decision::{DecisionAction, DecisionConfig, DecisionEngine};
//! use vigil_domain::AttentionSnapshot;
//!
//! let engine = DecisionEngine::new(DecisionConfig::default()).unwrap();
//! let idle = AttentionSnapshot::new(0.2, "safari");
//! let outcome = engine.decide("Is planning a trip to Lisbon", Some(9), &idle);
//! assert_eq!(outcome.action, DecisionAction::AutonomousAction);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod error;
pub mod outcome;

pub use config::{DecisionConfig, UtilityTable};
pub use engine::{expected_utilities, DecisionEngine};
pub use error::DecisionError;
pub use outcome::{DecisionAction, DecisionOutcome, ExpectedUtilities};
