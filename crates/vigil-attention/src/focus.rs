//! Pure focus scoring

use crate::config::AttentionConfig;
use std::collections::HashSet;

/// Scores applications by how much they suggest deep work
#[derive(Debug, Clone)]
pub struct AppClassifier {
    focus_apps: HashSet<String>,
    casual_apps: HashSet<String>,
    focus_score: f64,
    casual_score: f64,
    unknown_score: f64,
}

impl AppClassifier {
    /// Build a classifier from configuration
    pub fn new(config: &AttentionConfig) -> Self {
        let lower = |apps: &[String]| apps.iter().map(|a| a.trim().to_lowercase()).collect();
        Self {
            focus_apps: lower(&config.focus_apps),
            casual_apps: lower(&config.casual_apps),
            focus_score: config.focus_app_score,
            casual_score: config.casual_app_score,
            unknown_score: config.unknown_app_score,
        }
    }

    /// Score an application name
    ///
    /// Exact matches win; otherwise a substring match in either direction
    /// counts, focus apps before casual ones. Anything else is neutral.
    ///
    /// # Examples
    ///
    /// ```
    /// use vigil_attention::{AppClassifier, AttentionConfig};
    ///
    /// let classifier = AppClassifier::new(&AttentionConfig::default());
    /// assert_eq!(classifier.score("Xcode"), 0.9);
    /// assert_eq!(classifier.score("Google Chrome"), 0.2);
    /// assert_eq!(classifier.score("Calculator"), 0.5);
    /// ```
    pub fn score(&self, app: &str) -> f64 {
        let app = app.trim().to_lowercase();
        if app.is_empty() {
            return self.unknown_score;
        }

        if self.focus_apps.contains(&app) {
            return self.focus_score;
        }
        if self.casual_apps.contains(&app) {
            return self.casual_score;
        }

        let overlaps = |known: &String| app.contains(known.as_str()) || known.contains(app.as_str());
        if self.focus_apps.iter().any(overlaps) {
            return self.focus_score;
        }
        if self.casual_apps.iter().any(overlaps) {
            return self.casual_score;
        }
        self.unknown_score
    }
}

/// Raw signals feeding one focus computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusSignals {
    /// Application score from [`AppClassifier::score`]
    pub app_score: f64,

    /// Activity events in the recent-activity window
    pub recent_activity: usize,

    /// Seconds since the last activity
    pub idle_secs: f64,

    /// App switches per minute
    pub switch_frequency: f64,
}

/// Idle penalty in [0, max_idle_penalty]
pub fn idle_penalty(config: &AttentionConfig, idle_secs: f64) -> f64 {
    if idle_secs > config.idle_grace_secs {
        ((idle_secs - config.idle_grace_secs) / config.idle_penalty_window_secs)
            .min(config.max_idle_penalty)
    } else {
        0.0
    }
}

/// Switching penalty in [0, max_switch_penalty]
pub fn switch_penalty(config: &AttentionConfig, switch_frequency: f64) -> f64 {
    if switch_frequency > config.switch_threshold {
        ((switch_frequency - config.switch_threshold) / config.switch_penalty_scale)
            .min(config.max_switch_penalty)
    } else {
        0.0
    }
}

/// Combine signals into a focus level in [0, 1]
pub fn compute_focus(config: &AttentionConfig, signals: &FocusSignals) -> f64 {
    let activity_score =
        (signals.recent_activity as f64 / config.max_activity_for_boost as f64).min(1.0);
    let base = config.app_weight * signals.app_score + config.activity_weight * activity_score;

    let focus = base
        * (1.0 - idle_penalty(config, signals.idle_secs))
        * (1.0 - switch_penalty(config, signals.switch_frequency));

    if focus.is_finite() {
        focus.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
