//! Attention estimator configuration

use crate::error::AttentionError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for attention estimation and background sampling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttentionConfig {
    /// Milliseconds between background samples
    pub sample_interval_ms: u64,

    /// Milliseconds allowed for one frontmost-app query
    pub probe_timeout_ms: u64,

    /// Activity events older than this are pruned (seconds)
    pub history_window_secs: u64,

    /// Most activity events kept; the oldest are dropped first
    pub history_capacity: usize,

    /// Window for counting recent activity (seconds)
    pub activity_window_secs: u64,

    /// Recent-activity count that earns the full activity score
    pub max_activity_for_boost: usize,

    /// Weight of the application score
    pub app_weight: f64,

    /// Weight of the activity score
    pub activity_weight: f64,

    /// Idle time tolerated before any penalty (seconds)
    pub idle_grace_secs: f64,

    /// Idle time past the grace period that earns the full penalty (seconds)
    pub idle_penalty_window_secs: f64,

    /// Ceiling on the idle penalty
    pub max_idle_penalty: f64,

    /// Window for counting app switches (seconds)
    pub switch_window_secs: u64,

    /// Switches per minute tolerated before any penalty
    pub switch_threshold: f64,

    /// Switches per minute above the threshold that earn one unit of penalty
    pub switch_penalty_scale: f64,

    /// Ceiling on the switch penalty
    pub max_switch_penalty: f64,

    /// Score for deep-work applications
    pub focus_app_score: f64,

    /// Score for casual applications
    pub casual_app_score: f64,

    /// Score for anything else
    pub unknown_app_score: f64,

    /// Deep-work applications
    pub focus_apps: Vec<String>,

    /// Casual applications
    pub casual_apps: Vec<String>,
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 2000,
            probe_timeout_ms: 2000,
            history_window_secs: 300,
            history_capacity: 1000,
            activity_window_secs: 120,
            max_activity_for_boost: 20,
            app_weight: 0.7,
            activity_weight: 0.3,
            idle_grace_secs: 30.0,
            idle_penalty_window_secs: 300.0,
            max_idle_penalty: 0.8,
            switch_window_secs: 60,
            switch_threshold: 2.0,
            switch_penalty_scale: 10.0,
            max_switch_penalty: 0.5,
            focus_app_score: 0.9,
            casual_app_score: 0.2,
            unknown_app_score: 0.5,
            focus_apps: to_strings(&[
                "xcode",
                "visual studio code",
                "vscode",
                "intellij",
                "pycharm",
                "terminal",
                "iterm",
                "sublime text",
                "vim",
                "emacs",
                "android studio",
                "eclipse",
                "code",
                "phpstorm",
            ]),
            casual_apps: to_strings(&[
                "safari",
                "chrome",
                "firefox",
                "spotify",
                "music",
                "youtube",
                "slack",
                "discord",
                "messages",
                "facetime",
                "zoom",
                "teams",
                "netflix",
            ]),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl AttentionConfig {
    /// Background sampling period
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// Frontmost-app query timeout
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), AttentionError> {
        if self.sample_interval_ms == 0 {
            return Err(AttentionError::Config("sample_interval_ms must be > 0".to_string()));
        }
        if self.probe_timeout_ms == 0 {
            return Err(AttentionError::Config("probe_timeout_ms must be > 0".to_string()));
        }
        if self.history_capacity == 0 {
            return Err(AttentionError::Config("history_capacity must be > 0".to_string()));
        }
        if self.max_activity_for_boost == 0 {
            return Err(AttentionError::Config(
                "max_activity_for_boost must be > 0".to_string(),
            ));
        }
        if self.switch_window_secs == 0 {
            return Err(AttentionError::Config("switch_window_secs must be > 0".to_string()));
        }
        if !(self.idle_penalty_window_secs > 0.0 && self.switch_penalty_scale > 0.0) {
            return Err(AttentionError::Config(
                "penalty windows must be positive".to_string(),
            ));
        }

        let unit = [
            ("app_weight", self.app_weight),
            ("activity_weight", self.activity_weight),
            ("max_idle_penalty", self.max_idle_penalty),
            ("max_switch_penalty", self.max_switch_penalty),
            ("focus_app_score", self.focus_app_score),
            ("casual_app_score", self.casual_app_score),
            ("unknown_app_score", self.unknown_app_score),
        ];
        for (name, v) in unit {
            if !(0.0..=1.0).contains(&v) {
                return Err(AttentionError::Config(format!("{} must be in [0, 1], got {}", name, v)));
            }
        }
        Ok(())
    }

    /// Parse from TOML
    pub fn from_toml(s: &str) -> Result<Self, AttentionError> {
        toml::from_str(s).map_err(|e| AttentionError::Config(e.to_string()))
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String, AttentionError> {
        toml::to_string_pretty(self).map_err(|e| AttentionError::Config(e.to_string()))
    }
}
