//! Attention snapshot - the user's momentary focus

/// Application name used when the frontmost app cannot be determined
pub const UNKNOWN_APPLICATION: &str = "unknown";

/// Point-in-time estimate of the user's attentional state
///
/// Snapshots are plain values; consumers receive copies and never share
/// mutable state with the estimator that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct AttentionSnapshot {
    /// 0.0 (idle/distracted) to 1.0 (deeply focused)
    pub focus_level: f64,

    /// Lowercased frontmost application name, or "unknown"
    pub active_application: String,

    /// Seconds since the last recorded activity
    pub idle_time_seconds: f64,

    /// Activity events inside the recent-activity window
    pub recent_activity_count: usize,

    /// Application switches per minute
    pub app_switch_frequency: f64,
}

impl AttentionSnapshot {
    /// Snapshot with only focus and application set
    pub fn new(focus_level: f64, active_application: impl Into<String>) -> Self {
        Self {
            focus_level,
            active_application: active_application.into(),
            idle_time_seconds: 0.0,
            recent_activity_count: 0,
            app_switch_frequency: 0.0,
        }
    }

    /// Neutral snapshot used before any sample has been taken
    pub fn neutral() -> Self {
        Self::new(0.5, UNKNOWN_APPLICATION)
    }
}

impl Default for AttentionSnapshot {
    fn default() -> Self {
        Self::neutral()
    }
}
