//! Bounded activity and app-switch history

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// One recorded user activity
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEvent {
    /// Kind of event ("keyboard", "mouse", "app_switch", ...)
    pub event_type: String,

    /// Free-form detail
    pub detail: String,

    /// When it was recorded
    pub at: Instant,
}

/// Ring buffer of activity events
///
/// Holds at most `capacity` events; pushing into a full buffer drops the
/// oldest.
#[derive(Debug, Clone)]
pub struct ActivityHistory {
    events: VecDeque<ActivityEvent>,
    capacity: usize,
}

impl ActivityHistory {
    /// Create an empty history
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Append an event, evicting the oldest when full
    pub fn push(&mut self, event: ActivityEvent) {
        while self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Drop events older than `window`
    pub fn prune(&mut self, now: Instant, window: Duration) {
        let Some(cutoff) = now.checked_sub(window) else {
            return;
        };
        while self.events.front().is_some_and(|e| e.at < cutoff) {
            self.events.pop_front();
        }
    }

    /// Events recorded within `window` of `now`
    pub fn count_within(&self, now: Instant, window: Duration) -> usize {
        match now.checked_sub(window) {
            Some(cutoff) => self.events.iter().rev().take_while(|e| e.at >= cutoff).count(),
            None => self.events.len(),
        }
    }

    /// Number of events held
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when no events are held
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Most recent event
    pub fn latest(&self) -> Option<&ActivityEvent> {
        self.events.back()
    }
}

/// Timestamps of application switches
#[derive(Debug, Clone, Default)]
pub struct SwitchLog {
    switches: VecDeque<Instant>,
}

impl SwitchLog {
    /// Record a switch
    pub fn record(&mut self, at: Instant) {
        self.switches.push_back(at);
    }

    /// Switches per minute over the trailing `window`
    ///
    /// Also forgets switches that fell out of the window.
    pub fn frequency(&mut self, now: Instant, window: Duration) -> f64 {
        if let Some(cutoff) = now.checked_sub(window) {
            while self.switches.front().is_some_and(|t| *t < cutoff) {
                self.switches.pop_front();
            }
        }
        let minutes = window.as_secs_f64() / 60.0;
        if minutes > 0.0 {
            self.switches.len() as f64 / minutes
        } else {
            0.0
        }
    }
}
