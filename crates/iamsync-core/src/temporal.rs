//! # Lookback Window
//!
//! The deletion sweep scans a fixed window ending at the run's start time.
//! One clock reading per run is taken and used for both the window and every
//! `last_synced` value, so a run is internally consistent even if it takes
//! minutes to page through a large account.

use chrono::{DateTime, Duration, Utc};

/// Width of the deletion-event window, in hours.
pub const LOOKBACK_HOURS: i64 = 24;

/// Closed time range `[start, end]` scanned for deletion events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl LookbackWindow {
    /// The standard window ending at `now`.
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::hours(LOOKBACK_HOURS),
            end: now,
        }
    }

    /// Whether `t` lies inside the window, bounds included.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }
}
