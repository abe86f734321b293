//! Usage counters attached to a short link.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Best-effort redirect counters for one link.
///
/// Created with zero values together with the link and removed together with it.
/// Increments may be lost under crashes; the counter never decreases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub link_id: i64,
    pub click_count: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
}

impl UsageStats {
    /// Zero-valued counters for a freshly created link.
    pub fn empty(link_id: i64) -> Self {
        Self {
            link_id,
            click_count: 0,
            last_clicked_at: None,
        }
    }

    /// Records one redirect at `at`.
    pub fn record_click(&mut self, at: DateTime<Utc>) {
        self.click_count += 1;
        self.last_clicked_at = Some(at);
    }
}
