use serde::{Deserialize, Serialize};

/// Base thresholds for ordinary readers. Librarian values are derived from
/// these in [`effective_thresholds`](super::effective_thresholds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LendingPolicy {
    /// NMC: loans allowed within one rolling period.
    pub max_loans_per_period: u32,
    /// C: books allowed in a single request.
    pub max_books_per_request: u32,
    /// D: related-topic loans allowed within the topic window.
    pub max_books_per_topic: u32,
    /// NCZ: loans an ordinary reader may take out per calendar day.
    pub max_loans_per_day: u32,
    /// LIM: extensions allowed per loan.
    pub max_extensions: u32,
    /// DELTA: days before the same book may be borrowed again.
    pub cooldown_days: u32,
    /// PER: length of the rolling period in days.
    pub period_days: u32,
    /// L: length of the topic window in months.
    pub topic_window_months: u32,
    /// PERSIMP: daily cap applied to librarians instead of NCZ.
    pub librarian_max_loans_per_day: u32,
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self {
            max_loans_per_period: 10,
            max_books_per_request: 5,
            max_books_per_topic: 3,
            max_loans_per_day: 4,
            max_extensions: 2,
            cooldown_days: 30,
            period_days: 180,
            topic_window_months: 6,
            librarian_max_loans_per_day: 10,
        }
    }
}
