use chrono::Duration;
use serde::Serialize;

use super::config::LendingPolicy;

/// Thresholds after role scaling, the only numbers the rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectiveThresholds {
    pub daily_cap: u32,
    pub period_cap: u32,
    #[serde(serialize_with = "serialize_duration_hours")]
    pub period: Duration,
    #[serde(serialize_with = "serialize_duration_hours")]
    pub cooldown: Duration,
    pub request_cap: u32,
    pub topic_cap: u32,
    pub topic_window_months: u32,
    pub extension_limit: u32,
}

/// Librarians get doubled counts, halved time spans, and PERSIMP in place of
/// NCZ. The topic window length is not scaled.
pub fn effective_thresholds(policy: &LendingPolicy, is_librarian: bool) -> EffectiveThresholds {
    let period = Duration::days(i64::from(policy.period_days));
    let cooldown = Duration::days(i64::from(policy.cooldown_days));

    if is_librarian {
        EffectiveThresholds {
            daily_cap: policy.librarian_max_loans_per_day,
            period_cap: policy.max_loans_per_period.saturating_mul(2),
            period: period / 2,
            cooldown: cooldown / 2,
            request_cap: policy.max_books_per_request.saturating_mul(2),
            topic_cap: policy.max_books_per_topic.saturating_mul(2),
            topic_window_months: policy.topic_window_months,
            extension_limit: policy.max_extensions.saturating_mul(2),
        }
    } else {
        EffectiveThresholds {
            daily_cap: policy.max_loans_per_day,
            period_cap: policy.max_loans_per_period,
            period,
            cooldown,
            request_cap: policy.max_books_per_request,
            topic_cap: policy.max_books_per_topic,
            topic_window_months: policy.topic_window_months,
            extension_limit: policy.max_extensions,
        }
    }
}

fn serialize_duration_hours<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_i64(value.num_hours())
}
