use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::super::domain::{BookId, LoanId, TopicId};

/// Business rules a lending request or extension can fail on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanRule {
    DailyCap,
    PeriodCap,
    Cooldown,
    TopicCap,
    RequestSize,
    TopicDiversity,
    Availability,
    ExtensionLimit,
}

impl LoanRule {
    /// Evaluation order for loan requests. The extension limit is checked
    /// separately and is not part of this sequence.
    pub const fn ordered() -> [Self; 7] {
        [
            Self::DailyCap,
            Self::PeriodCap,
            Self::Cooldown,
            Self::TopicCap,
            Self::RequestSize,
            Self::TopicDiversity,
            Self::Availability,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::DailyCap => "daily cap",
            Self::PeriodCap => "rolling period cap",
            Self::Cooldown => "per-book cooldown",
            Self::TopicCap => "per-topic cap",
            Self::RequestSize => "request size cap",
            Self::TopicDiversity => "topic diversity",
            Self::Availability => "availability",
            Self::ExtensionLimit => "extension limit",
        }
    }
}

/// Reason a request or extension was refused, with the figures behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RejectionReason {
    DailyCap {
        limit: u32,
        already_today: usize,
        requested: usize,
    },
    PeriodCap {
        limit: u32,
        in_period: usize,
        requested: usize,
    },
    Cooldown {
        book: BookId,
        title: String,
        last_loaned_at: NaiveDateTime,
    },
    TopicCap {
        topic: TopicId,
        topic_name: String,
        limit: u32,
        already_borrowed: usize,
        requested: usize,
    },
    RequestSize {
        limit: u32,
        requested: usize,
    },
    TopicDiversity {
        requested: usize,
        distinct_topics: usize,
    },
    Availability {
        book: BookId,
        title: String,
    },
    ExtensionLimit {
        loan: LoanId,
        limit: u32,
        extensions: u32,
    },
}

impl RejectionReason {
    pub fn rule(&self) -> LoanRule {
        match self {
            Self::DailyCap { .. } => LoanRule::DailyCap,
            Self::PeriodCap { .. } => LoanRule::PeriodCap,
            Self::Cooldown { .. } => LoanRule::Cooldown,
            Self::TopicCap { .. } => LoanRule::TopicCap,
            Self::RequestSize { .. } => LoanRule::RequestSize,
            Self::TopicDiversity { .. } => LoanRule::TopicDiversity,
            Self::Availability { .. } => LoanRule::Availability,
            Self::ExtensionLimit { .. } => LoanRule::ExtensionLimit,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Self::DailyCap {
                limit,
                already_today,
                requested,
            } => format!(
                "cannot borrow more than {limit} books in one day \
                 ({already_today} today, {requested} requested)"
            ),
            Self::PeriodCap {
                limit,
                in_period,
                requested,
            } => format!(
                "{in_period} loans already in the current period, {requested} more would exceed {limit}"
            ),
            Self::Cooldown {
                title,
                last_loaned_at,
                ..
            } => format!("'{title}' was borrowed too recently (last on {last_loaned_at})"),
            Self::TopicCap {
                topic_name,
                limit,
                already_borrowed,
                requested,
                ..
            } => format!(
                "limit of {limit} books for topic '{topic_name}' exceeded \
                 ({already_borrowed} borrowed, {requested} requested)"
            ),
            Self::RequestSize { limit, requested } => {
                format!("cannot borrow more than {limit} books in one request ({requested} requested)")
            }
            Self::TopicDiversity {
                requested,
                distinct_topics,
            } => format!(
                "{requested} books need at least 2 different topics, found {distinct_topics}"
            ),
            Self::Availability { title, .. } => format!("'{title}' cannot be borrowed right now"),
            Self::ExtensionLimit {
                loan,
                limit,
                extensions,
            } => format!("loan {loan} already extended {extensions} of {limit} times"),
        }
    }
}

/// Outcome of evaluating a loan request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanDecision {
    Accepted,
    Rejected(RejectionReason),
}

impl LoanDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub fn rejection(&self) -> Option<&RejectionReason> {
        match self {
            Self::Accepted => None,
            Self::Rejected(reason) => Some(reason),
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Self::Accepted => "loan request accepted".to_string(),
            Self::Rejected(reason) => format!("loan request rejected: {}", reason.summary()),
        }
    }
}
