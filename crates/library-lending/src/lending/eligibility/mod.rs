mod config;
mod decision;
mod rules;
mod thresholds;

pub use config::LendingPolicy;
pub use decision::{LoanDecision, LoanRule, RejectionReason};
pub use thresholds::{effective_thresholds, EffectiveThresholds};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info};

use super::catalog::Catalog;
use super::domain::{Book, Loan, Reader, ReaderId};
use rules::{RuleContext, RuleOutcome, RULES};

/// Immutable view of one reader's loans, fetched once per request.
#[derive(Debug, Clone, Default)]
pub struct LoanHistory {
    loans: Vec<Loan>,
}

impl LoanHistory {
    pub fn for_reader(loans: impl IntoIterator<Item = Loan>, reader: &ReaderId) -> Self {
        Self {
            loans: loans
                .into_iter()
                .filter(|loan| &loan.reader == reader)
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Loan> {
        self.loans.iter()
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }
}

/// Stateless evaluator applying the lending policy to a request.
#[derive(Debug, Clone)]
pub struct EligibilityEngine {
    policy: LendingPolicy,
}

impl EligibilityEngine {
    pub fn new(policy: LendingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &LendingPolicy {
        &self.policy
    }

    pub fn thresholds_for(&self, reader: &Reader) -> EffectiveThresholds {
        effective_thresholds(&self.policy, reader.librarian)
    }

    /// Runs the ordered rules against the snapshot. Pure: nothing is written.
    pub fn evaluate(
        &self,
        reader: &Reader,
        books: &[&Book],
        history: &LoanHistory,
        catalog: &Catalog,
        now: NaiveDateTime,
    ) -> EligibilityReport {
        let thresholds = self.thresholds_for(reader);
        let mut checked = Vec::with_capacity(RULES.len());

        if books.is_empty() {
            return EligibilityReport {
                decision: LoanDecision::Accepted,
                checked,
                thresholds,
            };
        }

        let ctx = RuleContext {
            books,
            history,
            catalog,
            thresholds: &thresholds,
            now,
        };

        for (rule, check) in RULES.iter() {
            checked.push(*rule);
            match check(&ctx) {
                RuleOutcome::Pass => {
                    debug!(reader = %reader.id, rule = rule.label(), "lending rule passed");
                }
                RuleOutcome::Fail(reason) => {
                    info!(
                        reader = %reader.id,
                        rule = rule.label(),
                        reason = %reason.summary(),
                        "loan request rejected"
                    );
                    return EligibilityReport {
                        decision: LoanDecision::Rejected(reason),
                        checked,
                        thresholds,
                    };
                }
            }
        }

        EligibilityReport {
            decision: LoanDecision::Accepted,
            checked,
            thresholds,
        }
    }
}

/// Decision plus the trail of rules that were consulted to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityReport {
    pub decision: LoanDecision,
    pub checked: Vec<LoanRule>,
    pub thresholds: EffectiveThresholds,
}
