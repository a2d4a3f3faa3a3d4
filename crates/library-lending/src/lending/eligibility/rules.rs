use std::collections::BTreeSet;

use chrono::{Months, NaiveDateTime};

use super::super::availability::can_be_borrowed;
use super::super::catalog::Catalog;
use super::super::domain::{Book, Loan, TopicId};
use super::decision::{LoanRule, RejectionReason};
use super::thresholds::EffectiveThresholds;
use super::LoanHistory;

/// Requests of at least this many books must span several topics.
pub(crate) const DIVERSITY_MIN_BOOKS: usize = 3;
pub(crate) const DIVERSITY_MIN_TOPICS: usize = 2;

/// Everything a rule may look at. Built once per request.
pub(crate) struct RuleContext<'a> {
    pub books: &'a [&'a Book],
    pub history: &'a LoanHistory,
    pub catalog: &'a Catalog,
    pub thresholds: &'a EffectiveThresholds,
    pub now: NaiveDateTime,
}

pub(crate) enum RuleOutcome {
    Pass,
    Fail(RejectionReason),
}

type RuleCheck = fn(&RuleContext<'_>) -> RuleOutcome;

/// Rules in evaluation order; the first failure ends the evaluation.
pub(crate) const RULES: [(LoanRule, RuleCheck); 7] = [
    (LoanRule::DailyCap, daily_cap),
    (LoanRule::PeriodCap, period_cap),
    (LoanRule::Cooldown, cooldown),
    (LoanRule::TopicCap, topic_cap),
    (LoanRule::RequestSize, request_size),
    (LoanRule::TopicDiversity, topic_diversity),
    (LoanRule::Availability, availability),
];

fn daily_cap(ctx: &RuleContext<'_>) -> RuleOutcome {
    let today = ctx.now.date();
    let already_today = ctx
        .history
        .iter()
        .filter(|loan| loan.loaned_at.date() == today)
        .count();
    let requested = ctx.books.len();

    if already_today + requested > ctx.thresholds.daily_cap as usize {
        return RuleOutcome::Fail(RejectionReason::DailyCap {
            limit: ctx.thresholds.daily_cap,
            already_today,
            requested,
        });
    }
    RuleOutcome::Pass
}

fn period_cap(ctx: &RuleContext<'_>) -> RuleOutcome {
    let period_start = ctx
        .now
        .checked_sub_signed(ctx.thresholds.period)
        .unwrap_or(NaiveDateTime::MIN);
    let in_period = ctx
        .history
        .iter()
        .filter(|loan| loan.loaned_at >= period_start)
        .count();
    let requested = ctx.books.len();

    if in_period + requested > ctx.thresholds.period_cap as usize {
        return RuleOutcome::Fail(RejectionReason::PeriodCap {
            limit: ctx.thresholds.period_cap,
            in_period,
            requested,
        });
    }
    RuleOutcome::Pass
}

fn cooldown(ctx: &RuleContext<'_>) -> RuleOutcome {
    for book in ctx.books {
        let latest = ctx
            .history
            .iter()
            .filter(|loan| loan.book == book.id)
            .max_by_key(|loan| loan.loaned_at);

        if let Some(loan) = latest {
            if ctx.now - loan.loaned_at < ctx.thresholds.cooldown {
                return RuleOutcome::Fail(RejectionReason::Cooldown {
                    book: book.id.clone(),
                    title: book.title.clone(),
                    last_loaned_at: loan.loaned_at,
                });
            }
        }
    }
    RuleOutcome::Pass
}

fn topic_cap(ctx: &RuleContext<'_>) -> RuleOutcome {
    let window_start = ctx
        .now
        .checked_sub_months(Months::new(ctx.thresholds.topic_window_months))
        .unwrap_or(NaiveDateTime::MIN);
    let recent: Vec<&Loan> = ctx
        .history
        .iter()
        .filter(|loan| loan.loaned_at >= window_start)
        .collect();

    let tree = ctx.catalog.topics();
    let carries_related = |topics: &[TopicId], topic: TopicId| {
        topics.iter().any(|candidate| tree.related(*candidate, topic))
    };

    for topic in requested_topics(ctx.books) {
        let already_borrowed = recent
            .iter()
            .filter(|loan| {
                ctx.catalog
                    .book(&loan.book)
                    .map(|book| carries_related(&book.topics, topic))
                    .unwrap_or(false)
            })
            .count();
        let requested = ctx
            .books
            .iter()
            .filter(|book| carries_related(&book.topics, topic))
            .count();

        if already_borrowed + requested > ctx.thresholds.topic_cap as usize {
            return RuleOutcome::Fail(RejectionReason::TopicCap {
                topic,
                topic_name: tree.name(topic).unwrap_or_default().to_string(),
                limit: ctx.thresholds.topic_cap,
                already_borrowed,
                requested,
            });
        }
    }
    RuleOutcome::Pass
}

fn request_size(ctx: &RuleContext<'_>) -> RuleOutcome {
    let requested = ctx.books.len();
    if requested > ctx.thresholds.request_cap as usize {
        return RuleOutcome::Fail(RejectionReason::RequestSize {
            limit: ctx.thresholds.request_cap,
            requested,
        });
    }
    RuleOutcome::Pass
}

fn topic_diversity(ctx: &RuleContext<'_>) -> RuleOutcome {
    let requested = ctx.books.len();
    if requested < DIVERSITY_MIN_BOOKS {
        return RuleOutcome::Pass;
    }

    let tree = ctx.catalog.topics();
    let names: BTreeSet<&str> = ctx
        .books
        .iter()
        .flat_map(|book| book.topics.iter())
        .filter_map(|topic| tree.name(*topic))
        .collect();

    if names.len() < DIVERSITY_MIN_TOPICS {
        return RuleOutcome::Fail(RejectionReason::TopicDiversity {
            requested,
            distinct_topics: names.len(),
        });
    }
    RuleOutcome::Pass
}

fn availability(ctx: &RuleContext<'_>) -> RuleOutcome {
    match ctx.books.iter().find(|book| !can_be_borrowed(book)) {
        Some(book) => RuleOutcome::Fail(RejectionReason::Availability {
            book: book.id.clone(),
            title: book.title.clone(),
        }),
        None => RuleOutcome::Pass,
    }
}

/// Distinct topic ids across the request, in order of first appearance.
fn requested_topics(books: &[&Book]) -> Vec<TopicId> {
    let mut seen = BTreeSet::new();
    books
        .iter()
        .flat_map(|book| book.topics.iter().copied())
        .filter(|topic| seen.insert(*topic))
        .collect()
}
