use super::common::*;
use crate::lending::domain::{BookCopy, BookId};
use crate::lending::eligibility::{LendingPolicy, LoanDecision, LoanRule, RejectionReason};

#[test]
fn empty_request_is_accepted_without_consulting_rules() {
    let mut lib = Library::new();
    let reader = lib.reader();
    let fillers = lib.filler_books(6);
    let past = history(loans_at(&fillers, &reader, earlier_today()), &reader);

    let report = engine(LendingPolicy::default()).evaluate(
        lib.reader_ref(&reader),
        &[],
        &past,
        &lib.catalog,
        now(),
    );

    assert_eq!(report.decision, LoanDecision::Accepted);
    assert!(report.checked.is_empty());
}

#[test]
fn accepted_request_consults_every_rule_in_order() {
    let mut lib = Library::new();
    let reader = lib.reader();
    let optics = lib.book("Light", &[lib.topics.optics]);
    let art = lib.book("Colour", &[lib.topics.art]);

    let report = engine(LendingPolicy::default()).evaluate(
        lib.reader_ref(&reader),
        &[lib.book_ref(&optics), lib.book_ref(&art)],
        &history(Vec::new(), &reader),
        &lib.catalog,
        now(),
    );

    assert!(report.decision.is_accepted());
    assert_eq!(report.checked, LoanRule::ordered().to_vec());
}

#[test]
fn other_readers_loans_are_ignored() {
    let mut lib = Library::new();
    let reader = lib.reader();
    let neighbour = lib.reader();
    let fillers = lib.filler_books(4);
    let wanted = lib.book("Wanted", &[lib.topics.history]);

    let mut loans = loans_at(&fillers, &neighbour, earlier_today());
    loans.push(loan_at(&wanted, &neighbour, days_ago(1)));
    let past = history(loans, &reader);
    assert!(past.is_empty());

    let report = engine(LendingPolicy::default()).evaluate(
        lib.reader_ref(&reader),
        &[lib.book_ref(&wanted)],
        &past,
        &lib.catalog,
        now(),
    );
    assert!(report.decision.is_accepted());
}

#[test]
fn period_cap_counts_only_loans_inside_the_window() {
    let mut lib = Library::new();
    let reader = lib.reader();
    let recent = lib.filler_books(9);
    let old = lib.filler_books(5);
    let wanted = lib.book("Wanted", &[]);

    let mut loans = loans_at(&recent, &reader, days_ago(10));
    loans.extend(loans_at(&old, &reader, days_ago(181)));
    let past = history(loans, &reader);

    let engine = engine(LendingPolicy::default());
    let report = engine.evaluate(
        lib.reader_ref(&reader),
        &[lib.book_ref(&wanted)],
        &past,
        &lib.catalog,
        now(),
    );
    assert!(report.decision.is_accepted(), "9 + 1 fits a cap of 10");

    let second = lib.book("Second", &[]);
    let report = engine.evaluate(
        lib.reader_ref(&reader),
        &[lib.book_ref(&wanted), lib.book_ref(&second)],
        &past,
        &lib.catalog,
        now(),
    );
    match report.decision {
        LoanDecision::Rejected(RejectionReason::PeriodCap {
            limit,
            in_period,
            requested,
        }) => {
            assert_eq!((limit, in_period, requested), (10, 9, 2));
        }
        other => panic!("expected period cap rejection, got {other:?}"),
    }
}

#[test]
fn unbounded_period_reaches_back_to_the_first_loan() {
    let mut lib = Library::new();
    let reader = lib.reader();
    let ancient = lib.filler_books(10);
    let wanted = lib.book("Wanted", &[]);
    let past = history(loans_at(&ancient, &reader, days_ago(3000)), &reader);
    let policy = LendingPolicy {
        period_days: u32::MAX,
        ..LendingPolicy::default()
    };

    let engine = engine(policy);

    let report = engine.evaluate(
        lib.reader_ref(&reader),
        &[lib.book_ref(&wanted)],
        &past,
        &lib.catalog,
        now(),
    );
    assert_eq!(
        report.decision.rejection().map(RejectionReason::rule),
        Some(LoanRule::PeriodCap)
    );

    let mut promoted = lib.reader_ref(&reader).clone();
    promoted.librarian = true;
    let report = engine.evaluate(
        &promoted,
        &[lib.book_ref(&wanted)],
        &past,
        &lib.catalog,
        now(),
    );
    assert!(report.decision.is_accepted(), "10 + 1 fits a cap of 20");
}

#[test]
fn librarian_period_is_halved_and_cap_doubled() {
    let mut lib = Library::new();
    let reader = lib.reader();
    let librarian = lib.librarian();
    let fillers = lib.filler_books(10);
    let wanted = lib.book("Wanted", &[]);

    let engine = engine(LendingPolicy::default());

    let ordinary_past = history(loans_at(&fillers, &reader, days_ago(100)), &reader);
    let report = engine.evaluate(
        lib.reader_ref(&reader),
        &[lib.book_ref(&wanted)],
        &ordinary_past,
        &lib.catalog,
        now(),
    );
    assert_eq!(
        report.decision.rejection().map(RejectionReason::rule),
        Some(LoanRule::PeriodCap)
    );

    // 100 days ago is outside a librarian's 90-day period.
    let librarian_past = history(loans_at(&fillers, &librarian, days_ago(100)), &librarian);
    let report = engine.evaluate(
        lib.reader_ref(&librarian),
        &[lib.book_ref(&wanted)],
        &librarian_past,
        &lib.catalog,
        now(),
    );
    assert!(report.decision.is_accepted());

    // Inside the window, 19 + 1 still fits a librarian cap of 20.
    let more = lib.filler_books(9);
    let mut loans = loans_at(&fillers, &librarian, days_ago(20));
    loans.extend(loans_at(&more, &librarian, days_ago(30)));
    let librarian_past = history(loans, &librarian);
    let report = engine.evaluate(
        lib.reader_ref(&librarian),
        &[lib.book_ref(&wanted)],
        &librarian_past,
        &lib.catalog,
        now(),
    );
    assert!(report.decision.is_accepted());
}

#[test]
fn cooldown_uses_the_most_recent_loan_of_the_same_book() {
    let mut lib = Library::new();
    let reader = lib.reader();
    let wanted = lib.book("Wanted", &[lib.topics.art]);

    let loans = vec![
        loan_at(&wanted, &reader, days_ago(200)),
        loan_at(&wanted, &reader, days_ago(12)),
    ];
    let past = history(loans, &reader);

    let report = engine(LendingPolicy::default()).evaluate(
        lib.reader_ref(&reader),
        &[lib.book_ref(&wanted)],
        &past,
        &lib.catalog,
        now(),
    );
    match report.decision {
        LoanDecision::Rejected(RejectionReason::Cooldown {
            book,
            last_loaned_at,
            ..
        }) => {
            assert_eq!(book, wanted);
            assert_eq!(last_loaned_at, days_ago(12));
        }
        other => panic!("expected cooldown rejection, got {other:?}"),
    }
}

#[test]
fn cooldown_matches_book_identity_not_title() {
    let mut lib = Library::new();
    let reader = lib.reader();
    let first = lib.book("Same Title", &[]);
    let second = lib.book("Same Title", &[]);
    let past = history(vec![loan_at(&first, &reader, days_ago(1))], &reader);

    let report = engine(LendingPolicy::default()).evaluate(
        lib.reader_ref(&reader),
        &[lib.book_ref(&second)],
        &past,
        &lib.catalog,
        now(),
    );
    assert!(report.decision.is_accepted());
}

#[test]
fn librarian_cooldown_is_halved() {
    let mut lib = Library::new();
    let librarian = lib.librarian();
    let wanted = lib.book("Wanted", &[]);
    let engine = engine(LendingPolicy::default());

    let past = history(vec![loan_at(&wanted, &librarian, days_ago(15))], &librarian);
    let report = engine.evaluate(
        lib.reader_ref(&librarian),
        &[lib.book_ref(&wanted)],
        &past,
        &lib.catalog,
        now(),
    );
    assert!(report.decision.is_accepted());

    let past = history(vec![loan_at(&wanted, &librarian, days_ago(14))], &librarian);
    let report = engine.evaluate(
        lib.reader_ref(&librarian),
        &[lib.book_ref(&wanted)],
        &past,
        &lib.catalog,
        now(),
    );
    assert_eq!(
        report.decision.rejection().map(RejectionReason::rule),
        Some(LoanRule::Cooldown)
    );
}

#[test]
fn topic_cap_counts_ancestors_and_descendants() {
    let mut lib = Library::new();
    let reader = lib.reader();
    let general = lib.book("General Science", &[lib.topics.science]);
    let almanac = lib.book("Almanac", &[lib.topics.science]);
    let mechanics = lib.book("Mechanics", &[lib.topics.physics]);
    let lenses = lib.book("Lenses", &[lib.topics.optics]);

    let loans = vec![
        loan_at(&general, &reader, days_ago(40)),
        loan_at(&almanac, &reader, days_ago(50)),
        loan_at(&mechanics, &reader, days_ago(60)),
    ];
    let past = history(loans, &reader);

    let report = engine(LendingPolicy::default()).evaluate(
        lib.reader_ref(&reader),
        &[lib.book_ref(&lenses)],
        &past,
        &lib.catalog,
        now(),
    );
    match report.decision {
        LoanDecision::Rejected(RejectionReason::TopicCap {
            topic,
            topic_name,
            limit,
            already_borrowed,
            requested,
        }) => {
            assert_eq!(topic, lib.topics.optics);
            assert_eq!(topic_name, "Optics");
            assert_eq!((limit, already_borrowed, requested), (3, 3, 1));
        }
        other => panic!("expected topic cap rejection, got {other:?}"),
    }
}

#[test]
fn sibling_topics_do_not_share_a_cap() {
    let mut lib = Library::new();
    let reader = lib.reader();
    let chemistry = [
        lib.book("Acids", &[lib.topics.chemistry]),
        lib.book("Bases", &[lib.topics.chemistry]),
        lib.book("Salts", &[lib.topics.chemistry]),
    ];
    let mechanics = lib.book("Mechanics", &[lib.topics.physics]);
    let past = history(loans_at(&chemistry, &reader, days_ago(40)), &reader);

    let report = engine(LendingPolicy::default()).evaluate(
        lib.reader_ref(&reader),
        &[lib.book_ref(&mechanics)],
        &past,
        &lib.catalog,
        now(),
    );
    assert!(report.decision.is_accepted());
}

#[test]
fn topic_cap_ignores_loans_outside_the_month_window() {
    let mut lib = Library::new();
    let reader = lib.reader();
    let old = [
        lib.book("Old One", &[lib.topics.history]),
        lib.book("Old Two", &[lib.topics.history]),
        lib.book("Old Three", &[lib.topics.history]),
    ];
    let wanted = lib.book("Wanted", &[lib.topics.history]);
    let past = history(loans_at(&old, &reader, days_ago(7 * 31)), &reader);

    let report = engine(LendingPolicy::default()).evaluate(
        lib.reader_ref(&reader),
        &[lib.book_ref(&wanted)],
        &past,
        &lib.catalog,
        now(),
    );
    assert!(report.decision.is_accepted());
}

#[test]
fn topic_cap_counts_requested_books_against_each_other() {
    let mut lib = Library::new();
    let reader = lib.reader();
    let books = [
        lib.book("Physics I", &[lib.topics.physics]),
        lib.book("Physics II", &[lib.topics.physics]),
        lib.book("Physics III", &[lib.topics.physics, lib.topics.art]),
        lib.book("Optics", &[lib.topics.optics]),
    ];
    let requested: Vec<_> = books.iter().map(|id| lib.book_ref(id)).collect();

    let report = engine(LendingPolicy::default()).evaluate(
        lib.reader_ref(&reader),
        &requested,
        &history(Vec::new(), &reader),
        &lib.catalog,
        now(),
    );
    match report.decision {
        LoanDecision::Rejected(RejectionReason::TopicCap {
            topic, requested, ..
        }) => {
            assert_eq!(topic, lib.topics.physics);
            assert_eq!(requested, 4);
        }
        other => panic!("expected topic cap rejection, got {other:?}"),
    }
}

#[test]
fn librarian_topic_and_request_caps_are_doubled() {
    let mut lib = Library::new();
    let librarian = lib.librarian();
    let mut ids = Vec::new();
    for index in 0..6 {
        ids.push(lib.book(&format!("Physics {index}"), &[lib.topics.physics]));
    }
    ids.push(lib.book("Atlas", &[lib.topics.art]));
    let requested: Vec<_> = ids.iter().map(|id| lib.book_ref(id)).collect();

    let policy = LendingPolicy {
        librarian_max_loans_per_day: 10,
        ..LendingPolicy::default()
    };
    let report = engine(policy).evaluate(
        lib.reader_ref(&librarian),
        &requested,
        &history(Vec::new(), &librarian),
        &lib.catalog,
        now(),
    );
    assert!(report.decision.is_accepted(), "{:?}", report.decision);
}

#[test]
fn diversity_rule_applies_from_three_books() {
    let mut lib = Library::new();
    let reader = lib.reader();
    let first = lib.book("History I", &[lib.topics.history]);
    let second = lib.book("History II", &[lib.topics.history]);
    let third = lib.book("History III", &[lib.topics.history]);
    let engine = engine(LendingPolicy::default());

    let report = engine.evaluate(
        lib.reader_ref(&reader),
        &[lib.book_ref(&first), lib.book_ref(&second)],
        &history(Vec::new(), &reader),
        &lib.catalog,
        now(),
    );
    assert!(report.decision.is_accepted());

    let report = engine.evaluate(
        lib.reader_ref(&reader),
        &[lib.book_ref(&first), lib.book_ref(&second), lib.book_ref(&third)],
        &history(Vec::new(), &reader),
        &lib.catalog,
        now(),
    );
    assert_eq!(
        report.decision.rejection(),
        Some(&RejectionReason::TopicDiversity {
            requested: 3,
            distinct_topics: 1,
        })
    );
}

#[test]
fn diversity_counts_topic_names_not_ids() {
    let mut lib = Library::new();
    let reader = lib.reader();
    let duplicate = lib.catalog.topics_mut().add_root("History");
    let first = lib.book("History I", &[lib.topics.history]);
    let second = lib.book("History II", &[lib.topics.history]);
    let third = lib.book("History III", &[duplicate]);

    let report = engine(permissive_policy()).evaluate(
        lib.reader_ref(&reader),
        &[lib.book_ref(&first), lib.book_ref(&second), lib.book_ref(&third)],
        &history(Vec::new(), &reader),
        &lib.catalog,
        now(),
    );
    assert_eq!(
        report.decision.rejection().map(RejectionReason::rule),
        Some(LoanRule::TopicDiversity)
    );
}

#[test]
fn availability_reports_the_first_unavailable_book() {
    let mut lib = Library::new();
    let reader = lib.reader();
    let fine = lib.book("Fine", &[lib.topics.art]);
    let gone = lib.unavailable_book("Gone", &[lib.topics.history]);
    let also_gone = lib.book_with_copies("Also Gone", &[], vec![BookCopy::reading_room()]);

    let report = engine(LendingPolicy::default()).evaluate(
        lib.reader_ref(&reader),
        &[lib.book_ref(&fine), lib.book_ref(&gone), lib.book_ref(&also_gone)],
        &history(Vec::new(), &reader),
        &lib.catalog,
        now(),
    );
    match report.decision {
        LoanDecision::Rejected(RejectionReason::Availability { book, title }) => {
            assert_eq!(book, gone);
            assert_eq!(title, "Gone");
        }
        other => panic!("expected availability rejection, got {other:?}"),
    }
    assert_eq!(report.checked.last(), Some(&LoanRule::Availability));
}

#[test]
fn history_of_unknown_books_does_not_count_toward_topics() {
    let mut lib = Library::new();
    let reader = lib.reader();
    let wanted = lib.book("Wanted", &[lib.topics.art]);
    let missing = BookId("book-withdrawn".to_string());
    let loans = vec![
        loan_at(&missing, &reader, days_ago(40)),
        loan_at(&missing, &reader, days_ago(80)),
        loan_at(&missing, &reader, days_ago(120)),
    ];

    let report = engine(LendingPolicy::default()).evaluate(
        lib.reader_ref(&reader),
        &[lib.book_ref(&wanted)],
        &history(loans, &reader),
        &lib.catalog,
        now(),
    );
    assert!(report.decision.is_accepted());
}
