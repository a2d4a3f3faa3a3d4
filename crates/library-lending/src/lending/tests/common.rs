use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::lending::catalog::Catalog;
use crate::lending::clock::FixedClock;
use crate::lending::domain::{Book, BookCopy, BookId, Loan, LoanId, Reader, ReaderId, TopicId};
use crate::lending::eligibility::{EligibilityEngine, LendingPolicy, LoanHistory};
use crate::lending::hierarchy::TopicTree;
use crate::lending::repository::{InMemoryLoanStore, LoanStore, RepositoryError};
use crate::lending::service::LendingService;

/// Fixed evaluation instant shared by every test.
pub(super) fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 15)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .expect("valid timestamp")
}

pub(super) fn days_ago(days: i64) -> NaiveDateTime {
    now() - Duration::days(days)
}

/// Earlier the same calendar day as [`now`].
pub(super) fn earlier_today() -> NaiveDateTime {
    now() - Duration::hours(3)
}

pub(super) struct Topics {
    pub science: TopicId,
    pub physics: TopicId,
    pub optics: TopicId,
    pub chemistry: TopicId,
    pub history: TopicId,
    pub art: TopicId,
}

/// Catalog under construction plus the topic ids tests refer to.
pub(super) struct Library {
    pub catalog: Catalog,
    pub topics: Topics,
}

impl Library {
    pub(super) fn new() -> Self {
        let mut tree = TopicTree::new();
        let science = tree.add_root("Science");
        let physics = tree.add_child(science, "Physics").expect("parent exists");
        let optics = tree.add_child(physics, "Optics").expect("parent exists");
        let chemistry = tree.add_child(science, "Chemistry").expect("parent exists");
        let history = tree.add_root("History");
        let art = tree.add_root("Art");

        Self {
            catalog: Catalog::new(tree),
            topics: Topics {
                science,
                physics,
                optics,
                chemistry,
                history,
                art,
            },
        }
    }

    /// Book with three free lendable copies.
    pub(super) fn book(&mut self, title: &str, topics: &[TopicId]) -> BookId {
        self.book_with_copies(title, topics, vec![BookCopy::lendable(); 3])
    }

    pub(super) fn book_with_copies(
        &mut self,
        title: &str,
        topics: &[TopicId],
        copies: Vec<BookCopy>,
    ) -> BookId {
        self.catalog
            .register_book(
                Book::new(title)
                    .with_topics(topics.iter().copied())
                    .with_copies(copies),
            )
            .expect("fixture book is valid")
    }

    /// Book whose only lendable copy is out.
    pub(super) fn unavailable_book(&mut self, title: &str, topics: &[TopicId]) -> BookId {
        self.book_with_copies(
            title,
            topics,
            vec![BookCopy::on_loan(), BookCopy::reading_room()],
        )
    }

    /// Untagged books used to pad loan history without touching topic caps.
    pub(super) fn filler_books(&mut self, count: usize) -> Vec<BookId> {
        (0..count)
            .map(|index| self.book(&format!("Filler {index}"), &[]))
            .collect()
    }

    pub(super) fn reader(&mut self) -> ReaderId {
        self.catalog
            .register_reader(Reader::new("Popescu", "Ana").with_email("ana@example.com"))
            .expect("fixture reader is valid")
    }

    pub(super) fn librarian(&mut self) -> ReaderId {
        self.catalog
            .register_reader(
                Reader::new("Ionescu", "Mihai")
                    .with_phone("0722 000 111")
                    .as_librarian(),
            )
            .expect("fixture librarian is valid")
    }

    pub(super) fn book_ref(&self, id: &BookId) -> &Book {
        self.catalog.book(id).expect("book registered")
    }

    pub(super) fn reader_ref(&self, id: &ReaderId) -> &Reader {
        self.catalog.reader(id).expect("reader registered")
    }

    pub(super) fn service(
        self,
        store: Arc<InMemoryLoanStore>,
        policy: LendingPolicy,
    ) -> LendingService<InMemoryLoanStore> {
        LendingService::with_clock(
            Arc::new(self.catalog),
            store,
            policy,
            Arc::new(FixedClock(now())),
        )
    }
}

pub(super) fn loan_at(book: &BookId, reader: &ReaderId, at: NaiveDateTime) -> Loan {
    Loan::new(book.clone(), reader.clone(), at)
}

pub(super) fn loans_at(books: &[BookId], reader: &ReaderId, at: NaiveDateTime) -> Vec<Loan> {
    books.iter().map(|book| loan_at(book, reader, at)).collect()
}

pub(super) fn history(loans: Vec<Loan>, reader: &ReaderId) -> LoanHistory {
    LoanHistory::for_reader(loans, reader)
}

pub(super) fn engine(policy: LendingPolicy) -> EligibilityEngine {
    EligibilityEngine::new(policy)
}

/// Policy that keeps every count-based rule out of the way unless a test
/// lowers the one it is exercising.
pub(super) fn permissive_policy() -> LendingPolicy {
    LendingPolicy {
        max_loans_per_period: 100,
        max_books_per_request: 100,
        max_books_per_topic: 100,
        max_loans_per_day: 100,
        librarian_max_loans_per_day: 100,
        ..LendingPolicy::default()
    }
}

pub(super) struct UnavailableStore;

impl LoanStore for UnavailableStore {
    fn add(&self, _loan: Loan) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<Loan>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, loan: Loan) -> Result<(), RepositoryError> {
        Err(RepositoryError::NotFound(loan.id))
    }

    fn find(&self, _id: &LoanId) -> Result<Option<Loan>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
