//! Lending policy: topic hierarchy, availability, eligibility rules and the
//! loan lifecycle, composed by [`LendingService`].

pub mod availability;
pub mod catalog;
pub mod clock;
pub mod domain;
pub mod eligibility;
pub mod hierarchy;
pub mod lifecycle;
pub mod repository;
pub mod service;
pub mod snapshot;
pub mod validation;

#[cfg(test)]
mod tests;

pub use availability::can_be_borrowed;
pub use catalog::Catalog;
pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{Book, BookCopy, BookId, Loan, LoanId, Reader, ReaderId, TopicId};
pub use eligibility::{
    effective_thresholds, EffectiveThresholds, EligibilityEngine, EligibilityReport,
    LendingPolicy, LoanDecision, LoanHistory, LoanRule, RejectionReason,
};
pub use hierarchy::{HierarchyError, Topic, TopicTree};
pub use lifecycle::{ExtendError, DEFAULT_EXTENSION_DAYS};
pub use repository::{InMemoryLoanStore, LoanStore, RepositoryError};
pub use service::{LendingError, LendingService};
pub use snapshot::{LibrarySnapshot, SnapshotError};
pub use validation::{ValidationError, MAX_TOPICS_PER_BOOK};
