use std::sync::Arc;

use tracing::info;

use super::catalog::Catalog;
use super::clock::{Clock, SystemClock};
use super::domain::{Book, BookId, Loan, LoanId, Reader, ReaderId};
use super::eligibility::{
    EligibilityEngine, EligibilityReport, LendingPolicy, LoanDecision, LoanHistory,
    RejectionReason,
};
use super::lifecycle::{self, ExtendError};
use super::repository::{LoanStore, RepositoryError};
use super::validation::{validate_reader, ValidationError};

/// Service composing the catalog snapshot, the loan store and the rule engine.
///
/// Each request reads the store once, decides, then appends. Nothing is
/// re-validated between the read and the writes, so callers racing on the
/// same reader must serialize themselves.
pub struct LendingService<S> {
    catalog: Arc<Catalog>,
    store: Arc<S>,
    engine: Arc<EligibilityEngine>,
    clock: Arc<dyn Clock>,
}

impl<S> LendingService<S>
where
    S: LoanStore + 'static,
{
    pub fn new(catalog: Arc<Catalog>, store: Arc<S>, policy: LendingPolicy) -> Self {
        Self::with_clock(catalog, store, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(
        catalog: Arc<Catalog>,
        store: Arc<S>,
        policy: LendingPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            store,
            engine: Arc::new(EligibilityEngine::new(policy)),
            clock,
        }
    }

    pub fn engine(&self) -> &EligibilityEngine {
        &self.engine
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Evaluates a request without issuing anything.
    pub fn check_request(
        &self,
        reader_id: &ReaderId,
        book_ids: &[BookId],
    ) -> Result<EligibilityReport, LendingError> {
        let (reader, books) = self.resolve(reader_id, book_ids)?;
        let history = LoanHistory::for_reader(self.store.for_reader(&reader.id)?, &reader.id);
        Ok(self
            .engine
            .evaluate(reader, &books, &history, &self.catalog, self.clock.now()))
    }

    /// Lends every requested book or none of them.
    pub fn request_loans(
        &self,
        reader_id: &ReaderId,
        book_ids: &[BookId],
    ) -> Result<Vec<Loan>, LendingError> {
        let (reader, books) = self.resolve(reader_id, book_ids)?;
        if books.is_empty() {
            return Ok(Vec::new());
        }

        let now = self.clock.now();
        let stored = self.store.all()?;
        LoanId::reserve_past(stored.iter().map(|loan| &loan.id));
        let history = LoanHistory::for_reader(stored, &reader.id);
        let report = self
            .engine
            .evaluate(reader, &books, &history, &self.catalog, now);

        if let LoanDecision::Rejected(reason) = report.decision {
            return Err(LendingError::Rejected(reason));
        }

        let loans = lifecycle::issue(reader, &books, now);
        for (loan, book) in loans.iter().zip(&books) {
            self.store.add(loan.clone())?;
            info!(
                loan = %loan.id,
                title = %book.title,
                reader = %reader.display_name(),
                "book lent"
            );
        }

        Ok(loans)
    }

    /// Extends a stored loan by `extra_days`, persisting the new due date.
    pub fn extend_loan(&self, loan_id: &LoanId, extra_days: u32) -> Result<Loan, LendingError> {
        let mut loan = self
            .store
            .find(loan_id)?
            .ok_or_else(|| LendingError::UnknownLoan(loan_id.clone()))?;
        let reader = self
            .catalog
            .reader(&loan.reader)
            .ok_or_else(|| LendingError::UnknownReader(loan.reader.clone()))?;

        let thresholds = self.engine.thresholds_for(reader);
        match lifecycle::extend(&mut loan, &thresholds, extra_days, self.clock.now()) {
            Ok(()) => {}
            Err(ExtendError::Rejected(reason)) => {
                info!(loan = %loan.id, reason = %reason.summary(), "loan extension rejected");
                return Err(LendingError::Rejected(reason));
            }
            Err(ExtendError::Invalid(err)) => return Err(err.into()),
        }

        self.store.update(loan.clone())?;
        info!(
            loan = %loan.id,
            extensions = loan.extensions,
            limit = thresholds.extension_limit,
            "loan extended"
        );
        Ok(loan)
    }

    fn resolve(
        &self,
        reader_id: &ReaderId,
        book_ids: &[BookId],
    ) -> Result<(&Reader, Vec<&Book>), LendingError> {
        let reader = self
            .catalog
            .reader(reader_id)
            .ok_or_else(|| LendingError::UnknownReader(reader_id.clone()))?;
        validate_reader(reader)?;

        let books = book_ids
            .iter()
            .map(|id| {
                self.catalog
                    .book(id)
                    .ok_or_else(|| LendingError::UnknownBook(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((reader, books))
    }
}

/// Error raised by the lending service.
#[derive(Debug, thiserror::Error)]
pub enum LendingError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),
    #[error("unknown reader {0}")]
    UnknownReader(ReaderId),
    #[error("unknown book {0}")]
    UnknownBook(BookId),
    #[error("unknown loan {0}")]
    UnknownLoan(LoanId),
    #[error("{}", .0.summary())]
    Rejected(RejectionReason),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl LendingError {
    /// The business rejection, if this error is one.
    pub fn rejection(&self) -> Option<&RejectionReason> {
        match self {
            Self::Rejected(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::UnknownReader(_)
                | Self::UnknownBook(_)
                | Self::UnknownLoan(_)
        )
    }
}
