use std::sync::RwLock;

use super::domain::{Loan, LoanId, ReaderId};

/// Storage abstraction for loans so the service can be exercised in isolation.
///
/// Whatever `add` accepts must be visible to later `all` calls. No
/// check-and-append atomicity is assumed.
pub trait LoanStore: Send + Sync {
    fn add(&self, loan: Loan) -> Result<(), RepositoryError>;
    fn all(&self) -> Result<Vec<Loan>, RepositoryError>;
    fn update(&self, loan: Loan) -> Result<(), RepositoryError>;

    fn find(&self, id: &LoanId) -> Result<Option<Loan>, RepositoryError> {
        Ok(self.all()?.into_iter().find(|loan| &loan.id == id))
    }

    fn for_reader(&self, reader: &ReaderId) -> Result<Vec<Loan>, RepositoryError> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|loan| &loan.reader == reader)
            .collect())
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("loan {0} not found")]
    NotFound(LoanId),
    #[error("loan {0} already exists")]
    Conflict(LoanId),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Vec-backed store for tests and the command line host.
#[derive(Debug, Default)]
pub struct InMemoryLoanStore {
    loans: RwLock<Vec<Loan>>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loans(loans: Vec<Loan>) -> Self {
        Self {
            loans: RwLock::new(loans),
        }
    }

    pub fn len(&self) -> usize {
        self.loans.read().map(|loans| loans.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_loans(self) -> Result<Vec<Loan>, RepositoryError> {
        self.loans
            .into_inner()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".into()))
    }
}

impl LoanStore for InMemoryLoanStore {
    fn add(&self, loan: Loan) -> Result<(), RepositoryError> {
        let mut loans = self
            .loans
            .write()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".into()))?;
        if loans.iter().any(|existing| existing.id == loan.id) {
            return Err(RepositoryError::Conflict(loan.id));
        }
        loans.push(loan);
        Ok(())
    }

    fn all(&self) -> Result<Vec<Loan>, RepositoryError> {
        let loans = self
            .loans
            .read()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".into()))?;
        Ok(loans.clone())
    }

    fn update(&self, loan: Loan) -> Result<(), RepositoryError> {
        let mut loans = self
            .loans
            .write()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".into()))?;
        let slot = loans
            .iter_mut()
            .find(|existing| existing.id == loan.id)
            .ok_or_else(|| RepositoryError::NotFound(loan.id.clone()))?;
        *slot = loan;
        Ok(())
    }
}
