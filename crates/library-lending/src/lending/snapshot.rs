use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::catalog::Catalog;
use super::domain::Loan;
use super::domain::LoanId;
use super::eligibility::LendingPolicy;
use super::validation::{validate_loan, ValidationError};

/// JSON document a host keeps between runs: catalog, loan history and an
/// optional policy override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub loans: Vec<Loan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<LendingPolicy>,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("unable to access snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot loan {loan} is invalid: {source}")]
    InvalidLoan {
        loan: LoanId,
        source: ValidationError,
    },
}

impl LibrarySnapshot {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parses a snapshot and rejects loans that could not have been issued.
    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(raw)?;
        for loan in &snapshot.loans {
            validate_loan(loan).map_err(|source| SnapshotError::InvalidLoan {
                loan: loan.id.clone(),
                source,
            })?;
        }
        Ok(snapshot)
    }

    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let body = serde_json::to_string_pretty(self)?;
        fs::write(path, body)?;
        Ok(())
    }
}
