use chrono::{Duration, NaiveDateTime};

use super::domain::{Book, Loan, Reader};
use super::eligibility::{EffectiveThresholds, RejectionReason};
use super::validation::{validate_loan, ValidationError};

/// Days added to the due date when the caller does not choose.
pub const DEFAULT_EXTENSION_DAYS: u32 = 14;

/// One fresh loan per book, all sharing the reader and the loan date.
pub fn issue(reader: &Reader, books: &[&Book], now: NaiveDateTime) -> Vec<Loan> {
    books
        .iter()
        .map(|book| Loan::new(book.id.clone(), reader.id.clone(), now))
        .collect()
}

/// Why an extension did not happen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtendError {
    #[error("{}", .0.summary())]
    Rejected(RejectionReason),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Pushes the due date forward by `extra_days`.
///
/// The extension is cumulative on an existing due date and counted from
/// `now` when the loan has none. Acquisition rules are not consulted. The
/// loan is left untouched on any error.
pub fn extend(
    loan: &mut Loan,
    thresholds: &EffectiveThresholds,
    extra_days: u32,
    now: NaiveDateTime,
) -> Result<(), ExtendError> {
    if loan.extensions >= thresholds.extension_limit {
        return Err(ExtendError::Rejected(RejectionReason::ExtensionLimit {
            loan: loan.id.clone(),
            limit: thresholds.extension_limit,
            extensions: loan.extensions,
        }));
    }

    let due_at = loan
        .due_at
        .unwrap_or(now)
        .checked_add_signed(Duration::days(i64::from(extra_days)))
        .ok_or(ValidationError::DueDateOutOfRange { days: extra_days })?;

    let extended = Loan {
        due_at: Some(due_at),
        extensions: loan.extensions + 1,
        ..loan.clone()
    };
    validate_loan(&extended)?;
    *loan = extended;
    Ok(())
}
