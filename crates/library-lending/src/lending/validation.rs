//! Structural checks run before any lending rule sees an entity.

use std::collections::BTreeSet;

use super::domain::{Book, Loan, Reader, TopicId};
use super::hierarchy::TopicTree;

/// Catalog cap on topics per book. Enforced at registration only; the
/// loan-time topic cap is a separate rule.
pub const MAX_TOPICS_PER_BOOK: usize = 3;

const MIN_PHONE_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("book title is required")]
    MissingTitle,
    #[error("a book may carry at most {max} topics (found {found})")]
    TooManyTopics { max: usize, found: usize },
    #[error("book references unknown topic {0}")]
    UnknownTopic(TopicId),
    #[error("topic '{0}' is listed more than once")]
    DuplicateTopic(String),
    #[error("topics '{ancestor}' and '{descendant}' are in an ancestor-descendant relation")]
    AncestorTopicPair {
        ancestor: String,
        descendant: String,
    },
    #[error("last name is required")]
    MissingLastName,
    #[error("first name is required")]
    MissingFirstName,
    #[error("at least one contact method is required")]
    MissingContact,
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),
    #[error("invalid phone number '{0}'")]
    InvalidPhone(String),
    #[error("return date cannot precede the loan date")]
    DueBeforeLoan,
    #[error("extending by {days} days moves the return date out of range")]
    DueDateOutOfRange { days: u32 },
}

pub fn validate_book(book: &Book, topics: &TopicTree) -> Result<(), ValidationError> {
    if book.title.trim().is_empty() {
        return Err(ValidationError::MissingTitle);
    }

    if book.topics.len() > MAX_TOPICS_PER_BOOK {
        return Err(ValidationError::TooManyTopics {
            max: MAX_TOPICS_PER_BOOK,
            found: book.topics.len(),
        });
    }

    let mut names = BTreeSet::new();
    for topic in &book.topics {
        let name = topics
            .name(*topic)
            .ok_or(ValidationError::UnknownTopic(*topic))?;
        if !names.insert(name) {
            return Err(ValidationError::DuplicateTopic(name.to_string()));
        }
    }

    for ancestor in &book.topics {
        for descendant in &book.topics {
            if ancestor != descendant && topics.is_ancestor_of(*ancestor, *descendant) {
                return Err(ValidationError::AncestorTopicPair {
                    ancestor: topics.name(*ancestor).unwrap_or_default().to_string(),
                    descendant: topics.name(*descendant).unwrap_or_default().to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_reader(reader: &Reader) -> Result<(), ValidationError> {
    if reader.last_name.trim().is_empty() {
        return Err(ValidationError::MissingLastName);
    }
    if reader.first_name.trim().is_empty() {
        return Err(ValidationError::MissingFirstName);
    }

    let email = non_blank(reader.email.as_deref());
    let phone = non_blank(reader.phone.as_deref());

    if email.is_none() && phone.is_none() {
        return Err(ValidationError::MissingContact);
    }

    if let Some(email) = email {
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail(email.to_string()));
        }
    }

    if let Some(phone) = phone {
        if phone.chars().count() < MIN_PHONE_LENGTH {
            return Err(ValidationError::InvalidPhone(phone.to_string()));
        }
    }

    Ok(())
}

pub fn validate_loan(loan: &Loan) -> Result<(), ValidationError> {
    match loan.due_at {
        Some(due_at) if due_at < loan.loaned_at => Err(ValidationError::DueBeforeLoan),
        _ => Ok(()),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Exactly one `@`, with something on both sides.
fn is_valid_email(email: &str) -> bool {
    email.matches('@').count() == 1 && !email.starts_with('@') && !email.ends_with('@')
}
