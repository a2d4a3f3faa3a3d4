use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

static BOOK_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static READER_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static LOAN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Arena index of a topic inside a [`TopicTree`](super::hierarchy::TopicTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TopicId(pub usize);

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "topic-{}", self.0)
    }
}

/// Identifier wrapper for catalogued books.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookId(pub String);

impl BookId {
    pub fn next() -> Self {
        let id = BOOK_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("book-{id:06}"))
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for registered readers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReaderId(pub String);

impl ReaderId {
    pub fn next() -> Self {
        let id = READER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("reader-{id:06}"))
    }
}

impl fmt::Display for ReaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for issued loans.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LoanId(pub String);

impl LoanId {
    pub fn next() -> Self {
        let id = LOAN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("loan-{id:06}"))
    }

    /// Moves the sequence past every `loan-N` id in `taken`, so loans issued
    /// by this process never collide with loans persisted by an earlier one.
    pub fn reserve_past<'a>(taken: impl IntoIterator<Item = &'a LoanId>) {
        if let Some(highest) = taken.into_iter().filter_map(LoanId::sequence).max() {
            LOAN_SEQUENCE.fetch_max(highest.saturating_add(1), Ordering::Relaxed);
        }
    }

    fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix("loan-")?.parse().ok()
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Physical exemplar of a book. Both flags may be set at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookCopy {
    #[serde(default)]
    pub reading_room_only: bool,
    #[serde(default)]
    pub lent: bool,
}

impl BookCopy {
    pub const fn lendable() -> Self {
        Self {
            reading_room_only: false,
            lent: false,
        }
    }

    pub const fn on_loan() -> Self {
        Self {
            reading_room_only: false,
            lent: true,
        }
    }

    pub const fn reading_room() -> Self {
        Self {
            reading_room_only: true,
            lent: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    #[serde(default)]
    pub topics: Vec<TopicId>,
    #[serde(default)]
    pub copies: Vec<BookCopy>,
}

impl Book {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: BookId::next(),
            title: title.into(),
            topics: Vec::new(),
            copies: Vec::new(),
        }
    }

    pub fn with_topics(mut self, topics: impl IntoIterator<Item = TopicId>) -> Self {
        self.topics.extend(topics);
        self
    }

    pub fn with_copies(mut self, copies: impl IntoIterator<Item = BookCopy>) -> Self {
        self.copies.extend(copies);
        self
    }

    /// Number of copies the library acquired, regardless of their state.
    pub fn initial_stock(&self) -> usize {
        self.copies.len()
    }

    /// Copies that are neither lent nor restricted to the reading room.
    pub fn available_copies(&self) -> usize {
        self.copies
            .iter()
            .filter(|copy| !copy.lent && !copy.reading_room_only)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reader {
    pub id: ReaderId,
    pub last_name: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Librarians get scaled thresholds and their own daily cap.
    #[serde(default)]
    pub librarian: bool,
}

impl Reader {
    pub fn new(last_name: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            id: ReaderId::next(),
            last_name: last_name.into(),
            first_name: first_name.into(),
            email: None,
            phone: None,
            librarian: false,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn as_librarian(mut self) -> Self {
        self.librarian = true;
        self
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}

/// A single book lent to a single reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub book: BookId,
    pub reader: ReaderId,
    pub loaned_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub extensions: u32,
}

impl Loan {
    pub fn new(book: BookId, reader: ReaderId, loaned_at: NaiveDateTime) -> Self {
        Self {
            id: LoanId::next(),
            book,
            reader,
            loaned_at,
            due_at: None,
            extensions: 0,
        }
    }
}
