use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{Book, BookId, Reader, ReaderId};
use super::hierarchy::TopicTree;
use super::validation::{validate_book, validate_reader, ValidationError};

/// In-memory snapshot of topics, books and readers the lending rules consult.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    topics: TopicTree,
    #[serde(default)]
    books: BTreeMap<BookId, Book>,
    #[serde(default)]
    readers: BTreeMap<ReaderId, Reader>,
}

impl Catalog {
    pub fn new(topics: TopicTree) -> Self {
        Self {
            topics,
            ..Self::default()
        }
    }

    pub fn topics(&self) -> &TopicTree {
        &self.topics
    }

    pub fn topics_mut(&mut self) -> &mut TopicTree {
        &mut self.topics
    }

    /// Adds a book after the structural and topic checks pass.
    pub fn register_book(&mut self, book: Book) -> Result<BookId, ValidationError> {
        validate_book(&book, &self.topics)?;
        let id = book.id.clone();
        info!(book = %id, title = %book.title, "book added to catalog");
        self.books.insert(id.clone(), book);
        Ok(id)
    }

    pub fn register_reader(&mut self, reader: Reader) -> Result<ReaderId, ValidationError> {
        validate_reader(&reader)?;
        let id = reader.id.clone();
        info!(reader = %id, name = %reader.display_name(), "reader registered");
        self.readers.insert(id.clone(), reader);
        Ok(id)
    }

    pub fn book(&self, id: &BookId) -> Option<&Book> {
        self.books.get(id)
    }

    /// Mutable access for hosts that maintain copy flags.
    pub fn book_mut(&mut self, id: &BookId) -> Option<&mut Book> {
        self.books.get_mut(id)
    }

    pub fn reader(&self, id: &ReaderId) -> Option<&Reader> {
        self.readers.get(id)
    }

    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.books.values()
    }

    pub fn readers(&self) -> impl Iterator<Item = &Reader> {
        self.readers.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lending::domain::BookCopy;

    #[test]
    fn registered_book_is_retrievable() {
        let mut topics = TopicTree::new();
        let history = topics.add_root("History");
        let mut catalog = Catalog::new(topics);

        let id = catalog
            .register_book(
                Book::new("The Romans")
                    .with_topics([history])
                    .with_copies([BookCopy::lendable()]),
            )
            .expect("book is valid");

        let book = catalog.book(&id).expect("book stored");
        assert_eq!(book.title, "The Romans");
        assert_eq!(catalog.books().count(), 1);
    }

    #[test]
    fn invalid_book_is_not_stored() {
        let mut catalog = Catalog::default();
        let err = catalog.register_book(Book::new("")).unwrap_err();
        assert_eq!(err, ValidationError::MissingTitle);
        assert_eq!(catalog.books().count(), 0);
    }

    #[test]
    fn invalid_reader_is_not_stored() {
        let mut catalog = Catalog::default();
        let err = catalog
            .register_reader(Reader::new("Ionescu", "Dan"))
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingContact);
        assert_eq!(catalog.readers().count(), 0);
    }
}
