//! Portable library documents.
//!
//! A [`LibraryDocument`] is the persisted and exported portion of the
//! library: exactly the books and bookcases collections, encoded as JSON.
//! Decoding is strict. The text must parse, both collections must be
//! present, every entry must have the right shape, and the collections must
//! agree with each other before a document is handed back.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vlib_types::{Book, BookPosition, Bookcase, BookcaseId};

use crate::error::{ImportError, StorageError};

const BOOKS_KEY: &str = "books";
const BOOKCASES_KEY: &str = "bookcases";

/// The books and bookcases collections, in stored order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryDocument {
    pub books: Vec<Book>,
    pub bookcases: Vec<Bookcase>,
}

impl LibraryDocument {
    pub fn new(books: Vec<Book>, bookcases: Vec<Bookcase>) -> Self {
        Self { books, bookcases }
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn encode_pretty(&self) -> Result<String, StorageError> {
        serde_json::to_string_pretty(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Compact JSON, used for the persisted record.
    pub fn encode(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Parse and validate a document. Nothing is returned unless every
    /// check passes.
    pub fn decode(text: &str) -> Result<Self, ImportError> {
        let root: Value =
            serde_json::from_str(text).map_err(|e| ImportError::Malformed(e.to_string()))?;
        let Value::Object(mut fields) = root else {
            return Err(ImportError::Malformed(
                "top level is not an object".to_string(),
            ));
        };

        let books = take_collection(&mut fields, BOOKS_KEY)?;
        let bookcases = take_collection(&mut fields, BOOKCASES_KEY)?;

        let bookcases: Vec<Bookcase> =
            serde_json::from_value(bookcases).map_err(|e| ImportError::InvalidShape {
                collection: BOOKCASES_KEY,
                reason: e.to_string(),
            })?;
        let books: Vec<Book> =
            serde_json::from_value(books).map_err(|e| ImportError::InvalidShape {
                collection: BOOKS_KEY,
                reason: e.to_string(),
            })?;

        let document = Self { books, bookcases };
        document.validate()?;
        Ok(document)
    }

    /// Check identity uniqueness and referential integrity.
    pub fn validate(&self) -> Result<(), ImportError> {
        let mut cases: HashMap<&BookcaseId, &Bookcase> = HashMap::new();
        for bookcase in &self.bookcases {
            if bookcase.capacity() == 0 {
                return Err(ImportError::EmptyBookcase(bookcase.id.clone()));
            }
            if cases.insert(&bookcase.id, bookcase).is_some() {
                return Err(ImportError::DuplicateBookcase(bookcase.id.clone()));
            }
        }

        let mut ids = HashSet::new();
        let mut slots: HashMap<&BookPosition, &Book> = HashMap::new();
        for book in &self.books {
            if !ids.insert(&book.id) {
                return Err(ImportError::DuplicateBook(book.id.clone()));
            }
            let Some(bookcase) = cases.get(&book.position.bookcase_id) else {
                return Err(ImportError::DanglingBookcase {
                    book: book.id.clone(),
                    bookcase: book.position.bookcase_id.clone(),
                });
            };
            if !bookcase.in_range(&book.position) {
                return Err(ImportError::PositionOutOfRange {
                    book: book.id.clone(),
                    position: book.position.clone(),
                });
            }
            if let Some(first) = slots.insert(&book.position, book) {
                return Err(ImportError::SlotCollision {
                    position: book.position.clone(),
                    first: first.id.clone(),
                    second: book.id.clone(),
                });
            }
        }
        Ok(())
    }
}

fn take_collection(
    fields: &mut serde_json::Map<String, Value>,
    key: &'static str,
) -> Result<Value, ImportError> {
    match fields.remove(key) {
        Some(value @ Value::Array(_)) => Ok(value),
        _ => Err(ImportError::MissingCollection(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vlib_types::{BookDraft, BookcaseLayout, ResolvedCover};

    fn sample_document() -> LibraryDocument {
        let layout = BookcaseLayout::default();
        let bookcases = vec![
            layout.build(BookcaseId::for_ordinal(1), 0),
            layout.build(BookcaseId::for_ordinal(2), 1),
        ];
        let books = vec![
            Book::from_draft(
                BookDraft::new("Emma", "Jane Austen"),
                ResolvedCover::uploaded("data:image/png;base64,AAAA"),
                BookPosition::new("bookcase-1", 0, 0),
            ),
            Book::from_draft(
                BookDraft::new("Dune", "Frank Herbert").with_description("Spice."),
                ResolvedCover::generated("data:image/png;base64,BBBB"),
                BookPosition::new("bookcase-2", 4, 11),
            ),
        ];
        LibraryDocument::new(books, bookcases)
    }

    #[test]
    fn pretty_encoding_round_trips() {
        let doc = sample_document();
        let text = doc.encode_pretty().unwrap();
        assert!(text.contains("\n  \"books\""));
        assert_eq!(LibraryDocument::decode(&text).unwrap(), doc);
    }

    #[test]
    fn encoding_holds_only_collections() {
        let value: Value = serde_json::from_str(&sample_document().encode().unwrap()).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert!(value.get("books").is_some());
        assert!(value.get("bookcases").is_some());
    }

    #[test]
    fn rejects_unparsable_text() {
        let err = LibraryDocument::decode("{ not json").unwrap_err();
        assert!(matches!(err, ImportError::Malformed(_)));
    }

    #[test]
    fn rejects_non_object_root() {
        let err = LibraryDocument::decode("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, ImportError::Malformed(_)));
    }

    #[test]
    fn rejects_missing_bookcases() {
        let err = LibraryDocument::decode(r#"{ "books": [] }"#).unwrap_err();
        assert_eq!(err, ImportError::MissingCollection("bookcases"));
    }

    #[test]
    fn rejects_missing_books() {
        let err = LibraryDocument::decode(r#"{ "bookcases": [] }"#).unwrap_err();
        assert_eq!(err, ImportError::MissingCollection("books"));
    }

    #[test]
    fn rejects_non_array_collection() {
        let err = LibraryDocument::decode(r#"{ "books": {}, "bookcases": [] }"#).unwrap_err();
        assert_eq!(err, ImportError::MissingCollection("books"));
    }

    #[test]
    fn accepts_empty_library_and_ignores_extra_keys() {
        let doc =
            LibraryDocument::decode(r#"{ "books": [], "bookcases": [], "version": 3 }"#).unwrap();
        assert_eq!(doc, LibraryDocument::default());
    }

    #[test]
    fn rejects_wrongly_typed_fields() {
        let text = r#"{
            "books": [],
            "bookcases": [{ "id": "bookcase-1", "position": [0, 0, 0], "rotationY": 0, "shelves": "five", "slotsPerShelf": 12 }]
        }"#;
        let err = LibraryDocument::decode(text).unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidShape {
                collection: "bookcases",
                ..
            }
        ));
    }

    #[test]
    fn rejects_dangling_bookcase_reference() {
        let mut doc = sample_document();
        doc.bookcases.truncate(1);
        let err = LibraryDocument::decode(&doc.encode().unwrap()).unwrap_err();
        assert!(matches!(err, ImportError::DanglingBookcase { .. }));
    }

    #[test]
    fn rejects_out_of_range_index() {
        let mut doc = sample_document();
        doc.books[0].position.slot_index = 12;
        let err = doc.validate().unwrap_err();
        assert!(matches!(err, ImportError::PositionOutOfRange { .. }));
    }

    #[test]
    fn rejects_slot_collision() {
        let mut doc = sample_document();
        doc.books[1].position = doc.books[0].position.clone();
        let err = doc.validate().unwrap_err();
        match err {
            ImportError::SlotCollision { first, second, .. } => {
                assert_eq!(first, doc.books[0].id);
                assert_eq!(second, doc.books[1].id);
            }
            other => panic!("expected SlotCollision, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut doc = sample_document();
        doc.bookcases[1].id = doc.bookcases[0].id.clone();
        assert!(matches!(
            doc.validate(),
            Err(ImportError::DuplicateBookcase(_))
        ));

        let mut doc = sample_document();
        doc.books[1].id = doc.books[0].id.clone();
        assert!(matches!(doc.validate(), Err(ImportError::DuplicateBook(_))));
    }

    #[test]
    fn rejects_empty_bookcase() {
        let mut doc = sample_document();
        doc.bookcases[1].shelves = 0;
        assert!(matches!(doc.validate(), Err(ImportError::EmptyBookcase(_))));
    }
}
