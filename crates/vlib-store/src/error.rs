use vlib_types::{BookId, BookPosition, BookcaseId, TypeError};

/// Errors from library mutations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// Every slot in every bookcase is taken.
    #[error("all bookcases are full")]
    AllocationExhausted,

    /// A move targeted a slot held by another book.
    #[error("slot {position} is occupied by {occupant}")]
    SlotOccupied {
        position: BookPosition,
        occupant: BookId,
    },

    /// A position referenced a bookcase that does not exist.
    #[error("unknown bookcase: {0}")]
    UnknownBookcase(BookcaseId),

    /// A position's shelf or slot index is outside the bookcase.
    #[error("position {0} is outside its bookcase")]
    PositionOutOfRange(BookPosition),

    /// The new book's fields are invalid.
    #[error("invalid book: {0}")]
    InvalidDraft(#[from] TypeError),
}

/// Result alias for library mutations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Reasons a library document is rejected on import or hydration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ImportError {
    /// The text is not a structured document at all.
    #[error("malformed library document: {0}")]
    Malformed(String),

    /// A required top-level collection is absent or not a list.
    #[error("library document is missing the `{0}` collection")]
    MissingCollection(&'static str),

    /// A book or bookcase entry has missing or mistyped fields.
    #[error("invalid {collection} entry: {reason}")]
    InvalidShape {
        collection: &'static str,
        reason: String,
    },

    #[error("duplicate bookcase id: {0}")]
    DuplicateBookcase(BookcaseId),

    #[error("duplicate book id: {0}")]
    DuplicateBook(BookId),

    /// A bookcase declares zero shelves or zero slots per shelf.
    #[error("bookcase {0} has no slots")]
    EmptyBookcase(BookcaseId),

    /// A book references a bookcase that is not in the document.
    #[error("book {book} references unknown bookcase {bookcase}")]
    DanglingBookcase { book: BookId, bookcase: BookcaseId },

    /// A book's shelf or slot index is outside its bookcase.
    #[error("book {book} is placed outside its bookcase at {position}")]
    PositionOutOfRange { book: BookId, position: BookPosition },

    /// Two books claim the same slot.
    #[error("books {first} and {second} both occupy {position}")]
    SlotCollision {
        position: BookPosition,
        first: BookId,
        second: BookId,
    },
}

/// Errors from durable storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage lock poisoned: {0}")]
    Poisoned(String),
}
