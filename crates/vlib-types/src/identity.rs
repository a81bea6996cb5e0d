use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier of a book.
///
/// Freshly created books receive a time-ordered UUID v7. Any string is
/// accepted when reading an existing library, since documents written by
/// other front ends carry their own id formats.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Generate a new time-ordered book id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Wrap an existing id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short representation (first 8 characters).
    pub fn short_id(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Debug for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BookId({})", self.short_id())
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Unique identifier of a bookcase.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookcaseId(String);

impl BookcaseId {
    /// Derived identity for the `ordinal`-th bookcase (1-based): `bookcase-{n}`.
    pub fn for_ordinal(ordinal: usize) -> Self {
        Self(format!("bookcase-{ordinal}"))
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BookcaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BookcaseId({})", self.0)
    }
}

impl fmt::Display for BookcaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookcaseId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for BookcaseId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_book_ids_are_unique() {
        let a = BookId::generate();
        let b = BookId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_book_id_is_a_uuid() {
        let id = BookId::generate();
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn short_id_truncates() {
        let id = BookId::new("0123456789abcdef");
        assert_eq!(id.short_id(), "01234567");
        let short = BookId::new("abc");
        assert_eq!(short.short_id(), "abc");
    }

    #[test]
    fn bookcase_ordinal_format() {
        assert_eq!(BookcaseId::for_ordinal(1).as_str(), "bookcase-1");
        assert_eq!(BookcaseId::for_ordinal(12).as_str(), "bookcase-12");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&BookcaseId::for_ordinal(3)).unwrap();
        assert_eq!(json, "\"bookcase-3\"");
        let parsed: BookId = serde_json::from_str("\"legacy-id\"").unwrap();
        assert_eq!(parsed, BookId::from("legacy-id"));
    }
}
