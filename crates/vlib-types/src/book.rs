use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::{BookId, BookcaseId};

/// Composite coordinate of a single slot: bookcase, shelf, and slot within
/// the shelf.
///
/// `shelf_index` ranges over `[0, bookcase.shelves)` and `slot_index` over
/// `[0, bookcase.slots_per_shelf)`. At most one book may occupy a given
/// coordinate.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPosition {
    pub bookcase_id: BookcaseId,
    pub shelf_index: u32,
    pub slot_index: u32,
}

impl BookPosition {
    pub fn new(bookcase_id: impl Into<BookcaseId>, shelf_index: u32, slot_index: u32) -> Self {
        Self {
            bookcase_id: bookcase_id.into(),
            shelf_index,
            slot_index,
        }
    }
}

impl fmt::Display for BookPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.bookcase_id, self.shelf_index, self.slot_index
        )
    }
}

/// A book record on the shelves.
///
/// `id` and `created_at` never change after creation. The only mutations
/// are a new `position` (moves) and a new cover.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    /// Opaque cover locator, usually a `data:` URL with the embedded image.
    #[serde(default)]
    pub cover_url: String,
    /// `true` when the cover came from the generation service.
    #[serde(default)]
    pub cover_generated: bool,
    pub position: BookPosition,
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Build a new book from a draft, stamping a fresh id and creation time.
    pub fn from_draft(draft: BookDraft, cover: ResolvedCover, position: BookPosition) -> Self {
        Self {
            id: BookId::generate(),
            title: draft.title,
            author: draft.author,
            description: draft.description,
            cover_url: cover.url,
            cover_generated: cover.generated,
            position,
            created_at: Utc::now(),
        }
    }

    /// A book occupies a coordinate iff all three fields match exactly.
    pub fn occupies(&self, position: &BookPosition) -> bool {
        self.position == *position
    }
}

/// The cover chosen for a book before it is placed: an embedded or remote
/// locator, plus whether it came from the generation service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedCover {
    pub url: String,
    pub generated: bool,
}

impl ResolvedCover {
    pub fn uploaded(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            generated: false,
        }
    }

    pub fn generated(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            generated: true,
        }
    }
}

/// Caller-supplied fields for a new book.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    /// A cover locator supplied up front. When absent and no file is
    /// uploaded, a cover is generated.
    #[serde(default)]
    pub cover_url: Option<String>,
}

impl BookDraft {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_cover_url(mut self, cover_url: impl Into<String>) -> Self {
        self.cover_url = Some(cover_url.into());
        self
    }

    /// The explicit cover locator, treating an empty string as unset.
    pub fn explicit_cover(&self) -> Option<&str> {
        self.cover_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Title and author must be non-blank.
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.title.trim().is_empty() {
            return Err(TypeError::BlankField { field: "title" });
        }
        if self.author.trim().is_empty() {
            return Err(TypeError::BlankField { field: "author" });
        }
        Ok(())
    }
}
