//! The authoritative library state and its operations.
//!
//! [`Library`] owns every book and bookcase plus the transient UI flags.
//! All mutation goes through the methods below; nothing here performs I/O,
//! so callers decide when to persist [`Library::document`].

use tracing::debug;
use vlib_types::{
    Book, BookDraft, BookId, BookPosition, Bookcase, BookcaseId, BookcaseLayout, ResolvedCover,
};

use crate::allocator;
use crate::document::LibraryDocument;
use crate::error::{StoreError, StoreResult};
use crate::state::{LibrarySnapshot, UiState};

#[derive(Clone, Debug)]
pub struct Library {
    books: Vec<Book>,
    bookcases: Vec<Bookcase>,
    ui: UiState,
    layout: BookcaseLayout,
}

impl Library {
    /// An empty library. Call [`Library::bootstrap`] before adding books.
    pub fn new(layout: BookcaseLayout) -> Self {
        Self {
            books: Vec::new(),
            bookcases: Vec::new(),
            ui: UiState::default(),
            layout,
        }
    }

    /// Rehydrate from a persisted document. UI state starts at defaults.
    pub fn from_document(document: LibraryDocument, layout: BookcaseLayout) -> Self {
        Self {
            books: document.books,
            bookcases: document.bookcases,
            ui: UiState::default(),
            layout,
        }
    }

    // ---- Reads ----

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn bookcases(&self) -> &[Bookcase] {
        &self.bookcases
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn layout(&self) -> &BookcaseLayout {
        &self.layout
    }

    pub fn book(&self, id: &BookId) -> Option<&Book> {
        self.books.iter().find(|book| &book.id == id)
    }

    pub fn bookcase(&self, id: &BookcaseId) -> Option<&Bookcase> {
        self.bookcases.iter().find(|bookcase| &bookcase.id == id)
    }

    /// The book shown at `position`.
    pub fn book_at(&self, position: &BookPosition) -> Option<&Book> {
        allocator::occupant(&self.books, position)
    }

    pub fn next_available_slot(&self) -> Option<BookPosition> {
        allocator::find_next_available_slot(&self.bookcases, &self.books)
    }

    /// The first `limit` free slots in scan order.
    pub fn free_slots(&self, limit: usize) -> Vec<BookPosition> {
        allocator::free_slots(&self.bookcases, &self.books)
            .take(limit)
            .collect()
    }

    pub fn free_slot_count(&self) -> u64 {
        allocator::free_slot_count(&self.bookcases, &self.books)
    }

    pub fn capacity(&self) -> u64 {
        allocator::total_capacity(&self.bookcases)
    }

    /// The persisted portion: books and bookcases only.
    pub fn document(&self) -> LibraryDocument {
        LibraryDocument::new(self.books.clone(), self.bookcases.clone())
    }

    pub fn snapshot(&self) -> LibrarySnapshot {
        LibrarySnapshot {
            books: self.books.clone(),
            bookcases: self.bookcases.clone(),
            ui: self.ui.clone(),
        }
    }

    // ---- Books ----

    /// Place a new book in the first free slot.
    ///
    /// The slot is chosen here, at commit time. On exhaustion nothing is
    /// created and the state is left exactly as it was. On success the
    /// add-book panel closes.
    pub fn commit_book(&mut self, draft: BookDraft, cover: ResolvedCover) -> StoreResult<Book> {
        draft.validate()?;
        let position = self
            .next_available_slot()
            .ok_or(StoreError::AllocationExhausted)?;
        let book = Book::from_draft(draft, cover, position);
        debug!(id = %book.id, position = %book.position, "book added");
        self.books.push(book.clone());
        self.ui.is_add_book_panel_open = false;
        Ok(book)
    }

    /// Move a book to `new_position`.
    ///
    /// Move mode always ends, whatever the outcome. An unknown `book_id` is
    /// a no-op returning `Ok(false)`. The target must name an existing
    /// bookcase, be in range, and be free or already held by this book.
    pub fn update_book_position(
        &mut self,
        book_id: &BookId,
        new_position: BookPosition,
    ) -> StoreResult<bool> {
        self.ui.moving_book_id = None;

        let Some(index) = self.books.iter().position(|book| &book.id == book_id) else {
            return Ok(false);
        };
        let bookcase = self
            .bookcase(&new_position.bookcase_id)
            .ok_or_else(|| StoreError::UnknownBookcase(new_position.bookcase_id.clone()))?;
        if !bookcase.in_range(&new_position) {
            return Err(StoreError::PositionOutOfRange(new_position));
        }
        if let Some(other) = self
            .books
            .iter()
            .find(|book| book.occupies(&new_position) && &book.id != book_id)
        {
            return Err(StoreError::SlotOccupied {
                position: new_position,
                occupant: other.id.clone(),
            });
        }

        debug!(id = %book_id, to = %new_position, "book moved");
        self.books[index].position = new_position;
        Ok(true)
    }

    /// Remove a book, clearing the selection if it was selected.
    pub fn delete_book(&mut self, book_id: &BookId) -> Option<Book> {
        let index = self.books.iter().position(|book| &book.id == book_id)?;
        let removed = self.books.remove(index);
        if self.ui.selected_book_id.as_ref() == Some(book_id) {
            self.ui.selected_book_id = None;
            self.ui.is_book_detail_open = false;
        }
        debug!(id = %book_id, "book deleted");
        Some(removed)
    }

    /// Replace a book's cover. Returns `false` if the book is gone.
    pub fn set_cover(&mut self, book_id: &BookId, cover: ResolvedCover) -> bool {
        match self.books.iter_mut().find(|book| &book.id == book_id) {
            Some(book) => {
                book.cover_url = cover.url;
                book.cover_generated = cover.generated;
                true
            }
            None => false,
        }
    }

    // ---- Bookcases ----

    /// Append a bookcase sized and placed by the layout.
    ///
    /// The id is `bookcase-{count + 1}`, bumped past any id already taken
    /// (imported libraries may not be numbered contiguously).
    pub fn add_bookcase(&mut self) -> Bookcase {
        let index = self.bookcases.len();
        let mut ordinal = index + 1;
        let id = loop {
            let candidate = BookcaseId::for_ordinal(ordinal);
            if self.bookcase(&candidate).is_none() {
                break candidate;
            }
            ordinal += 1;
        };
        let bookcase = self.layout.build(id, index);
        debug!(id = %bookcase.id, "bookcase added");
        self.bookcases.push(bookcase.clone());
        bookcase
    }

    /// Ensure at least one bookcase exists. Returns `true` if one was added.
    pub fn bootstrap(&mut self) -> bool {
        if self.bookcases.is_empty() {
            self.add_bookcase();
            true
        } else {
            false
        }
    }

    /// Replace books and bookcases wholesale with a validated document.
    ///
    /// Selection and panels reset, since they may name books that no longer
    /// exist. The loading flag is left alone.
    pub fn replace_collections(&mut self, document: LibraryDocument) {
        self.books = document.books;
        self.bookcases = document.bookcases;
        self.ui = UiState {
            is_loading_cover: self.ui.is_loading_cover,
            ..UiState::default()
        };
    }

    // ---- Selection and panels ----

    /// Select a book (or clear the selection). Opens the detail panel iff a
    /// book is given; always leaves move mode and closes the reading view.
    pub fn select_book(&mut self, book_id: Option<BookId>) {
        self.ui.is_book_detail_open = book_id.is_some();
        self.ui.selected_book_id = book_id;
        self.ui.is_book_view_open = false;
        self.ui.moving_book_id = None;
    }

    /// Enter (or leave) move mode. The detail panel closes either way.
    pub fn set_moving_book(&mut self, book_id: Option<BookId>) {
        self.ui.moving_book_id = book_id;
        self.ui.is_book_detail_open = false;
    }

    /// Leave move mode without touching any other state.
    pub fn cancel_move(&mut self) {
        self.ui.moving_book_id = None;
    }

    /// Open, close, or flip the add-book panel.
    pub fn toggle_add_book_panel(&mut self, open: Option<bool>) {
        self.ui.is_add_book_panel_open = open.unwrap_or(!self.ui.is_add_book_panel_open);
    }

    /// Open, close, or flip the detail panel. Explicitly closing it also
    /// clears the selection.
    pub fn toggle_book_detail(&mut self, open: Option<bool>) {
        self.ui.is_book_detail_open = open.unwrap_or(!self.ui.is_book_detail_open);
        if open == Some(false) {
            self.ui.selected_book_id = None;
        }
    }

    /// Open, close, or flip the reading view. Explicitly opening it closes
    /// the detail panel.
    pub fn toggle_book_view(&mut self, open: Option<bool>) {
        self.ui.is_book_view_open = open.unwrap_or(!self.ui.is_book_view_open);
        if open == Some(true) {
            self.ui.is_book_detail_open = false;
        }
    }

    pub fn set_loading_cover(&mut self, loading: bool) {
        self.ui.is_loading_cover = loading;
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new(BookcaseLayout::default())
    }
}
