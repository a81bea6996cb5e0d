use serde::Serialize;
use vlib_types::{Book, BookId, Bookcase};

/// Ephemeral selection and panel-visibility state.
///
/// Never persisted or exported: every process starts from `Default`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub selected_book_id: Option<BookId>,
    /// The book waiting for a destination slot while in move mode.
    pub moving_book_id: Option<BookId>,
    pub is_add_book_panel_open: bool,
    pub is_book_detail_open: bool,
    /// Full-text reading view.
    pub is_book_view_open: bool,
    /// Set while a cover is being read or generated.
    pub is_loading_cover: bool,
}

impl UiState {
    pub fn is_moving(&self) -> bool {
        self.moving_book_id.is_some()
    }
}

/// Read-only view of the whole library handed to renderers.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySnapshot {
    pub books: Vec<Book>,
    pub bookcases: Vec<Bookcase>,
    pub ui: UiState,
}

impl LibrarySnapshot {
    pub fn selected_book(&self) -> Option<&Book> {
        let id = self.ui.selected_book_id.as_ref()?;
        self.books.iter().find(|book| &book.id == id)
    }
}
