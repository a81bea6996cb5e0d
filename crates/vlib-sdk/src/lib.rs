//! High-level API for the Virtual Library.
//!
//! [`VirtualLibrary`] is the entry point for front ends: it owns the
//! [`Library`] state, serializes every operation that changes books or
//! bookcases, resolves covers, and persists after each change. Renderers read
//! from [`LibrarySnapshot`]s and never touch the state directly.

pub mod config;
pub mod error;
pub mod library;

pub use config::{ConfigError, LibraryConfig};
pub use error::{LibraryError, LibraryResult};
pub use library::{LocalLibrary, VirtualLibrary};

// Re-export key types
pub use vlib_cover::{CoverConfig, CoverGenerator, GeminiCoverGenerator};
pub use vlib_store::{
    FileStateStorage, InMemoryStateStorage, Library, LibraryDocument, LibrarySnapshot,
    StateStorage, UiState,
};
pub use vlib_types::{
    Book, BookDraft, BookId, BookPosition, Bookcase, BookcaseId, BookcaseLayout, ResolvedCover,
};
