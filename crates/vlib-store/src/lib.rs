//! Library state management for the Virtual Library.
//!
//! This crate holds the part of the system with real invariants: assigning
//! every book a unique `(bookcase, shelf, slot)` coordinate, mutating the
//! library through named operations, and moving the persisted portion of
//! the state in and out of durable storage.
//!
//! # Modules
//!
//! - [`allocator`]: Deterministic first-free-slot search and occupancy tests
//! - [`library`]: The [`Library`] state struct and its operations
//! - [`state`]: Ephemeral UI selection state and read-only snapshots
//! - [`document`]: [`LibraryDocument`] encode/decode with strict validation
//! - [`storage`]: The [`StateStorage`] trait with memory and file backends
//! - [`error`]: Error types for all of the above
//!
//! # Invariants
//!
//! 1. At most one book occupies any slot coordinate.
//! 2. Every book's position names an existing bookcase and in-range indices.
//! 3. Only books and bookcases are persisted; UI state always starts fresh.
//! 4. Imports are all-or-nothing: a rejected document leaves state untouched.

pub mod allocator;
pub mod document;
pub mod error;
pub mod library;
pub mod state;
pub mod storage;

pub use allocator::{
    find_next_available_slot, free_slot_count, free_slots, is_occupied, occupant, total_capacity,
};
pub use document::LibraryDocument;
pub use error::{ImportError, StorageError, StoreError, StoreResult};
pub use library::Library;
pub use state::{LibrarySnapshot, UiState};
pub use storage::{FileStateStorage, InMemoryStateStorage, StateStorage, DEFAULT_NAMESPACE};
