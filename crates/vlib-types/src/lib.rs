//! Foundation types for the Virtual Library.
//!
//! This crate defines the entity model shared by every other `vlib` crate:
//! the books on the shelves, the bookcases that hold them, and the
//! composite slot coordinate that ties the two together.
//!
//! # Key Types
//!
//! - [`Book`]: A book record placed at exactly one [`BookPosition`]
//! - [`Bookcase`]: A set of shelves, each with a fixed number of slots
//! - [`BookPosition`]: `(bookcase, shelf, slot)` coordinate of a single slot
//! - [`BookId`] / [`BookcaseId`]: Opaque string identities
//! - [`BookDraft`]: Caller-supplied fields for a new book
//! - [`ResolvedCover`]: Cover locator chosen for a new book
//! - [`BookcaseLayout`]: Dimensions and placement rules for new bookcases

pub mod book;
pub mod bookcase;
pub mod error;
pub mod identity;

pub use book::{Book, BookDraft, BookPosition, ResolvedCover};
pub use bookcase::{Bookcase, BookcaseLayout};
pub use error::TypeError;
pub use identity::{BookId, BookcaseId};
