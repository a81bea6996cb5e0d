//! Cover acquisition for the Virtual Library.
//!
//! A book's cover comes from one of three places, checked in order:
//!
//! 1. an uploaded image file, read from disk and embedded as a `data:` URL;
//! 2. a cover locator supplied with the book;
//! 3. the image-generation service, prompted with the title and author.
//!
//! The generation service sits behind the [`CoverGenerator`] trait.
//! [`GeminiCoverGenerator`] talks to the Gemini image API over HTTP; tests
//! substitute their own implementations.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod gemini;
pub mod generator;
pub mod image;

pub use config::CoverConfig;
pub use coordinator::{read_upload, CoverCoordinator};
pub use error::{CoverError, CoverResult};
pub use gemini::GeminiCoverGenerator;
pub use generator::{cover_prompt, CoverGenerator};
pub use image::{CoverImage, ImageMime};
