use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use vlib_cover::{CoverCoordinator, CoverGenerator, GeminiCoverGenerator};
use vlib_store::{FileStateStorage, Library, LibraryDocument, LibrarySnapshot, StateStorage};
use vlib_types::{Book, BookDraft, BookId, BookPosition, Bookcase};

use crate::config::LibraryConfig;
use crate::error::{LibraryError, LibraryResult};

/// A library persisted under the configured data directory with covers
/// generated by Gemini.
pub type LocalLibrary = VirtualLibrary<FileStateStorage, GeminiCoverGenerator>;

/// The main entry point for working with a virtual library.
///
/// Operations that change books or bookcases run one at a time, including
/// across the await points of cover generation, and persist before their
/// result becomes visible. Failed operations leave both the in-memory state
/// and the stored record as they were.
///
/// # Example
///
/// ```no_run
/// use vlib_sdk::{BookDraft, LibraryConfig, VirtualLibrary};
///
/// # async fn example() -> vlib_sdk::LibraryResult<()> {
/// let library = VirtualLibrary::open_local(&LibraryConfig::default())?;
/// library.load_library().await?;
/// let book = library.add_book(BookDraft::new("Dune", "Frank Herbert"), None).await?;
/// println!("shelved at {}", book.position);
/// # Ok(())
/// # }
/// ```
pub struct VirtualLibrary<S, G> {
    state: RwLock<Library>,
    ops: Mutex<()>,
    storage: S,
    covers: CoverCoordinator<G>,
    namespace: String,
    export_file_name: String,
}

impl LocalLibrary {
    /// Open the library stored in `config.data_dir`.
    pub fn open_local(config: &LibraryConfig) -> LibraryResult<Self> {
        let storage = FileStateStorage::open(&config.data_dir)?;
        let generator = GeminiCoverGenerator::from_env(config.cover.clone())?;
        Self::open(storage, generator, config)
    }
}

impl<S: StateStorage, G: CoverGenerator> VirtualLibrary<S, G> {
    /// Open a library, rehydrating books and bookcases from `storage`.
    ///
    /// A missing record yields an empty library. A record that exists but
    /// does not decode is an error rather than silently discarded.
    pub fn open(storage: S, generator: G, config: &LibraryConfig) -> LibraryResult<Self> {
        config.validate()?;
        let library = match storage.load(&config.namespace)? {
            Some(record) => {
                let document = LibraryDocument::decode(&record).map_err(|e| {
                    warn!(
                        namespace = %config.namespace,
                        error = %e,
                        "stored library is unreadable"
                    );
                    LibraryError::Persisted(e)
                })?;
                info!(
                    books = document.books.len(),
                    bookcases = document.bookcases.len(),
                    "library rehydrated"
                );
                Library::from_document(document, config.layout.clone())
            }
            None => Library::new(config.layout.clone()),
        };

        Ok(Self {
            state: RwLock::new(library),
            ops: Mutex::new(()),
            storage,
            covers: CoverCoordinator::new(generator),
            namespace: config.namespace.clone(),
            export_file_name: config.export_file_name.clone(),
        })
    }

    pub fn cover_generator(&self) -> &G {
        self.covers.generator()
    }

    // ---- Reads ----

    pub fn snapshot(&self) -> LibrarySnapshot {
        self.read().snapshot()
    }

    pub fn book(&self, id: &BookId) -> Option<Book> {
        self.read().book(id).cloned()
    }

    pub fn next_available_slot(&self) -> Option<BookPosition> {
        self.read().next_available_slot()
    }

    /// The first `limit` free slots in scan order.
    pub fn free_slots(&self, limit: usize) -> Vec<BookPosition> {
        self.read().free_slots(limit)
    }

    pub fn free_slot_count(&self) -> u64 {
        self.read().free_slot_count()
    }

    pub fn capacity(&self) -> u64 {
        self.read().capacity()
    }

    // ---- Collection operations ----

    /// Make sure at least one bookcase exists. Returns `true` if the first
    /// bookcase was created.
    pub async fn load_library(&self) -> LibraryResult<bool> {
        let _op = self.ops.lock().await;
        let created = self.mutate(|library| Ok(library.bootstrap()))?;
        if created {
            info!("created first bookcase");
        }
        Ok(created)
    }

    /// Add a book, resolving its cover first.
    ///
    /// The draft is checked and the library must have a free slot before any
    /// cover is fetched. The slot itself is picked when the book is committed.
    /// `is_loading_cover` is up for the whole call, whatever the cover source.
    pub async fn add_book(&self, draft: BookDraft, upload: Option<&Path>) -> LibraryResult<Book> {
        let _op = self.ops.lock().await;
        let _loading = LoadingCover::start(&self.state);
        draft.validate()?;
        let full = self.read().next_available_slot().is_none();
        if full {
            warn!(title = %draft.title, "no free slot for new book");
            return Err(LibraryError::AllocationExhausted);
        }

        let cover = self.covers.resolve(&draft, upload).await?;
        let book = self.mutate(|library| Ok(library.commit_book(draft, cover)?))?;
        info!(id = %book.id, title = %book.title, position = %book.position, "book added");
        Ok(book)
    }

    /// Replace a book's cover with a newly generated one.
    ///
    /// Returns `Ok(None)` if no such book exists.
    pub async fn generate_cover_for_book(&self, id: &BookId) -> LibraryResult<Option<Book>> {
        let _op = self.ops.lock().await;
        let found = self
            .read()
            .book(id)
            .map(|book| (book.title.clone(), book.author.clone()));
        let Some((title, author)) = found else {
            return Ok(None);
        };

        let cover = {
            let _loading = LoadingCover::start(&self.state);
            self.covers.regenerate(&title, &author).await?
        };

        let updated = self.mutate(|library| {
            library.set_cover(id, cover);
            Ok(library.book(id).cloned())
        })?;
        info!(id = %id, "cover regenerated");
        Ok(updated)
    }

    /// Move a book. Move mode ends whether or not the move succeeds.
    ///
    /// Returns `Ok(false)` if the book does not exist.
    pub async fn update_book_position(
        &self,
        id: &BookId,
        position: BookPosition,
    ) -> LibraryResult<bool> {
        let _op = self.ops.lock().await;
        match self.mutate(|library| Ok(library.update_book_position(id, position)?)) {
            Ok(moved) => Ok(moved),
            Err(e) => {
                self.write().cancel_move();
                warn!(id = %id, error = %e, "move rejected");
                Err(e)
            }
        }
    }

    /// Delete a book, returning it if it existed.
    pub async fn delete_book(&self, id: &BookId) -> LibraryResult<Option<Book>> {
        let _op = self.ops.lock().await;
        let removed = self.mutate(|library| Ok(library.delete_book(id)))?;
        if let Some(book) = &removed {
            info!(id = %book.id, title = %book.title, "book deleted");
        }
        Ok(removed)
    }

    pub async fn add_bookcase(&self) -> LibraryResult<Bookcase> {
        let _op = self.ops.lock().await;
        let bookcase = self.mutate(|library| Ok(library.add_bookcase()))?;
        info!(id = %bookcase.id, "bookcase added");
        Ok(bookcase)
    }

    // ---- Import / export ----

    /// Replace the whole library with a serialized document.
    ///
    /// The document is fully validated first; on any error nothing changes.
    pub async fn import_library(&self, text: &str) -> LibraryResult<LibraryDocument> {
        let _op = self.ops.lock().await;
        let document = LibraryDocument::decode(text)?;
        let imported = document.clone();
        self.mutate(|library| {
            library.replace_collections(document);
            Ok(())
        })?;
        info!(
            books = imported.books.len(),
            bookcases = imported.bookcases.len(),
            "library imported"
        );
        Ok(imported)
    }

    pub async fn import_library_file(&self, path: &Path) -> LibraryResult<LibraryDocument> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| LibraryError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
        self.import_library(&text).await
    }

    /// Serialize books and bookcases as pretty-printed JSON.
    pub fn export_library(&self) -> LibraryResult<String> {
        Ok(self.read().document().encode_pretty()?)
    }

    /// Write the export to `target`. A directory target gets the configured
    /// export file name. Returns the path written.
    pub async fn export_library_to(&self, target: &Path) -> LibraryResult<PathBuf> {
        let path = if tokio::fs::metadata(target)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
        {
            target.join(&self.export_file_name)
        } else {
            target.to_path_buf()
        };
        let text = self.export_library()?;
        tokio::fs::write(&path, text).await?;
        info!(path = %path.display(), "library exported");
        Ok(path)
    }

    // ---- Selection and panels ----

    pub fn select_book(&self, id: Option<BookId>) {
        self.write().select_book(id);
    }

    pub fn set_moving_book(&self, id: Option<BookId>) {
        self.write().set_moving_book(id);
    }

    pub fn toggle_add_book_panel(&self, open: Option<bool>) {
        self.write().toggle_add_book_panel(open);
    }

    pub fn toggle_book_detail(&self, open: Option<bool>) {
        self.write().toggle_book_detail(open);
    }

    pub fn toggle_book_view(&self, open: Option<bool>) {
        self.write().toggle_book_view(open);
    }

    // ---- Internals ----

    fn read(&self) -> RwLockReadGuard<'_, Library> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Library> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `change` to a copy of the state, persist the copy, then swap it
    /// in. The write lock is held throughout so UI updates are not lost.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Library) -> LibraryResult<T>,
    ) -> LibraryResult<T> {
        let mut state = self.write();
        let mut next = state.clone();
        let out = change(&mut next)?;
        let record = next.document().encode()?;
        self.storage.save(&self.namespace, &record)?;
        debug!(namespace = %self.namespace, bytes = record.len(), "library persisted");
        *state = next;
        Ok(out)
    }
}

/// Holds `is_loading_cover` up for as long as it lives.
struct LoadingCover<'a> {
    state: &'a RwLock<Library>,
}

impl<'a> LoadingCover<'a> {
    fn start(state: &'a RwLock<Library>) -> Self {
        state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_loading_cover(true);
        Self { state }
    }
}

impl Drop for LoadingCover<'_> {
    fn drop(&mut self) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_loading_cover(false);
    }
}
