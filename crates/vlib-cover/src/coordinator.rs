use std::path::Path;

use tracing::{debug, info, warn};
use vlib_types::{BookDraft, ResolvedCover};

use crate::error::{CoverError, CoverResult};
use crate::generator::{cover_prompt, CoverGenerator};
use crate::image::{CoverImage, ImageMime};

/// Decides where a book's cover comes from and fetches it.
pub struct CoverCoordinator<G> {
    generator: G,
}

impl<G: CoverGenerator> CoverCoordinator<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Generate a cover for `title` by `author`.
    pub async fn acquire_cover(&self, title: &str, author: &str) -> CoverResult<CoverImage> {
        let prompt = cover_prompt(title, author);
        let image = match self.generator.generate(&prompt).await {
            Ok(image) => image,
            Err(e) => {
                warn!(title, error = %e, "cover generation failed");
                return Err(e);
            }
        };
        if image.is_empty() {
            warn!(title, "cover generation returned an empty image");
            return Err(CoverError::NoImageData);
        }
        info!(title, bytes = image.bytes.len(), mime = %image.mime, "cover generated");
        Ok(image)
    }

    /// Pick the cover for a new book.
    ///
    /// An upload always wins and never touches the generator. Otherwise an
    /// explicit locator on the draft is kept, and only when neither is given
    /// is a cover generated.
    pub async fn resolve(
        &self,
        draft: &BookDraft,
        upload: Option<&Path>,
    ) -> CoverResult<ResolvedCover> {
        if let Some(path) = upload {
            let image = read_upload(path).await?;
            return Ok(ResolvedCover::uploaded(image.to_data_url()));
        }
        if let Some(url) = draft.explicit_cover() {
            return Ok(ResolvedCover::uploaded(url));
        }
        let image = self.acquire_cover(&draft.title, &draft.author).await?;
        Ok(ResolvedCover::generated(image.to_data_url()))
    }

    /// A freshly generated cover for an existing book.
    pub async fn regenerate(&self, title: &str, author: &str) -> CoverResult<ResolvedCover> {
        let image = self.acquire_cover(title, author).await?;
        Ok(ResolvedCover::generated(image.to_data_url()))
    }
}

/// Read an uploaded cover file into memory.
pub async fn read_upload(path: &Path) -> CoverResult<CoverImage> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| CoverError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
    let mime = ImageMime::detect(&bytes, path);
    debug!(path = %path.display(), bytes = bytes.len(), %mime, "cover upload read");
    Ok(CoverImage::new(bytes, mime))
}
