use async_trait::async_trait;

use crate::error::CoverResult;
use crate::image::CoverImage;

/// External image-generation collaborator.
///
/// Every failure mode (missing credential, service error, empty response)
/// surfaces as a [`CoverError`](crate::CoverError).
#[async_trait]
pub trait CoverGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> CoverResult<CoverImage>;
}

/// The prompt sent to the generator for a given book.
pub fn cover_prompt(title: &str, author: &str) -> String {
    format!(
        "Minimalist book cover for '{title}' by {author}. Style: modern, warm palette, bold title typography."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_title_and_author() {
        assert_eq!(
            cover_prompt("Dune", "Frank Herbert"),
            "Minimalist book cover for 'Dune' by Frank Herbert. Style: modern, warm palette, bold title typography."
        );
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(cover_prompt("T", "A"), cover_prompt("T", "A"));
    }
}
