use std::fmt;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;

/// MIME type of a cover image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageMime {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
    Svg,
    OctetStream,
    Other(String),
}

impl ImageMime {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
            Self::Bmp => "image/bmp",
            Self::Svg => "image/svg+xml",
            Self::OctetStream => "application/octet-stream",
            Self::Other(s) => s,
        }
    }

    pub fn from_mime(s: &str) -> Self {
        match s {
            "image/png" => Self::Png,
            "image/jpeg" => Self::Jpeg,
            "image/gif" => Self::Gif,
            "image/webp" => Self::Webp,
            "image/bmp" => Self::Bmp,
            "image/svg+xml" => Self::Svg,
            "application/octet-stream" => Self::OctetStream,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "gif" => Self::Gif,
            "webp" => Self::Webp,
            "bmp" => Self::Bmp,
            "svg" => Self::Svg,
            _ => Self::OctetStream,
        }
    }

    /// Identify an image by its leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else if bytes.starts_with(b"BM") {
            Some(Self::Bmp)
        } else {
            None
        }
    }

    /// Sniff the content first, then fall back to the file extension.
    pub fn detect(bytes: &[u8], path: &Path) -> Self {
        Self::sniff(bytes).unwrap_or_else(|| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(Self::from_extension)
                .unwrap_or(Self::OctetStream)
        })
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw cover image bytes with their MIME type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverImage {
    pub bytes: Bytes,
    pub mime: ImageMime,
}

impl CoverImage {
    pub fn new(bytes: impl Into<Bytes>, mime: ImageMime) -> Self {
        Self {
            bytes: bytes.into(),
            mime,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The storable embedded representation: `data:<mime>;base64,<payload>`.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn sniffs_common_formats() {
        assert_eq!(ImageMime::sniff(PNG_HEADER), Some(ImageMime::Png));
        assert_eq!(ImageMime::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageMime::Jpeg));
        assert_eq!(ImageMime::sniff(b"GIF89a...."), Some(ImageMime::Gif));
        assert_eq!(ImageMime::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageMime::Webp));
        assert_eq!(ImageMime::sniff(b"hello"), None);
    }

    #[test]
    fn detect_falls_back_to_extension() {
        assert_eq!(
            ImageMime::detect(b"<svg/>", Path::new("cover.SVG")),
            ImageMime::Svg
        );
        assert_eq!(
            ImageMime::detect(PNG_HEADER, Path::new("cover.jpg")),
            ImageMime::Png
        );
        assert_eq!(
            ImageMime::detect(b"???", Path::new("cover")),
            ImageMime::OctetStream
        );
    }

    #[test]
    fn mime_string_round_trip() {
        for mime in [ImageMime::Png, ImageMime::Jpeg, ImageMime::Webp, ImageMime::Svg] {
            assert_eq!(ImageMime::from_mime(mime.as_str()), mime);
        }
        assert_eq!(
            ImageMime::from_mime("image/avif"),
            ImageMime::Other("image/avif".into())
        );
    }

    #[test]
    fn data_url_embeds_payload() {
        let image = CoverImage::new(b"hello".to_vec(), ImageMime::Png);
        assert_eq!(image.to_data_url(), "data:image/png;base64,aGVsbG8=");
    }
}
