//! Gemini image generation over HTTP.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::CoverConfig;
use crate::error::{CoverError, CoverResult};
use crate::generator::CoverGenerator;
use crate::image::{CoverImage, ImageMime};

/// [`CoverGenerator`] backed by the Gemini `generateContent` endpoint.
///
/// The API key is read from the configured environment variable when the
/// generator is built. A missing key is not an error until a cover is
/// actually requested.
pub struct GeminiCoverGenerator {
    client: reqwest::Client,
    config: CoverConfig,
    api_key: Option<String>,
}

impl GeminiCoverGenerator {
    /// Build a generator, taking the API key from `config.api_key_env`.
    pub fn from_env(config: CoverConfig) -> CoverResult<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!(
                env = %config.api_key_env,
                "cover generation API key not found; generation will fail"
            );
        }
        Self::build(config, api_key)
    }

    /// Build a generator with an explicit API key.
    pub fn with_api_key(config: CoverConfig, api_key: impl Into<String>) -> CoverResult<Self> {
        Self::build(config, Some(api_key.into()))
    }

    fn build(config: CoverConfig, api_key: Option<String>) -> CoverResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| CoverError::Service(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl CoverGenerator for GeminiCoverGenerator {
    async fn generate(&self, prompt: &str) -> CoverResult<CoverImage> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CoverError::MissingCredential {
                env: self.config.api_key_env.clone(),
            })?;

        debug!(model = %self.config.model, "requesting generated cover");
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&GenerateContentRequest::image(prompt))
            .send()
            .await
            .map_err(|e| CoverError::Service(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoverError::Service(format!("HTTP {status}: {body}")));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| CoverError::Service(format!("unreadable response: {e}")))?;
        extract_image(body)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

impl<'a> GenerateContentRequest<'a> {
    fn image(prompt: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![TextPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE"],
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: String,
}

/// The first inline image of the first candidate.
fn extract_image(response: GenerateContentResponse) -> CoverResult<CoverImage> {
    let inline = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.inline_data))
        .ok_or(CoverError::NoImageData)?;

    let bytes = STANDARD
        .decode(inline.data.as_bytes())
        .map_err(|e| CoverError::Decode(e.to_string()))?;
    if bytes.is_empty() {
        return Err(CoverError::NoImageData);
    }
    let mime = inline
        .mime_type
        .as_deref()
        .map(ImageMime::from_mime)
        .unwrap_or(ImageMime::Png);
    Ok(CoverImage::new(bytes, mime))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(GenerateContentRequest::image("a prompt")).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "a prompt");
        assert_eq!(body["generationConfig"]["responseModalities"][0], "IMAGE");
    }

    #[test]
    fn extracts_first_inline_image() {
        let response = parse(
            r#"{
                "candidates": [{
                    "content": { "parts": [
                        { "text": "Here is your cover" },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "aGVsbG8=" } },
                        { "inlineData": { "mimeType": "image/png", "data": "d29ybGQ=" } }
                    ] }
                }]
            }"#,
        );
        let image = extract_image(response).unwrap();
        assert_eq!(&image.bytes[..], b"hello");
        assert_eq!(image.mime, ImageMime::Jpeg);
    }

    #[test]
    fn missing_mime_defaults_to_png() {
        let response = parse(
            r#"{ "candidates": [{ "content": { "parts": [ { "inlineData": { "data": "aGVsbG8=" } } ] } }] }"#,
        );
        assert_eq!(extract_image(response).unwrap().mime, ImageMime::Png);
    }

    #[test]
    fn text_only_response_has_no_image() {
        let response =
            parse(r#"{ "candidates": [{ "content": { "parts": [ { "text": "sorry" } ] } }] }"#);
        assert!(matches!(extract_image(response), Err(CoverError::NoImageData)));
        assert!(matches!(
            extract_image(parse("{}")),
            Err(CoverError::NoImageData)
        ));
    }

    #[test]
    fn empty_payload_has_no_image() {
        let response = parse(
            r#"{ "candidates": [{ "content": { "parts": [ { "inlineData": { "data": "" } } ] } }] }"#,
        );
        assert!(matches!(extract_image(response), Err(CoverError::NoImageData)));
    }

    #[test]
    fn bad_base64_is_a_decode_error() {
        let response = parse(
            r#"{ "candidates": [{ "content": { "parts": [ { "inlineData": { "data": "%%%" } } ] } }] }"#,
        );
        assert!(matches!(extract_image(response), Err(CoverError::Decode(_))));
    }

    #[test]
    fn url_joins_endpoint_and_model() {
        let config = CoverConfig {
            endpoint: "https://example.test/v1beta/".into(),
            ..Default::default()
        };
        let generator = GeminiCoverGenerator::with_api_key(config, "k").unwrap();
        assert_eq!(
            generator.url(),
            "https://example.test/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
    }

    #[tokio::test]
    async fn missing_credential_fails_without_network() {
        let config = CoverConfig {
            api_key_env: "VLIB_TEST_UNSET_KEY_3F9A".into(),
            endpoint: "http://127.0.0.1:9".into(),
            ..Default::default()
        };
        let generator = GeminiCoverGenerator::from_env(config).unwrap();
        assert!(!generator.has_credential());
        let err = generator.generate("prompt").await.unwrap_err();
        assert!(matches!(
            err,
            CoverError::MissingCredential { env } if env == "VLIB_TEST_UNSET_KEY_3F9A"
        ));
    }
}
