use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the cover generation backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverConfig {
    /// Image-capable model name.
    pub model: String,
    /// Base URL of the generative language API.
    pub endpoint: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Upper bound on a single generation request.
    pub request_timeout_secs: u64,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash-image".into(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".into(),
            api_key_env: "API_KEY".into(),
            request_timeout_secs: 60,
        }
    }
}

impl CoverConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = CoverConfig::default();
        assert_eq!(c.model, "gemini-2.5-flash-image");
        assert_eq!(c.api_key_env, "API_KEY");
        assert_eq!(c.request_timeout(), Duration::from_secs(60));
    }
}
