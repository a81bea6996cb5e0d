use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vlib_cover::CoverConfig;
use vlib_store::DEFAULT_NAMESPACE;
use vlib_types::BookcaseLayout;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Library configuration, usually loaded from `vlib.toml`.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Directory holding the persisted library record.
    pub data_dir: PathBuf,
    /// Storage namespace of the record.
    pub namespace: String,
    /// File name used when exporting into a directory.
    pub export_file_name: String,
    /// Shape and placement of new bookcases.
    pub layout: BookcaseLayout,
    pub cover: CoverConfig,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".vlib"),
            namespace: DEFAULT_NAMESPACE.to_string(),
            export_file_name: "virtual-library.json".to_string(),
            layout: BookcaseLayout::default(),
            cover: CoverConfig::default(),
        }
    }
}

impl LibraryConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.is_empty()
            || self
                .namespace
                .contains(|c: char| c == '/' || c == '\\' || c == '.')
        {
            return Err(ConfigError::Invalid(format!(
                "namespace {:?} must be a plain non-empty name",
                self.namespace
            )));
        }
        if self.export_file_name.is_empty() {
            return Err(ConfigError::Invalid("export_file_name is empty".into()));
        }
        self.layout
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = LibraryConfig::default();
        assert_eq!(c.namespace, "virtual-library-storage");
        assert_eq!(c.export_file_name, "virtual-library.json");
        assert_eq!(c.layout.shelves, 5);
        assert_eq!(c.layout.slots_per_shelf, 12);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(
            LibraryConfig::from_toml_str("").unwrap(),
            LibraryConfig::default()
        );
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let c = LibraryConfig::from_toml_str(
            r#"
            data_dir = "/var/lib/vlib"

            [layout]
            shelves = 3

            [cover]
            api_key_env = "GEMINI_API_KEY"
            "#,
        )
        .unwrap();
        assert_eq!(c.data_dir, PathBuf::from("/var/lib/vlib"));
        assert_eq!(c.layout.shelves, 3);
        assert_eq!(c.layout.slots_per_shelf, 12);
        assert_eq!(c.cover.api_key_env, "GEMINI_API_KEY");
        assert_eq!(c.cover.model, "gemini-2.5-flash-image");
    }

    #[test]
    fn rejects_zero_shelves() {
        let err = LibraryConfig::from_toml_str("[layout]\nshelves = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_path_like_namespace() {
        let err = LibraryConfig::from_toml_str("namespace = \"../escape\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn toml_round_trip() {
        let c = LibraryConfig::default();
        let text = c.to_toml_string().unwrap();
        assert_eq!(LibraryConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LibraryConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
