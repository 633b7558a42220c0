//! Configuration, passed explicitly to the issuer and verifier.

use std::path::{Path, PathBuf};

use certledger_document::DocumentConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default cap on submitted documents: 10 MiB.
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config is not valid JSON for [`CertifyConfig`].
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
///
/// Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CertifyConfig {
    /// Template and asset settings.
    pub document: DocumentConfig,
    /// Submitted documents larger than this are rejected unread.
    pub max_document_bytes: u64,
    /// Directory for scratch files during issuance. System temp dir if unset.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for CertifyConfig {
    fn default() -> Self {
        Self {
            document: DocumentConfig::default(),
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            scratch_dir: None,
        }
    }
}

impl CertifyConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_document_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_document_bytes must be greater than zero".into(),
            ));
        }
        if self.document.mark_file.trim().is_empty() {
            return Err(ConfigError::Invalid("document.mark_file is empty".into()));
        }
        if self.document.title.trim().is_empty() {
            return Err(ConfigError::Invalid("document.title is empty".into()));
        }
        Ok(())
    }
}
