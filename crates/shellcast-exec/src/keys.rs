//! SSH key management and resolution

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

/// SSH key resolution strategy
#[derive(Debug, Clone)]
pub enum KeySource {
    /// Key material passed directly
    Inline(String),
    /// Explicit path to key file
    Path(PathBuf),
    /// Base64-encoded key from environment
    Env(String),
}

impl KeySource {
    /// Resolve key source to key text
    ///
    /// # Errors
    /// Returns `KeyError` if key resolution fails (env not set, invalid base64, etc.)
    pub fn resolve(&self) -> Result<String, KeyError> {
        self.resolve_with(|name| env::var(name).ok())
    }

    /// Resolve using `lookup` for environment variables
    ///
    /// # Errors
    /// Returns `KeyError` if key resolution fails
    pub fn resolve_with<F>(&self, lookup: F) -> Result<String, KeyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            KeySource::Inline(key) => Ok(key.clone()),
            KeySource::Path(path) => {
                validate_key_permissions(path)?;
                debug!(path = %path.display(), "reading SSH key file");
                Ok(std::fs::read_to_string(path)?)
            }
            KeySource::Env(var_name) => {
                let base64_key =
                    lookup(var_name).ok_or_else(|| KeyError::EnvNotSet(var_name.clone()))?;
                let key_data = base64_decode(&base64_key).map_err(|_| KeyError::InvalidBase64)?;
                String::from_utf8(key_data).map_err(|_| KeyError::NotText)
            }
        }
    }
}

/// Key resolution errors
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("environment variable {0} not set")]
    EnvNotSet(String),

    #[error("invalid base64 encoding")]
    InvalidBase64,

    #[error("decoded key is not valid UTF-8 text")]
    NotText,

    #[error("key file permissions too open: {0} (should be 600)")]
    BadPermissions(String),

    #[error("key file not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn base64_decode(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.decode(input.trim())
}

fn validate_key_permissions(path: &Path) -> Result<(), KeyError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => KeyError::NotFound(path.display().to_string()),
        _ => KeyError::Io(e),
    })?;

    // group and other bits must be clear
    if metadata.permissions().mode() & 0o77 != 0 {
        return Err(KeyError::BadPermissions(path.display().to_string()));
    }

    Ok(())
}
