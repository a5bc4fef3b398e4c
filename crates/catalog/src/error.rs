use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// Malformed or oversized name/content. Caller input problem.
    #[error("validation failed for '{name}': {reason}")]
    Validation { name: String, reason: String },

    /// Filesystem failure other than "missing".
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No supported extension yielded non-empty content. A normal outcome,
    /// modeled explicitly rather than as an empty return.
    #[error("spike '{0}' not found in catalog")]
    NotFound(String),

    #[error("failed to parse spike '{name}': {reason}")]
    Parse { name: String, reason: String },
}

impl CatalogError {
    pub fn validation(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
