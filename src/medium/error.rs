//! Error types for medium loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::medium::MediumKind;

/// Errors that can occur while loading or attaching a medium.
///
/// This is the only error class an editor surfaces to its caller; the editor
/// stays disabled until a new source loads successfully.
#[derive(Error, Debug)]
pub enum MediumLoadError {
    /// I/O error while reading an asset
    #[error("IO error reading {path:?}: {source}")]
    Io {
        /// The asset path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Asset bytes could not be decoded
    #[error("[{loader}] Failed to decode: {message}")]
    Decode {
        /// The loader that failed
        loader: &'static str,
        /// Description of the decode error
        message: String,
    },

    /// No loader handles this asset
    #[error("No loader could handle the asset (file: {filename:?})")]
    Unsupported {
        /// Name of the asset, if known
        filename: Option<String>,
    },

    /// Metadata such as a duration is missing or nonsensical
    #[error("Invalid medium metadata: {message}")]
    InvalidMetadata {
        /// Description of the problem
        message: String,
    },

    /// The source names neither a path nor inline bytes
    #[error("{kind} source has no path or bytes")]
    MissingAsset {
        /// Medium that was being loaded
        kind: MediumKind,
    },

    /// The loaded medium does not fit the editor
    #[error("Medium mismatch: editor expects {expected}, got {found}")]
    KindMismatch {
        /// Medium the adapter handles
        expected: MediumKind,
        /// Medium that was supplied
        found: MediumKind,
    },
}

impl MediumLoadError {
    /// Create a decode error.
    pub fn decode(loader: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            loader,
            message: message.into(),
        }
    }

    /// Create an invalid metadata error.
    pub fn invalid_metadata(message: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            message: message.into(),
        }
    }
}
