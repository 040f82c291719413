use std::path::PathBuf;

use thiserror::Error;

/// Export error types.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A digest string did not match the expected textual form.
    #[error("Malformed digest '{text}': expected '<algorithm>{separator}<hex>'")]
    MalformedDigest { text: String, separator: char },

    /// No manifest file exists for the requested model.
    #[error("Manifest for '{reference}' not found: {path}")]
    ManifestNotFound { reference: String, path: PathBuf },

    /// An explicit manifest path lies outside the models directory.
    #[error("Manifest {path} is not under the models directory {root}")]
    NotUnderRoot { path: PathBuf, root: PathBuf },

    /// A manifest file could not be parsed.
    #[error("Invalid manifest {path}: {message}")]
    InvalidManifest { path: PathBuf, message: String },

    /// A digest referenced by a manifest has no blob file on disk.
    #[error("Blob {digest} referenced by '{reference}' not found: {path}")]
    BlobNotFound {
        digest: String,
        reference: String,
        path: PathBuf,
    },

    /// Copying a file into the destination directory failed.
    #[error("Failed to copy {path}: {source}")]
    CopyFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing an archive entry failed.
    #[error("Failed to write archive entry {path}: {source}")]
    ArchiveWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// I/O error outside the cases above.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
