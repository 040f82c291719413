//! Model storage layout and manifest resolution.
//!
//! Ollama keeps models under a single root directory:
//!
//! ```text
//! <root>/
//! ├── manifests/
//! │   └── registry.ollama.ai/
//! │       └── library/
//! │           └── <name>/
//! │               └── <tag>        (JSON manifest)
//! └── blobs/
//!     └── <algorithm>-<hex>        (content-addressed blob)
//! ```
//!
//! This convention is undocumented and has no enumeration API, so the
//! path construction lives here and nowhere else; a future layout change
//! is a one-place edit.

use std::path::{Path, PathBuf};

use crate::digest::Digest;
use crate::error::{ExportError, Result};
use crate::reference::ModelReference;

/// Registry host used for locally pulled models.
const DEFAULT_REGISTRY: &str = "registry.ollama.ai";

/// Namespace used for library models.
const DEFAULT_NAMESPACE: &str = "library";

/// A resolved manifest file location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLocation {
    /// Absolute path to the manifest file
    pub absolute_path: PathBuf,
    /// Path of the manifest relative to the storage root
    pub relative_path: PathBuf,
}

/// The root directory under which `manifests/` and `blobs/` live.
///
/// All relative paths produced by this crate are relative to this root.
/// The store is read-only: nothing here mutates the tree.
#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    /// Create a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Root-relative manifest path for a `name:tag` pair.
    pub fn manifest_rel_path(name: &str, tag: &str) -> PathBuf {
        ["manifests", DEFAULT_REGISTRY, DEFAULT_NAMESPACE, name, tag]
            .iter()
            .collect()
    }

    /// Root-relative blob path for a digest.
    pub fn blob_rel_path(digest: &Digest) -> PathBuf {
        Path::new("blobs").join(digest.to_blob_filename())
    }

    /// Resolve a model reference to its manifest file.
    ///
    /// Named references resolve to the canonical layout path and must
    /// exist as a regular file. Explicit paths must exist and lie under
    /// the storage root; their relative path is computed by prefix
    /// stripping. No fuzzy or partial-tag matching is performed.
    pub fn resolve(&self, reference: &ModelReference) -> Result<ManifestLocation> {
        match reference {
            ModelReference::Named { name, tag } => {
                let relative_path = Self::manifest_rel_path(name, tag);
                let absolute_path = self.root.join(&relative_path);
                if !absolute_path.is_file() {
                    return Err(ExportError::ManifestNotFound {
                        reference: reference.to_string(),
                        path: absolute_path,
                    });
                }
                tracing::debug!(reference = %reference, path = %absolute_path.display(), "resolved manifest");
                Ok(ManifestLocation {
                    absolute_path,
                    relative_path,
                })
            }
            ModelReference::Manifest(path) => {
                if !path.is_file() {
                    return Err(ExportError::ManifestNotFound {
                        reference: reference.to_string(),
                        path: path.clone(),
                    });
                }
                // Canonicalize both sides so relative inputs and symlinked
                // roots still prefix-match.
                let absolute_path = path.canonicalize()?;
                let canonical_root =
                    self.root
                        .canonicalize()
                        .map_err(|_| ExportError::NotUnderRoot {
                            path: absolute_path.clone(),
                            root: self.root.clone(),
                        })?;
                let relative_path = absolute_path
                    .strip_prefix(&canonical_root)
                    .map_err(|_| ExportError::NotUnderRoot {
                        path: absolute_path.clone(),
                        root: self.root.clone(),
                    })?
                    .to_path_buf();
                tracing::debug!(reference = %reference, path = %absolute_path.display(), "resolved manifest");
                Ok(ManifestLocation {
                    absolute_path,
                    relative_path,
                })
            }
        }
    }
}
