//! Model manifest parsing.
//!
//! A manifest is a JSON file naming a config object and an ordered list
//! of layers, each carrying a content digest:
//!
//! ```json
//! {
//!   "config": { "digest": "sha256:<hex>", ... },
//!   "layers": [ { "digest": "sha256:<hex>", ... }, ... ]
//! }
//! ```
//!
//! Unknown fields are ignored. Blob content is trusted; digests are never
//! re-verified against the bytes they name.

use std::path::Path;

use serde::Deserialize;

use crate::digest::Digest;
use crate::error::{ExportError, Result};

/// A digest-bearing manifest entry (the config object or one layer).
#[derive(Debug, Clone, Deserialize)]
pub struct LayerEntry {
    /// Media type, read through but not interpreted
    #[serde(rename = "mediaType", default)]
    pub media_type: Option<String>,
    /// Content digest in colon form
    pub digest: Digest,
    /// Blob size in bytes, when the manifest records it
    #[serde(default)]
    pub size: Option<u64>,
}

/// A parsed model manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelManifest {
    #[serde(rename = "schemaVersion", default)]
    pub schema_version: Option<u32>,
    #[serde(rename = "mediaType", default)]
    pub media_type: Option<String>,
    /// Config object; some manifests omit it
    #[serde(default)]
    pub config: Option<LayerEntry>,
    /// Ordered layer list
    pub layers: Vec<LayerEntry>,
}

impl ModelManifest {
    /// Read and parse a manifest file.
    ///
    /// Fails with `InvalidManifest` if the content is not valid JSON,
    /// lacks a `layers` array, or any entry carries a missing or
    /// malformed digest.
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| ExportError::InvalidManifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// All referenced digests: config first (when present), then each
    /// layer in manifest order.
    pub fn digests(&self) -> impl Iterator<Item = &Digest> {
        self.config
            .iter()
            .chain(self.layers.iter())
            .map(|entry| &entry.digest)
    }

    /// Total size of all recorded blobs, from the manifest's own `size`
    /// fields. Entries without a size contribute zero.
    pub fn total_size(&self) -> u64 {
        self.config
            .iter()
            .chain(self.layers.iter())
            .filter_map(|entry| entry.size)
            .sum()
    }
}
