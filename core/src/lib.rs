//! Core library for exporting locally stored Ollama models.
//!
//! A model is not one file: it is a manifest plus a set of
//! content-addressed blobs referenced by digest, and there is no API to
//! enumerate them. This crate replicates the storage convention
//! (resolve a reference to its manifest, parse the manifest's digests,
//! map each digest to its blob path) and unions the results into a
//! deduplicated [`FileSet`] that one of three exporters consumes:
//!
//! - listing (one relative path per line)
//! - directory copy
//! - streaming tar / stored-zip archive (pipe-friendly, no seeking)
//!
//! The storage root is always passed in explicitly as a [`ModelStore`];
//! nothing here reads ambient process state, so everything is testable
//! against a synthetic directory tree.

pub mod digest;
pub mod error;
pub mod export;
pub mod fileset;
pub mod manifest;
pub mod reference;
pub mod store;

pub use digest::Digest;
pub use error::{ExportError, Result};
pub use export::{copy_files, write_archive, write_listing, write_tar, write_zip, ArchiveFormat};
pub use fileset::FileSet;
pub use manifest::{LayerEntry, ModelManifest};
pub use reference::ModelReference;
pub use store::{ManifestLocation, ModelStore};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
