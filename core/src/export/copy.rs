//! Directory copy exporter.

use std::fs;
use std::path::Path;

use crate::error::{ExportError, Result};
use crate::fileset::FileSet;
use crate::store::ModelStore;

/// Replicate the file set's relative paths under `dest`.
///
/// Parent directories are created as needed; file bytes are copied
/// verbatim and the source tree is never mutated. Fails fast on the
/// first I/O error: files already copied are left in place, remaining
/// files are not attempted. Returns the total bytes copied.
pub fn copy_files(file_set: &FileSet, store: &ModelStore, dest: &Path) -> Result<u64> {
    let mut total = 0u64;

    for relative_path in file_set {
        let source = store.root().join(relative_path);
        let target = dest.join(relative_path);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| ExportError::CopyFailed {
                path: relative_path.clone(),
                source: e,
            })?;
        }

        total += fs::copy(&source, &target).map_err(|e| ExportError::CopyFailed {
            path: relative_path.clone(),
            source: e,
        })?;
    }

    tracing::debug!(
        files = file_set.len(),
        bytes = total,
        dest = %dest.display(),
        "copied file set"
    );
    Ok(total)
}
