//! Tar archive exporter.

use std::io::Write;

use crate::error::{ExportError, Result};
use crate::fileset::FileSet;
use crate::store::ModelStore;

/// Stream a tar archive of the file set to `dest`.
///
/// One entry per path, named by its root-relative path, with size, mode
/// and mtime taken from a stat before the entry body is written. The
/// destination is never seeked, so a pipe works. No directory entries
/// are emitted; extraction creates parents.
pub fn write_tar<W: Write>(file_set: &FileSet, store: &ModelStore, dest: W) -> Result<()> {
    let mut builder = tar::Builder::new(dest);

    for relative_path in file_set {
        let source = store.root().join(relative_path);
        builder
            .append_path_with_name(&source, relative_path)
            .map_err(|e| ExportError::ArchiveWriteFailed {
                path: relative_path.clone(),
                source: e,
            })?;
    }

    let mut dest = builder.into_inner()?;
    dest.flush()?;

    tracing::debug!(files = file_set.len(), "wrote tar archive");
    Ok(())
}
