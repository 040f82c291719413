//! Exporters: the consumers of a built [`FileSet`](crate::FileSet).
//!
//! Three independent strategies over the same input, a plain listing, a
//! directory copy, and streaming archive emission (tar or stored zip).

mod copy;
mod list;
mod tar;
mod zip;

pub use self::copy::copy_files;
pub use self::list::write_listing;
pub use self::tar::write_tar;
pub use self::zip::write_zip;

use std::io::Write;

use crate::error::Result;
use crate::fileset::FileSet;
use crate::store::ModelStore;

/// Supported archive container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// POSIX tar
    Tar,
    /// Zip with stored (uncompressed) entries
    Zip,
}

/// Stream an archive of the file set to any writer.
///
/// The destination only needs [`Write`]; both formats work against a
/// non-seekable pipe such as standard output. Entry sizes come from a
/// stat before each entry is written, never from seeking back.
pub fn write_archive<W: Write>(
    format: ArchiveFormat,
    file_set: &FileSet,
    store: &ModelStore,
    dest: W,
) -> Result<()> {
    match format {
        ArchiveFormat::Tar => write_tar(file_set, store, dest),
        ArchiveFormat::Zip => write_zip(file_set, store, dest),
    }
}
