//! Listing exporter.

use std::io::Write;

use crate::error::Result;
use crate::fileset::FileSet;

/// Write the file set's paths to `dest`, one per line, in set order.
///
/// A pure formatting pass: no filesystem access happens here.
pub fn write_listing<W: Write>(file_set: &FileSet, mut dest: W) -> Result<()> {
    for path in file_set {
        writeln!(dest, "{}", path.display())?;
    }
    Ok(())
}
