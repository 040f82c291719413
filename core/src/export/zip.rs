//! Stored zip archive exporter.
//!
//! Writes a zip container with stored (uncompressed) entries; quantized
//! weight blobs compress poorly, so deflate would cost time for nothing.
//! The writer works over any [`Write`] and never seeks: each entry's size
//! comes from a stat and its CRC-32 from a first read pass, so the local
//! header is complete before the file bytes follow. That keeps pipes
//! (e.g. standard output) valid destinations. Entries or offsets past
//! the 32-bit field limits get zip64 records; weight blobs above 4 GiB
//! are routine.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Datelike, Local, Timelike};

use crate::error::{ExportError, Result};
use crate::fileset::FileSet;
use crate::store::ModelStore;

const LOCAL_FILE_HEADER_SIG: u32 = 0x0403_4b50;
const CENTRAL_DIR_HEADER_SIG: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIR_SIG: u32 = 0x0605_4b50;
const ZIP64_END_OF_CENTRAL_DIR_SIG: u32 = 0x0606_4b50;
const ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIG: u32 = 0x0706_4b50;
const ZIP64_EXTRA_FIELD_ID: u16 = 0x0001;

/// Unix host system, zip spec 4.5.
const VERSION_MADE_BY_UNIX: u16 = (3 << 8) | 45;
const VERSION_NEEDED_DEFAULT: u16 = 20;
const VERSION_NEEDED_ZIP64: u16 = 45;
const METHOD_STORED: u16 = 0;

const U32_MAX: u64 = u32::MAX as u64;
const U16_MAX_ENTRIES: usize = u16::MAX as usize;

/// Stream a stored zip archive of the file set to `dest`.
pub fn write_zip<W: Write>(file_set: &FileSet, store: &ModelStore, dest: W) -> Result<()> {
    let mut dest = CountingWriter::new(dest);
    let mut records = Vec::with_capacity(file_set.len());

    for relative_path in file_set {
        let source = store.root().join(relative_path);
        let name = entry_name(relative_path);
        let record = append_entry(&mut dest, &source, name).map_err(|e| {
            ExportError::ArchiveWriteFailed {
                path: relative_path.clone(),
                source: e,
            }
        })?;
        records.push(record);
    }

    let central_dir_offset = dest.bytes_written();
    for record in &records {
        write_central_header(&mut dest, record)?;
    }
    let central_dir_size = dest.bytes_written() - central_dir_offset;

    write_end_records(&mut dest, records.len(), central_dir_offset, central_dir_size)?;
    dest.flush()?;

    tracing::debug!(files = file_set.len(), "wrote zip archive");
    Ok(())
}

/// What the central directory needs to remember about a written entry.
struct CentralRecord {
    name: String,
    crc: u32,
    size: u64,
    offset: u64,
    dos_time: u16,
    dos_date: u16,
    mode: u32,
}

/// Write one local header plus file bytes; returns the central record.
fn append_entry<W: Write>(
    dest: &mut CountingWriter<W>,
    source: &Path,
    name: String,
) -> io::Result<CentralRecord> {
    let meta = std::fs::metadata(source)?;
    let size = meta.len();
    let crc = file_crc32(source)?;
    let (dos_date, dos_time) = dos_date_time(meta.modified()?);
    let offset = dest.bytes_written();
    let needs_zip64 = size >= U32_MAX;

    let mut header = Vec::with_capacity(30 + name.len() + 20);
    put_u32(&mut header, LOCAL_FILE_HEADER_SIG);
    put_u16(
        &mut header,
        if needs_zip64 {
            VERSION_NEEDED_ZIP64
        } else {
            VERSION_NEEDED_DEFAULT
        },
    );
    put_u16(&mut header, 0); // general purpose flags
    put_u16(&mut header, METHOD_STORED);
    put_u16(&mut header, dos_time);
    put_u16(&mut header, dos_date);
    put_u32(&mut header, crc);
    if needs_zip64 {
        put_u32(&mut header, u32::MAX); // compressed size in zip64 extra
        put_u32(&mut header, u32::MAX); // uncompressed size in zip64 extra
    } else {
        put_u32(&mut header, size as u32);
        put_u32(&mut header, size as u32);
    }
    put_u16(&mut header, name.len() as u16);
    put_u16(&mut header, if needs_zip64 { 20 } else { 0 }); // extra field length
    header.extend_from_slice(name.as_bytes());
    if needs_zip64 {
        put_u16(&mut header, ZIP64_EXTRA_FIELD_ID);
        put_u16(&mut header, 16);
        put_u64(&mut header, size); // uncompressed
        put_u64(&mut header, size); // compressed
    }
    dest.write_all(&header)?;

    let mut file = File::open(source)?;
    let copied = io::copy(&mut file, dest)?;
    if copied != size {
        // The header already promised `size` bytes; the container is
        // only valid if the file still has exactly that many.
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("file size changed while archiving: expected {size} bytes, wrote {copied}"),
        ));
    }

    Ok(CentralRecord {
        name,
        crc,
        size,
        offset,
        dos_time,
        dos_date,
        mode: file_mode(&meta),
    })
}

fn write_central_header<W: Write>(dest: &mut W, record: &CentralRecord) -> io::Result<()> {
    let size_maxed = record.size >= U32_MAX;
    let offset_maxed = record.offset >= U32_MAX;

    // Zip64 extra data: only the fields whose 32-bit slot is maxed out,
    // in spec order (uncompressed, compressed, offset).
    let mut extra = Vec::new();
    if size_maxed {
        put_u64(&mut extra, record.size);
        put_u64(&mut extra, record.size);
    }
    if offset_maxed {
        put_u64(&mut extra, record.offset);
    }

    let mut header = Vec::with_capacity(46 + record.name.len() + extra.len() + 4);
    put_u32(&mut header, CENTRAL_DIR_HEADER_SIG);
    put_u16(&mut header, VERSION_MADE_BY_UNIX);
    put_u16(
        &mut header,
        if size_maxed || offset_maxed {
            VERSION_NEEDED_ZIP64
        } else {
            VERSION_NEEDED_DEFAULT
        },
    );
    put_u16(&mut header, 0); // general purpose flags
    put_u16(&mut header, METHOD_STORED);
    put_u16(&mut header, record.dos_time);
    put_u16(&mut header, record.dos_date);
    put_u32(&mut header, record.crc);
    let size_field = if size_maxed {
        u32::MAX
    } else {
        record.size as u32
    };
    put_u32(&mut header, size_field); // compressed
    put_u32(&mut header, size_field); // uncompressed
    put_u16(&mut header, record.name.len() as u16);
    put_u16(
        &mut header,
        if extra.is_empty() {
            0
        } else {
            (extra.len() + 4) as u16
        },
    );
    put_u16(&mut header, 0); // comment length
    put_u16(&mut header, 0); // disk number start
    put_u16(&mut header, 0); // internal attributes
    put_u32(&mut header, record.mode << 16); // external attributes, unix mode
    put_u32(
        &mut header,
        if offset_maxed {
            u32::MAX
        } else {
            record.offset as u32
        },
    );
    header.extend_from_slice(record.name.as_bytes());
    if !extra.is_empty() {
        put_u16(&mut header, ZIP64_EXTRA_FIELD_ID);
        put_u16(&mut header, extra.len() as u16);
        header.extend_from_slice(&extra);
    }
    dest.write_all(&header)
}

fn write_end_records<W: Write>(
    dest: &mut CountingWriter<W>,
    entries: usize,
    central_dir_offset: u64,
    central_dir_size: u64,
) -> io::Result<()> {
    let needs_zip64 = entries > U16_MAX_ENTRIES
        || central_dir_offset >= U32_MAX
        || central_dir_size >= U32_MAX;

    if needs_zip64 {
        let zip64_eocd_offset = dest.bytes_written();
        let mut rec = Vec::with_capacity(56 + 20);
        put_u32(&mut rec, ZIP64_END_OF_CENTRAL_DIR_SIG);
        put_u64(&mut rec, 44); // record size, not counting sig + this field
        put_u16(&mut rec, VERSION_MADE_BY_UNIX);
        put_u16(&mut rec, VERSION_NEEDED_ZIP64);
        put_u32(&mut rec, 0); // this disk
        put_u32(&mut rec, 0); // central directory start disk
        put_u64(&mut rec, entries as u64);
        put_u64(&mut rec, entries as u64);
        put_u64(&mut rec, central_dir_size);
        put_u64(&mut rec, central_dir_offset);
        put_u32(&mut rec, ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIG);
        put_u32(&mut rec, 0); // disk holding the zip64 end record
        put_u64(&mut rec, zip64_eocd_offset);
        put_u32(&mut rec, 1); // total disks
        dest.write_all(&rec)?;
    }

    let mut eocd = Vec::with_capacity(22);
    put_u32(&mut eocd, END_OF_CENTRAL_DIR_SIG);
    put_u16(&mut eocd, 0); // this disk
    put_u16(&mut eocd, 0); // central directory start disk
    let entry_field = entries.min(U16_MAX_ENTRIES) as u16;
    put_u16(&mut eocd, entry_field);
    put_u16(&mut eocd, entry_field);
    put_u32(&mut eocd, central_dir_size.min(U32_MAX) as u32);
    put_u32(&mut eocd, central_dir_offset.min(U32_MAX) as u32);
    put_u16(&mut eocd, 0); // comment length
    dest.write_all(&eocd)
}

/// Zip entry names always use forward slashes.
fn entry_name(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// CRC-32 of a file's contents, streamed.
fn file_crc32(path: &Path) -> io::Result<u32> {
    let mut file = File::open(path)?;
    let mut hasher = crc32fast::Hasher::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}

/// MS-DOS date/time pair, local time, 2-second resolution.
fn dos_date_time(mtime: SystemTime) -> (u16, u16) {
    let dt: DateTime<Local> = mtime.into();
    if dt.year() < 1980 {
        // DOS epoch starts at 1980-01-01
        return ((1 << 5) | 1, 0);
    }
    let year = dt.year().min(2107);
    let date =
        (((year - 1980) as u16) << 9) | ((dt.month() as u16) << 5) | dt.day() as u16;
    let time =
        ((dt.hour() as u16) << 11) | ((dt.minute() as u16) << 5) | (dt.second() as u16 / 2);
    (date, time)
}

#[cfg(unix)]
fn file_mode(meta: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

#[cfg(not(unix))]
fn file_mode(_meta: &std::fs::Metadata) -> u32 {
    0o644
}

/// Tracks the byte offset of everything written so far; offsets feed the
/// central directory without ever seeking the destination.
struct CountingWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.written
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn put_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ModelReference;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    /// Seed a model whose manifest references the given blob digests
    /// (first entry becomes the config, the rest layers).
    fn seed_model(root: &Path, name: &str, tag: &str, hexes: &[&str]) {
        let manifest_path = root.join(ModelStore::manifest_rel_path(name, tag));
        fs::create_dir_all(manifest_path.parent().unwrap()).unwrap();

        let (config_hex, layer_hexes) = hexes.split_first().unwrap();
        let layers: Vec<String> = layer_hexes
            .iter()
            .map(|h| format!(r#"{{ "digest": "sha256:{h}", "size": 10 }}"#))
            .collect();
        let manifest = format!(
            r#"{{ "config": {{ "digest": "sha256:{config_hex}", "size": 4 }}, "layers": [ {} ] }}"#,
            layers.join(", ")
        );
        fs::write(&manifest_path, manifest).unwrap();

        fs::create_dir_all(root.join("blobs")).unwrap();
        for hex in hexes {
            fs::write(root.join("blobs").join(format!("sha256-{hex}")), hex).unwrap();
        }
    }

    fn build_set(root: &Path, reference: &str) -> (ModelStore, FileSet) {
        let store = ModelStore::new(root);
        let set = FileSet::build(&store, &[ModelReference::parse(reference)]).unwrap();
        (store, set)
    }

    #[test]
    fn test_zip_round_trip() {
        let src = TempDir::new().unwrap();
        seed_model(src.path(), "qwen3", "0.6b", &["aa", "bb"]);
        let (store, set) = build_set(src.path(), "qwen3:0.6b");

        // Vec<u8> is Write but not Seek; this is the pipe case
        let mut archive_bytes = Vec::new();
        write_zip(&set, &store, &mut archive_bytes).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes)).unwrap();
        assert_eq!(archive.len(), set.len());

        for (i, relative_path) in set.paths().iter().enumerate() {
            let mut entry = archive.by_index(i).unwrap();
            assert_eq!(entry.name(), entry_name(relative_path));

            let mut contents = Vec::new();
            entry.read_to_end(&mut contents).unwrap();
            assert_eq!(
                contents,
                fs::read(src.path().join(relative_path)).unwrap(),
                "contents differ for {}",
                relative_path.display()
            );
        }
    }

    #[test]
    fn test_zip_entries_are_stored_not_deflated() {
        let src = TempDir::new().unwrap();
        seed_model(src.path(), "qwen3", "0.6b", &["aa"]);
        let (store, set) = build_set(src.path(), "qwen3:0.6b");

        let mut archive_bytes = Vec::new();
        write_zip(&set, &store, &mut archive_bytes).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes)).unwrap();
        for i in 0..archive.len() {
            let entry = archive.by_index(i).unwrap();
            assert_eq!(entry.compression(), zip::CompressionMethod::Stored);
            assert_eq!(entry.size(), entry.compressed_size());
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_zip_preserves_unix_mode() {
        use std::os::unix::fs::PermissionsExt;

        let src = TempDir::new().unwrap();
        seed_model(src.path(), "qwen3", "0.6b", &["aa"]);
        let blob = src.path().join("blobs/sha256-aa");
        fs::set_permissions(&blob, fs::Permissions::from_mode(0o600)).unwrap();

        let (store, set) = build_set(src.path(), "qwen3:0.6b");
        let mut archive_bytes = Vec::new();
        write_zip(&set, &store, &mut archive_bytes).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes)).unwrap();
        let entry = archive.by_name("blobs/sha256-aa").unwrap();
        assert_eq!(entry.unix_mode().unwrap() & 0o777, 0o600);
    }

    #[test]
    fn test_zip_missing_source_fails() {
        let src = TempDir::new().unwrap();
        seed_model(src.path(), "qwen3", "0.6b", &["aa"]);
        let (store, set) = build_set(src.path(), "qwen3:0.6b");

        fs::remove_file(src.path().join("blobs/sha256-aa")).unwrap();

        let err = write_zip(&set, &store, Vec::new()).unwrap_err();
        assert!(matches!(err, ExportError::ArchiveWriteFailed { .. }));
    }

    #[test]
    fn test_entry_name_uses_forward_slashes() {
        let path: std::path::PathBuf = ["blobs", "sha256-aa"].iter().collect();
        assert_eq!(entry_name(&path), "blobs/sha256-aa");
    }

    #[test]
    fn test_dos_date_time_clamps_pre_epoch() {
        let (date, time) = dos_date_time(SystemTime::UNIX_EPOCH);
        assert_eq!(date, (1 << 5) | 1); // 1980-01-01
        assert_eq!(time, 0);
    }

    #[test]
    fn test_counting_writer_tracks_offsets() {
        let mut w = CountingWriter::new(Vec::new());
        w.write_all(b"hello").unwrap();
        assert_eq!(w.bytes_written(), 5);
        w.write_all(b" world").unwrap();
        assert_eq!(w.bytes_written(), 11);
    }
}
