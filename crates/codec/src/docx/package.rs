//! Container I/O - reading and writing the ZIP package
//!
//! Reading goes through [`PackageReader`], which hands out whole entries as
//! byte buffers. Writing takes a complete set of [`PackageEntries`] and
//! emits them in sorted path order; [`write_package_file`] stages the
//! archive in a temporary file next to the destination and only renames it
//! into place once every entry has been written.

use crate::docx::error::{DocxError, DocxResult};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// A ZIP package opened for reading
pub struct PackageReader<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl PackageReader<BufReader<File>> {
    /// Open a package file on disk
    pub fn open(path: &Path) -> DocxResult<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DocxError::NotFound(path.display().to_string())
            } else {
                DocxError::Io(e)
            }
        })?;
        Self::new(BufReader::new(file))
    }
}

impl<'a> PackageReader<Cursor<&'a [u8]>> {
    /// Open a package held in memory
    pub fn from_bytes(bytes: &'a [u8]) -> DocxResult<Self> {
        Self::new(Cursor::new(bytes))
    }
}

impl<R: Read + Seek> PackageReader<R> {
    /// Open a package from any seekable source
    pub fn new(reader: R) -> DocxResult<Self> {
        let archive =
            ZipArchive::new(reader).map_err(|e| DocxError::InvalidContainer(e.to_string()))?;
        Ok(Self { archive })
    }

    /// Read an entry as bytes
    pub fn read_entry(&mut self, path: &str) -> DocxResult<Vec<u8>> {
        let mut file = self.archive.by_name(path).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => DocxError::NotFound(path.to_string()),
            other => DocxError::from(other),
        })?;

        let mut contents = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Read an entry as UTF-8 text
    pub fn read_string(&mut self, path: &str) -> DocxResult<String> {
        Ok(String::from_utf8(self.read_entry(path)?)?)
    }

    /// Read an entry that may legitimately be absent
    pub fn read_optional(&mut self, path: &str) -> DocxResult<Option<String>> {
        if !self.has_entry(path) {
            return Ok(None);
        }
        self.read_string(path).map(Some)
    }

    pub fn has_entry(&self, path: &str) -> bool {
        self.archive.file_names().any(|name| name == path)
    }

    /// All entry paths, sorted
    pub fn list_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = self.archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }
}

/// The full content of a package to be written, keyed by entry path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageEntries {
    entries: BTreeMap<String, Vec<u8>>,
}

impl PackageEntries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry
    pub fn insert(&mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.entries.insert(path.into(), data.into());
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.entries.remove(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry paths in write order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// How entries are stored in the archive
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageOptions {
    /// Deflate media entries too (they are usually compressed already)
    pub compress_media: bool,
}

fn is_media(path: &str) -> bool {
    !(path.ends_with(".xml") || path.ends_with(".rels"))
}

/// Write all entries to a ZIP stream in sorted path order
pub fn write_package<W: Write + Seek>(
    writer: W,
    entries: &PackageEntries,
    options: PackageOptions,
) -> DocxResult<W> {
    let mut zip = ZipWriter::new(writer);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (path, data) in &entries.entries {
        let file_options = if is_media(path) && !options.compress_media {
            stored
        } else {
            deflated
        };
        zip.start_file(path.as_str(), file_options)?;
        zip.write_all(data)?;
    }

    let writer = zip.finish()?;
    tracing::debug!(entries = entries.len(), "package written");
    Ok(writer)
}

/// Write entries to an in-memory package
pub fn write_package_bytes(entries: &PackageEntries, options: PackageOptions) -> DocxResult<Vec<u8>> {
    let cursor = write_package(Cursor::new(Vec::new()), entries, options)?;
    Ok(cursor.into_inner())
}

/// Write entries to `path`, replacing any existing file only on success
///
/// The archive is staged in a temporary file in the destination directory.
/// If anything fails the temporary file is removed and the destination is
/// left exactly as it was.
pub fn write_package_file(
    path: &Path,
    entries: &PackageEntries,
    options: PackageOptions,
) -> DocxResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(DocxError::NotFound(dir.display().to_string()));
    }

    let staged = tempfile::Builder::new()
        .prefix(".docx-")
        .suffix(".tmp")
        .tempfile_in(dir)?;

    let writer = write_package(BufWriter::new(staged.as_file()), entries, options)?;
    writer
        .into_inner()
        .map_err(|e| DocxError::Io(e.into_error()))?
        .sync_all()?;

    staged.persist(path).map_err(|e| DocxError::Io(e.error))?;
    tracing::debug!(path = %path.display(), "package saved");
    Ok(())
}
