//! Public API for DOCX import/export
//!
//! This module provides the main entry points for working with DOCX files.

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::fidelity::FidelityTracker;
use crate::docx::package::{write_package_bytes, write_package_file, PackageOptions, PackageReader};
use crate::docx::parser::DocumentReader;
use crate::docx::styles::TableStyleCatalog;
use crate::docx::writer::DocxWriter;
use crate::settings::{ReadSettings, WriteSettings};
use doc_model::Document;
use std::path::{Path, PathBuf};

/// A document read from a package, with everything that was lost on the way
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub document: Document,
    pub fidelity: FidelityTracker,
}

/// Import a DOCX file from disk
///
/// # Example
///
/// ```ignore
/// use codec::docx::import_docx;
/// use std::path::Path;
///
/// let result = import_docx(Path::new("document.docx"))?;
/// println!("{}", result.document.plain_text());
/// ```
pub fn import_docx(path: &Path) -> DocxResult<ImportResult> {
    import_docx_with(path, &ReadSettings::default())
}

/// Import a DOCX file from disk with explicit read settings
pub fn import_docx_with(path: &Path, settings: &ReadSettings) -> DocxResult<ImportResult> {
    let mut package = PackageReader::open(path)?;
    let result = DocumentReader::new(settings).read(&mut package)?;
    tracing::debug!(
        path = %path.display(),
        elements = result.document.elements.len(),
        "document imported"
    );
    Ok(result)
}

/// Import a DOCX from an in-memory byte slice
pub fn import_docx_bytes(bytes: &[u8], settings: &ReadSettings) -> DocxResult<ImportResult> {
    let mut package = PackageReader::from_bytes(bytes)?;
    DocumentReader::new(settings).read(&mut package)
}

/// Export a document to a DOCX file on disk
///
/// The file at `path` is replaced only when the whole package was written;
/// on failure any previous file there is left untouched.
///
/// # Example
///
/// ```ignore
/// use codec::docx::export_docx;
/// use doc_model::{Document, Paragraph};
/// use std::path::Path;
///
/// let document = Document::new().with(Paragraph::with_text("Hello"));
/// let fidelity = export_docx(&document, Path::new("output.docx"))?;
/// assert!(fidelity.is_empty());
/// ```
pub fn export_docx(document: &Document, path: &Path) -> DocxResult<FidelityTracker> {
    export_docx_with(document, path, &WriteSettings::default(), None)
}

/// Export with explicit write settings and, optionally, the table style
/// definitions to embed for the styles the document refers to
pub fn export_docx_with(
    document: &Document,
    path: &Path,
    settings: &WriteSettings,
    table_styles: Option<&TableStyleCatalog>,
) -> DocxResult<FidelityTracker> {
    let (entries, fidelity) = writer_for(settings, table_styles).write(document)?;
    let options = PackageOptions {
        compress_media: settings.compress_media,
    };
    write_package_file(path, &entries, options)?;
    tracing::debug!(path = %path.display(), "document exported");
    Ok(fidelity)
}

/// Export a document to an in-memory DOCX package
pub fn export_docx_bytes(
    document: &Document,
    settings: &WriteSettings,
    table_styles: Option<&TableStyleCatalog>,
) -> DocxResult<(Vec<u8>, FidelityTracker)> {
    let (entries, fidelity) = writer_for(settings, table_styles).write(document)?;
    let options = PackageOptions {
        compress_media: settings.compress_media,
    };
    Ok((write_package_bytes(&entries, options)?, fidelity))
}

fn writer_for<'s>(
    settings: &'s WriteSettings,
    table_styles: Option<&'s TableStyleCatalog>,
) -> DocxWriter<'s> {
    let writer = DocxWriter::new(settings);
    match table_styles {
        Some(catalog) => writer.with_table_styles(catalog),
        None => writer,
    }
}

/// Import on the blocking thread pool
///
/// The read cannot be cancelled; dropping the future only discards the
/// result.
pub async fn import_docx_async(path: PathBuf, settings: ReadSettings) -> DocxResult<ImportResult> {
    tokio::task::spawn_blocking(move || import_docx_with(&path, &settings))
        .await
        .map_err(|e| DocxError::ParsingFailed(format!("import task failed: {}", e)))?
}

/// Export on the blocking thread pool
pub async fn export_docx_async(
    document: Document,
    path: PathBuf,
    settings: WriteSettings,
) -> DocxResult<FidelityTracker> {
    tokio::task::spawn_blocking(move || export_docx_with(&document, &path, &settings, None))
        .await
        .map_err(|e| DocxError::Serialization(format!("export task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::Paragraph;
    use tempfile::TempDir;

    #[test]
    fn test_import_nonexistent_file() {
        let result = import_docx(Path::new("/nonexistent/path/document.docx"));
        assert!(matches!(result, Err(DocxError::NotFound(_))));
    }

    #[test]
    fn test_import_garbage_bytes() {
        let result = import_docx_bytes(b"not a zip archive", &ReadSettings::default());
        assert!(matches!(result, Err(DocxError::InvalidContainer(_))));
    }

    #[test]
    fn test_bytes_round_trip() {
        let document = Document::new().with(Paragraph::with_text("Hello"));
        let (bytes, fidelity) =
            export_docx_bytes(&document, &WriteSettings::default(), None).unwrap();
        assert!(fidelity.is_empty());
        assert_eq!(&bytes[..2], b"PK");

        let result = import_docx_bytes(&bytes, &ReadSettings::default()).unwrap();
        assert_eq!(result.document.plain_text(), "Hello");
    }

    #[tokio::test]
    async fn test_async_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("async.docx");
        let document = Document::new().with(Paragraph::heading(1, "Title"));

        export_docx_async(document, path.clone(), WriteSettings::default())
            .await
            .unwrap();
        let result = import_docx_async(path, ReadSettings::default()).await.unwrap();
        let heading = result.document.paragraphs().next().unwrap();
        assert_eq!(heading.heading_level, Some(1));
        assert_eq!(heading.text(), "Title");
    }
}
