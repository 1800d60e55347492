//! Saving replaces the destination only when the package is complete

use codec::docx::{export_docx, export_docx_with, import_docx, DocxError};
use codec::WriteSettings;
use doc_model::{Document, ImageRef, Paragraph, Run};
use std::fs;
use tempfile::TempDir;

fn document(text: &str) -> Document {
    Document::new().with(Paragraph::with_text(text))
}

#[test]
fn test_save_creates_and_replaces() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.docx");

    export_docx(&document("first"), &path).unwrap();
    assert_eq!(import_docx(&path).unwrap().document.plain_text(), "first");

    export_docx(&document("second"), &path).unwrap();
    assert_eq!(import_docx(&path).unwrap().document.plain_text(), "second");

    // no staging files left behind
    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("doc.docx")]);
}

#[test]
fn test_failed_save_leaves_destination_untouched() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("occupied");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("keep.txt"), "data").unwrap();

    let result = export_docx(&document("lost"), &target);
    assert!(result.is_err());
    assert!(target.is_dir());
    assert_eq!(fs::read_to_string(target.join("keep.txt")).unwrap(), "data");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_missing_directory_is_not_found() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent").join("doc.docx");
    let result = export_docx(&document("x"), &path);
    assert!(matches!(result, Err(DocxError::NotFound(_))));
    assert!(!path.exists());
}

#[test]
fn test_media_compression_setting() {
    let dir = TempDir::new().unwrap();
    let image = ImageRef::new(vec![0u8; 4096], "image/png", 10.0, 10.0);
    let doc = Document::new().with(Paragraph::new().with_run(Run::image(image)));

    let stored = dir.path().join("stored.docx");
    let compressed = dir.path().join("compressed.docx");
    export_docx_with(&doc, &stored, &WriteSettings::default(), None).unwrap();
    let settings = WriteSettings {
        compress_media: true,
        ..Default::default()
    };
    export_docx_with(&doc, &compressed, &settings, None).unwrap();

    let stored_size = fs::metadata(&stored).unwrap().len();
    let compressed_size = fs::metadata(&compressed).unwrap().len();
    assert!(compressed_size < stored_size);

    let read = import_docx(&compressed).unwrap();
    assert_eq!(read.document.paragraphs().count(), 1);
}
