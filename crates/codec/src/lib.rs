//! Codec - DOCX package import and export
//!
//! This crate reads WordprocessingML packages into the [`doc_model`]
//! document tree and writes the tree back out:
//! container I/O, relationship and theme resolution, the event-driven
//! markup reader, the table style cascade, the markup writer, fidelity
//! reporting and the codec settings file.

pub mod docx;
pub mod settings;

pub use settings::{CodecSettings, ReadSettings, WriteSettings};

// Re-export the entry points
pub use docx::{
    export_docx, export_docx_async, export_docx_bytes, export_docx_with, import_docx,
    import_docx_async, import_docx_bytes, import_docx_with, DocxError, DocxResult,
    FidelityTracker, FidelityWarning, ImportResult,
};
