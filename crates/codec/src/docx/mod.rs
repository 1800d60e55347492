//! DOCX Import/Export Module
//!
//! Reads and writes WordprocessingML packages (ECMA-376).
//!
//! ## Structure
//!
//! A DOCX file is a ZIP archive containing XML parts:
//! - `[Content_Types].xml` - Content type definitions
//! - `_rels/.rels` - Root relationships
//! - `word/document.xml` - Main document content
//! - `word/_rels/document.xml.rels` - Document relationships
//! - `word/styles.xml` - Style definitions, including table styles
//! - `word/numbering.xml` - List definitions (only when lists exist)
//! - `word/theme/theme1.xml` - Theme color palette
//! - `word/media/` - Embedded images
//! - `word/charts/` - Chart parts
//! - `word/header1.xml`, `word/footer1.xml` - Header and footer
//! - `docProps/core.xml` - Title, author and timestamps
//!
//! ## Read path
//!
//! [`DocumentReader`] opens the package, resolves relationships and the
//! theme, runs the [`MarkupReader`] over the main part, substitutes chart
//! placeholders with parsed chart parts and finally applies table styles
//! through the [`TableStyleResolver`].
//!
//! ## Write path
//!
//! [`DocxWriter`] walks the tree with the [`MarkupWriter`], collecting media,
//! chart and header/footer parts, and hands the complete entry set to the
//! container layer for an atomic save.

mod error;
mod package;
mod reader;
mod content_types;
mod relationships;
mod theme;
mod styles;
mod table_styles;
mod numbering;
mod document;
mod core_properties;
mod parser;
mod writer;
mod document_writer;
mod tables_writer;
mod styles_writer;
mod fidelity;
mod api;

pub use error::{DocxError, DocxResult};
pub use api::{
    export_docx, export_docx_async, export_docx_bytes, export_docx_with, import_docx,
    import_docx_async, import_docx_bytes, import_docx_with, ImportResult,
};
pub use package::{
    write_package, write_package_bytes, write_package_file, PackageEntries, PackageOptions,
    PackageReader,
};
pub use relationships::{Relationship, Relationships, TargetMode};
pub use content_types::ContentTypes;
pub use theme::{ThemePalette, ThemeSlot};
pub use styles::{Condition, ConditionRegion, TableStyleCatalog, TableStyleDefinition};
pub use table_styles::TableStyleResolver;
pub use numbering::{DefaultNumbering, NumberingResolver};
pub use document::{MarkupReader, ParsedPart};
pub use parser::DocumentReader;
pub use writer::DocxWriter;
pub use document_writer::{MarkupOutput, MarkupWriter, PartKind, SatellitePart};
pub use fidelity::{codes, FeatureCategory, FidelityTracker, FidelityWarning, WarningSeverity};

/// XML namespaces used in DOCX files
pub mod namespaces {
    /// Main WordprocessingML namespace
    pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    /// Relationships namespace
    pub const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    /// Package relationships namespace
    pub const PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
    /// Content types namespace
    pub const CT: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
    /// DrawingML namespace
    pub const A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
    /// WordprocessingML Drawing namespace
    pub const WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
    /// Picture namespace
    pub const PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
    /// Chart namespace, also the graphic data URI of chart drawings
    pub const C: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
    /// Core properties namespaces
    pub const CP: &str =
        "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
    pub const DC: &str = "http://purl.org/dc/elements/1.1/";
    pub const DCTERMS: &str = "http://purl.org/dc/terms/";
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
}

/// Relationship types used in DOCX
pub mod relationship_types {
    pub const DOCUMENT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const CORE_PROPERTIES: &str = "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const NUMBERING: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
    pub const SETTINGS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
    pub const IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const HYPERLINK: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
    pub const CHART: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";
    pub const HEADER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
    pub const FOOTER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
    pub const THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
}

/// Content types for DOCX parts
pub mod content_type_values {
    pub const DOCUMENT: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const STYLES: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
    pub const NUMBERING: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";
    pub const SETTINGS: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";
    pub const HEADER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml";
    pub const FOOTER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";
    pub const CHART: &str = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";
    pub const THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
    pub const CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        assert!(namespaces::W.contains("wordprocessingml"));
        assert!(namespaces::C.contains("chart"));
        assert!(relationship_types::CHART.ends_with("/chart"));
    }
}
