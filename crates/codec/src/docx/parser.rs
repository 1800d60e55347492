//! Document-level read orchestration
//!
//! Ties the part readers together: locate the main part through the root
//! relationships, load its manifest, theme and table styles, run the markup
//! reader, then resolve chart placeholders and apply the table style cascade.
//! Every optional part degrades to its default when absent.

use crate::docx::api::ImportResult;
use crate::docx::core_properties::{parse_core_properties, CORE_PROPERTIES_PATH};
use crate::docx::document::{ImageMap, MarkupReader, ParsedPart};
use crate::docx::error::{DocxError, DocxResult};
use crate::docx::fidelity::{FidelityTracker, FidelityWarning};
use crate::docx::numbering::{DefaultNumbering, NumberingResolver};
use crate::docx::package::PackageReader;
use crate::docx::relationship_types;
use crate::docx::relationships::{rels_path_for, resolve_target, Relationships};
use crate::docx::styles::TableStyleCatalog;
use crate::docx::table_styles::TableStyleResolver;
use crate::docx::theme::ThemePalette;
use crate::settings::ReadSettings;
use charts::DrawingMLParser;
use doc_model::{ChartContent, Document, DocumentProperties, Element, HeaderFooter, Paragraph};
use std::io::{Read, Seek};

const DEFAULT_MAIN_PART: &str = "word/document.xml";
const DEFAULT_THEME_PART: &str = "word/theme/theme1.xml";
const DEFAULT_STYLES_PART: &str = "word/styles.xml";

/// Reads a whole package into a [`Document`]
pub struct DocumentReader<'s> {
    settings: &'s ReadSettings,
    numbering: &'s dyn NumberingResolver,
}

impl<'s> DocumentReader<'s> {
    pub fn new(settings: &'s ReadSettings) -> Self {
        Self {
            settings,
            numbering: &DefaultNumbering,
        }
    }

    /// Replace the id-based bullet/numbered heuristic
    pub fn with_numbering(mut self, numbering: &'s dyn NumberingResolver) -> Self {
        self.numbering = numbering;
        self
    }

    /// Read the document held by `package`
    pub fn read<R: Read + Seek>(&self, package: &mut PackageReader<R>) -> DocxResult<ImportResult> {
        let mut fidelity = FidelityTracker::new();

        let root_rels = Relationships::parse_optional(package.read_optional("_rels/.rels")?.as_deref())?;
        let main_part = root_rels
            .get_by_type(relationship_types::DOCUMENT)
            .map(|r| resolve_target("", &r.target))
            .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());

        let content = package.read_string(&main_part)?;
        let rels = Relationships::parse_optional(
            package.read_optional(&rels_path_for(&main_part))?.as_deref(),
        )?;
        tracing::debug!(part = %main_part, relationships = rels.len(), "reading main part");

        let theme = self.read_theme(package, &main_part, &rels)?;
        let catalog = self.read_table_styles(package, &main_part, &rels, &theme)?;

        let images = self.load_images(package, &main_part, &rels);
        let parsed = self
            .markup_reader(&main_part, &rels, &theme, &images)
            .parse(&content, &mut fidelity)?;
        let ParsedPart {
            elements,
            header_id,
            footer_id,
        } = parsed;

        let mut document = Document {
            elements,
            ..Default::default()
        };

        if self.settings.resolve_charts {
            self.resolve_charts(package, &main_part, &rels, &mut document, &mut fidelity);
        }

        let header_id = header_id.or_else(|| first_of_kind(&rels, "header"));
        let footer_id = footer_id.or_else(|| first_of_kind(&rels, "footer"));
        document.header = self.read_header_footer(package, &main_part, &rels, header_id, &theme, &mut fidelity)?;
        document.footer = self.read_header_footer(package, &main_part, &rels, footer_id, &theme, &mut fidelity)?;

        if self.settings.apply_table_styles && !catalog.is_empty() {
            let resolver = TableStyleResolver::new(&catalog);
            for table in document.tables_mut() {
                match resolver.apply(table) {
                    Ok(_) => {}
                    Err(DocxError::StyleCycle(detail)) => {
                        fidelity.add_warning(FidelityWarning::style_cycle(&detail));
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        document.properties = self.read_core_properties(package, &root_rels)?;

        tracing::debug!(
            elements = document.elements.len(),
            warnings = fidelity.warnings().count(),
            "document read"
        );
        Ok(ImportResult { document, fidelity })
    }

    fn markup_reader<'p>(
        &'p self,
        part: &'p str,
        rels: &'p Relationships,
        theme: &'p ThemePalette,
        images: &'p ImageMap,
    ) -> MarkupReader<'p> {
        let reader = MarkupReader::new(part, rels, theme)
            .with_numbering(self.numbering)
            .with_nominal_width(self.settings.nominal_content_width);
        if self.settings.load_images {
            reader.with_images(images)
        } else {
            reader
        }
    }

    fn read_theme<R: Read + Seek>(
        &self,
        package: &mut PackageReader<R>,
        main_part: &str,
        rels: &Relationships,
    ) -> DocxResult<ThemePalette> {
        let path = rels
            .get_by_type(relationship_types::THEME)
            .map(|r| resolve_target(main_part, &r.target))
            .unwrap_or_else(|| DEFAULT_THEME_PART.to_string());

        let Some(content) = package.read_optional(&path)? else {
            tracing::warn!(part = %path, "no theme part; theme colors will not resolve");
            return Ok(ThemePalette::new());
        };
        Ok(ThemePalette::parse(&content).unwrap_or_else(|e| {
            tracing::warn!(part = %path, error = %e, "ignoring unreadable theme part");
            ThemePalette::new()
        }))
    }

    fn read_table_styles<R: Read + Seek>(
        &self,
        package: &mut PackageReader<R>,
        main_part: &str,
        rels: &Relationships,
        theme: &ThemePalette,
    ) -> DocxResult<TableStyleCatalog> {
        let path = rels
            .get_by_type(relationship_types::STYLES)
            .map(|r| resolve_target(main_part, &r.target))
            .unwrap_or_else(|| DEFAULT_STYLES_PART.to_string());

        let Some(content) = package.read_optional(&path)? else {
            tracing::warn!(part = %path, "no styles part; table styles will not apply");
            return Ok(TableStyleCatalog::new());
        };
        Ok(TableStyleCatalog::parse(&content, theme).unwrap_or_else(|e| {
            tracing::warn!(part = %path, error = %e, "ignoring unreadable styles part");
            TableStyleCatalog::new()
        }))
    }

    /// Bytes of every readable internal image target of `part`
    ///
    /// Targets that cannot be read are left out; the markup reader reports
    /// them when an image run refers to one.
    fn load_images<R: Read + Seek>(
        &self,
        package: &mut PackageReader<R>,
        part: &str,
        rels: &Relationships,
    ) -> ImageMap {
        let mut images = ImageMap::new();
        if !self.settings.load_images {
            return images;
        }
        for rel in rels.of_kind("image").filter(|r| !r.is_external()) {
            let path = resolve_target(part, &rel.target);
            match package.read_entry(&path) {
                Ok(data) => {
                    images.insert(rel.id.clone(), data);
                }
                Err(e) => tracing::debug!(part = %path, error = %e, "image target unreadable"),
            }
        }
        images
    }

    fn resolve_charts<R: Read + Seek>(
        &self,
        package: &mut PackageReader<R>,
        main_part: &str,
        rels: &Relationships,
        document: &mut Document,
        fidelity: &mut FidelityTracker,
    ) {
        let parser = DrawingMLParser::new();
        for frame in document.charts_mut() {
            let ChartContent::Unresolved { relationship_id } = &frame.content else {
                continue;
            };
            let relationship_id = relationship_id.clone();
            let Some(rel) = rels.get(&relationship_id) else {
                fidelity.add_warning(FidelityWarning::chart_unresolved(&relationship_id));
                continue;
            };
            let path = resolve_target(main_part, &rel.target);
            let chart = package
                .read_string(&path)
                .and_then(|xml| parser.parse(&xml).map_err(DocxError::from));
            match chart {
                Ok(chart) => {
                    tracing::debug!(part = %path, "chart resolved");
                    frame.resolve(chart);
                }
                Err(e) => {
                    tracing::debug!(part = %path, error = %e, "chart part unreadable");
                    fidelity.add_warning(FidelityWarning::chart_unresolved(&relationship_id));
                }
            }
        }
    }

    /// Header or footer content; tables are flattened into their paragraphs
    fn read_header_footer<R: Read + Seek>(
        &self,
        package: &mut PackageReader<R>,
        main_part: &str,
        rels: &Relationships,
        relationship_id: Option<String>,
        theme: &ThemePalette,
        fidelity: &mut FidelityTracker,
    ) -> DocxResult<Option<HeaderFooter>> {
        let Some(rel) = relationship_id.as_deref().and_then(|id| rels.get(id)) else {
            return Ok(None);
        };
        let path = resolve_target(main_part, &rel.target);
        let Some(content) = package.read_optional(&path)? else {
            tracing::warn!(part = %path, "referenced header/footer part is missing");
            return Ok(None);
        };

        let part_rels =
            Relationships::parse_optional(package.read_optional(&rels_path_for(&path))?.as_deref())?;
        let images = self.load_images(package, &path, &part_rels);
        let parsed = match self
            .markup_reader(&path, &part_rels, theme, &images)
            .parse(&content, fidelity)
        {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(part = %path, error = %e, "ignoring unreadable header/footer part");
                return Ok(None);
            }
        };

        let mut paragraphs = Vec::new();
        for element in parsed.elements {
            match element {
                Element::Paragraph(p) => paragraphs.push(p),
                Element::Table(t) => paragraphs.extend(
                    t.rows
                        .into_iter()
                        .flat_map(|r| r.cells)
                        .flat_map(|c| c.paragraphs),
                ),
                Element::Chart(_) | Element::Shape(_) => {}
            }
        }
        if paragraphs.is_empty() {
            paragraphs.push(Paragraph::new());
        }
        Ok(Some(HeaderFooter::new(paragraphs)))
    }

    fn read_core_properties<R: Read + Seek>(
        &self,
        package: &mut PackageReader<R>,
        root_rels: &Relationships,
    ) -> DocxResult<DocumentProperties> {
        let path = root_rels
            .get_by_type(relationship_types::CORE_PROPERTIES)
            .map(|r| resolve_target("", &r.target))
            .unwrap_or_else(|| CORE_PROPERTIES_PATH.to_string());

        let Some(content) = package.read_optional(&path)? else {
            return Ok(DocumentProperties::default());
        };
        Ok(parse_core_properties(&content).unwrap_or_else(|e| {
            tracing::warn!(part = %path, error = %e, "ignoring unreadable core properties");
            DocumentProperties::default()
        }))
    }
}

fn first_of_kind(rels: &Relationships, kind: &str) -> Option<String> {
    rels.of_kind(kind).next().map(|r| r.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::package::{write_package_bytes, PackageEntries, PackageOptions};
    use crate::docx::fidelity::codes;
    use doc_model::Color;

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

    const ROOT_RELS: &str = r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

    fn package(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut package = PackageEntries::new();
        for (path, content) in entries {
            package.insert(*path, content.as_bytes().to_vec());
        }
        write_package_bytes(&package, PackageOptions::default()).unwrap()
    }

    fn read(bytes: &[u8]) -> DocxResult<ImportResult> {
        let settings = ReadSettings::default();
        let mut package = PackageReader::from_bytes(bytes)?;
        DocumentReader::new(&settings).read(&mut package)
    }

    #[test]
    fn test_main_part_without_any_manifest() {
        let body = format!(
            r#"<w:document {}><w:body><w:p><w:r><w:t>Hello</w:t></w:r></w:p></w:body></w:document>"#,
            W
        );
        let bytes = package(&[("word/document.xml", &body)]);
        let result = read(&bytes).unwrap();
        assert_eq!(result.document.elements.len(), 1);
        assert_eq!(result.document.plain_text(), "Hello");
        assert!(result.fidelity.is_empty());
    }

    #[test]
    fn test_missing_main_part() {
        let bytes = package(&[("_rels/.rels", ROOT_RELS)]);
        assert!(matches!(read(&bytes), Err(DocxError::NotFound(_))));
    }

    #[test]
    fn test_theme_colors_resolve_through_relationship() {
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/custom.xml"/>
</Relationships>"#;
        let theme = r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><a:themeElements>
<a:clrScheme name="x"><a:accent1><a:srgbClr val="112233"/></a:accent1></a:clrScheme></a:themeElements></a:theme>"#;
        let body = format!(
            r#"<w:document {}><w:body><w:p><w:r><w:rPr><w:color w:val="000000" w:themeColor="accent1"/></w:rPr><w:t>x</w:t></w:r></w:p></w:body></w:document>"#,
            W
        );
        let bytes = package(&[
            ("_rels/.rels", ROOT_RELS),
            ("word/document.xml", &body),
            ("word/_rels/document.xml.rels", rels),
            ("word/theme/custom.xml", theme),
        ]);
        let document = read(&bytes).unwrap().document;
        let run = &document.paragraphs().next().unwrap().runs[0];
        assert_eq!(run.format.color, Some(Color::rgb(0x11, 0x22, 0x33)));
    }

    #[test]
    fn test_unresolved_chart_is_reported() {
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart" Target="charts/chart1.xml"/>
</Relationships>"#;
        let body = format!(
            r#"<w:document {}><w:body><w:p><w:r><w:drawing><wp:inline xmlns:wp="wp"><wp:extent cx="914400" cy="914400"/>
<a:graphic xmlns:a="a"><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart xmlns:c="c" r:id="rId5"/></a:graphicData></a:graphic>
</wp:inline></w:drawing></w:r></w:p></w:body></w:document>"#,
            W
        );
        let bytes = package(&[
            ("word/document.xml", &body),
            ("word/_rels/document.xml.rels", rels),
        ]);
        let result = read(&bytes).unwrap();
        let frame = result.document.charts().next().unwrap();
        assert!(!frame.is_resolved());
        assert_eq!(result.fidelity.count(codes::CHART_UNRESOLVED), 1);
    }

    #[test]
    fn test_header_uses_own_relationships() {
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId8" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/>
</Relationships>"#;
        let header_rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.org" TargetMode="External"/>
</Relationships>"#;
        let header = format!(
            r#"<w:hdr {}><w:p><w:hyperlink r:id="rId1"><w:r><w:t>site</w:t></w:r></w:hyperlink></w:p>
<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl></w:hdr>"#,
            W
        );
        let body = format!(
            r#"<w:document {}><w:body><w:p/><w:sectPr><w:headerReference w:type="default" r:id="rId8"/></w:sectPr></w:body></w:document>"#,
            W
        );
        let bytes = package(&[
            ("word/document.xml", &body),
            ("word/_rels/document.xml.rels", rels),
            ("word/header1.xml", &header),
            ("word/_rels/header1.xml.rels", header_rels),
        ]);
        let document = read(&bytes).unwrap().document;
        let header = document.header.unwrap();
        assert_eq!(header.paragraphs.len(), 2);
        assert_eq!(
            header.paragraphs[0].runs[0].hyperlink.as_ref().map(|h| h.url.as_str()),
            Some("https://example.org")
        );
        assert_eq!(header.paragraphs[1].text(), "cell");
        assert!(document.footer.is_none());
    }

    #[test]
    fn test_style_cycle_degrades() {
        let styles = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="table" w:styleId="A"><w:basedOn w:val="B"/><w:tblPr><w:shd w:fill="FF0000"/></w:tblPr></w:style>
<w:style w:type="table" w:styleId="B"><w:basedOn w:val="A"/></w:style>
</w:styles>"#;
        let body = format!(
            r#"<w:document {}><w:body><w:tbl><w:tblPr><w:tblStyle w:val="A"/></w:tblPr><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl></w:body></w:document>"#,
            W
        );
        let bytes = package(&[("word/document.xml", &body), ("word/styles.xml", styles)]);
        let result = read(&bytes).unwrap();
        assert_eq!(result.fidelity.count(codes::STYLE_CYCLE), 1);
        let table = result.document.tables().next().unwrap();
        assert!(table.rows[0].cells[0].background.is_none());
    }

    #[test]
    fn test_malformed_optional_part_degrades() {
        let body = format!(r#"<w:document {}><w:body><w:p/></w:body></w:document>"#, W);
        let bytes = package(&[
            ("word/document.xml", &body),
            ("word/styles.xml", "<w:styles><w:style>"),
            ("docProps/core.xml", "<cp:coreProperties"),
        ]);
        let result = read(&bytes).unwrap();
        assert_eq!(result.document.elements.len(), 1);
        assert!(result.document.properties.is_empty());
    }

    #[test]
    fn test_malformed_main_part_fails() {
        let bytes = package(&[("word/document.xml", "<w:document><w:body><w:p></w:body>")]);
        assert!(matches!(read(&bytes), Err(DocxError::InvalidMarkup(_))));
    }
}
