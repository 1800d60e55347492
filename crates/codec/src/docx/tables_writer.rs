//! Table serialization for document.xml
//!
//! Cells hold paragraphs that may carry images and hyperlinks, which need
//! relationship ids from the part being written; paragraph emission is
//! therefore passed in by the caller.

use crate::docx::document_writer::write_border;
use crate::docx::error::DocxResult;
use crate::docx::reader::{escape_xml, to_twips};
use doc_model::{GridSlot, Paragraph, Table, TableCell, TableRow};

/// Width assumed for a table without grid or preferred width
const FALLBACK_TABLE_WIDTH: f32 = 468.0;

/// Writer for `w:tbl` elements
pub struct TableWriter;

impl TableWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write a table, emitting cell paragraphs through `write_paragraph`
    pub fn write_table<F>(&self, xml: &mut String, table: &Table, mut write_paragraph: F) -> DocxResult<()>
    where
        F: FnMut(&mut String, &Paragraph) -> DocxResult<()>,
    {
        xml.push_str("<w:tbl>");
        self.write_table_properties(xml, table);
        self.write_grid(xml, table);

        for (row, slots) in table.rows.iter().zip(table.row_slots()) {
            self.write_row(xml, row, &slots, &mut write_paragraph)?;
        }

        xml.push_str("</w:tbl>");
        Ok(())
    }

    fn write_table_properties(&self, xml: &mut String, table: &Table) {
        xml.push_str("<w:tblPr>");

        if let Some(style) = &table.style_id {
            xml.push_str(&format!(r#"<w:tblStyle w:val="{}"/>"#, escape_xml(style)));
        }

        match table.width {
            Some(width) => xml.push_str(&format!(
                r#"<w:tblW w:w="{}" w:type="dxa"/>"#,
                to_twips(width)
            )),
            None => xml.push_str(r#"<w:tblW w:w="0" w:type="auto"/>"#),
        }

        if let Some(alignment) = table.alignment {
            xml.push_str(&format!(r#"<w:jc w:val="{}"/>"#, alignment.to_xml()));
        }

        if !table.borders.is_empty() {
            xml.push_str("<w:tblBorders>");
            for (tag, border) in table.borders.sides() {
                if let Some(border) = border {
                    write_border(xml, tag, &border);
                }
            }
            xml.push_str("</w:tblBorders>");
        }

        let look = &table.look;
        xml.push_str(&format!(
            r#"<w:tblLook w:val="{:04X}" w:firstRow="{}" w:lastRow="{}" w:firstColumn="{}" w:lastColumn="{}" w:noHBand="{}" w:noVBand="{}"/>"#,
            look.to_bitmask(),
            u8::from(look.first_row),
            u8::from(look.last_row),
            u8::from(look.first_column),
            u8::from(look.last_column),
            u8::from(!look.banded_rows),
            u8::from(!look.banded_columns),
        ));

        if let Some(caption) = &table.caption {
            xml.push_str(&format!(r#"<w:tblCaption w:val="{}"/>"#, escape_xml(caption)));
        }
        if let Some(summary) = &table.summary {
            xml.push_str(&format!(r#"<w:tblDescription w:val="{}"/>"#, escape_xml(summary)));
        }

        xml.push_str("</w:tblPr>");
    }

    /// Column widths; an empty grid is split evenly over the table width
    fn write_grid(&self, xml: &mut String, table: &Table) {
        let grid = if table.grid.is_empty() {
            let columns = table.column_count().max(1);
            let width = table.width.unwrap_or(FALLBACK_TABLE_WIDTH);
            vec![width / columns as f32; columns]
        } else {
            table.grid.clone()
        };

        xml.push_str("<w:tblGrid>");
        for width in grid {
            xml.push_str(&format!(r#"<w:gridCol w:w="{}"/>"#, to_twips(width)));
        }
        xml.push_str("</w:tblGrid>");
    }

    fn write_row<F>(
        &self,
        xml: &mut String,
        row: &TableRow,
        slots: &[GridSlot],
        write_paragraph: &mut F,
    ) -> DocxResult<()>
    where
        F: FnMut(&mut String, &Paragraph) -> DocxResult<()>,
    {
        xml.push_str("<w:tr>");

        if row.is_header || row.height.is_some() {
            xml.push_str("<w:trPr>");
            if let Some(height) = row.height {
                xml.push_str(&format!(r#"<w:trHeight w:val="{}"/>"#, to_twips(height)));
            }
            if row.is_header {
                xml.push_str("<w:tblHeader/>");
            }
            xml.push_str("</w:trPr>");
        }

        for slot in slots {
            match *slot {
                GridSlot::Cell(index) => {
                    if let Some(cell) = row.cells.get(index) {
                        self.write_cell(xml, cell, write_paragraph)?;
                    }
                }
                GridSlot::Continuation { column_span } => {
                    xml.push_str("<w:tc><w:tcPr>");
                    if column_span > 1 {
                        xml.push_str(&format!(r#"<w:gridSpan w:val="{}"/>"#, column_span));
                    }
                    xml.push_str("<w:vMerge/></w:tcPr><w:p/></w:tc>");
                }
            }
        }

        xml.push_str("</w:tr>");
        Ok(())
    }

    fn write_cell<F>(&self, xml: &mut String, cell: &TableCell, write_paragraph: &mut F) -> DocxResult<()>
    where
        F: FnMut(&mut String, &Paragraph) -> DocxResult<()>,
    {
        xml.push_str("<w:tc>");
        xml.push_str("<w:tcPr>");

        if let Some(width) = cell.width {
            xml.push_str(&format!(r#"<w:tcW w:w="{}" w:type="dxa"/>"#, to_twips(width)));
        }
        if cell.column_span > 1 {
            xml.push_str(&format!(r#"<w:gridSpan w:val="{}"/>"#, cell.column_span));
        }
        if cell.row_span > 1 {
            xml.push_str(r#"<w:vMerge w:val="restart"/>"#);
        }
        if !cell.borders.is_empty() {
            xml.push_str("<w:tcBorders>");
            for (tag, border) in cell.borders.sides() {
                if let Some(border) = border {
                    write_border(xml, tag, &border);
                }
            }
            xml.push_str("</w:tcBorders>");
        }
        if let Some(color) = cell.background {
            xml.push_str(&format!(
                r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                color.to_hex()
            ));
        }
        if let Some(align) = cell.vertical_align {
            xml.push_str(&format!(r#"<w:vAlign w:val="{}"/>"#, align.to_xml()));
        }

        xml.push_str("</w:tcPr>");

        // A cell must end with a paragraph
        if cell.paragraphs.is_empty() {
            xml.push_str("<w:p/>");
        }
        for paragraph in &cell.paragraphs {
            write_paragraph(xml, paragraph)?;
        }

        xml.push_str("</w:tc>");
        Ok(())
    }
}

impl Default for TableWriter {
    fn default() -> Self {
        Self::new()
    }
}
