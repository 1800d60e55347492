//! List numbering: reading list kinds and writing numbering.xml
//!
//! The reader never parses numbering.xml. Whether a `numId` is a bullet or
//! a numbered list is decided by a [`NumberingResolver`]; the default maps
//! id 1 to bullets and every other id to numbers, which is also the layout
//! [`NumberingWriter`] produces, so list kinds round-trip.

use crate::docx::namespaces;
use doc_model::ListKind;

/// Decides the list kind of a numbering reference
pub trait NumberingResolver {
    fn list_kind(&self, num_id: u32, level: u8) -> ListKind;
}

/// The id 1 = bullet, anything else = numbered heuristic
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNumbering;

impl NumberingResolver for DefaultNumbering {
    fn list_kind(&self, num_id: u32, _level: u8) -> ListKind {
        if num_id == BULLET_NUM_ID {
            ListKind::Bullet
        } else {
            ListKind::Numbered
        }
    }
}

impl<F> NumberingResolver for F
where
    F: Fn(u32, u8) -> ListKind,
{
    fn list_kind(&self, num_id: u32, level: u8) -> ListKind {
        self(num_id, level)
    }
}

/// `numId` written for bullet lists
pub const BULLET_NUM_ID: u32 = 1;
/// `numId` written for numbered lists
pub const DECIMAL_NUM_ID: u32 = 2;

/// The `numId` the writer uses for a list kind
pub fn num_id_for(kind: ListKind) -> u32 {
    match kind {
        ListKind::Bullet => BULLET_NUM_ID,
        ListKind::Numbered => DECIMAL_NUM_ID,
    }
}

const LEVELS: u8 = 9;
const BULLET_GLYPHS: [&str; 3] = ["\u{F0B7}", "o", "\u{F0A7}"];
const BULLET_FONTS: [&str; 3] = ["Symbol", "Courier New", "Wingdings"];
const DECIMAL_FORMATS: [&str; 3] = ["decimal", "lowerLetter", "lowerRoman"];

/// Writer for numbering.xml
pub struct NumberingWriter;

impl NumberingWriter {
    pub fn new() -> Self {
        Self
    }

    /// Generate numbering.xml with one bullet and one decimal definition
    pub fn write(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<w:numbering xmlns:w="{}">"#, namespaces::W));

        self.write_abstract_num(&mut xml, 0, ListKind::Bullet);
        self.write_abstract_num(&mut xml, 1, ListKind::Numbered);

        for (num_id, abstract_id) in [(BULLET_NUM_ID, 0), (DECIMAL_NUM_ID, 1)] {
            xml.push_str(&format!(
                r#"<w:num w:numId="{}"><w:abstractNumId w:val="{}"/></w:num>"#,
                num_id, abstract_id
            ));
        }

        xml.push_str("</w:numbering>");
        xml
    }

    fn write_abstract_num(&self, xml: &mut String, id: u32, kind: ListKind) {
        xml.push_str(&format!(r#"<w:abstractNum w:abstractNumId="{}">"#, id));
        xml.push_str(r#"<w:multiLevelType w:val="hybridMultilevel"/>"#);

        for level in 0..LEVELS {
            let cycle = usize::from(level % 3);
            let indent = 720 * (u32::from(level) + 1);
            xml.push_str(&format!(r#"<w:lvl w:ilvl="{}">"#, level));
            xml.push_str(r#"<w:start w:val="1"/>"#);
            match kind {
                ListKind::Bullet => {
                    xml.push_str(r#"<w:numFmt w:val="bullet"/>"#);
                    xml.push_str(&format!(r#"<w:lvlText w:val="{}"/>"#, BULLET_GLYPHS[cycle]));
                }
                ListKind::Numbered => {
                    xml.push_str(&format!(r#"<w:numFmt w:val="{}"/>"#, DECIMAL_FORMATS[cycle]));
                    xml.push_str(&format!(r#"<w:lvlText w:val="%{}."/>"#, level + 1));
                }
            }
            xml.push_str(r#"<w:lvlJc w:val="left"/>"#);
            xml.push_str(&format!(
                r#"<w:pPr><w:ind w:left="{}" w:hanging="360"/></w:pPr>"#,
                indent
            ));
            if kind == ListKind::Bullet {
                let font = BULLET_FONTS[cycle];
                xml.push_str(&format!(
                    r#"<w:rPr><w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:hint="default"/></w:rPr>"#,
                    font
                ));
            }
            xml.push_str("</w:lvl>");
        }

        xml.push_str("</w:abstractNum>");
    }
}

impl Default for NumberingWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_heuristic() {
        assert_eq!(DefaultNumbering.list_kind(1, 0), ListKind::Bullet);
        assert_eq!(DefaultNumbering.list_kind(2, 0), ListKind::Numbered);
        assert_eq!(DefaultNumbering.list_kind(17, 3), ListKind::Numbered);
    }

    #[test]
    fn test_closure_resolver() {
        let all_bullets = |_: u32, _: u8| ListKind::Bullet;
        assert_eq!(all_bullets.list_kind(5, 0), ListKind::Bullet);
    }

    #[test]
    fn test_writer_ids_match_heuristic() {
        for kind in [ListKind::Bullet, ListKind::Numbered] {
            assert_eq!(DefaultNumbering.list_kind(num_id_for(kind), 0), kind);
        }
    }

    #[test]
    fn test_numbering_xml() {
        let xml = NumberingWriter::new().write();
        assert!(xml.contains(r#"<w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>"#));
        assert!(xml.contains(r#"<w:num w:numId="2"><w:abstractNumId w:val="1"/></w:num>"#));
        assert!(xml.contains(r#"<w:numFmt w:val="bullet"/>"#));
        assert!(xml.contains(r#"<w:lvlText w:val="%1."/>"#));
        assert!(crate::docx::reader::check_well_formed(&xml, "numbering").is_ok());
    }
}
