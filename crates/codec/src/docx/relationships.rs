//! Relationships (.rels) file parsing and generation
//!
//! A relationship manifest maps ids to `(type, target)` pairs so that one
//! part can reference another. Unknown relationship types are kept verbatim
//! and callers filter them by substring ("image", "chart", "header", ...).

use crate::docx::error::DocxResult;
use crate::docx::reader::{escape_xml, XmlParser};
use crate::docx::relationship_types;
use quick_xml::events::Event;

/// A single relationship in a .rels file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Unique ID within the rels file (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative to the source part) or external URL
    pub target: String,
    pub target_mode: TargetMode,
}

impl Relationship {
    /// Whether the type URI contains `kind` (`"image"`, `"chart"`, ...)
    pub fn is_kind(&self, kind: &str) -> bool {
        self.rel_type
            .rsplit('/')
            .next()
            .is_some_and(|last| last.eq_ignore_ascii_case(kind))
            || self.rel_type.contains(kind)
    }

    pub fn is_external(&self) -> bool {
        self.target_mode == TargetMode::External
    }
}

/// Target mode for relationships
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetMode {
    /// Internal target within the package
    #[default]
    Internal,
    /// External target (URL)
    External,
}

/// Collection of relationships from a .rels file, in manifest order
#[derive(Debug, Clone)]
pub struct Relationships {
    relationships: Vec<Relationship>,
    /// Counter for generating new IDs
    next_id: u32,
}

impl Default for Relationships {
    fn default() -> Self {
        Self::new()
    }
}

impl Relationships {
    pub fn new() -> Self {
        Self {
            relationships: Vec::new(),
            next_id: 1,
        }
    }

    /// A collection whose generated ids start after `reserved`
    ///
    /// Ids `rId1..=rId{reserved}` are left for parts that are added
    /// explicitly with [`Relationships::insert`].
    pub fn with_reserved(reserved: u32) -> Self {
        Self {
            relationships: Vec::new(),
            next_id: reserved + 1,
        }
    }

    /// Parse a .rels file from its XML content
    ///
    /// Entries without an `Id` are skipped; anything else is kept as-is.
    pub fn parse(content: &str) -> DocxResult<Self> {
        let mut result = Self::new();
        let mut reader = XmlParser::from_string_trimmed(content);
        let mut buf = Vec::new();
        let mut max_id = 0u32;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let Some(id) = XmlParser::get_attribute(e, "Id") else {
                            tracing::debug!("skipping relationship without Id");
                            buf.clear();
                            continue;
                        };
                        let rel_type = XmlParser::get_attribute(e, "Type").unwrap_or_default();
                        let target = XmlParser::get_attribute(e, "Target").unwrap_or_default();
                        let target_mode = match XmlParser::get_attribute(e, "TargetMode").as_deref()
                        {
                            Some("External") => TargetMode::External,
                            _ => TargetMode::Internal,
                        };

                        if let Some(num) = id.strip_prefix("rId").and_then(|n| n.parse::<u32>().ok()) {
                            max_id = max_id.max(num);
                        }

                        result.relationships.push(Relationship {
                            id,
                            rel_type,
                            target,
                            target_mode,
                        });
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XmlParser::markup_error(&reader, "relationships", e)),
                _ => {}
            }
            buf.clear();
        }

        result.next_id = max_id + 1;
        Ok(result)
    }

    /// Parse an optional manifest; absence means no relationships
    pub fn parse_optional(content: Option<&str>) -> DocxResult<Self> {
        match content {
            Some(xml) => Self::parse(xml),
            None => Ok(Self::new()),
        }
    }

    /// Add a relationship with the next free id and return that id
    pub fn add(&mut self, rel_type: &str, target: &str, target_mode: TargetMode) -> String {
        let mut id = format!("rId{}", self.next_id);
        while self.contains(&id) {
            self.next_id += 1;
            id = format!("rId{}", self.next_id);
        }
        self.next_id += 1;

        self.relationships.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode,
        });

        id
    }

    /// Add a relationship under a caller-chosen id, replacing any previous one
    pub fn insert(&mut self, id: &str, rel_type: &str, target: &str) {
        self.relationships.retain(|r| r.id != id);
        self.relationships.push(Relationship {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode: TargetMode::Internal,
        });
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.id == id)
    }

    /// First relationship with exactly this type URI
    pub fn get_by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.rel_type == rel_type)
    }

    /// All relationships whose type mentions `kind`
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships.iter().filter(move |r| r.is_kind(kind))
    }

    pub fn get_target(&self, id: &str) -> Option<&str> {
        self.get(id).map(|r| r.target.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.relationships.iter().any(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    pub fn all(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.iter()
    }

    /// Generate XML content for the .rels file
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);

        for rel in &self.relationships {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                escape_xml(&rel.id),
                escape_xml(&rel.rel_type),
                escape_xml(&rel.target)
            ));
            if rel.is_external() {
                xml.push_str(r#" TargetMode="External""#);
            }
            xml.push_str("/>");
        }

        xml.push_str("</Relationships>");
        xml
    }
}

/// Package path of the manifest describing `part`
/// (`word/document.xml` -> `word/_rels/document.xml.rels`)
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the directory of its source part
///
/// Targets are relative to the source part (`media/image1.png` from
/// `word/document.xml` is `word/media/image1.png`), may climb with `../`,
/// or may be package-absolute with a leading `/`.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').filter(|s| !s.is_empty()).collect(),
        None => Vec::new(),
    };

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Create the root .rels file for a new package
pub fn create_root_rels(with_core_properties: bool) -> Relationships {
    let mut rels = Relationships::new();
    rels.add(
        relationship_types::DOCUMENT,
        "word/document.xml",
        TargetMode::Internal,
    );
    if with_core_properties {
        rels.add(
            relationship_types::CORE_PROPERTIES,
            "docProps/core.xml",
            TargetMode::Internal,
        );
    }
    rels
}
