//! Document - the root of the tree

use crate::{ChartFrame, DocModelError, Paragraph, Result, Shape, Table, ViewOnly};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A block-level element in document order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Element {
    Paragraph(Paragraph),
    Table(Table),
    Chart(ChartFrame),
    /// Displayed by editing surfaces, never written to a package
    Shape(ViewOnly<Shape>),
}

impl Element {
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Element::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Element::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_chart(&self) -> Option<&ChartFrame> {
        match self {
            Element::Chart(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&Shape> {
        match self {
            Element::Shape(s) => Some(&**s),
            _ => None,
        }
    }

    /// Short name used in logs and projections
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Paragraph(_) => "paragraph",
            Element::Table(_) => "table",
            Element::Chart(_) => "chart",
            Element::Shape(_) => "shape",
        }
    }
}

impl From<Paragraph> for Element {
    fn from(p: Paragraph) -> Self {
        Element::Paragraph(p)
    }
}

impl From<Table> for Element {
    fn from(t: Table) -> Self {
        Element::Table(t)
    }
}

impl From<ChartFrame> for Element {
    fn from(c: ChartFrame) -> Self {
        Element::Chart(c)
    }
}

impl From<Shape> for Element {
    fn from(s: Shape) -> Self {
        Element::Shape(ViewOnly::new(s))
    }
}

/// Header or footer content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderFooter {
    pub paragraphs: Vec<Paragraph>,
}

impl HeaderFooter {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(vec![Paragraph::with_text(text)])
    }

    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Document metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentProperties {
    pub title: Option<String>,
    pub author: Option<String>,
    /// Language tag such as `en-US`
    pub language: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

impl DocumentProperties {
    pub fn is_empty(&self) -> bool {
        *self == DocumentProperties::default()
    }
}

/// The document tree
///
/// `elements` is the only source of truth for content order. The typed
/// accessors (`paragraphs()`, `tables()`, ...) are views derived from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub elements: Vec<Element>,
    pub header: Option<HeaderFooter>,
    pub footer: Option<HeaderFooter>,
    pub properties: DocumentProperties,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: impl Into<Element>) {
        self.elements.push(element.into());
    }

    pub fn with(mut self, element: impl Into<Element>) -> Self {
        self.push(element);
        self
    }

    /// Insert at `index`, failing when past the end
    pub fn insert(&mut self, index: usize, element: impl Into<Element>) -> Result<()> {
        if index > self.elements.len() {
            return Err(DocModelError::InvalidOperation(format!(
                "insert index {} out of range (len {})",
                index,
                self.elements.len()
            )));
        }
        self.elements.insert(index, element.into());
        Ok(())
    }

    /// Remove and return the element at `index`
    pub fn remove(&mut self, index: usize) -> Result<Element> {
        if index >= self.elements.len() {
            return Err(DocModelError::InvalidOperation(format!(
                "remove index {} out of range (len {})",
                index,
                self.elements.len()
            )));
        }
        Ok(self.elements.remove(index))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.header.is_none() && self.footer.is_none()
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.elements.iter().filter_map(Element::as_paragraph)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.elements.iter().filter_map(Element::as_table)
    }

    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.elements.iter_mut().filter_map(|e| match e {
            Element::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn charts(&self) -> impl Iterator<Item = &ChartFrame> {
        self.elements.iter().filter_map(Element::as_chart)
    }

    pub fn charts_mut(&mut self) -> impl Iterator<Item = &mut ChartFrame> {
        self.elements.iter_mut().filter_map(|e| match e {
            Element::Chart(c) => Some(c),
            _ => None,
        })
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.elements.iter().filter_map(Element::as_shape)
    }

    /// Plain text of body paragraphs and table cells, one block per line
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        for element in &self.elements {
            match element {
                Element::Paragraph(p) => lines.push(p.text()),
                Element::Table(t) => {
                    for row in &t.rows {
                        let cells: Vec<String> = row.cells.iter().map(|c| c.text()).collect();
                        lines.push(cells.join("\t"));
                    }
                }
                Element::Chart(_) | Element::Shape(_) => {}
            }
        }
        lines.join("\n")
    }

    /// Whether any paragraph, including those in cells and header/footer,
    /// belongs to a list
    pub fn has_lists(&self) -> bool {
        self.all_paragraphs().any(|p| p.list.is_some())
    }

    /// Body, cell, header and footer paragraphs
    pub fn all_paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        let body = self.elements.iter().flat_map(element_paragraphs);
        let header = self.header.iter().flat_map(|h| h.paragraphs.iter());
        let footer = self.footer.iter().flat_map(|f| f.paragraphs.iter());
        body.chain(header).chain(footer)
    }
}

fn element_paragraphs(element: &Element) -> Box<dyn Iterator<Item = &Paragraph> + '_> {
    match element {
        Element::Paragraph(p) => Box::new(std::iter::once(p)),
        Element::Table(t) => Box::new(
            t.rows
                .iter()
                .flat_map(|r| r.cells.iter())
                .flat_map(|c| c.paragraphs.iter()),
        ),
        Element::Chart(_) | Element::Shape(_) => Box::new(std::iter::empty()),
    }
}
