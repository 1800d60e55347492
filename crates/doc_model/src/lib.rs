//! Document Model - the document tree shared by codec and editing surfaces
//!
//! The tree is a flat, ordered list of block [`Element`]s (paragraphs,
//! tables, charts and view-only shapes) plus optional header and footer.
//! It is built by the DOCX reader, mutated in place by an editing surface,
//! and consumed by the DOCX writer. All lengths are stored in points and all
//! colors as resolved RGB values.

mod error;
mod color;
mod border;
mod run;
mod paragraph;
pub mod table;
mod chart;
pub mod shape;
mod document;
pub mod projection;

pub use error::*;
pub use color::*;
pub use border::*;
pub use run::*;
pub use paragraph::*;
pub use table::*;
pub use chart::*;
pub use shape::*;
pub use document::*;

/// Re-export of the chart model used by chart elements
pub use charts;
