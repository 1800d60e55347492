//! Charts - chart model and DrawingML chart parts
//!
//! This crate provides:
//! - A strongly-typed chart model (type, title, legend, series)
//! - Parsing of `word/charts/chartN.xml` parts into that model
//! - Writing the model back to a chart part with a cached data snapshot

mod model;
mod error;
mod drawingml_parser;
mod drawingml_writer;

pub use model::*;
pub use error::*;
pub use drawingml_parser::*;
pub use drawingml_writer::*;
