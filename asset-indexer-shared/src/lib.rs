//! # Asset Indexer Shared
//!
//! Data types passed between the stages of the asset inventory indexer:
//! the in-memory [`Table`] produced by the reader and cleaned by the
//! sanitizer, and the [`AssetDocument`] submitted to the search index.

mod document;
mod row;

pub use document::AssetDocument;
pub use row::{CellValue, Row, Table};
