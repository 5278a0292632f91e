//! Processor module for the asset indexer pipeline.
//!
//! Transforms sanitized rows into search documents.

mod document_builder;

pub use document_builder::DocumentBuilder;
