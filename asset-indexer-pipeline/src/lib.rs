//! # Asset Indexer Pipeline
//!
//! This crate provides the pipeline that turns a CSV asset inventory into
//! documents in the search index.
//!
//! ## Architecture
//!
//! The pipeline is strictly linear; each stage consumes the full output of
//! the previous one:
//!
//! 1. **Reader**: Loads the CSV file into an in-memory table
//! 2. **Sanitizer**: Drops unusable rows, disambiguates hostnames, normalizes dates
//! 3. **Processor**: Builds one search document per row
//! 4. **Loader**: Submits documents in batches and verifies the index count
//! 5. **Orchestrator**: Runs the stages in order against a search provider

pub mod config;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod reader;
pub mod sanitizer;

pub use config::PipelineConfig;
pub use errors::PipelineError;
pub use orchestrator::{Orchestrator, RunReport};
