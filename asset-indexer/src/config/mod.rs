//! Configuration and dependency wiring for the asset indexer.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{IndexerConfig, LogFormat};
