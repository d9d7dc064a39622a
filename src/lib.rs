//! shipdex - Ship and outfit catalog extractor
//!
//! A library for parsing a game's indentation-based data-definition files
//! into structured ship, variant, outfit, and effect records, with
//! variant inheritance resolution and government inference, serializable
//! to JSON for rendering and UI consumers.

pub mod catalog;
pub mod cli;
pub mod discovery;
pub mod error;
pub mod output;
pub mod parser;
pub mod resolve;
pub mod validation;

pub use catalog::{Catalog, CatalogBuilder, DataSource, SourceFile, SourceIndex};
pub use discovery::{
    discover, discover_paths, discover_with_manifest, DiscoveryResult, Manifest, ScanResult,
};
pub use error::{Result, ShipdexError};
pub use parser::{parse_block, BlockOptions, Record, Value};
pub use resolve::{ResolverContext, SpeciesTables};
pub use validation::{validate_catalog, Diagnostic, Severity, ValidationResult};
