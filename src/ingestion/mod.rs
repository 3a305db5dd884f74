//! Catalog ingestion: line tokenizing, record parsing and the lazy record source.
//!
//! Most callers should use [`open_catalog`], which returns a [`RecordSource`]: a single-pass
//! iterator of [`crate::types::Record`] that parses lines as they are pulled and releases the
//! file handle on every exit path.
//!
//! The building blocks are also available under:
//! - [`tokenizer`]
//! - [`parser`]

pub mod observability;
pub mod parser;
pub mod source;
pub mod tokenizer;

pub use observability::{
    severity_for_error, CatalogContext, CatalogObserver, CatalogSeverity, CompositeObserver, FileObserver,
    StdErrObserver,
};
pub use parser::parse_record;
pub use source::{open_catalog, open_catalog_with_options, CatalogOptions, RecordSource};
pub use tokenizer::{split_fields, tokenize, unquote};
