//! # LitSift
//!
//! Search, sift, and export academic literature from Semantic Scholar.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: the normalized [`Paper`] record and its filterable fields
//! - [`source`]: the rate-limited, retrying, paginated retrieval pipeline
//! - [`filter`]: the sift expression language (tokenizer, parser, evaluator)
//! - [`export`]: CSV and BibTeX writers
//! - [`config`]: configuration management

pub mod config;
pub mod export;
pub mod filter;
pub mod models;
pub mod source;

// Re-export commonly used types
pub use models::{Field, Paper};
pub use source::{CancelToken, RateLimiter, SemanticScholar, SourceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
