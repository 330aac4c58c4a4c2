//! # ngdeps
//!
//! Component dependency graphs from decorated TypeScript declarations.
//!
//! Source files are parsed with tree-sitter into a small syntax model
//! ([`parsers::ParsedFile`]). The extraction engine ([`extract`]) finds
//! declarations decorated with `@Component(..)`/`@View(..)`-like annotations
//! and normalizes their `directives`, `providers` and `templateUrl`
//! configuration into [`extract::DependencyRecord`]s, which are then rendered
//! through Graphviz ([`formatters::DotEngine`]) or written as JSON.
//!
//! ```rust,no_run
//! use ngdeps::core::DependencyAnalyzer;
//! use std::path::PathBuf;
//!
//! let report = DependencyAnalyzer::default()
//!     .analyze(&[PathBuf::from("src/app")])
//!     .unwrap();
//! for record in &report.records {
//!     println!("{} -> {:?}", record.name, record.providers);
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod extract;
pub mod formatters;
pub mod parsers;

pub use error::{ConfigError, ExtractError, RenderError, RenderStage, ScanError};
pub use extract::{DependencyRecord, Extractor};
