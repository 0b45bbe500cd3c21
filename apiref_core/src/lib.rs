//! `apiref_core` turns one set of markdown API sources into per-language
//! reference pages.
//!
//! ## Processing Pipeline
//!
//! ```text
//! api/*.md
//!   -> markdown (reflow + tree)
//!   -> parser (classes, members, params, options, language metadata)
//!   -> documentation (merge, copy inherited docs, filter per language)
//!   -> format (signatures and types for JS, Python, Java, C#)
//!   -> generator (class pages, guides, link definitions)
//! ```
//!
//! ## Modules
//!
//! - [`markdown`]: the restricted markdown dialect. Parse, render, filter by
//!   language, tables of contents.
//! - [`documentation`]: the API model and its per-language transformations.
//! - [`format`]: one [`format::Formatter`] per target language.
//! - [`generator`]: the end to end run used by the CLI.
//! - [`config`]: `apiref.toml`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use apiref_core::ApirefConfig;
//! use apiref_core::generator::Generator;
//! use apiref_core::generator::write_outputs;
//!
//! let root = Path::new(".");
//! let config = ApirefConfig::load_or_default(root).unwrap();
//! let generation = Generator::new(root, config).generate(&[]).unwrap();
//! for diagnostic in generation.diagnostics.iter() {
//!     eprintln!("{diagnostic}");
//! }
//! write_outputs(&generation.files).unwrap();
//! ```

pub use config::*;
pub use error::*;
pub use lang::*;

pub mod config;
pub mod documentation;
#[allow(unused_assignments)]
mod error;
pub mod format;
pub mod generator;
mod lang;
pub mod markdown;
pub mod overloads;
pub mod parser;
pub mod sources;
pub mod type_expr;

#[cfg(test)]
mod __fixtures;
#[cfg(test)]
mod __tests;
