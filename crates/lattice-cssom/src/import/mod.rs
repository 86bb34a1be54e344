//! Inlining of `@import` rules.
//!
//! [`ImportResolver`] walks a stylesheet's `@import` rules, loads each target
//! through a [`Fetcher`], and splices the loaded rules back in as `@media`
//! rules carrying the import's media list.
//!
//! # Example
//!
//! ```ignore
//! use lattice_cssom::import::{FileFetcher, ImportResolver};
//!
//! let fetcher = FileFetcher;
//! ImportResolver::new(&fetcher).resolve_imports(&mut sheet, true)?;
//! ```

mod fetch;
mod resolver;

pub use fetch::{FetchError, Fetcher, FileFetcher};
pub use resolver::ImportResolver;
