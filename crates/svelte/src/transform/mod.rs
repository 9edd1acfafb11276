//! Built-in transforms for the processor's extension points.
//!
//! - `smartypants`: smart punctuation in document text (quotes, dashes, ellipsis).

/// Smart punctuation transformations (quotes, dashes, ellipsis).
pub mod smartypants;

pub use smartypants::Smartypants;
