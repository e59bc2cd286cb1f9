//! PPD directive extraction for ppdguard.
//!
//! This crate implements the parsing layer: a growable value buffer
//! (`ValueBuffer`), the recognized directive keys (`DirectiveKey`), and the
//! line-oriented directive parser (`DirectiveParser`) that reconstructs
//! multi-line directive values from a PPD stream.

pub mod buffer;
pub mod directive;
pub mod parser;

pub use buffer::ValueBuffer;
pub use directive::{Directive, DirectiveKey};
pub use parser::{DirectiveParser, ParseError, ParseStats};
