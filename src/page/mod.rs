//! Page-level processing: visible-text extraction, tokenization, and
//! outbound link extraction.

pub mod links;
pub mod text;
pub mod tokens;
