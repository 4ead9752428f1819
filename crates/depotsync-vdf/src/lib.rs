//! Parser for nested key-value text documents (`key.vdf` style).
//!
//! ```text
//! "depots"
//! {
//!     "228981"
//!     {
//!         "DecryptionKey"  "a1b2..."
//!     }
//! }
//! ```
//!
//! Keys and values may be quoted or bare, sections nest with braces, `//`
//! starts a line comment, and bracketed platform conditionals (`[$WIN32]`)
//! are accepted and dropped. Key order and duplicate keys are preserved.

pub use self::document::{Document, MAX_DEPTH, Value};
pub use self::error::{Error, Result};

mod document;
mod error;
mod lexer;

/// Parse a document from text.
pub fn parse(input: &str) -> Result<Document> {
    document::parse_tokens(lexer::tokenize(input)?)
}

/// Parse a document from raw bytes, dropping a UTF-8 BOM and replacing
/// invalid sequences.
pub fn parse_bytes(input: &[u8]) -> Result<Document> {
    let input = input.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(input);
    parse(&String::from_utf8_lossy(input))
}
