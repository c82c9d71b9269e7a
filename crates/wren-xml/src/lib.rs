//! XML parsing for wren.
//!
//! The [`tokenizer`] turns a document into a stream of [`Token`]s and the
//! [`parser`] assembles that stream into a [`wren_dom::XmlTree`], grouping
//! same-name siblings into chains so that lookups by tag name are direct.
//!
//! ```
//! let tree = wren_xml::parse_str(r#"<a><b x="1"/><b x="2"/></a>"#).unwrap();
//! let values: Vec<_> = tree
//!     .children_named(tree.root(), "b")
//!     .filter_map(|b| tree.get_attr(b, "x"))
//!     .collect();
//! assert_eq!(values, ["1", "2"]);
//! ```

pub mod error;
pub mod parser;
pub mod tokenizer;

pub use error::{ParseError, TokenizeError};
pub use parser::{ParseIssue, XmlParser, print_tree};
pub use tokenizer::{Attribute, Token, TokenKind, TokenSource, XmlTokenizer};

use wren_dom::XmlTree;

/// Parse a UTF-8 byte buffer into a tree.
///
/// # Errors
///
/// Returns an error if the buffer is not UTF-8, the markup is unterminated,
/// or the document has no root element.
pub fn parse(buffer: &[u8]) -> Result<XmlTree, ParseError> {
    let text = std::str::from_utf8(buffer).map_err(|e| TokenizeError::InvalidUtf8 {
        position: e.valid_up_to(),
    })?;
    parse_str(text)
}

/// Parse a document held in a string.
///
/// # Errors
///
/// Same as [`parse`], minus the UTF-8 check.
pub fn parse_str(text: &str) -> Result<XmlTree, ParseError> {
    XmlParser::new(XmlTokenizer::new(text)).run()
}
