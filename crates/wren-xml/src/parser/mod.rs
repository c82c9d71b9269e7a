//! XML tree builder: turns a token stream into an [`XmlTree`](wren_dom::XmlTree).

/// Tree builder implementation.
pub mod core;

pub use self::core::{ParseIssue, XmlParser, print_tree};
