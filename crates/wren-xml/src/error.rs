//! Error types for tokenizing and tree building.

use thiserror::Error;

/// An unrecoverable problem in the markup itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// Input ended inside a tag, comment, CDATA section, processing
    /// instruction or DOCTYPE.
    #[error("unexpected end of input inside {context} starting at byte {position}")]
    UnexpectedEof {
        /// What was being scanned.
        context: &'static str,
        /// Byte offset where the unterminated construct began.
        position: usize,
    },

    /// The input buffer is not valid UTF-8.
    #[error("input is not valid UTF-8 after byte {position}")]
    InvalidUtf8 {
        /// Length of the longest valid prefix.
        position: usize,
    },
}

/// Why a parse produced no tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The token source failed.
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    /// The input contained no element.
    #[error("document has no root element")]
    NoRootElement,

    /// Strict mode: an end tag arrived with no element open.
    #[error("end tag </{name}> at token {token_index} has no open element")]
    UnexpectedEndTag {
        /// Name on the end tag.
        name: String,
        /// Index of the offending token.
        token_index: usize,
    },

    /// Strict mode: an end tag does not match the innermost open element.
    #[error("end tag </{found}> at token {token_index} does not close <{expected}>")]
    MismatchedEndTag {
        /// Name of the innermost open element.
        expected: String,
        /// Name on the end tag.
        found: String,
        /// Index of the offending token.
        token_index: usize,
    },

    /// Strict mode: a second top-level element followed the root.
    #[error("extra top-level element <{name}> at token {token_index}")]
    MultipleRoots {
        /// Name of the extra element.
        name: String,
        /// Index of the offending token.
        token_index: usize,
    },

    /// Strict mode: non-whitespace text outside the root element.
    #[error("text outside the root element at token {token_index}")]
    TextOutsideRoot {
        /// Index of the offending token.
        token_index: usize,
    },

    /// Strict mode: input ended with elements still open.
    #[error("input ended with unclosed elements: {}", .names.join(", "))]
    UnclosedElements {
        /// Open element names, outermost first.
        names: Vec<String>,
    },
}
