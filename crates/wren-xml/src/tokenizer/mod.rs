//! XML tokenizer module: the token source consumed by the tree builder.

/// Tokenizer state machine implementation.
pub mod core;
/// Helper methods for tokenizer state transitions, input and references.
pub mod helpers;
/// The pull-based token source contract.
pub mod source;
/// Token types produced by the tokenizer.
pub mod token;

pub use self::core::XmlTokenizer;
pub use source::TokenSource;
pub use token::{Attribute, Token, TokenKind};
