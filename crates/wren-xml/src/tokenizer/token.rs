use core::fmt;

use strum_macros::{AsRefStr, Display};

/// An attribute on a start tag token: a name and an already-decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified attribute name, prefix included (`xml:lang`).
    pub name: String,
    /// Attribute value with character references decoded.
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub const fn new(name: String, value: String) -> Self {
        Self { name, value }
    }
}

/// One structural event reported by a token source.
///
/// Only [`Token::StartTag`], [`Token::EndTag`] and [`Token::Text`] shape the
/// tree. The remaining kinds are reported so callers can inspect the full
/// stream, and the builder ignores them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<name attr="v">` or, with `self_closing` set, `<name attr="v"/>`.
    StartTag {
        /// Qualified tag name.
        name: String,
        /// Attributes in source order, duplicates removed.
        attributes: Vec<Attribute>,
        /// Whether the tag ended in `/>` (no end tag follows).
        self_closing: bool,
    },

    /// `</name>`
    EndTag {
        /// Qualified tag name.
        name: String,
    },

    /// A run of character data (or a CDATA section) containing at least one
    /// non-whitespace character.
    Text {
        /// Decoded text.
        data: String,
    },

    /// A run of character data made only of XML whitespace.
    Whitespace {
        /// The whitespace as written (line endings normalized).
        data: String,
    },

    /// `<!--data-->`
    Comment {
        /// Text between the delimiters.
        data: String,
    },

    /// `<?target data?>`, including the XML declaration.
    ProcessingInstruction {
        /// Instruction target (`xml` for the declaration).
        target: String,
        /// Everything after the target, leading whitespace removed.
        data: String,
    },

    /// `<!DOCTYPE data>`
    Doctype {
        /// Everything between `<!DOCTYPE` and the closing `>`.
        data: String,
    },
}

/// The kind of a [`Token`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum TokenKind {
    /// [`Token::StartTag`]
    StartTag,
    /// [`Token::EndTag`]
    EndTag,
    /// [`Token::Text`]
    Text,
    /// [`Token::Whitespace`]
    Whitespace,
    /// [`Token::Comment`]
    Comment,
    /// [`Token::ProcessingInstruction`]
    ProcessingInstruction,
    /// [`Token::Doctype`]
    Doctype,
}

impl Token {
    /// Create a start tag token.
    #[must_use]
    pub fn start_tag(name: &str, attributes: &[(&str, &str)], self_closing: bool) -> Self {
        Self::StartTag {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(n, v)| Attribute::new((*n).to_string(), (*v).to_string()))
                .collect(),
            self_closing,
        }
    }

    /// Create an end tag token.
    #[must_use]
    pub fn end_tag(name: &str) -> Self {
        Self::EndTag {
            name: name.to_string(),
        }
    }

    /// Create a text token.
    #[must_use]
    pub fn text(data: &str) -> Self {
        Self::Text {
            data: data.to_string(),
        }
    }

    /// The kind of this token.
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        match self {
            Self::StartTag { .. } => TokenKind::StartTag,
            Self::EndTag { .. } => TokenKind::EndTag,
            Self::Text { .. } => TokenKind::Text,
            Self::Whitespace { .. } => TokenKind::Whitespace,
            Self::Comment { .. } => TokenKind::Comment,
            Self::ProcessingInstruction { .. } => TokenKind::ProcessingInstruction,
            Self::Doctype { .. } => TokenKind::Doctype,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                write!(f, "<{name}")?;
                for attr in attributes {
                    write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                }
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag { name } => write!(f, "</{name}>"),
            Self::Text { data } => write!(f, "Text({data:?})"),
            Self::Whitespace { data } => write!(f, "Whitespace({data:?})"),
            Self::Comment { data } => write!(f, "<!--{data}-->"),
            Self::ProcessingInstruction { target, data } => {
                if data.is_empty() {
                    write!(f, "<?{target}?>")
                } else {
                    write!(f, "<?{target} {data}?>")
                }
            }
            Self::Doctype { data } => write!(f, "<!DOCTYPE {data}>"),
        }
    }
}
