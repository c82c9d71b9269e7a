use std::fmt;

use wren_common::debug::{DebugCategory, debug_log};
use wren_common::warning::warn_once_at;
use wren_dom::{AttributesMap, NodeId, XmlTree};

use crate::error::ParseError;
use crate::tokenizer::{Attribute, Token, TokenSource};

/// A recovered problem in the token stream.
///
/// In the default mode the builder records one of these and carries on; in
/// strict mode the same condition is a [`ParseError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// What was wrong and how it was handled.
    pub message: String,
    /// Index into the token stream where the problem was seen.
    pub token_index: usize,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token {}: {}", self.token_index, self.message)
    }
}

/// Streaming tree builder.
///
/// Pulls tokens from a [`TokenSource`] until it is exhausted and assembles
/// exactly one [`XmlTree`]:
///
/// - A start tag creates a node, attaches it under the innermost open element
///   (as the new head of that name's sibling chain), copies its attributes and,
///   unless the tag is self-closing, opens it.
/// - An end tag closes the innermost open element and puts each of its
///   same-name sibling chains back into document order.
/// - Text replaces the content of the innermost open element.
/// - Everything else is ignored.
pub struct XmlParser<S> {
    source: S,

    /// Elements opened and not yet closed, root first.
    stack_of_open_elements: Vec<NodeId>,

    /// Tree under construction. The first element becomes `NodeId::ROOT`.
    tree: XmlTree,

    /// Nesting depth inside an ignored extra top-level element.
    skip_depth: usize,

    /// Index of the token being processed.
    token_index: usize,

    /// Issues recorded while recovering.
    issues: Vec<ParseIssue>,

    /// If true, recoverable stream problems become errors.
    strict_mode: bool,
}

impl<S: TokenSource> XmlParser<S> {
    /// Create a new builder over a token source.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            stack_of_open_elements: Vec::new(),
            tree: XmlTree::new(),
            skip_depth: 0,
            token_index: 0,
            issues: Vec::new(),
            strict_mode: false,
        }
    }

    /// Enable strict mode: orphan or mismatched end tags, extra top-level
    /// elements, text outside the root and unclosed elements fail the parse.
    #[must_use]
    pub fn with_strict_mode(mut self) -> Self {
        self.strict_mode = true;
        self
    }

    /// Run the builder and return the tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the token source fails, the stream contains no
    /// element, or (in strict mode) the stream is not properly nested.
    pub fn run(self) -> Result<XmlTree, ParseError> {
        self.run_with_issues().map(|(tree, _)| tree)
    }

    /// Run the builder and return both the tree and any recovered issues.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub fn run_with_issues(mut self) -> Result<(XmlTree, Vec<ParseIssue>), ParseError> {
        while let Some(token) = self.source.next_token()? {
            self.process_token(token)?;
            self.token_index += 1;
        }
        self.close_unclosed_elements()?;

        if self.tree.is_empty() {
            return Err(ParseError::NoRootElement);
        }
        Ok((self.tree, self.issues))
    }

    fn process_token(&mut self, token: Token) -> Result<(), ParseError> {
        if self.skip_depth > 0 {
            self.skip_extra_root_token(&token);
            return Ok(());
        }

        match token {
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => self.handle_start_tag(&name, attributes, self_closing),
            Token::EndTag { name } => self.handle_end_tag(&name),
            Token::Text { data } => self.handle_text(data),
            other => {
                debug_log(
                    DebugCategory::XmlParser,
                    format_args!("Found other content: {}", other.kind()),
                );
                Ok(())
            }
        }
    }

    /// The innermost open element.
    fn current_node(&self) -> Option<NodeId> {
        self.stack_of_open_elements.last().copied()
    }

    fn handle_start_tag(
        &mut self,
        name: &str,
        attributes: Vec<Attribute>,
        self_closing: bool,
    ) -> Result<(), ParseError> {
        debug_log(DebugCategory::XmlParser, format_args!("Opening tag: {name}"));

        let parent = self.current_node();
        if parent.is_none() && !self.tree.is_empty() {
            return self.handle_extra_root(name, self_closing);
        }

        let interned = self.tree.intern(name);
        let node = self.tree.alloc_element(interned, AttributesMap::new());

        if let Some(parent) = parent {
            let seen = self
                .tree
                .get(parent)
                .is_some_and(|p| p.children.contains_key(&interned));
            if seen {
                debug_log(
                    DebugCategory::XmlParser,
                    format_args!("Existing node found for this name. Prepending to the list."),
                );
            } else {
                debug_log(
                    DebugCategory::XmlParser,
                    format_args!("Unseen name. Adding to the children table."),
                );
            }
            self.tree.prepend_child(parent, node);
        }

        self.insert_attributes(node, attributes);

        if self_closing {
            debug_log(
                DebugCategory::XmlParser,
                format_args!("Empty element. No children or text."),
            );
        } else {
            debug_log(
                DebugCategory::XmlParser,
                format_args!("Non-empty element. Pushing to stack and updating current node."),
            );
            self.stack_of_open_elements.push(node);
        }
        Ok(())
    }

    /// Drain a start tag's attributes into the node's attribute map.
    fn insert_attributes(&mut self, node: NodeId, attributes: Vec<Attribute>) {
        let Some(element) = self.tree.get_mut(node) else {
            return;
        };
        for Attribute { name, value } in attributes {
            debug_log(
                DebugCategory::XmlParser,
                format_args!("Attribute found: {name} = {value}"),
            );
            let _ = element.attrs.insert(name, value);
        }
    }

    fn handle_end_tag(&mut self, name: &str) -> Result<(), ParseError> {
        debug_log(DebugCategory::XmlParser, format_args!("Closing tag: {name}"));

        let Some(closed) = self.stack_of_open_elements.pop() else {
            if self.strict_mode {
                return Err(ParseError::UnexpectedEndTag {
                    name: name.to_string(),
                    token_index: self.token_index,
                });
            }
            self.record_issue(&format!("ignored end tag </{name}> with no open element"));
            return Ok(());
        };

        if self.strict_mode {
            let expected = self.tree.name_of(closed).unwrap_or_default();
            if expected != name {
                return Err(ParseError::MismatchedEndTag {
                    expected: expected.to_string(),
                    found: name.to_string(),
                    token_index: self.token_index,
                });
            }
        }

        self.tree.restore_document_order(closed);

        match self.current_node() {
            Some(head) => debug_log(
                DebugCategory::XmlParser,
                format_args!("Head is now {}", self.tree.name_of(head).unwrap_or_default()),
            ),
            None => debug_log(DebugCategory::XmlParser, format_args!("At the top level")),
        }
        Ok(())
    }

    fn handle_text(&mut self, data: String) -> Result<(), ParseError> {
        let Some(current) = self.current_node() else {
            if self.strict_mode {
                return Err(ParseError::TextOutsideRoot {
                    token_index: self.token_index,
                });
            }
            self.record_issue("ignored text outside the root element");
            return Ok(());
        };

        debug_log(
            DebugCategory::XmlParser,
            format_args!("Text content found: {data}"),
        );
        self.tree.set_content(current, data);
        Ok(())
    }

    /// A start tag after the root element was closed.
    fn handle_extra_root(&mut self, name: &str, self_closing: bool) -> Result<(), ParseError> {
        if self.strict_mode {
            return Err(ParseError::MultipleRoots {
                name: name.to_string(),
                token_index: self.token_index,
            });
        }
        self.record_issue(&format!("ignored extra top-level element <{name}>"));
        if !self_closing {
            self.skip_depth = 1;
        }
        Ok(())
    }

    /// Track nesting inside an ignored top-level element.
    const fn skip_extra_root_token(&mut self, token: &Token) {
        match token {
            Token::StartTag {
                self_closing: false,
                ..
            } => self.skip_depth += 1,
            Token::EndTag { .. } => self.skip_depth -= 1,
            _ => {}
        }
    }

    /// Close whatever is still open at end of input, innermost first.
    fn close_unclosed_elements(&mut self) -> Result<(), ParseError> {
        if self.skip_depth > 0 {
            self.record_issue("skipped extra top-level element left unclosed at end of input");
            self.skip_depth = 0;
        }

        if self.stack_of_open_elements.is_empty() {
            return Ok(());
        }

        if self.strict_mode {
            let names = self
                .stack_of_open_elements
                .iter()
                .map(|&id| self.tree.name_of(id).unwrap_or_default().to_string())
                .collect();
            return Err(ParseError::UnclosedElements { names });
        }

        while let Some(id) = self.stack_of_open_elements.pop() {
            let name = self.tree.name_of(id).unwrap_or_default().to_string();
            self.record_issue(&format!("closed unclosed element <{name}> at end of input"));
            self.tree.restore_document_order(id);
        }
        Ok(())
    }

    /// Warn about a recovered problem and keep it for `run_with_issues`.
    fn record_issue(&mut self, message: &str) {
        warn_once_at(
            "XML Parser",
            message,
            format_args!("token {}", self.token_index),
        );
        self.issues.push(ParseIssue {
            message: message.to_string(),
            token_index: self.token_index,
        });
    }
}

/// Print a tree for debugging.
pub fn print_tree(tree: &XmlTree, id: NodeId, indent: usize) {
    let prefix = "  ".repeat(indent);
    let Some(node) = tree.get(id) else {
        return;
    };
    let name = tree.name_of(id).unwrap_or_default();

    if node.attrs.is_empty() {
        println!("{prefix}<{name}>");
    } else {
        let mut attrs: Vec<String> = node
            .attrs
            .iter()
            .map(|(k, v)| format!("{k}=\"{v}\""))
            .collect();
        attrs.sort();
        println!("{prefix}<{name} {}>", attrs.join(" "));
    }
    if let Some(text) = &node.content {
        let display = text.replace('\n', "\\n");
        println!("{prefix}  \"{display}\"");
    }
    for child in tree.children(id) {
        print_tree(tree, child, indent + 1);
    }
}
