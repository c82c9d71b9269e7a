use std::collections::VecDeque;

use strum_macros::Display;

use crate::error::TokenizeError;

use super::helpers::{is_name_char, is_name_start_char, is_xml_whitespace};
use super::source::TokenSource;
use super::token::{Attribute, Token};

/// States of the tokenizer state machine.
///
/// Comments, CDATA sections, processing instructions and DOCTYPE declarations
/// are scanned in one step from the tag-open state and have no states of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// Character data between markup.
    Data,
    /// After `<`.
    TagOpen,
    /// Inside a start tag name.
    StartTagName,
    /// After `</`.
    EndTagOpen,
    /// Inside an end tag name.
    EndTagName,
    /// After an end tag name, before `>`.
    AfterEndTagName,
    /// Between attributes of a start tag.
    BeforeAttributeName,
    /// Inside an attribute name.
    AttributeName,
    /// After an attribute name, before `=`.
    AfterAttributeName,
    /// After `=`, before the value.
    BeforeAttributeValue,
    /// Inside a `"`-quoted value.
    AttributeValueDoubleQuoted,
    /// Inside a `'`-quoted value.
    AttributeValueSingleQuoted,
    /// Inside an unquoted value (recovered).
    AttributeValueUnquoted,
    /// After the closing quote of a value.
    AfterAttributeValueQuoted,
    /// After `/` inside a start tag.
    SelfClosingStartTag,
}

/// A start or end tag under construction.
#[derive(Debug)]
pub(super) struct TagInProgress {
    pub(super) name: String,
    pub(super) attributes: Vec<Attribute>,
    pub(super) is_end: bool,
    pub(super) self_closing: bool,
}

impl TagInProgress {
    fn new(first: char, is_end: bool) -> Self {
        Self {
            name: String::from(first),
            attributes: Vec::new(),
            is_end,
            self_closing: false,
        }
    }

    fn start_attribute(&mut self, first: char) {
        self.attributes
            .push(Attribute::new(String::from(first), String::new()));
    }

    fn push_attribute_name(&mut self, c: char) {
        if let Some(attr) = self.attributes.last_mut() {
            attr.name.push(c);
        }
    }

    pub(super) fn push_attribute_value(&mut self, c: char) {
        if let Some(attr) = self.attributes.last_mut() {
            attr.value.push(c);
        }
    }

    /// Whether the last attribute repeats the name of an earlier one.
    pub(super) fn current_attribute_is_duplicate(&self) -> bool {
        self.attributes.split_last().is_some_and(|(current, earlier)| {
            earlier.iter().any(|attr| attr.name == current.name)
        })
    }

    fn into_token(self) -> Token {
        if self.is_end {
            Token::EndTag { name: self.name }
        } else {
            Token::StartTag {
                name: self.name,
                attributes: self.attributes,
                self_closing: self.self_closing,
            }
        }
    }
}

/// Pull-based XML tokenizer over an in-memory document.
///
/// Each call to [`next_token`](Self::next_token) runs the state machine until
/// at least one token is ready. Low-level syntax problems are recovered and
/// reported through the warning system; only markup left unterminated at the
/// end of input is an error.
pub struct XmlTokenizer<'a> {
    pub(super) state: TokenizerState,
    pub(super) input: &'a str,
    pub(super) current_pos: usize,
    pub(super) current_input_character: Option<char>,
    // When true, the next step will not consume a new character.
    pub(super) reconsume: bool,
    pub(super) at_eof: bool,
    pub(super) current_tag: Option<TagInProgress>,
    /// Byte offset of the `<` that opened the markup being scanned.
    pub(super) markup_start: usize,
    /// Character data collected since the last markup.
    pub(super) text_buffer: String,
    /// The collected character data includes a CDATA section, so it is
    /// `Text` even when every character is whitespace.
    pub(super) text_has_cdata: bool,
    /// Tokens produced but not yet handed out.
    pub(super) pending: VecDeque<Token>,
    /// Tokens collected by [`run`](Self::run).
    pub(super) token_stream: Vec<Token>,
}

impl<'a> XmlTokenizer<'a> {
    /// Create a new tokenizer for the given input. A leading byte order mark is skipped.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            state: TokenizerState::Data,
            input: input.strip_prefix('\u{FEFF}').unwrap_or(input),
            current_pos: 0,
            current_input_character: None,
            reconsume: false,
            at_eof: false,
            current_tag: None,
            markup_start: 0,
            text_buffer: String::new(),
            text_has_cdata: false,
            pending: VecDeque::new(),
            token_stream: Vec::new(),
        }
    }

    /// Run the tokenizer to completion, collecting every token.
    ///
    /// # Errors
    ///
    /// Returns the first unrecoverable tokenizing error.
    pub fn run(&mut self) -> Result<(), TokenizeError> {
        while let Some(token) = self.next_token()? {
            self.token_stream.push(token);
        }
        Ok(())
    }

    /// Consume the tokenizer and return the tokens collected by [`run`](Self::run).
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.token_stream
    }

    /// Produce the next token, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input ends inside a tag, comment, CDATA section,
    /// processing instruction or DOCTYPE.
    pub fn next_token(&mut self) -> Result<Option<Token>, TokenizeError> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }
            if self.at_eof {
                return Ok(None);
            }
            self.step()?;
        }
    }

    /// Consume (or reconsume) one character and dispatch on the current state.
    fn step(&mut self) -> Result<(), TokenizeError> {
        if self.reconsume {
            self.reconsume = false;
        } else {
            self.current_input_character = self.consume();
        }

        match self.state {
            TokenizerState::Data => {
                self.handle_data_state();
                Ok(())
            }
            TokenizerState::TagOpen => self.handle_tag_open_state(),
            TokenizerState::StartTagName => self.handle_start_tag_name_state(),
            TokenizerState::EndTagOpen => self.handle_end_tag_open_state(),
            TokenizerState::EndTagName => self.handle_end_tag_name_state(),
            TokenizerState::AfterEndTagName => self.handle_after_end_tag_name_state(),
            TokenizerState::BeforeAttributeName => self.handle_before_attribute_name_state(),
            TokenizerState::AttributeName => self.handle_attribute_name_state(),
            TokenizerState::AfterAttributeName => self.handle_after_attribute_name_state(),
            TokenizerState::BeforeAttributeValue => self.handle_before_attribute_value_state(),
            TokenizerState::AttributeValueDoubleQuoted => {
                self.handle_attribute_value_quoted_state('"')
            }
            TokenizerState::AttributeValueSingleQuoted => {
                self.handle_attribute_value_quoted_state('\'')
            }
            TokenizerState::AttributeValueUnquoted => self.handle_attribute_value_unquoted_state(),
            TokenizerState::AfterAttributeValueQuoted => {
                self.handle_after_attribute_value_quoted_state()
            }
            TokenizerState::SelfClosingStartTag => self.handle_self_closing_start_tag_state(),
        }
    }

    fn handle_data_state(&mut self) {
        match self.current_input_character {
            Some('<') => {
                self.markup_start = self.current_pos - 1;
                self.switch_to(TokenizerState::TagOpen);
            }
            Some('&') => match self.consume_character_reference() {
                Some(decoded) => self.text_buffer.push(decoded),
                None => {
                    self.log_parse_error("unrecognized character reference kept literally");
                    self.text_buffer.push('&');
                }
            },
            Some('\r') => {
                self.skip_if_next('\n');
                self.text_buffer.push('\n');
            }
            Some(c) => self.text_buffer.push(c),
            None => {
                self.flush_text();
                self.at_eof = true;
            }
        }
    }

    fn handle_tag_open_state(&mut self) -> Result<(), TokenizeError> {
        match self.current_input_character {
            Some('/') => self.switch_to(TokenizerState::EndTagOpen),
            Some('!') => self.scan_markup_declaration()?,
            Some('?') => self.scan_processing_instruction()?,
            Some(c) if is_name_start_char(c) => {
                self.current_tag = Some(TagInProgress::new(c, false));
                self.switch_to(TokenizerState::StartTagName);
            }
            _ => {
                self.log_parse_error("'<' does not start markup; treating it as text");
                self.text_buffer.push('<');
                self.reconsume_in(TokenizerState::Data);
            }
        }
        Ok(())
    }

    fn handle_start_tag_name_state(&mut self) -> Result<(), TokenizeError> {
        match self.current_input_character {
            Some(c) if is_name_char(c) => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.name.push(c);
                }
            }
            Some(c) if is_xml_whitespace(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => self.emit_current_tag(),
            None => return Err(self.eof_error("start tag")),
            Some(_) => {
                self.log_parse_error("invalid character in tag name");
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
        Ok(())
    }

    fn handle_end_tag_open_state(&mut self) -> Result<(), TokenizeError> {
        match self.current_input_character {
            Some(c) if is_name_start_char(c) => {
                self.current_tag = Some(TagInProgress::new(c, true));
                self.switch_to(TokenizerState::EndTagName);
            }
            None => return Err(self.eof_error("end tag")),
            Some(_) => {
                self.log_parse_error("'</' does not start an end tag; treating it as text");
                self.text_buffer.push_str("</");
                self.reconsume_in(TokenizerState::Data);
            }
        }
        Ok(())
    }

    fn handle_end_tag_name_state(&mut self) -> Result<(), TokenizeError> {
        match self.current_input_character {
            Some(c) if is_name_char(c) => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.name.push(c);
                }
            }
            Some(c) if is_xml_whitespace(c) => self.switch_to(TokenizerState::AfterEndTagName),
            Some('>') => self.emit_current_tag(),
            None => return Err(self.eof_error("end tag")),
            Some(_) => {
                self.log_parse_error("invalid character in end tag name");
                self.reconsume_in(TokenizerState::AfterEndTagName);
            }
        }
        Ok(())
    }

    fn handle_after_end_tag_name_state(&mut self) -> Result<(), TokenizeError> {
        match self.current_input_character {
            Some(c) if is_xml_whitespace(c) => {}
            Some('>') => self.emit_current_tag(),
            None => return Err(self.eof_error("end tag")),
            Some(_) => self.log_parse_error("unexpected content in end tag skipped"),
        }
        Ok(())
    }

    fn handle_before_attribute_name_state(&mut self) -> Result<(), TokenizeError> {
        match self.current_input_character {
            Some(c) if is_xml_whitespace(c) => {}
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => self.emit_current_tag(),
            Some(c) if is_name_start_char(c) => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.start_attribute(c);
                }
                self.switch_to(TokenizerState::AttributeName);
            }
            None => return Err(self.eof_error("start tag")),
            Some(_) => self.log_parse_error("unexpected character in tag skipped"),
        }
        Ok(())
    }

    fn handle_attribute_name_state(&mut self) -> Result<(), TokenizeError> {
        match self.current_input_character {
            Some(c) if is_name_char(c) => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.push_attribute_name(c);
                }
            }
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some(c) if is_xml_whitespace(c) => {
                self.switch_to(TokenizerState::AfterAttributeName);
            }
            Some('/' | '>') => {
                self.log_parse_error("attribute without a value");
                self.finish_attribute();
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
            None => return Err(self.eof_error("start tag")),
            Some(_) => self.log_parse_error("invalid character in attribute name skipped"),
        }
        Ok(())
    }

    fn handle_after_attribute_name_state(&mut self) -> Result<(), TokenizeError> {
        match self.current_input_character {
            Some(c) if is_xml_whitespace(c) => {}
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            None => return Err(self.eof_error("start tag")),
            Some(_) => {
                self.log_parse_error("attribute without a value");
                self.finish_attribute();
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
        Ok(())
    }

    fn handle_before_attribute_value_state(&mut self) -> Result<(), TokenizeError> {
        match self.current_input_character {
            Some(c) if is_xml_whitespace(c) => {}
            Some('"') => self.switch_to(TokenizerState::AttributeValueDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::AttributeValueSingleQuoted),
            Some('>') => {
                self.log_parse_error("attribute without a value");
                self.finish_attribute();
                self.emit_current_tag();
            }
            None => return Err(self.eof_error("start tag")),
            Some(_) => {
                self.log_parse_error("unquoted attribute value");
                self.reconsume_in(TokenizerState::AttributeValueUnquoted);
            }
        }
        Ok(())
    }

    fn handle_attribute_value_quoted_state(&mut self, quote: char) -> Result<(), TokenizeError> {
        match self.current_input_character {
            Some(c) if c == quote => {
                self.finish_attribute();
                self.switch_to(TokenizerState::AfterAttributeValueQuoted);
            }
            Some('&') => self.push_reference_to_attribute(),
            Some('<') => {
                self.log_parse_error("'<' in attribute value");
                self.push_to_attribute_value('<');
            }
            Some('\r') => {
                self.skip_if_next('\n');
                self.push_to_attribute_value('\n');
            }
            Some(c) => self.push_to_attribute_value(c),
            None => return Err(self.eof_error("attribute value")),
        }
        Ok(())
    }

    fn handle_attribute_value_unquoted_state(&mut self) -> Result<(), TokenizeError> {
        match self.current_input_character {
            Some(c) if is_xml_whitespace(c) => {
                self.finish_attribute();
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('>') => {
                self.finish_attribute();
                self.emit_current_tag();
            }
            Some('/') if self.peek_codepoint(0) == Some('>') => {
                self.finish_attribute();
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            Some('&') => self.push_reference_to_attribute(),
            Some(c) => self.push_to_attribute_value(c),
            None => return Err(self.eof_error("attribute value")),
        }
        Ok(())
    }

    fn handle_after_attribute_value_quoted_state(&mut self) -> Result<(), TokenizeError> {
        match self.current_input_character {
            Some(c) if is_xml_whitespace(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => self.emit_current_tag(),
            None => return Err(self.eof_error("start tag")),
            Some(_) => {
                self.log_parse_error("missing whitespace between attributes");
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
        Ok(())
    }

    fn handle_self_closing_start_tag_state(&mut self) -> Result<(), TokenizeError> {
        match self.current_input_character {
            Some('>') => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.self_closing = true;
                }
                self.emit_current_tag();
            }
            None => return Err(self.eof_error("start tag")),
            Some(_) => {
                self.log_parse_error("unexpected '/' in tag");
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
        Ok(())
    }

    /// After `<!`: a comment, CDATA section or DOCTYPE declaration.
    fn scan_markup_declaration(&mut self) -> Result<(), TokenizeError> {
        if self.next_few_characters_are("--") {
            self.consume_string("--");
            let data = self.consume_until("-->", "comment")?;
            self.emit_token(Token::Comment {
                data: data.to_string(),
            });
        } else if self.next_few_characters_are("[CDATA[") {
            self.consume_string("[CDATA[");
            let data = self.consume_until("]]>", "CDATA section")?;
            self.text_buffer.push_str(&normalize_newlines(data));
            self.text_has_cdata = true;
        } else if self.next_few_characters_are("DOCTYPE") {
            self.consume_string("DOCTYPE");
            self.scan_doctype()?;
        } else {
            self.log_parse_error("unknown markup declaration; treating it as text");
            self.text_buffer.push_str("<!");
        }
        self.switch_to(TokenizerState::Data);
        Ok(())
    }

    /// After `<!DOCTYPE`: everything up to the `>` outside quotes and the
    /// bracketed internal subset.
    fn scan_doctype(&mut self) -> Result<(), TokenizeError> {
        let rest = self.remaining();
        let mut depth = 0usize;
        let mut quote = None;
        let mut end = None;

        for (i, c) in rest.char_indices() {
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, '[') => depth += 1,
                (None, ']') => depth = depth.saturating_sub(1),
                (None, '>') if depth == 0 => {
                    end = Some(i);
                    break;
                }
                _ => {}
            }
        }

        let Some(end) = end else {
            return Err(self.eof_error("DOCTYPE"));
        };
        self.current_pos += end + 1;
        self.emit_token(Token::Doctype {
            data: rest[..end].trim().to_string(),
        });
        Ok(())
    }

    /// After `<?`: a processing instruction or the XML declaration.
    fn scan_processing_instruction(&mut self) -> Result<(), TokenizeError> {
        let body = self.consume_until("?>", "processing instruction")?;
        let (target, data) = match body.find(is_xml_whitespace) {
            Some(i) => (&body[..i], body[i..].trim_start()),
            None => (body, ""),
        };
        if target.is_empty() {
            self.log_parse_error("processing instruction without a target");
        }
        self.emit_token(Token::ProcessingInstruction {
            target: target.to_string(),
            data: data.to_string(),
        });
        self.switch_to(TokenizerState::Data);
        Ok(())
    }

    /// Close the current attribute, dropping it if its name repeats an earlier one.
    fn finish_attribute(&mut self) {
        let is_duplicate = self
            .current_tag
            .as_ref()
            .is_some_and(TagInProgress::current_attribute_is_duplicate);

        if is_duplicate {
            self.log_parse_error("duplicate attribute dropped");
            if let Some(tag) = self.current_tag.as_mut() {
                let _ = tag.attributes.pop();
            }
        }
    }

    /// Emit the tag under construction and return to the data state.
    fn emit_current_tag(&mut self) {
        if let Some(tag) = self.current_tag.take() {
            self.emit_token(tag.into_token());
        }
        self.switch_to(TokenizerState::Data);
    }
}

impl TokenSource for XmlTokenizer<'_> {
    fn next_token(&mut self) -> Result<Option<Token>, TokenizeError> {
        Self::next_token(self)
    }
}

/// Replace `\r\n` and lone `\r` with `\n`.
pub(super) fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
