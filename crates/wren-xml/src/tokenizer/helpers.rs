//! Helper functions for the XML tokenizer.
//!
//! - State transitions ("switch to", "reconsume in")
//! - Input lookahead and consumption
//! - Token emission and text flushing
//! - Character reference decoding
//! - Character classes for names and whitespace

use wren_common::debug::{DebugCategory, debug_log};
use wren_common::warning::warn_once_at;

use crate::error::TokenizeError;

use super::core::{TokenizerState, XmlTokenizer};
use super::token::Token;

/// Longest reference body (between `&` and `;`) we try to decode.
const MAX_REFERENCE_LENGTH: usize = 32;

// =============================================================================
// State Transition Helpers
// =============================================================================

impl XmlTokenizer<'_> {
    /// Transitions to a new state. The next character will be consumed on the
    /// next step.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// Transitions to a new state without consuming the current character.
    /// The same character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl<'a> XmlTokenizer<'a> {
    /// Returns the character at the current position and advances the position.
    /// Returns None if we've reached the end of input.
    pub(super) fn consume(&mut self) -> Option<char> {
        let c = self.remaining().chars().next()?;
        self.current_pos += c.len_utf8();
        Some(c)
    }

    /// The unconsumed part of the input.
    pub(super) fn remaining(&self) -> &'a str {
        &self.input[self.current_pos..]
    }

    /// Peek at a codepoint at the given offset from the current position
    /// without consuming it.
    #[must_use]
    pub fn peek_codepoint(&self, offset: usize) -> Option<char> {
        self.remaining().chars().nth(offset)
    }

    /// Check if the next few characters match the target string exactly.
    #[must_use]
    pub fn next_few_characters_are(&self, target: &str) -> bool {
        self.remaining().starts_with(target)
    }

    /// Consume the given string from the input.
    /// Caller must have already verified the characters are present.
    pub(super) const fn consume_string(&mut self, target: &str) {
        self.current_pos += target.len();
    }

    /// Consume `expected` if it is the next character.
    pub(super) fn skip_if_next(&mut self, expected: char) {
        if self.peek_codepoint(0) == Some(expected) {
            self.current_pos += expected.len_utf8();
        }
    }

    /// Consume everything up to and including `terminator`, returning the
    /// text before it.
    pub(super) fn consume_until(
        &mut self,
        terminator: &str,
        context: &'static str,
    ) -> Result<&'a str, TokenizeError> {
        let rest = self.remaining();
        let Some(end) = rest.find(terminator) else {
            return Err(self.eof_error(context));
        };
        self.current_pos += end + terminator.len();
        Ok(&rest[..end])
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl XmlTokenizer<'_> {
    /// Queue a markup token, preceded by any character data collected before it.
    pub(super) fn emit_token(&mut self, token: Token) {
        self.flush_text();
        debug_log(DebugCategory::XmlTokenizer, format_args!("Emitting {token}"));
        self.pending.push_back(token);
    }

    /// Queue the collected character data as a `Text` token, or as a
    /// `Whitespace` token when it holds nothing but whitespace outside CDATA.
    pub(super) fn flush_text(&mut self) {
        let had_cdata = std::mem::take(&mut self.text_has_cdata);
        if self.text_buffer.is_empty() {
            return;
        }
        let data = std::mem::take(&mut self.text_buffer);
        let token = if !had_cdata && data.chars().all(is_xml_whitespace) {
            Token::Whitespace { data }
        } else {
            Token::Text { data }
        };
        self.pending.push_back(token);
    }

    pub(super) fn push_to_attribute_value(&mut self, c: char) {
        if let Some(tag) = self.current_tag.as_mut() {
            tag.push_attribute_value(c);
        }
    }
}

// =============================================================================
// Character References
// =============================================================================

impl XmlTokenizer<'_> {
    /// Called after `&` was consumed. If a well-formed, known reference
    /// follows, consume it through the `;` and return the character.
    /// Otherwise consume nothing.
    pub(super) fn consume_character_reference(&mut self) -> Option<char> {
        let rest = self.remaining();
        let body_len = rest
            .bytes()
            .take(MAX_REFERENCE_LENGTH)
            .position(|b| !(b.is_ascii_alphanumeric() || b == b'#'))?;
        if rest.as_bytes()[body_len] != b';' {
            return None;
        }
        let decoded = decode_reference(&rest[..body_len])?;
        debug_log(
            DebugCategory::XmlTokenizer,
            format_args!("Decoded &{}; as {decoded:?}", &rest[..body_len]),
        );
        self.current_pos += body_len + 1;
        Some(decoded)
    }

    /// Decode a reference inside an attribute value, keeping `&` literally
    /// when it does not start one.
    pub(super) fn push_reference_to_attribute(&mut self) {
        match self.consume_character_reference() {
            Some(decoded) => self.push_to_attribute_value(decoded),
            None => {
                self.log_parse_error("unrecognized character reference kept literally");
                self.push_to_attribute_value('&');
            }
        }
    }
}

/// Decode the body of `&body;`: one of the five predefined entities or a
/// decimal (`#38`) / hexadecimal (`#x26`) character reference.
pub(crate) fn decode_reference(body: &str) -> Option<char> {
    match body {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let digits = body.strip_prefix('#')?;
            let code = match digits.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(code).filter(|&c| c != '\0')
        }
    }
}

// =============================================================================
// Character Classes
// =============================================================================

/// XML whitespace: space, tab, line feed, carriage return.
pub(crate) const fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Characters that may begin a tag or attribute name.
pub(crate) fn is_name_start_char(c: char) -> bool {
    c == ':' || c == '_' || c.is_alphabetic()
}

/// Characters that may continue a tag or attribute name.
pub(crate) fn is_name_char(c: char) -> bool {
    is_name_start_char(c) || c.is_alphanumeric() || matches!(c, '-' | '.' | '\u{B7}')
}

// =============================================================================
// Error Handling
// =============================================================================

impl XmlTokenizer<'_> {
    /// Report a recovered syntax problem through the warning system.
    pub(super) fn log_parse_error(&self, message: &str) {
        let pos = self.current_pos;
        let state = self.state;
        warn_once_at(
            "XML Tokenizer",
            message,
            format_args!("{state} state, byte {pos}"),
        );
    }

    /// The error for markup left open at end of input.
    pub(super) const fn eof_error(&self, context: &'static str) -> TokenizeError {
        TokenizeError::UnexpectedEof {
            context,
            position: self.markup_start,
        }
    }
}
