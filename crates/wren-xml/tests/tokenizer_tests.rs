//! Integration tests for the XML tokenizer.

use wren_xml::{Attribute, Token, TokenKind, TokenizeError, XmlTokenizer};

/// Helper to tokenize a string and return the tokens
fn tokenize(input: &str) -> Vec<Token> {
    let mut tokenizer = XmlTokenizer::new(input);
    tokenizer.run().expect("tokenizing failed");
    tokenizer.into_tokens()
}

/// Helper to tokenize a string that is expected to fail
fn tokenize_err(input: &str) -> TokenizeError {
    let mut tokenizer = XmlTokenizer::new(input);
    tokenizer.run().expect_err("tokenizing should fail")
}

fn attr(name: &str, value: &str) -> Attribute {
    Attribute::new(name.to_string(), value.to_string())
}

// ========== tags ==========

#[test]
fn test_start_tag_with_attributes() {
    let tokens = tokenize(r#"<item id="1" kind='leaf'>"#);
    assert_eq!(
        tokens,
        vec![Token::StartTag {
            name: "item".to_string(),
            attributes: vec![attr("id", "1"), attr("kind", "leaf")],
            self_closing: false,
        }]
    );
}

#[test]
fn test_self_closing_tag() {
    let tokens = tokenize("<br/><hr />");
    assert_eq!(
        tokens,
        vec![Token::start_tag("br", &[], true), Token::start_tag("hr", &[], true)]
    );
}

#[test]
fn test_end_tag_allows_trailing_whitespace() {
    let tokens = tokenize("<a></a >");
    assert_eq!(tokens, vec![Token::start_tag("a", &[], false), Token::end_tag("a")]);
}

#[test]
fn test_qualified_names_are_kept() {
    let tokens = tokenize(r#"<atom:link xml:lang="en"/>"#);
    assert_eq!(
        tokens,
        vec![Token::start_tag("atom:link", &[("xml:lang", "en")], true)]
    );
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    let tokens = tokenize(r#"<a x="1" x="2" y="3"/>"#);
    assert_eq!(
        tokens,
        vec![Token::start_tag("a", &[("x", "1"), ("y", "3")], true)]
    );
}

#[test]
fn test_unquoted_and_valueless_attributes_are_recovered() {
    let tokens = tokenize("<a x=1 flag y=2/>");
    assert_eq!(
        tokens,
        vec![Token::start_tag("a", &[("x", "1"), ("flag", ""), ("y", "2")], true)]
    );
}

// ========== character data ==========

#[test]
fn test_text_and_whitespace_are_distinct() {
    let tokens = tokenize("<a>\n  <b>hi</b>\n</a>");
    let kinds: Vec<TokenKind> = tokens.iter().map(Token::kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::StartTag,
            TokenKind::Whitespace,
            TokenKind::StartTag,
            TokenKind::Text,
            TokenKind::EndTag,
            TokenKind::Whitespace,
            TokenKind::EndTag,
        ]
    );
    assert_eq!(tokens[3], Token::text("hi"));
}

#[test]
fn test_newlines_are_normalized() {
    let tokens = tokenize("<a>x\r\ny\rz</a>");
    assert_eq!(tokens[1], Token::text("x\ny\nz"));
}

#[test]
fn test_references_in_text() {
    let tokens = tokenize("<a>&lt;&amp;&gt;&quot;&apos;&#65;&#x42;</a>");
    assert_eq!(tokens[1], Token::text("<&>\"'AB"));
}

#[test]
fn test_references_in_attribute_values() {
    let tokens = tokenize(r#"<a href="?x=1&amp;y=2" q='&#x27;'/>"#);
    assert_eq!(
        tokens,
        vec![Token::start_tag("a", &[("href", "?x=1&y=2"), ("q", "'")], true)]
    );
}

#[test]
fn test_unknown_reference_kept_literally() {
    let tokens = tokenize("<a>&nbsp; & done</a>");
    assert_eq!(tokens[1], Token::text("&nbsp; & done"));
}

#[test]
fn test_stray_less_than_is_text() {
    let tokens = tokenize("<a>1 < 2</a>");
    assert_eq!(tokens[1], Token::text("1 < 2"));
}

#[test]
fn test_cdata_is_text() {
    let tokens = tokenize("<a><![CDATA[<raw> & stuff]]></a>");
    assert_eq!(
        tokens,
        vec![
            Token::start_tag("a", &[], false),
            Token::text("<raw> & stuff"),
            Token::end_tag("a"),
        ]
    );
}

#[test]
fn test_cdata_joins_adjacent_text() {
    let tokens = tokenize("<a>foo<![CDATA[bar]]>baz</a>");
    assert_eq!(
        tokens,
        vec![
            Token::start_tag("a", &[], false),
            Token::text("foobarbaz"),
            Token::end_tag("a"),
        ]
    );
}

#[test]
fn test_whitespace_cdata_is_text() {
    let tokens = tokenize("<a> <![CDATA[\t]]>\n</a>");
    assert_eq!(tokens[1], Token::text(" \t\n"));
    let tokens = tokenize("<a><![CDATA[]]></a>");
    assert_eq!(tokens.len(), 2);
}

// ========== declarations ==========

#[test]
fn test_xml_declaration() {
    let tokens = tokenize(r#"<?xml version="1.0" encoding="UTF-8"?><r/>"#);
    assert_eq!(
        tokens[0],
        Token::ProcessingInstruction {
            target: "xml".to_string(),
            data: r#"version="1.0" encoding="UTF-8""#.to_string(),
        }
    );
    assert_eq!(tokens[1], Token::start_tag("r", &[], true));
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- a <b> c --><r/>");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: " a <b> c ".to_string()
        }
    );
}

#[test]
fn test_doctype_with_internal_subset() {
    let tokens = tokenize(r#"<!DOCTYPE r [<!ENTITY e "v>">]><r/>"#);
    assert_eq!(
        tokens[0],
        Token::Doctype {
            data: r#"r [<!ENTITY e "v>">]"#.to_string()
        }
    );
    assert_eq!(tokens[1], Token::start_tag("r", &[], true));
}

#[test]
fn test_byte_order_mark_is_skipped() {
    let tokens = tokenize("\u{FEFF}<r/>");
    assert_eq!(tokens, vec![Token::start_tag("r", &[], true)]);
}

// ========== errors ==========

#[test]
fn test_unterminated_start_tag() {
    assert_eq!(
        tokenize_err("<r><a x=\"1\""),
        TokenizeError::UnexpectedEof {
            context: "start tag",
            position: 3,
        }
    );
}

#[test]
fn test_unterminated_attribute_value() {
    assert_eq!(
        tokenize_err("<a x=\"1"),
        TokenizeError::UnexpectedEof {
            context: "attribute value",
            position: 0,
        }
    );
}

#[test]
fn test_unterminated_comment() {
    assert_eq!(
        tokenize_err("<r><!-- never closed"),
        TokenizeError::UnexpectedEof {
            context: "comment",
            position: 3,
        }
    );
}

#[test]
fn test_unterminated_cdata() {
    assert!(matches!(
        tokenize_err("<r><![CDATA[x"),
        TokenizeError::UnexpectedEof {
            context: "CDATA section",
            ..
        }
    ));
}

// ========== pull interface ==========

#[test]
fn test_next_token_pulls_one_at_a_time() {
    let mut tokenizer = XmlTokenizer::new("<a>t</a>");
    assert_eq!(
        tokenizer.next_token(),
        Ok(Some(Token::start_tag("a", &[], false)))
    );
    assert_eq!(tokenizer.next_token(), Ok(Some(Token::text("t"))));
    assert_eq!(tokenizer.next_token(), Ok(Some(Token::end_tag("a"))));
    assert_eq!(tokenizer.next_token(), Ok(None));
    assert_eq!(tokenizer.next_token(), Ok(None));
}

#[test]
fn test_token_kind_names() {
    assert_eq!(TokenKind::StartTag.to_string(), "start-tag");
    let name: &str = TokenKind::ProcessingInstruction.as_ref();
    assert_eq!(name, "processing-instruction");
    assert_eq!(Token::end_tag("a").kind(), TokenKind::EndTag);
}
