//! Integration tests for the XML tree builder.

use wren_dom::{NodeId, XmlTree};
use wren_xml::{
    ParseError, ParseIssue, Token, TokenizeError, XmlParser, XmlTokenizer, parse, parse_str,
};

/// Helper to parse a document that is expected to succeed
fn parse_ok(xml: &str) -> XmlTree {
    parse_str(xml).expect("parse failed")
}

/// Helper to parse leniently and return the recovered issues as well
fn parse_with_issues(xml: &str) -> (XmlTree, Vec<ParseIssue>) {
    XmlParser::new(XmlTokenizer::new(xml))
        .run_with_issues()
        .expect("parse failed")
}

/// Helper to parse in strict mode
fn parse_strict(xml: &str) -> Result<XmlTree, ParseError> {
    XmlParser::new(XmlTokenizer::new(xml))
        .with_strict_mode()
        .run()
}

/// Helper to collect one attribute across a same-name chain
fn chain_attrs(tree: &XmlTree, parent: NodeId, tag: &str, attr: &str) -> Vec<String> {
    tree.children_named(parent, tag)
        .filter_map(|id| tree.get_attr(id, attr))
        .map(str::to_string)
        .collect()
}

// ========== structure ==========

#[test]
fn test_sibling_chain_in_document_order() {
    let tree = parse_ok(r#"<a><b x="1"/><b x="2"/><c/></a>"#);
    let root = tree.root();

    assert_eq!(tree.name_of(root), Some("a"));
    assert_eq!(tree.len(), 4);
    assert_eq!(chain_attrs(&tree, root, "b", "x"), vec!["1", "2"]);

    let first_b = tree.child(root, "b").expect("no <b>");
    let second_b = tree.next_sibling(first_b).expect("no second <b>");
    assert_eq!(tree.next_sibling(second_b), None);
    assert_eq!(tree.content(first_b), None);

    let c = tree.child(root, "c").expect("no <c>");
    assert_eq!(tree.next_sibling(c), None);
    assert_eq!(tree.child_names(root).collect::<Vec<_>>(), vec!["b", "c"]);
}

#[test]
fn test_interleaved_names_keep_separate_chains() {
    let tree = parse_ok(
        r#"<feed><entry n="1"/><title/><entry n="2"/><link/><entry n="3"/></feed>"#,
    );
    let root = tree.root();
    assert_eq!(chain_attrs(&tree, root, "entry", "n"), vec!["1", "2", "3"]);
    assert_eq!(tree.children_named(root, "title").count(), 1);
    assert_eq!(
        tree.child_names(root).collect::<Vec<_>>(),
        vec!["entry", "title", "link"]
    );
}

#[test]
fn test_nested_chains_are_repaired_per_parent() {
    let tree = parse_ok(
        r#"<r><g><i v="1"/><i v="2"/></g><g><i v="3"/><i v="4"/><i v="5"/></g></r>"#,
    );
    let groups: Vec<NodeId> = tree.children_named(tree.root(), "g").collect();
    assert_eq!(groups.len(), 2);
    assert_eq!(chain_attrs(&tree, groups[0], "i", "v"), vec!["1", "2"]);
    assert_eq!(chain_attrs(&tree, groups[1], "i", "v"), vec!["3", "4", "5"]);
    for &g in &groups {
        assert_eq!(tree.parent(g), Some(tree.root()));
    }
}

#[test]
fn test_root_only_document() {
    let tree = parse_ok("<root/>");
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.name_of(NodeId::ROOT), Some("root"));
    assert_eq!(tree.children(NodeId::ROOT).count(), 0);
}

// ========== text ==========

#[test]
fn test_text_content() {
    let tree = parse_ok("<a>hello</a>");
    assert_eq!(tree.content(tree.root()), Some("hello"));
}

#[test]
fn test_later_text_overwrites_earlier() {
    let tree = parse_ok("<a>one<b/>two</a>");
    assert_eq!(tree.content(tree.root()), Some("two"));
}

#[test]
fn test_whitespace_does_not_overwrite_content() {
    let tree = parse_ok("<a>text<b/>\n  </a>");
    assert_eq!(tree.content(tree.root()), Some("text"));
}

#[test]
fn test_whitespace_only_element_has_no_content() {
    let tree = parse_ok("<a>\n\t </a>");
    assert_eq!(tree.content(tree.root()), None);
}

#[test]
fn test_text_after_self_closing_child_belongs_to_parent() {
    let tree = parse_ok("<a><b/>stray</a>");
    let b = tree.child(tree.root(), "b").expect("no <b>");
    assert_eq!(tree.content(b), None);
    assert_eq!(tree.content(tree.root()), Some("stray"));
}

#[test]
fn test_entities_are_decoded() {
    let tree = parse_ok(r#"<a t="&lt;&amp;">&#65;&#x42;&gt;</a>"#);
    assert_eq!(tree.get_attr(tree.root(), "t"), Some("<&"));
    assert_eq!(tree.content(tree.root()), Some("AB>"));
}

#[test]
fn test_attribute_values_are_kept_exactly() {
    let tree = parse_ok(r#"<a  z=" spaced  out " y="" x='it"s' w="ünï"/>"#);
    let root = tree.root();
    assert_eq!(tree.get_attr(root, "z"), Some(" spaced  out "));
    assert_eq!(tree.get_attr(root, "y"), Some(""));
    assert_eq!(tree.get_attr(root, "x"), Some("it\"s"));
    assert_eq!(tree.get_attr(root, "w"), Some("ünï"));
    assert_eq!(tree.get_attr(root, "missing"), None);
    assert_eq!(tree.get(root).map(|n| n.attrs.len()), Some(4));
}

#[test]
fn test_cdata_becomes_content() {
    let tree = parse_ok("<a><![CDATA[<raw>]]></a>");
    assert_eq!(tree.content(tree.root()), Some("<raw>"));
}

#[test]
fn test_cdata_merges_with_surrounding_text() {
    let tree = parse_ok("<a>foo<![CDATA[bar]]>baz</a>");
    assert_eq!(tree.content(tree.root()), Some("foobarbaz"));
}

#[test]
fn test_whitespace_cdata_is_content() {
    let tree = parse_ok("<a>text<b/><![CDATA[  ]]></a>");
    assert_eq!(tree.content(tree.root()), Some("  "));
}

// ========== ignored tokens ==========

#[test]
fn test_prolog_and_comments_are_ignored() {
    let tree = parse_ok(
        "<?xml version=\"1.0\"?>\n<!DOCTYPE a>\n<!-- lead -->\n<a><!-- inner --><?pi x?></a>\n<!-- tail -->\n",
    );
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.name_of(tree.root()), Some("a"));
    assert_eq!(tree.content(tree.root()), None);
}

// ========== find ==========

#[test]
fn test_find_prefers_shallowest_match() {
    let tree = parse_ok(r#"<r><x><t id="deep"/></x><t id="shallow"/></r>"#);
    let found = tree.find(tree.root(), "t").expect("no <t>");
    assert_eq!(tree.get_attr(found, "id"), Some("shallow"));
}

#[test]
fn test_find_under_later_sibling() {
    let tree = parse_ok(r#"<r><s/><s><t id="hit"/></s></r>"#);
    let found = tree.find(tree.root(), "t").expect("no <t>");
    assert_eq!(tree.get_attr(found, "id"), Some("hit"));
    assert_eq!(tree.depth(found), 2);
}

#[test]
fn test_find_missing_tag() {
    let tree = parse_ok("<r><s/></r>");
    assert_eq!(tree.find(tree.root(), "nope"), None);
    assert_eq!(tree.find(tree.root(), "r"), None);
}

// ========== byte input ==========

#[test]
fn test_parse_bytes_with_bom() {
    let tree = parse(b"\xEF\xBB\xBF<a>x</a>").expect("parse failed");
    assert_eq!(tree.content(tree.root()), Some("x"));
}

#[test]
fn test_parse_rejects_invalid_utf8() {
    assert_eq!(
        parse(&[b'<', b'a', 0xFF, b'>']),
        Err(ParseError::Tokenize(TokenizeError::InvalidUtf8 { position: 2 }))
    );
}

// ========== errors ==========

#[test]
fn test_empty_input_has_no_root() {
    assert_eq!(parse_str(""), Err(ParseError::NoRootElement));
    assert_eq!(parse_str("  <!-- only a comment -->  "), Err(ParseError::NoRootElement));
}

#[test]
fn test_unterminated_markup_is_an_error() {
    assert_eq!(
        parse_str("<a><b"),
        Err(ParseError::Tokenize(TokenizeError::UnexpectedEof {
            context: "start tag",
            position: 3,
        }))
    );
}

// ========== recovery policies ==========

#[test]
fn test_extra_roots_are_skipped() {
    let (tree, issues) = parse_with_issues("<a/><b><c/><c></c></b><d/>");
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.name_of(tree.root()), Some("a"));
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].token_index, 1);
    assert!(issues[0].message.contains("<b>"));
    assert!(issues[1].message.contains("<d>"));
}

#[test]
fn test_unclosed_extra_root_is_reported() {
    let (tree, issues) = parse_with_issues("<a/><b><c>");
    assert_eq!(tree.len(), 1);
    assert_eq!(issues.len(), 2);
    assert!(issues[0].message.contains("<b>"));
    assert!(issues[1].message.contains("left unclosed"));
}

#[test]
fn test_second_root_with_same_name_is_skipped() {
    let (tree, issues) = parse_with_issues("<a><b/></a><a><c/></a>");
    assert_eq!(tree.len(), 2);
    assert!(tree.child(tree.root(), "b").is_some());
    assert_eq!(tree.find(tree.root(), "c"), None);
    assert_eq!(issues.len(), 1);
}

#[test]
fn test_extra_roots_fail_in_strict_mode() {
    assert_eq!(
        parse_strict("<a/><b/>"),
        Err(ParseError::MultipleRoots {
            name: "b".to_string(),
            token_index: 1,
        })
    );
}

#[test]
fn test_orphan_end_tag() {
    let (tree, issues) = parse_with_issues("<a/></b>");
    assert_eq!(tree.len(), 1);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].token_index, 1);

    assert_eq!(
        parse_strict("<a/></b>"),
        Err(ParseError::UnexpectedEndTag {
            name: "b".to_string(),
            token_index: 1,
        })
    );
}

#[test]
fn test_mismatched_end_tag() {
    let (tree, issues) = parse_with_issues("<a><b></c></a>");
    assert!(issues.is_empty());
    assert!(tree.child(tree.root(), "b").is_some());

    assert_eq!(
        parse_strict("<a><b></c></a>"),
        Err(ParseError::MismatchedEndTag {
            expected: "b".to_string(),
            found: "c".to_string(),
            token_index: 2,
        })
    );
}

#[test]
fn test_unclosed_elements_are_closed_at_end() {
    let (tree, issues) = parse_with_issues(r#"<a><b n="1"/><b n="2"/><c><d n="3"/><d n="4"/>"#);
    assert_eq!(chain_attrs(&tree, tree.root(), "b", "n"), vec!["1", "2"]);
    let c = tree.child(tree.root(), "c").expect("no <c>");
    assert_eq!(chain_attrs(&tree, c, "d", "n"), vec!["3", "4"]);
    assert_eq!(issues.len(), 2);
    assert!(issues[0].message.contains("<c>"));
    assert!(issues[1].message.contains("<a>"));

    assert_eq!(
        parse_strict("<a><b/><c>"),
        Err(ParseError::UnclosedElements {
            names: vec!["a".to_string(), "c".to_string()],
        })
    );
}

#[test]
fn test_text_outside_root() {
    let (tree, issues) = parse_with_issues("<a/>junk");
    assert_eq!(tree.content(tree.root()), None);
    assert_eq!(issues.len(), 1);

    assert_eq!(
        parse_strict("<a/>junk"),
        Err(ParseError::TextOutsideRoot { token_index: 1 })
    );
    assert!(parse_strict("\n<a/>\n").is_ok());
}

#[test]
fn test_well_formed_document_has_no_issues() {
    let (_, issues) = parse_with_issues("<a><b>x</b><b/></a>");
    assert!(issues.is_empty());
    assert!(parse_strict("<a><b>x</b><b/></a>").is_ok());
}

// ========== scripted token streams ==========

#[test]
fn test_builder_over_scripted_tokens() {
    let tokens = vec![
        Token::start_tag("a", &[("k", "v")], false),
        Token::start_tag("b", &[], true),
        Token::text("hi"),
        Token::start_tag("b", &[], false),
        Token::end_tag("b"),
        Token::end_tag("a"),
    ];
    let tree = XmlParser::new(tokens.into_iter()).run().expect("parse failed");
    let root = tree.root();

    assert_eq!(tree.get_attr(root, "k"), Some("v"));
    assert_eq!(tree.content(root), Some("hi"));
    assert_eq!(tree.children_named(root, "b").count(), 2);
}

#[test]
fn test_empty_token_stream() {
    let tokens: Vec<Token> = Vec::new();
    assert_eq!(
        XmlParser::new(tokens.into_iter()).run(),
        Err(ParseError::NoRootElement)
    );
}

#[test]
fn test_parse_is_idempotent() {
    let xml = r#"<r a="1"><x>t</x><y/><x><z q="2"/></x><y>u</y></r>"#;
    assert_eq!(parse_ok(xml), parse_ok(xml));
}

#[test]
fn test_issue_display() {
    let issue = ParseIssue {
        message: "ignored text outside the root element".to_string(),
        token_index: 4,
    };
    assert_eq!(
        issue.to_string(),
        "token 4: ignored text outside the root element"
    );
}
