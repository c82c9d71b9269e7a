//! Wren CLI
//!
//! Parse an XML document and inspect the resulting tree.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use wren_common::debug::{self, DebugFlags};
use wren_common::warning::warn_once;
use wren_dom::{NodeId, XmlTree};
use wren_xml::{ParseIssue, XmlParser, XmlTokenizer, print_tree};

/// Wren: streaming XML-to-tree parser with name-indexed lookup
#[derive(Parser, Debug)]
#[command(name = "wren")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the tree of a file
    wren feed.xml

    # Parse inline XML
    wren --xml '<a><b x="1"/><b x="2"/></a>'

    # Find the shallowest <title> and print its text
    wren --find title feed.xml

    # Print an attribute of the found node
    wren --find link --attr href feed.xml

    # Dump the tree as JSON
    wren --json feed.xml

    # Fail on malformed nesting instead of recovering
    wren --strict feed.xml
"#)]
struct Cli {
    /// Path to an XML file
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse an XML string directly instead of a file
    #[arg(long, value_name = "XML", conflicts_with = "path")]
    xml: Option<String>,

    /// Search for the shallowest element with this tag name
    #[arg(long, value_name = "TAG")]
    find: Option<String>,

    /// With --find, print this attribute of the found element
    #[arg(long, value_name = "NAME", requires = "find")]
    attr: Option<String>,

    /// Print the tree (or the found subtree) as JSON
    #[arg(long)]
    json: bool,

    /// Treat extra roots, stray end tags and unclosed elements as errors
    #[arg(long)]
    strict: bool,

    /// List the problems recovered while parsing
    #[arg(long)]
    issues: bool,

    /// Debug channels to enable (comma-separated, e.g. "xml-parser" or "all")
    #[arg(long, value_name = "CHANNELS")]
    debug: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref channels) = cli.debug
        && !debug::init(DebugFlags::from_spec(channels))
    {
        warn_once("CLI", "debug channels were already configured");
    }

    let buffer = load_input(&cli)?;
    let mut parser = XmlParser::new(XmlTokenizer::new(&buffer));
    if cli.strict {
        parser = parser.with_strict_mode();
    }
    let (tree, issues) = parser.run_with_issues().context("Failed to parse XML")?;

    let target = match cli.find {
        Some(ref tag) => match tree.find(tree.root(), tag) {
            Some(id) => id,
            None => bail!("No <{tag}> element below the root"),
        },
        None => tree.root(),
    };

    if let Some(ref name) = cli.attr {
        match tree.get_attr(target, name) {
            Some(value) => println!("{value}"),
            None => bail!("Element has no attribute {name:?}"),
        }
    } else if cli.json {
        print_json(&tree, target)?;
    } else if cli.find.is_some() {
        print_found(&tree, target);
    } else {
        println!("{}", "=== Tree ===".bold());
        print_tree(&tree, target, 0);
    }

    if cli.issues {
        print_issues(&issues);
    }

    Ok(())
}

/// Read the document from `--xml` or the file argument.
fn load_input(cli: &Cli) -> Result<String> {
    if let Some(ref xml) = cli.xml {
        Ok(xml.clone())
    } else if let Some(ref path) = cli.path {
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        String::from_utf8(bytes).with_context(|| format!("{} is not UTF-8", path.display()))
    } else {
        bail!("Expected a FILE argument or --xml")
    }
}

fn print_json(tree: &XmlTree, id: NodeId) -> Result<()> {
    let snapshot = tree
        .snapshot(id)
        .context("Selected node is not part of the tree")?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Print the found element's text, or its outline when it has none.
fn print_found(tree: &XmlTree, id: NodeId) {
    match tree.content(id) {
        Some(text) => println!("{text}"),
        None => print_tree(tree, id, 0),
    }
}

fn print_issues(issues: &[ParseIssue]) {
    println!("\n{}", "=== Parse Issues ===".bold());
    if issues.is_empty() {
        println!("  (none)");
    }
    for issue in issues {
        println!("  - {}", issue.yellow());
    }
}
