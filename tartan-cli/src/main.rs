//! Tartan CLI
//!
//! Styles a document described as JSON with one or more JSON style sheets and
//! prints the resolved properties of every element.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;
use serde::Serialize;
use tartan_common::warning::set_warnings_enabled;
use tartan_css::cascade::style_attributes;
use tartan_css::{
    Analyzer, ElementStyle, MediaSpec, NodeData, PropertyCatalog, StandardElementMatcher,
    StyleConfig, StyleSheet, parse_selector,
};
use tartan_dom::{DomTree, NodeId, NodeSpec};

/// How element names, classes and IDs are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// HTML document in no-quirks mode
    Html,
    /// HTML document in quirks mode (case-insensitive classes and IDs)
    Quirks,
    /// XML document (everything case-sensitive)
    Xml,
}

/// Tartan: resolve CSS cascades for a document
#[derive(Parser, Debug)]
#[command(name = "tartan")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Style a document with one author sheet
    tartan page.json -s site.json

    # Agent, user and author sheets, in cascade order
    tartan page.json -s agent.json -s user.json -s site.json

    # Print media on a narrow viewport, only paragraphs
    tartan page.json -s site.json --media print --width 400 --select 'p'

    # Machine-readable output with every catalog property
    tartan page.json -s site.json --json --all
"#)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Document tree as JSON (`{"tag": ..., "attrs": {...}, "children": [...]}`)
    #[arg(value_name = "DOCUMENT")]
    document: PathBuf,

    /// Style sheet as JSON; repeat for several sheets, in order of appearance
    #[arg(short = 's', long = "sheet", value_name = "FILE")]
    sheets: Vec<PathBuf>,

    /// Media type to evaluate `@media` rules against
    #[arg(long, default_value = "screen")]
    media: String,

    /// Viewport width in px
    #[arg(long, default_value = "1100")]
    width: f32,

    /// Viewport height in px
    #[arg(long, default_value = "850")]
    height: f32,

    /// Device width in px
    #[arg(long, default_value = "1920")]
    device_width: f32,

    /// Device height in px
    #[arg(long, default_value = "1200")]
    device_height: f32,

    /// Device resolution in dpi
    #[arg(long, default_value = "96")]
    resolution: f32,

    /// Matching rules for names, classes and IDs
    #[arg(long, value_enum, default_value_t = Mode::Html)]
    mode: Mode,

    /// Do not inherit values from parent elements
    #[arg(long)]
    no_inherit: bool,

    /// Ignore `style` attributes
    #[arg(long)]
    no_inline: bool,

    /// Only report elements matching this selector
    #[arg(long, value_name = "SELECTOR")]
    select: Option<String>,

    /// Report every catalog property, not just declared and inherited ones
    #[arg(short, long)]
    all: bool,

    /// Show the winning declaration and its cascade priority
    #[arg(short, long)]
    verbose: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Suppress warnings about dropped values
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    set_warnings_enabled(!cli.quiet);

    let tree = load_document(&cli.document)?;
    let sheets = cli
        .sheets
        .iter()
        .map(|path| load_sheet(path))
        .collect::<Result<Vec<_>>>()?;
    let config = build_config(&cli)?;
    let media = MediaSpec::new(&cli.media)
        .with_dimensions(cli.width, cli.height)
        .with_device_dimensions(cli.device_width, cli.device_height)
        .with_resolution(cli.resolution);

    let analyzer = Analyzer::new(&config, &sheets);
    let styles = if cli.no_inline {
        analyzer.evaluate(&tree, &media)
    } else {
        analyzer.evaluate_with_inline(&tree, &media, style_attributes(&tree))
    }
    .context("cannot style document")?;

    let filter = cli
        .select
        .as_deref()
        .map(parse_selector)
        .transpose()
        .context("invalid --select selector")?;
    let selected: Vec<(NodeId, &ElementStyle)> = styles
        .iter()
        .filter(|&(node, _)| {
            filter.as_ref().is_none_or(|selector| {
                selector.matches(&tree, node, config.element_matcher(), config.match_condition())
            })
        })
        .collect();

    if cli.json {
        print_json(&tree, &selected, cli.all)?;
    } else {
        print_styles(&tree, &selected, cli.all, cli.verbose);
    }
    Ok(())
}

fn load_document(path: &Path) -> Result<DomTree> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read document {}", path.display()))?;
    let spec: NodeSpec = serde_json::from_str(&text)
        .with_context(|| format!("invalid document JSON in {}", path.display()))?;
    Ok(DomTree::from_spec(&spec))
}

fn load_sheet(path: &Path) -> Result<StyleSheet> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read style sheet {}", path.display()))?;
    let mut sheet: StyleSheet = serde_json::from_str(&text)
        .with_context(|| format!("invalid style sheet JSON in {}", path.display()))?;
    if sheet.url.is_none() {
        sheet.url = Some(path.display().to_string());
    }
    Ok(sheet)
}

fn build_config(cli: &Cli) -> Result<StyleConfig> {
    let matcher = match cli.mode {
        Mode::Html => StandardElementMatcher::html(),
        Mode::Quirks => StandardElementMatcher::quirks(),
        Mode::Xml => StandardElementMatcher::xml(),
    };
    StyleConfig::builder()
        .element_matcher(matcher)
        .catalog(PropertyCatalog::builtin())
        .inherit(!cli.no_inherit)
        .build()
        .context("incomplete style configuration")
}

/// Property names to report for one style, sorted.
fn reported_names(data: &NodeData, all: bool) -> Vec<&str> {
    let mut names: Vec<&str> = data.property_names().collect();
    if all {
        names.extend(data.catalog().iter().map(|info| info.name.as_str()));
        names.sort_unstable();
        names.dedup();
    }
    names
}

fn print_styles(tree: &DomTree, selected: &[(NodeId, &ElementStyle)], all: bool, verbose: bool) {
    println!("=== Styles ({} elements) ===", selected.len());
    for (node, style) in selected {
        println!("\n{}", tree.path(*node).bold().cyan());
        print_node_data(&style.base, all, verbose, "  ");
        for (pseudo, data) in &style.pseudo {
            println!("  {}", format!("::{pseudo}").magenta());
            print_node_data(data, all, verbose, "    ");
        }
    }
}

fn print_node_data(data: &NodeData, all: bool, verbose: bool, indent: &str) {
    for name in reported_names(data, all) {
        let value = data.as_string(name, true).unwrap_or_default();
        let note = if data.is_inherited(name) {
            " (inherited)"
        } else if data.specified_value(name).is_none() {
            " (initial)"
        } else {
            ""
        };
        println!("{indent}{}: {value}{}", name.green(), note.dimmed());
        if verbose {
            if let Some(priority) = data.priority(name) {
                println!("{indent}  {}", priority.dimmed());
            }
            if let Some(source) = data.source_declaration(name, true) {
                let location = source
                    .location
                    .as_ref()
                    .map(|location| format!(" at {location}"))
                    .unwrap_or_default();
                println!("{indent}  {}", format!("from `{source}`{location}").dimmed());
            }
        }
    }
}

#[derive(Serialize)]
struct ElementReport<'a> {
    node: NodeId,
    path: String,
    properties: BTreeMap<&'a str, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pseudo_elements: BTreeMap<String, BTreeMap<&'a str, String>>,
}

fn property_map(data: &NodeData, all: bool) -> BTreeMap<&str, String> {
    reported_names(data, all)
        .into_iter()
        .filter_map(|name| data.as_string(name, true).map(|value| (name, value)))
        .collect()
}

fn print_json(tree: &DomTree, selected: &[(NodeId, &ElementStyle)], all: bool) -> Result<()> {
    let reports: Vec<ElementReport<'_>> = selected
        .iter()
        .map(|(node, style)| ElementReport {
            node: *node,
            path: tree.path(*node),
            properties: property_map(&style.base, all),
            pseudo_elements: style
                .pseudo
                .iter()
                .map(|(pseudo, data)| (pseudo.to_string(), property_map(data, all)))
                .collect(),
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&reports).context("cannot serialize styles")?
    );
    Ok(())
}
