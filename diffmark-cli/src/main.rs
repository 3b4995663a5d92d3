//! diffmark command-line front end
//!
//! Reads documents and diff lists from files and prints the highlighted
//! rendering, or reports how the node matcher pairs two XML documents.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};

use clap::{Parser, Subcommand};
use diffmark::{
    highlight, parse_str, DiffMessage, Format, KeyRules, NodeId, NodeMatcher, XmlDocument,
};
use log::info;

/// Side-by-side difference highlighting
#[derive(Parser)]
#[command(name = "diffmark")]
#[command(version)]
#[command(about = "Side-by-side difference highlighting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a diff list against the expected and actual documents
    #[command(visible_alias = "h")]
    Highlight {
        /// Document format: xml, json, table, text or full-text
        format: String,
        /// Expected document
        expected: String,
        /// Actual document
        actual: String,
        /// JSON array of diff messages
        diffs: String,

        /// JSON object of rule lists, keyed by rule name
        #[arg(short, long)]
        rules: Option<String>,

        /// Print HTML instead of JSON
        #[arg(long)]
        html: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Pair the elements of two XML documents
    #[command(visible_alias = "m")]
    Match {
        /// Control (expected) document
        control: String,
        /// Test (actual) document
        test: String,

        /// JSON object of key rules, keyed by tag name
        #[arg(short, long)]
        keys: Option<String>,
    },
}

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

fn main() -> std::process::ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Highlight {
            format,
            expected,
            actual,
            diffs,
            rules,
            html,
            output,
        } => run_highlight(
            &format,
            &expected,
            &actual,
            &diffs,
            rules.as_deref(),
            html,
            output.as_deref(),
        ),
        Commands::Match { control, test, keys } => run_match(&control, &test, keys.as_deref()),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

/// Reads an optional `map<string, [string]>` file.
fn read_rule_map(path: Option<&str>) -> CliResult<HashMap<String, Vec<String>>> {
    match path {
        Some(path) => Ok(serde_json::from_str(&fs::read_to_string(path)?)?),
        None => Ok(HashMap::new()),
    }
}

fn run_highlight(
    format: &str,
    expected_path: &str,
    actual_path: &str,
    diffs_path: &str,
    rules_path: Option<&str>,
    html: bool,
    output_path: Option<&str>,
) -> CliResult {
    let format: Format = format.parse()?;
    let expected = fs::read_to_string(expected_path)?;
    let actual = fs::read_to_string(actual_path)?;
    let diffs: Vec<DiffMessage> = serde_json::from_str(&fs::read_to_string(diffs_path)?)?;
    let rules = read_rule_map(rules_path)?;

    info!("highlighting {} diff(s) as {format}", diffs.len());
    let out = highlight(format, &diffs, &expected, &actual, &rules)?;

    let mut output: Box<dyn Write> = match output_path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };
    if html {
        writeln!(output, "<div class=\"er\">\n{}\n</div>", out.er.to_html())?;
        writeln!(output, "<div class=\"ar\">\n{}\n</div>", out.ar.to_html())?;
        if let Some(combined) = &out.combined {
            writeln!(output, "<div class=\"combined\">\n{combined}\n</div>")?;
        }
    } else {
        serde_json::to_writer_pretty(&mut output, &out)?;
        writeln!(output)?;
    }
    output.flush()?;
    Ok(())
}

fn run_match(control_path: &str, test_path: &str, keys_path: Option<&str>) -> CliResult {
    let control = parse_str(&fs::read_to_string(control_path)?)?;
    let test = parse_str(&fs::read_to_string(test_path)?)?;
    let matcher = NodeMatcher::with_key_rules(KeyRules::from_map(&read_rule_map(keys_path)?)?);

    let mut out = io::stdout().lock();
    print_matches(&matcher, &control, control.root(), &test, test.root(), &mut out)?;
    Ok(())
}

/// Prints matched and unmatched children of two corresponding nodes,
/// descending into matched elements.
fn print_matches(
    matcher: &NodeMatcher,
    control: &XmlDocument,
    control_parent: NodeId,
    test: &XmlDocument,
    test_parent: NodeId,
    out: &mut impl Write,
) -> io::Result<()> {
    let pairs = matcher.match_children(control, control_parent, test, test_parent);

    for c in control.significant_children(control_parent) {
        if !pairs.iter().any(|(pc, _)| *pc == c) {
            writeln!(out, "{}\t-", control.xpath_of(c))?;
        }
    }
    for t in test.significant_children(test_parent) {
        if !pairs.iter().any(|(_, pt)| *pt == t) {
            writeln!(out, "-\t{}", test.xpath_of(t))?;
        }
    }
    for (c, t) in pairs {
        writeln!(out, "{}\t{}", control.xpath_of(c), test.xpath_of(t))?;
        if control.element(c).is_some() && test.element(t).is_some() {
            print_matches(matcher, control, c, test, t, out)?;
        }
    }
    Ok(())
}
