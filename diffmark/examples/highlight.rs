//! Example: Highlight a diff list against two documents
//!
//! This example reads an expected and an actual document plus a JSON array
//! of diff messages, and prints both highlighted sides as HTML.
//!
//! Usage: cargo run --example highlight <format> <expected> <actual> <diffs.json>

use std::collections::HashMap;
use std::env;
use std::fs;

use diffmark::{highlight, DiffMessage, Format};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 5 {
        eprintln!(
            "Usage: {} <xml|json|table|text|full-text> <expected> <actual> <diffs.json>",
            args[0]
        );
        std::process::exit(1);
    }

    let format: Format = args[1].parse()?;
    let expected = fs::read_to_string(&args[2])?;
    let actual = fs::read_to_string(&args[3])?;
    let diffs: Vec<DiffMessage> = serde_json::from_str(&fs::read_to_string(&args[4])?)?;

    eprintln!("Highlighting {} diff(s) as {}...", diffs.len(), format);
    let out = highlight(format, &diffs, &expected, &actual, &HashMap::new())?;

    println!("<!-- expected -->");
    println!("{}", out.er.to_html());
    println!("<!-- actual -->");
    println!("{}", out.ar.to_html());
    if let Some(combined) = out.combined {
        println!("<!-- combined -->");
        println!("{combined}");
    }

    Ok(())
}
