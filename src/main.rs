//! Receipt Engine CLI
//!
//! Usage:
//!   receipt-engine [OPTIONS] <ELEMENTS> [DATA]
//!
//! Options:
//!   -c, --config <FILE>  Engine configuration (TOML)
//!   -s, --strict         Fail on layout errors instead of degrading
//!   -p, --positions      Print only resolved positions
//!   -l, --lint           Report malformed placeholders and exit
//!   -g, --grammar        Show placeholder and formatter reference
//!   -h, --help           Print help

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use receipt_engine::{
    bind_document, lint_placeholders, parse_elements, resolve_positions,
    resolve_positions_lenient, Element, EngineConfig,
};

#[derive(Parser)]
#[command(name = "receipt-engine")]
#[command(about = "Bind receipt templates to data and resolve their layout")]
struct Cli {
    /// Element document (JSON array, or object with an `elements` array)
    elements: Option<PathBuf>,

    /// Data file (JSON); `-` reads stdin
    data: Option<PathBuf>,

    /// Engine configuration (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fail on layout errors instead of keeping authored positions
    #[arg(short, long)]
    strict: bool,

    /// Print only resolved positions
    #[arg(short, long)]
    positions: bool,

    /// Report malformed placeholders and exit
    #[arg(short, long)]
    lint: bool,

    /// Show placeholder and formatter reference
    #[arg(short, long)]
    grammar: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // JSON lines when RUST_LOG_FORMAT=json
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn fail(message: String) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if cli.grammar {
        print_grammar();
        return;
    }

    let Some(elements_path) = &cli.elements else {
        print_intro();
        return;
    };

    let elements = match fs::read_to_string(elements_path) {
        Ok(source) => match parse_elements(&source) {
            Ok(elements) => elements,
            Err(e) => fail(format!(
                "Error parsing elements '{}': {}",
                elements_path.display(),
                e
            )),
        },
        Err(e) => fail(format!(
            "Error reading file '{}': {}",
            elements_path.display(),
            e
        )),
    };

    if cli.lint {
        std::process::exit(lint(&elements));
    }

    let mut config = match &cli.config {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => fail(format!("Error loading config '{}': {}", path.display(), e)),
        },
        None => EngineConfig::builtin(),
    };
    if cli.strict {
        config = config.with_strict_layout(true);
    }

    if cli.positions {
        print_positions(&elements, config.layout.strict);
        return;
    }

    let data = read_data(cli.data.as_deref());
    match bind_document(&elements, &data, &config) {
        Ok(document) => print_json(&document),
        Err(e) => fail(format!("Error: {}", e)),
    }
}

fn read_data(path: Option<&Path>) -> Value {
    let source = match path {
        Some(p) if p != Path::new("-") => match fs::read_to_string(p) {
            Ok(content) => content,
            Err(e) => fail(format!("Error reading file '{}': {}", p.display(), e)),
        },
        Some(_) => read_stdin(),
        None if !io::stdin().is_terminal() => read_stdin(),
        None => return Value::Null,
    };

    if source.trim().is_empty() {
        return Value::Null;
    }
    match serde_json::from_str(&source) {
        Ok(data) => data,
        Err(e) => fail(format!("Error parsing data: {}", e)),
    }
}

fn read_stdin() -> String {
    let mut buffer = String::new();
    match io::stdin().read_to_string(&mut buffer) {
        Ok(_) => buffer,
        Err(e) => fail(format!("Error reading from stdin: {}", e)),
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(format!("Error writing output: {}", e)),
    }
}

fn print_positions(elements: &[Element], strict: bool) {
    let positions = if strict {
        match resolve_positions(elements) {
            Ok(positions) => positions,
            Err(e) => fail(format!("Error: {}", e)),
        }
    } else {
        let resolution = resolve_positions_lenient(elements);
        for error in &resolution.errors {
            eprintln!("warning: {}", error);
        }
        resolution.positions
    };

    let sorted: BTreeMap<_, _> = positions.into_iter().collect();
    print_json(&sorted);
}

/// Print every malformed placeholder; returns the exit code
fn lint(elements: &[Element]) -> i32 {
    let mut problems = 0;
    for element in elements {
        for error in lint_placeholders(&element.content) {
            eprint!("{}", error.format(&element.content, &element.id));
            problems += 1;
        }
    }

    if problems == 0 {
        println!("No placeholder problems found.");
        0
    } else {
        eprintln!("{} malformed placeholder(s)", problems);
        1
    }
}

fn print_intro() {
    println!(
        r#"Receipt Engine - bind receipt templates to data

USAGE:
    receipt-engine [OPTIONS] <ELEMENTS> [DATA]
    cat venta.json | receipt-engine ticket.json

OPTIONS:
    -c, --config      Engine configuration (TOML file)
    -s, --strict      Fail on layout errors
    -p, --positions   Print only resolved positions
    -l, --lint        Report malformed placeholders
    -g, --grammar     Show placeholder and formatter reference
    -h, --help        Print help

Run --grammar for the placeholder syntax."#
    );
}

fn print_grammar() {
    println!(
        r#"PLACEHOLDER REFERENCE
=====================

PLACEHOLDERS
  {{{{path}}}}                      Value at a dotted path: {{{{venta.total}}}}
  {{{{path|formatter}}}}            Piped through a formatter
  {{{{array;result;prop=literal}}}} First array item whose prop equals literal
  {{{{array;result;prop:literal}}}} Same, with ':' as the comparison

  Numeric segments index arrays: {{{{items.0.name}}}}
  Missing values and null resolve to an empty string.
  Malformed placeholders are left as written (see --lint).

FORMATTERS
  uppercase  lowercase  capitalize
  number                  grouped, up to 3 decimals
  number:N                exactly N decimals
  currency                MXN, same as currency:mxn
  currency:usd|mxn|eur    $1,234.50 / €1,234.50
  percentage[:N]          16 -> 16%
  date[:pattern]          default DD/MM/YYYY
  datetime[:pattern]      default DD/MM/YYYY HH:mm
  truncate:N              first N characters + "..."

  Date pattern tokens: yyyy yy mm dd hh ss (mm after hh: is minutes)

FORMULAS
  Formula elements run JavaScript function bodies with `data` in scope:
    return data.venta.total * 1.16
  outputFormat: text | number | boolean | json
  errorHandling: show-error | hide-error | show-default"#
    );
}
