//! Command-line interface (CLI) for tagcalc
//!
//! Replays keystrokes through a [`FormulaSession`] and prints the committed
//! tags, the parsed expression, and the result. Variables are resolved
//! against a symbol catalog loaded with [`parse_catalog`]; without
//! `--catalog` a small built-in catalog is used.
//!
//! Set `RUST_LOG=trace` to watch the tokenizer rules and parser reductions.

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use smartstring::alias::String;
use tagcalc::{FormulaSession, SymTab, parse, parse_catalog};

const DEMO_CATALOG: &str = "\
# name,category,value
revenue,Finance,1200
cost,Finance,700
tax_rate,Finance / Policy,0.2
headcount,HR,12
hours,Timesheet,37.5
";

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Symbol catalog file (`name,category,value` per line)
    #[arg(short, long)]
    catalog: Option<String>,

    /// Command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Types a formula key by key and evaluates it
    Eval {
        /// Keystrokes; whitespace commits a pending variable name
        keys: Option<String>,
        /// Input file with one formula per line
        #[arg(short, long, conflicts_with = "keys")]
        input: Option<String>,
    },
    /// Lists catalog entries matching a query
    Search {
        /// Case-insensitive substring of a name or category
        query: String,
    },
}

fn load_catalog(path: Option<&str>) -> Result<SymTab> {
    let text = match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("can't open {:?}", path))?
        }
        None => DEMO_CATALOG.to_owned(),
    };
    Ok(parse_catalog(&text)?)
}

fn run_formula(symtab: &SymTab, keys: &str) -> Result<()> {
    let mut session = FormulaSession::new();
    session.type_keys(keys)?;

    for tok in session.tokens() {
        println!(
            "{:>6} {:<8} {}",
            tok.id().to_string(),
            tok.kind().to_string(),
            tok.text()
        );
    }
    match parse(session.tokens().as_slice()) {
        Ok(expr) => println!("expr: {}", expr),
        Err(e) => log::debug!("no expression: {}", e),
    }
    match session.evaluate(symtab) {
        Ok(value) => println!("= {}", value),
        Err(e) => println!("error: {}", e),
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let symtab = load_catalog(args.catalog.as_deref())?;
    log::info!("catalog has {} symbols", symtab.len());

    match args.command {
        Commands::Eval { keys, input } => {
            if let Some(path) = input {
                let text = std::fs::read_to_string(path.as_str())
                    .with_context(|| format!("can't open {:?}", path))?;
                for line in text.lines().filter(|l| !l.trim().is_empty()) {
                    println!("{}", line);
                    run_formula(&symtab, line)?;
                }
            } else if let Some(keys) = keys {
                run_formula(&symtab, &keys)?;
            } else {
                anyhow::bail!("nothing to evaluate: pass keys or --input");
            }
        }
        Commands::Search { query } => {
            for entry in symtab.search(&query) {
                println!(
                    "{:<16} {:<20} {}",
                    entry.name(),
                    entry.category(),
                    entry.value()
                );
            }
        }
    }

    Ok(())
}
