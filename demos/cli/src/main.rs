use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use complaint_core::{ParseOptions, ParseResult};
use complaint_parser::parse;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "complaint-cli",
    about = "Extract symptom and duration from free-text chief complaints."
)]
struct Args {
    /// Complaint text. Reads one complaint per line from stdin when omitted.
    text: Option<String>,

    /// JSON file with `synonyms` and `knownSymptoms`. May be repeated.
    #[arg(short, long)]
    dictionary: Vec<PathBuf>,

    /// Print one JSON object per line instead of pretty output.
    #[arg(long)]
    compact: bool,

    /// Include an onset date estimated from the duration.
    #[arg(long)]
    onset: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn load_options(paths: &[PathBuf]) -> anyhow::Result<ParseOptions> {
    let mut options = ParseOptions::default();
    for path in paths {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read dictionary {:?}", path))?;
        let loaded = ParseOptions::from_json_str(&data)
            .with_context(|| format!("Invalid dictionary {:?}", path))?;
        options.merge(loaded);
    }
    tracing::debug!(
        synonyms = options.synonyms.len(),
        symptoms = options.known_symptoms.len(),
        "dictionary loaded"
    );
    Ok(options)
}

fn render(result: &ParseResult, args: &Args) -> anyhow::Result<String> {
    if !result.is_complete() {
        tracing::info!(
            reason = ?result.failure_reason,
            confidence = result.confidence,
            "incomplete parse"
        );
    }

    let mut value = serde_json::to_value(result)?;
    if args.onset {
        let onset = result
            .duration
            .as_ref()
            .and_then(|duration| duration.estimated_onset(Utc::now()))
            .map(|onset| onset.date_naive().to_string());
        value["estimated_onset"] = json!(onset);
    }
    let rendered = if args.compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    Ok(rendered)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let options = load_options(&args.dictionary)?;

    if let Some(text) = &args.text {
        println!("{}", render(&parse(text, &options), &args)?);
        return Ok(());
    }

    for line in io::stdin().lock().lines() {
        let line = line.context("Could not read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        println!("{}", render(&parse(&line, &options), &args)?);
    }

    Ok(())
}
