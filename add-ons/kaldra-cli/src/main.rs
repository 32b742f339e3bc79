//! KALDRA CLI: run the bias pipeline on text and print JSON.
//!
//! Usage:
//!   cargo run -p kaldra-cli -- [--locale pt-BR] "texto a analisar"
//!   cargo run -p kaldra-cli -- --locale en --batch texts.txt
//!   cat texts.txt | cargo run -p kaldra-cli -- --batch -
//!
//! Batch files hold one text per line. Settings come from `.env`,
//! `KALDRA_BIAS_CONFIG` and `KALDRA_BIAS_*` variables.

use kaldra_bias::{BiasPipeline, DEFAULT_LOCALE};
use kaldra_core::{init_logging, BiasSettings};
use std::io::Read;
use tracing::info;

fn print_usage() {
    eprintln!("KALDRA — bias analysis kernel ({})", kaldra_core::version());
    eprintln!("  kaldra-cli [--locale L] TEXT...      Analyze TEXT (words joined by spaces)");
    eprintln!("  kaldra-cli [--locale L] --batch FILE Analyze one text per line of FILE (- = stdin)");
    eprintln!();
    eprintln!("  --locale L   Locale for cultural modulation (default {})", DEFAULT_LOCALE);
    eprintln!();
    eprintln!("Config: KALDRA_BIAS_CONFIG (default config/kaldra-bias), KALDRA_BIAS_* env vars.");
}

fn read_batch(source: &str) -> std::io::Result<Vec<String>> {
    let content = if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(source)?
    };
    Ok(content.lines().map(str::to_string).collect())
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let mut locale = DEFAULT_LOCALE.to_string();
    let mut batch: Option<String> = None;
    let mut words: Vec<String> = Vec::new();

    while let Some(a) = args.next() {
        match a.as_str() {
            "--locale" => {
                if let Some(l) = args.next() {
                    locale = l;
                }
            }
            "--batch" => batch = args.next(),
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            _ => words.push(a),
        }
    }

    if batch.is_none() && words.is_empty() {
        print_usage();
        return Ok(());
    }

    let settings = BiasSettings::load()?;
    init_logging(&settings);
    let pipeline = BiasPipeline::from_settings(settings)?;

    let output = match batch {
        Some(source) => {
            let texts = read_batch(&source)?;
            info!(target: "kaldra::cli", source = %source, items = texts.len(), %locale, "Running batch");
            serde_json::to_string_pretty(&pipeline.analyze_batch(&texts, &locale))?
        }
        None => {
            let text = words.join(" ");
            serde_json::to_string_pretty(&pipeline.analyze(&text, &locale)?)?
        }
    };
    println!("{}", output);
    Ok(())
}
