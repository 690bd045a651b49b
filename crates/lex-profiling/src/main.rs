//! CLI entry point for the data profiling engine.

use anyhow::{Result, anyhow};
use clap::Parser;
use lex_profiling::{DataProfiler, DatasetProfile, ProfilerConfig};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "Statistical data profiling: types, quality, outliers and duplicates",
    long_about = "Profiles a CSV dataset column by column and reports data quality.\n\n\
                  EXAMPLES:\n  \
                  # Human-readable summary\n  \
                  lex-profiling -i data.csv\n\n  \
                  # Full JSON report on stdout\n  \
                  lex-profiling -i data.csv --json\n\n  \
                  # Write the report to a file, force chunked mode\n  \
                  lex-profiling -i data.csv -o report.json --max-memory-mb 0"
)]
struct Args {
    /// Path to the CSV file to profile
    #[arg(short, long)]
    input: String,

    /// Print the JSON report to stdout instead of the summary table
    #[arg(long)]
    json: bool,

    /// Also write the JSON report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Memory budget in MB; frames estimated above half of it are chunked
    #[arg(long, default_value_t = 1000)]
    max_memory_mb: usize,

    /// Rows per chunk in chunked mode
    #[arg(long, default_value_t = 100_000)]
    chunk_size: usize,

    /// Maximum rows inspected for exact duplicates
    #[arg(long, default_value_t = 100_000)]
    exact_sample_size: usize,

    /// Similarity threshold for fuzzy duplicates (0.0 - 1.0)
    #[arg(long, default_value_t = 0.95)]
    fuzzy_threshold: f64,

    /// Maximum rows sampled for fuzzy duplicates
    #[arg(long, default_value_t = 1000)]
    fuzzy_max_rows: usize,

    /// Skip duplicate detection
    #[arg(long)]
    no_duplicates: bool,
}

fn init_logging(level: &str, quiet: bool, json_output: bool) {
    // stdout carries only the report in JSON mode
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    info!("Loading dataset from: {}", args.input);
    let data = load_csv_with_fallbacks(&args.input)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    let config = ProfilerConfig::builder()
        .max_memory_mb(args.max_memory_mb)
        .chunk_size(args.chunk_size)
        .exact_sample_size(args.exact_sample_size)
        .fuzzy_threshold(args.fuzzy_threshold)
        .fuzzy_max_rows(args.fuzzy_max_rows)
        .detect_duplicates(!args.no_duplicates)
        .build()?;

    let profile = DataProfiler::new(&data, config)?.profile()?;
    let report = profile.to_json()?;

    if let Some(path) = &args.output {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        info!("Report written to: {}", path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&args.input, &profile);
    }
    Ok(())
}

fn print_summary(input: &str, profile: &DatasetProfile) {
    let summary = &profile.summary;

    println!("\n{}", "=".repeat(80));
    println!("DATA PROFILE");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", input);
    println!("  Rows: {}", summary.total_rows);
    println!("  Columns: {}", summary.total_columns);
    println!("  Quality score: {:.3}", summary.data_quality_score);
    println!("  Mode: {}", if summary.chunked { "chunked" } else { "exact" });
    println!();

    println!("COLUMN PROFILES");
    println!("{}", "-".repeat(40));
    println!(
        "{:<20} {:<12} {:<10} {:<10} {:<10} {:<8}",
        "Column", "Type", "Missing", "Unique", "Validity", "Quality"
    );
    println!("{}", "-".repeat(75));
    for col in &profile.columns {
        println!(
            "{:<20} {:<12} {:<10} {:<10} {:<10.3} {:<8.3}",
            truncate_str(&col.column_name, 19),
            col.data_type.as_str(),
            col.missing_count,
            col.unique_count,
            col.validity,
            col.quality_score
        );
    }
    println!();

    println!("DUPLICATES");
    println!("{}", "-".repeat(40));
    match (&profile.exact_duplicates, &profile.fuzzy_duplicates) {
        (Some(exact), Some(fuzzy)) => {
            println!(
                "  Exact duplicate rows: {}{}",
                exact.count,
                if exact.estimated { " (estimated)" } else { "" }
            );
            println!(
                "  Near-duplicate rows: {} in {} reported groups",
                fuzzy.count,
                fuzzy.values.len()
            );
        }
        _ => println!("  Skipped"),
    }
    println!();

    println!("ISSUES");
    println!("{}", "-".repeat(40));
    if profile.issues.is_empty() {
        println!("  No issues found");
    }
    for issue in &profile.issues {
        println!("  [{}] {}", issue.severity, issue.description);
    }
    println!();
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

fn load_csv_with_fallbacks(path: &str) -> Result<DataFrame> {
    // Strategy 1: Standard loading with quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Strategy 2: Everything as strings, type inference is left to the profiler
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(0))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Loading as strings failed: {}", e);
        }
    }

    // Strategy 3: Pre-clean content
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cleaned = clean_csv_content(&content);
            let cursor = std::io::Cursor::new(cleaned);

            CsvReadOptions::default()
                .with_infer_schema_length(Some(100))
                .with_has_header(true)
                .into_reader_with_file_handle(cursor)
                .finish()
                .map_err(|e| e.into())
        }
        Err(e) => {
            error!("Could not read file: {}", e);
            Err(e.into())
        }
    }
}

/// Collapse doubled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
