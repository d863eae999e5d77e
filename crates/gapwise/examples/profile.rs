//! Example: profile a file and check its series for gaps.
//!
//! Usage:
//!   cargo run --example profile -- <file_path> [date_column] [id_column] [frequency] [horizon]
//!
//! Example:
//!   cargo run --example profile -- sales.csv date store W 4

use std::env;
use std::path::Path;

use indexmap::IndexMap;

use gapwise::{ForecastConfig, Gapwise, SeriesCategory};

fn main() -> gapwise::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example profile -- <file_path> [date_column] [id_column] [frequency] [horizon]");
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    if !path.exists() {
        eprintln!("Error: File not found: {}", args[1]);
        std::process::exit(1);
    }

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("Gapwise Profile: {}", args[1]);
    println!("{}", separator);
    println!();

    let gapwise = Gapwise::new();
    let (data, source) = gapwise.load(path)?;
    let profile = gapwise.profile(&data, &IndexMap::new());

    println!("## Source");
    println!("  Format: {}", source.format);
    println!("  Rows: {}", source.row_count);
    println!("  Columns: {}", source.column_count);
    println!();

    println!("## Columns");
    for col in &profile.columns {
        println!(
            "  {:20} {:12} confidence={:.2} nulls={}",
            col.name, col.column_type, col.confidence, col.null_count
        );
        for issue in &col.issues {
            println!("      issue: {}", issue);
        }
        for warning in &col.warnings {
            println!("      warning: {}", warning);
        }
        for suggestion in &col.suggestions {
            println!("      suggestion: {}", suggestion);
        }
    }
    println!();

    let Some(date_column) = args
        .get(2)
        .map(String::as_str)
        .or_else(|| profile.suggested_date_column())
    else {
        println!("No date column found; skipping series validation.");
        return Ok(());
    };

    let frequency = args.get(4).map(String::as_str).unwrap_or("D");
    let horizon = args.get(5).and_then(|h| h.parse().ok()).unwrap_or(1);
    let mut config = ForecastConfig::new(date_column, frequency, horizon);
    if let Some(id) = args.get(3) {
        config = config.with_id_column(id.clone());
    }

    let summary = gapwise.validate(&data, &config)?;

    println!("## Series ({} total)", summary.total_series);
    println!("  complete: {}", summary.category1_count);
    println!("  non-critical gaps only: {}", summary.category2_count);
    println!("  critical gaps: {}", summary.category3_count);
    println!();

    for report in summary
        .series_analysis
        .iter()
        .filter(|r| r.category == SeriesCategory::Critical)
    {
        println!(
            "  [{}] {} critical, {} non-critical (window starts {})",
            report.series_id,
            report.critical_breaks_count,
            report.non_critical_breaks_count,
            report
                .critical_period_start
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }

    println!("{}", separator);
    Ok(())
}
