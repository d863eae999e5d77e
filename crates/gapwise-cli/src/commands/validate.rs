//! Validate command - check every series for missing periods.

use std::path::PathBuf;

use colored::Colorize;
use gapwise::{Gapwise, SeriesCategory, ValidationClient, ValidationSummary};

use super::{CommandResult, forecast_config, load};
use crate::cli::ForecastArgs;

/// Series listed individually before the rest are summarized.
const MAX_LISTED_SERIES: usize = 20;

pub fn run(
    file: PathBuf,
    forecast: ForecastArgs,
    remote: Option<String>,
    json: bool,
    verbose: bool,
) -> CommandResult {
    let config = forecast_config(forecast)?;
    let gapwise = Gapwise::new();
    let (data, _) = load(&gapwise, &file)?;

    let summary = match remote {
        Some(url) => {
            if verbose {
                eprintln!("Validating remotely at {}", url);
            }
            ValidationClient::new(url)?.validate(&data.rows, &config)?
        }
        None => gapwise.validate(&data, &config)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, verbose);
    }

    Ok(())
}

fn print_summary(summary: &ValidationSummary, verbose: bool) {
    println!(
        "{} {} series at {} frequency, horizon {} (critical window {} periods)",
        "Validated".cyan().bold(),
        summary.total_series.to_string().white().bold(),
        summary.time_granularity.label(),
        summary.prediction_length,
        summary.required_length
    );
    if summary.dropped_records > 0 {
        println!(
            "{} {} rows skipped (unparseable date or missing id)",
            "Note:".yellow(),
            summary.dropped_records
        );
    }
    println!();
    println!("  {} complete", summary.category1_count.to_string().green());
    println!(
        "  {} with non-critical gaps only",
        summary.category2_count.to_string().yellow()
    );
    println!(
        "  {} with critical gaps",
        summary.category3_count.to_string().red()
    );

    let broken: Vec<_> = summary
        .series_analysis
        .iter()
        .filter(|r| r.category != SeriesCategory::Complete)
        .collect();
    if broken.is_empty() {
        println!();
        println!("{}", "No gaps found - every series is complete!".green());
        return;
    }

    println!();
    for report in broken.iter().take(MAX_LISTED_SERIES) {
        let label = match report.category {
            SeriesCategory::Critical => report.category.label().red(),
            _ => report.category.label().yellow(),
        };
        println!(
            "  {:20} {} ({} critical, {} non-critical)",
            report.series_id,
            label,
            report.critical_breaks_count,
            report.non_critical_breaks_count
        );
        if verbose {
            let dates: Vec<String> = report.missing_dates().iter().map(|d| d.to_string()).collect();
            println!("      missing: {}", dates.join(", ").dimmed());
        }
    }
    if broken.len() > MAX_LISTED_SERIES {
        println!("  ... and {} more", broken.len() - MAX_LISTED_SERIES);
    }

    println!();
    println!(
        "Run {} to repair gaps",
        "gapwise prepare".cyan().bold()
    );
}
