//! Prepare command - repair gaps, aggregate and export.

use std::path::{Path, PathBuf};

use colored::Colorize;
use gapwise::export::export_rows;
use gapwise::{AggregationMethod, ExportFormat, GapChoices, Gapwise};
use indexmap::IndexMap;

use super::{CommandResult, forecast_config, load};
use crate::cli::{ForecastArgs, GapArgs};

pub fn run(
    file: PathBuf,
    forecast: ForecastArgs,
    gaps: GapArgs,
    aggregations: Vec<(String, AggregationMethod)>,
    output: Option<PathBuf>,
    format: Option<ExportFormat>,
    verbose: bool,
) -> CommandResult {
    let config = forecast_config(forecast)?;
    let choices = GapChoices::new(gaps.critical, gaps.non_critical);
    let methods: IndexMap<String, AggregationMethod> = aggregations.into_iter().collect();

    let gapwise = Gapwise::new();
    let (data, _) = load(&gapwise, &file)?;
    let profile = gapwise.profile(&data, &IndexMap::new());

    println!(
        "{} {}",
        "Preparing".cyan().bold(),
        file.display().to_string().white()
    );

    let prepared = gapwise.prepare(&data, &profile, &config, &choices, &methods)?;

    let validation = &prepared.validation;
    println!(
        "  {} series: {} complete, {} non-critical, {} critical",
        validation.total_series,
        validation.category1_count.to_string().green(),
        validation.category2_count.to_string().yellow(),
        validation.category3_count.to_string().red()
    );

    let repair = &prepared.repair;
    println!(
        "  repair: {} series removed ({} rows), {} rows added ({} marked missing)",
        repair.series_removed,
        repair.rows_removed,
        repair.rows_synthesized,
        repair.rows_marked_missing
    );
    if verbose {
        for action in &repair.actions {
            println!("      {}", action.description().dimmed());
        }
    }

    match &prepared.aggregation {
        Some(aggregation) => println!(
            "  aggregation: {} -> {} rows ({:.1}% reduction)",
            aggregation.original_count, aggregation.aggregated_count, aggregation.reduction_percent
        ),
        None => println!("  aggregation: skipped for daily data"),
    }

    let excluded = profile.excluded_columns();
    if !excluded.is_empty() {
        println!("  dropped unusable columns: {}", excluded.join(", ").red());
    }

    let format = format
        .or_else(|| output.as_deref().and_then(ExportFormat::from_path))
        .unwrap_or_default();
    let output_path = output.unwrap_or_else(|| default_output(&file, format));
    export_rows(&output_path, &prepared.rows, format)?;

    println!();
    println!(
        "{} {} rows to {}",
        "Saved".green().bold(),
        prepared.rows.len(),
        output_path.display().to_string().white()
    );

    Ok(())
}

fn default_output(file: &Path, format: ExportFormat) -> PathBuf {
    let stem = file.file_stem().unwrap_or_default().to_string_lossy();
    file.with_file_name(format!("{}.prepared.{}", stem, format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output(Path::new("data/sales.csv"), ExportFormat::Json),
            PathBuf::from("data/sales.prepared.json")
        );
    }
}
