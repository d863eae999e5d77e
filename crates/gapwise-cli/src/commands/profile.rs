//! Profile command - classify columns and report quality findings.

use std::path::PathBuf;

use colored::Colorize;
use gapwise::{ColumnType, Gapwise};
use indexmap::IndexMap;

use super::{CommandResult, load};

pub fn run(
    file: PathBuf,
    json: bool,
    overrides: Vec<(String, ColumnType)>,
    verbose: bool,
) -> CommandResult {
    let gapwise = Gapwise::new();
    let (data, source) = load(&gapwise, &file)?;

    for (column, _) in &overrides {
        if !data.has_column(column) {
            return Err(format!("Cannot override '{}': no such column", column).into());
        }
    }
    let user_types: IndexMap<String, ColumnType> = overrides.into_iter().collect();
    let profile = gapwise.profile(&data, &user_types);

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows, {} columns, {})",
        "Profiled".cyan().bold(),
        file.display().to_string().white(),
        source.row_count,
        source.column_count,
        source.format
    );
    println!();

    for column in &profile.columns {
        let marker = if profile.overlay.is_user_classified(&column.name) {
            " (set)".dimmed().to_string()
        } else {
            String::new()
        };
        let name = if column.is_usable() {
            column.name.white().bold()
        } else {
            column.name.red().bold()
        };
        println!(
            "  {:24} {:12}{} {:>4.0}%",
            name,
            column.column_type,
            marker,
            column.confidence * 100.0
        );

        if verbose {
            for reason in &column.reasons {
                println!("      {}", reason.dimmed());
            }
        }
        for issue in &column.issues {
            println!("      {} {}", "issue:".red(), issue);
        }
        for warning in &column.warnings {
            println!("      {} {}", "warning:".yellow(), warning);
        }
        for suggestion in &column.suggestions {
            println!("      {} {}", "suggestion:".blue(), suggestion);
        }
    }

    let counts = &profile.summary.observations_by_severity;
    println!();
    println!(
        "{} of {} columns usable ({} issues, {} warnings, {} suggestions)",
        profile.summary.usable_columns.to_string().white().bold(),
        profile.summary.total_columns,
        counts.issue.to_string().red(),
        counts.warning.to_string().yellow(),
        counts.suggestion.to_string().blue()
    );

    let excluded = profile.excluded_columns();
    if !excluded.is_empty() {
        println!("Excluded from preparation: {}", excluded.join(", ").red());
    }
    if let Some(date) = profile.suggested_date_column() {
        println!(
            "Run {} to check for gaps",
            format!("gapwise validate {} --date {}", file.display(), date)
                .cyan()
                .bold()
        );
    }

    Ok(())
}
