//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use gapwise::{AggregationMethod, ColumnType, CriticalPolicy, ExportFormat, NonCriticalPolicy};

/// gapwise: profile, validate and repair time-series data for forecasting
#[derive(Parser)]
#[command(name = "gapwise")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify columns and report data quality findings
    Profile {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Force a column type, e.g. `--override store=categorical`
        #[arg(long = "override", value_name = "COLUMN=TYPE", value_parser = parse_pair::<ColumnType>)]
        overrides: Vec<(String, ColumnType)>,
    },

    /// Check every series for missing periods
    Validate {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        forecast: ForecastArgs,

        /// Send the rows to a remote validator instead of validating locally
        #[arg(long, value_name = "URL")]
        remote: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Repair gaps, aggregate and export forecast-ready data
    Prepare {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        forecast: ForecastArgs,

        #[command(flatten)]
        gaps: GapArgs,

        /// Aggregation method for a column, e.g. `--agg sales=sum`
        #[arg(long = "agg", value_name = "COLUMN=METHOD", value_parser = parse_pair::<AggregationMethod>)]
        aggregations: Vec<(String, AggregationMethod)>,

        /// Output path (default: <file>.prepared.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: csv, tsv or json (default: from output extension)
        #[arg(short, long)]
        format: Option<ExportFormat>,
    },

    /// Run the validation HTTP server
    Serve {
        /// Port for web server
        #[arg(short, long, default_value = "3141")]
        port: u16,

        /// Largest accepted request body, in megabytes
        #[arg(long, value_name = "MB", default_value = "64")]
        max_body_mb: usize,
    },
}

/// Column selections and forecast parameters.
#[derive(Args, Debug, Clone)]
pub struct ForecastArgs {
    /// Date column
    #[arg(long)]
    pub date: Option<String>,

    /// Series id column (omit for a single series)
    #[arg(long)]
    pub id: Option<String>,

    /// Target column to forecast
    #[arg(long)]
    pub target: Option<String>,

    /// Frequency: D, W, M, Q or Y (default: D)
    #[arg(long)]
    pub frequency: Option<String>,

    /// Forecast horizon in periods (default: 1)
    #[arg(long, allow_negative_numbers = true)]
    pub horizon: Option<i64>,

    /// Critical window length in multiples of the horizon
    #[arg(long)]
    pub critical_window: Option<u32>,

    /// Load the forecast config from a JSON file; flags override its fields
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// How gaps are handled.
#[derive(Args, Debug, Clone)]
pub struct GapArgs {
    /// Critical gaps: fill_zeros or remove
    #[arg(long, default_value = "fill_zeros")]
    pub critical: CriticalPolicy,

    /// Non-critical gaps: fill_zeros, mark_missing or remove
    #[arg(long, default_value = "fill_zeros")]
    pub non_critical: NonCriticalPolicy,
}

/// Parse `name=value` into a column name and a typed value.
fn parse_pair<T>(s: &str) -> Result<(String, T), String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let (column, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{}'", s))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in '{}'", s));
    }
    let value = value.trim().parse::<T>().map_err(|e| e.to_string())?;
    Ok((column.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair::<ColumnType>("store = categorical").unwrap(),
            ("store".to_string(), ColumnType::Categorical)
        );
        assert_eq!(
            parse_pair::<AggregationMethod>("sales=avg").unwrap(),
            ("sales".to_string(), AggregationMethod::Mean)
        );
        assert!(parse_pair::<ColumnType>("store").is_err());
        assert!(parse_pair::<ColumnType>("=numeric").is_err());
        assert!(parse_pair::<ColumnType>("store=colour").is_err());
    }

    #[test]
    fn test_serve_body_limit() {
        let cli = Cli::try_parse_from(["gapwise", "serve", "--max-body-mb", "8"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { port: 3141, max_body_mb: 8 }));

        let cli = Cli::try_parse_from(["gapwise", "serve"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { max_body_mb: 64, .. }));
    }

    #[test]
    fn test_prepare_flags() {
        let cli = Cli::try_parse_from([
            "gapwise",
            "prepare",
            "sales.csv",
            "--date",
            "date",
            "--id",
            "store",
            "--frequency",
            "W",
            "--horizon",
            "4",
            "--non-critical",
            "mark-missing",
            "--agg",
            "sales=sum",
        ])
        .unwrap();

        let Commands::Prepare {
            forecast,
            gaps,
            aggregations,
            ..
        } = cli.command
        else {
            panic!("expected prepare");
        };
        assert_eq!(forecast.horizon, Some(4));
        assert_eq!(gaps.critical, CriticalPolicy::FillZeros);
        assert_eq!(gaps.non_critical, NonCriticalPolicy::MarkMissing);
        assert_eq!(aggregations, vec![("sales".to_string(), AggregationMethod::Sum)]);
    }
}
