//! CLI command implementations.

pub mod prepare;
pub mod profile;
pub mod serve;
pub mod validate;

use std::path::Path;

use gapwise::{ForecastConfig, Gapwise, RowSet, SourceMetadata};

use crate::cli::ForecastArgs;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Load a data file, failing early with a readable message if it is absent.
fn load(gapwise: &Gapwise, file: &Path) -> Result<(RowSet, SourceMetadata), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    Ok(gapwise.load(file)?)
}

/// Build a forecast config from a JSON file and/or flags. Flags win.
fn forecast_config(args: ForecastArgs) -> Result<ForecastConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            serde_json::from_str::<ForecastConfig>(&text)
                .map_err(|e| format!("Invalid forecast config {}: {}", path.display(), e))?
        }
        None => {
            let date = args
                .date
                .clone()
                .ok_or("--date is required unless --config is given")?;
            ForecastConfig::new(date, "D", 1)
        }
    };

    if let Some(date) = args.date {
        config.date_column = date;
    }
    if let Some(id) = args.id {
        config.id_column = Some(id);
    }
    if let Some(target) = args.target {
        config.target_column = Some(target);
    }
    if let Some(frequency) = args.frequency {
        config.frequency = frequency;
    }
    if let Some(horizon) = args.horizon {
        config.horizon = horizon;
    }
    if let Some(multiplier) = args.critical_window {
        config.critical_window_multiplier = multiplier;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args() -> ForecastArgs {
        ForecastArgs {
            date: None,
            id: None,
            target: None,
            frequency: None,
            horizon: None,
            critical_window: None,
            config: None,
        }
    }

    #[test]
    fn test_config_from_flags() {
        let config = forecast_config(ForecastArgs {
            date: Some("day".to_string()),
            horizon: Some(7),
            ..args()
        })
        .unwrap();
        assert_eq!(config.date_column, "day");
        assert_eq!(config.frequency, "D");
        assert_eq!(config.horizon, 7);
        assert!(config.id_column.is_none());
    }

    #[test]
    fn test_date_required_without_file() {
        assert!(forecast_config(args()).is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"dateColumn":"date","idColumn":"store","frequency":"W","horizon":4}"#)
            .unwrap();

        let config = forecast_config(ForecastArgs {
            config: Some(file.path().to_path_buf()),
            horizon: Some(2),
            ..args()
        })
        .unwrap();

        assert_eq!(config.id_column.as_deref(), Some("store"));
        assert_eq!(config.frequency, "W");
        assert_eq!(config.horizon, 2);
        assert_eq!(config.critical_window_multiplier, 2);
    }
}
