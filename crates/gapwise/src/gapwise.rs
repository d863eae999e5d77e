//! Main Gapwise struct and public API.

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::inference::{ClassifierConfig, ColumnClassifier};
use crate::input::{Parser, ParserConfig, Row, RowSet, SourceMetadata};
use crate::quality::{ColumnQuality, QualityAnalyzer, QualityConfig, Severity};
use crate::schema::{ClassificationOverlay, ColumnClassification, ColumnType};
use crate::series::{ForecastConfig, SeriesValidator, ValidatedConfig, ValidationSummary};
use crate::transform::{
    AggregationMethod, AggregationOutcome, AggregationSummary, Aggregator, GapChoices,
    GapRepairer, RepairOutcome, RepairSummary,
};

/// Configuration for the whole pipeline.
#[derive(Debug, Clone, Default)]
pub struct GapwiseConfig {
    /// Parser configuration.
    pub parser: ParserConfig,
    /// Classifier thresholds.
    pub classifier: ClassifierConfig,
    /// Quality check thresholds.
    pub quality: QualityConfig,
}

/// Column classifications and quality findings for one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataProfile {
    /// One entry per column, carrying the effective type and findings.
    pub columns: Vec<ColumnClassification>,
    /// Detailed quality results, in column order.
    pub quality: Vec<ColumnQuality>,
    /// Inferred and user-set types.
    pub overlay: ClassificationOverlay,
    pub summary: ProfileSummary,
}

impl DataProfile {
    /// Effective type of a column.
    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.overlay.effective_type(column)
    }

    /// Columns whose findings include an issue.
    pub fn excluded_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| !c.is_usable())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// First column whose effective type is `Date`.
    pub fn suggested_date_column(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.column_type == ColumnType::Date && c.is_usable())
            .map(|c| c.name.as_str())
    }
}

/// Counts of findings by severity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservationCounts {
    pub issue: usize,
    pub warning: usize,
    pub suggestion: usize,
}

/// Summary of a profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub total_columns: usize,
    pub usable_columns: usize,
    pub row_count: usize,
    pub observations_by_severity: ObservationCounts,
}

/// Everything `prepare` produced.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub validation: ValidationSummary,
    pub repair: RepairSummary,
    /// `None` when the frequency is daily and no aggregation ran.
    pub aggregation: Option<AggregationSummary>,
    pub rows: Vec<Row>,
}

/// The forecasting data preparation pipeline.
///
/// Stages run strictly in order: profile, validate, repair, aggregate.
pub struct Gapwise {
    parser: Parser,
    classifier: ColumnClassifier,
    quality: QualityAnalyzer,
    validator: SeriesValidator,
    repairer: GapRepairer,
    aggregator: Aggregator,
}

impl Gapwise {
    /// Create a new Gapwise instance with default configuration.
    pub fn new() -> Self {
        Self::with_config(GapwiseConfig::default())
    }

    /// Create a Gapwise instance with custom configuration.
    pub fn with_config(config: GapwiseConfig) -> Self {
        Self {
            parser: Parser::with_config(config.parser),
            classifier: ColumnClassifier::with_config(config.classifier),
            quality: QualityAnalyzer::with_config(config.quality),
            validator: SeriesValidator::new(),
            repairer: GapRepairer::new(),
            aggregator: Aggregator::new(),
        }
    }

    /// Load a delimited file.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(RowSet, SourceMetadata)> {
        self.parser.parse_file(path)
    }

    /// Classify every column and analyze its quality.
    ///
    /// `user_types` overrides inferred types; quality checks run under the
    /// effective type.
    pub fn profile(&self, data: &RowSet, user_types: &IndexMap<String, ColumnType>) -> DataProfile {
        let inferred = self.classifier.classify_rows(data);
        let overlay =
            ClassificationOverlay::from_classifications(&inferred).with_user_overrides(user_types);

        let mut columns = Vec::with_capacity(inferred.len());
        let mut quality = Vec::with_capacity(inferred.len());
        for mut column in inferred {
            if overlay.is_user_classified(&column.name) {
                column.column_type = overlay.resolve(&column.name, column.column_type);
                column.confidence = 1.0;
                column.reasons.push("set by user".to_string());
            }

            let values: Vec<_> = data.column_values(&column.name).cloned().collect();
            let result = self.quality.analyze(&column.name, &values, column.column_type);
            result.apply_to(&mut column);

            columns.push(column);
            quality.push(result);
        }

        let summary = summarize(&columns, &quality, data.row_count());
        info!(
            columns = summary.total_columns,
            usable = summary.usable_columns,
            "profiled dataset"
        );

        DataProfile {
            columns,
            quality,
            overlay,
            summary,
        }
    }

    /// Check every series for missing periods.
    pub fn validate(&self, data: &RowSet, config: &ForecastConfig) -> Result<ValidationSummary> {
        self.validator.validate(data, config)
    }

    /// Apply the gap choice to the series of a validated dataset.
    pub fn repair(
        &self,
        data: &RowSet,
        validation: &ValidationSummary,
        choices: &GapChoices,
        config: &ForecastConfig,
    ) -> Result<RepairOutcome> {
        let config = config.validate()?;
        self.repairer
            .repair(&data.rows, &validation.series_analysis, choices, &config)
    }

    /// Reduce rows to one per (series, period).
    pub fn aggregate(
        &self,
        rows: &[Row],
        config: &ForecastConfig,
        types: &ClassificationOverlay,
        methods: &IndexMap<String, AggregationMethod>,
    ) -> Result<AggregationOutcome> {
        let config = config.validate()?;
        self.aggregator.aggregate(rows, &config, types, methods)
    }

    /// Validate, repair, and (for frequencies coarser than daily) aggregate.
    ///
    /// Columns the profile excluded are dropped unless they are the date, id
    /// or target column.
    pub fn prepare(
        &self,
        data: &RowSet,
        profile: &DataProfile,
        config: &ForecastConfig,
        choices: &GapChoices,
        methods: &IndexMap<String, AggregationMethod>,
    ) -> Result<PreparedData> {
        let validated = config.validate_against(data)?;
        let validation = self.validator.validate_checked(&data.rows, &validated);

        let repaired = self.repairer.repair(
            &data.rows,
            &validation.series_analysis,
            choices,
            &validated,
        )?;
        let rows = drop_excluded(repaired.rows, profile, &validated);

        let (rows, aggregation) = if validated.frequency.is_coarser_than_daily() {
            let outcome = self
                .aggregator
                .aggregate(&rows, &validated, &profile.overlay, methods)?;
            (outcome.rows, Some(outcome.summary))
        } else {
            (rows, None)
        };

        Ok(PreparedData {
            validation,
            repair: repaired.summary,
            aggregation,
            rows,
        })
    }
}

impl Default for Gapwise {
    fn default() -> Self {
        Self::new()
    }
}

fn summarize(
    columns: &[ColumnClassification],
    quality: &[ColumnQuality],
    row_count: usize,
) -> ProfileSummary {
    let mut counts = ObservationCounts::default();
    for obs in quality.iter().flat_map(|q| q.observations()) {
        match obs.severity {
            Severity::Issue => counts.issue += 1,
            Severity::Warning => counts.warning += 1,
            Severity::Suggestion => counts.suggestion += 1,
        }
    }

    ProfileSummary {
        total_columns: columns.len(),
        usable_columns: columns.iter().filter(|c| c.is_usable()).count(),
        row_count,
        observations_by_severity: counts,
    }
}

fn drop_excluded(rows: Vec<Row>, profile: &DataProfile, config: &ValidatedConfig) -> Vec<Row> {
    let keep = [
        Some(config.date_column.as_str()),
        config.id_column.as_deref(),
        config.target_column.as_deref(),
    ];
    let excluded: HashSet<&str> = profile
        .excluded_columns()
        .into_iter()
        .filter(|c| !keep.contains(&Some(*c)))
        .collect();
    if excluded.is_empty() {
        return rows;
    }

    rows.into_iter()
        .map(|mut row| {
            row.retain(|column, _| !excluded.contains(column.as_str()));
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{CriticalPolicy, NonCriticalPolicy};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const SALES: &str = "\
date,store,sales,promo,empty
2024-01-01,1,10,0,
2024-01-15,1,20,1,
2024-02-10,1,30,0,
2024-01-03,2,5,0,
2024-03-09,2,7,1,
";

    #[test]
    fn test_profile_file() {
        let file = create_test_file(SALES);
        let gapwise = Gapwise::new();
        let (data, source) = gapwise.load(file.path()).unwrap();
        let profile = gapwise.profile(&data, &IndexMap::new());

        assert_eq!(source.row_count, 5);
        assert_eq!(profile.column_type("date"), Some(ColumnType::Date));
        assert_eq!(profile.column_type("store"), Some(ColumnType::Categorical));
        assert_eq!(profile.column_type("promo"), Some(ColumnType::Binary));
        assert_eq!(profile.excluded_columns(), vec!["empty"]);
        assert_eq!(profile.suggested_date_column(), Some("date"));
        assert_eq!(profile.summary.usable_columns, 4);
    }

    #[test]
    fn test_user_override_wins() {
        let data = Parser::new().parse_str(SALES).unwrap();
        let mut user = IndexMap::new();
        user.insert("store".to_string(), ColumnType::Text);
        let profile = Gapwise::new().profile(&data, &user);

        assert_eq!(profile.column_type("store"), Some(ColumnType::Text));
        assert_eq!(profile.overlay.auto_classified()["store"], ColumnType::Categorical);
        let store = profile.columns.iter().find(|c| c.name == "store").unwrap();
        assert_eq!(store.column_type, ColumnType::Text);
    }

    #[test]
    fn test_prepare_monthly() {
        let data = Parser::new().parse_str(SALES).unwrap();
        let gapwise = Gapwise::new();
        let profile = gapwise.profile(&data, &IndexMap::new());
        let config = ForecastConfig::new("date", "M", 1)
            .with_id_column("store")
            .with_target_column("sales");
        let choices = GapChoices::new(CriticalPolicy::FillZeros, NonCriticalPolicy::FillZeros);

        let prepared = gapwise
            .prepare(&data, &profile, &config, &choices, &IndexMap::new())
            .unwrap();

        // store 2 is missing February, inside its critical window
        assert_eq!(prepared.validation.category3_count, 1);
        assert_eq!(prepared.repair.rows_synthesized, 1);
        let aggregation = prepared.aggregation.unwrap();
        assert_eq!(aggregation.original_count, 6);
        assert_eq!(aggregation.aggregated_count, 5);
        assert!(prepared.rows.iter().all(|r| !r.contains_key("empty")));

        let january_store_1 = &prepared.rows[0];
        assert_eq!(january_store_1["date"].as_text(), "2024-01-01");
        assert_eq!(january_store_1["sales"], crate::input::RawValue::Number(15.0));
    }

    #[test]
    fn test_prepare_daily_skips_aggregation() {
        let data = Parser::new()
            .parse_str("date,sales\n2024-01-01,1\n2024-01-02,2\n")
            .unwrap();
        let gapwise = Gapwise::new();
        let profile = gapwise.profile(&data, &IndexMap::new());
        let config = ForecastConfig::new("date", "D", 1).with_target_column("sales");

        let prepared = gapwise
            .prepare(&data, &profile, &config, &GapChoices::default(), &IndexMap::new())
            .unwrap();

        assert!(prepared.aggregation.is_none());
        assert_eq!(prepared.rows.len(), 2);
    }
}
