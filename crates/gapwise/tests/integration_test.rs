//! Integration tests for the Gapwise pipeline.

use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

use chrono::NaiveDate;
use indexmap::IndexMap;

use gapwise::export::{export_rows, rows_to_string};
use gapwise::transform::MISSING_FLAG_COLUMN;
use gapwise::{
    AggregationMethod, ColumnType, CriticalPolicy, ExportFormat, ForecastConfig, GapChoices,
    Gapwise, NonCriticalPolicy, ObservationType, RawValue, SeriesCategory,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

/// Three daily series: `a` misses two days right before its end, `b` misses
/// one day early on, `c` is complete.
const STORES: &str = "\
date,store,sales,promo
2024-01-01,a,1,0
2024-01-02,a,2,1
2024-01-05,a,3,0
2024-01-01,b,4,0
2024-01-03,b,5,1
2024-01-04,b,6,0
2024-01-05,b,7,0
2024-01-06,b,8,1
2024-01-01,c,9,0
2024-01-02,c,10,1
";

fn daily_config() -> ForecastConfig {
    ForecastConfig::new("date", "D", 1)
        .with_id_column("store")
        .with_target_column("sales")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// =============================================================================
// Profiling
// =============================================================================

#[test]
fn test_profile_csv_file() {
    let file = create_test_file(STORES);
    let gapwise = Gapwise::new();
    let (data, source) = gapwise.load(file.path()).expect("load failed");
    let profile = gapwise.profile(&data, &IndexMap::new());

    assert_eq!(source.row_count, 10);
    assert_eq!(source.column_count, 4);
    assert!(source.hash.starts_with("sha256:"));

    assert_eq!(profile.column_type("date"), Some(ColumnType::Date));
    assert_eq!(profile.column_type("store"), Some(ColumnType::Categorical));
    assert_eq!(profile.column_type("sales"), Some(ColumnType::Categorical));
    assert_eq!(profile.column_type("promo"), Some(ColumnType::Binary));
    assert!(profile.excluded_columns().is_empty());
}

#[test]
fn test_profile_tsv_with_issue() {
    let file = create_test_file(
        "when\tamount\tnotes\n\
         2024-01-01\t12.5\t\n\
         2024-01-02\t-3.25\t\n\
         2024-01-03\t18.75\t\n",
    );
    let gapwise = Gapwise::new();
    let (data, _) = gapwise.load(file.path()).expect("load failed");
    let profile = gapwise.profile(&data, &IndexMap::new());

    assert_eq!(profile.column_type("when"), Some(ColumnType::Date));
    assert_eq!(profile.column_type("amount"), Some(ColumnType::Numeric));
    assert_eq!(profile.excluded_columns(), vec!["notes"]);

    let notes = profile.quality.iter().find(|q| q.column == "notes").unwrap();
    assert_eq!(
        notes.issues[0].observation_type,
        ObservationType::NoParseableValues
    );
    let amount = profile.quality.iter().find(|q| q.column == "amount").unwrap();
    assert!(
        amount
            .warnings
            .iter()
            .any(|w| w.observation_type == ObservationType::NegativeValues)
    );
}

#[test]
fn test_user_type_changes_quality_checks() {
    let file = create_test_file(STORES);
    let gapwise = Gapwise::new();
    let (data, _) = gapwise.load(file.path()).unwrap();

    let mut user = IndexMap::new();
    user.insert("sales".to_string(), ColumnType::Numeric);
    let profile = gapwise.profile(&data, &user);

    assert_eq!(profile.column_type("sales"), Some(ColumnType::Numeric));
    assert!(profile.overlay.is_user_classified("sales"));
    let sales = profile.quality.iter().find(|q| q.column == "sales").unwrap();
    assert_eq!(sales.column_type, ColumnType::Numeric);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_validate_categorizes_series() {
    let file = create_test_file(STORES);
    let gapwise = Gapwise::new();
    let (data, _) = gapwise.load(file.path()).unwrap();

    let summary = gapwise.validate(&data, &daily_config()).unwrap();

    assert_eq!(summary.total_series, 3);
    assert_eq!(summary.category1_count, 1);
    assert_eq!(summary.category2_count, 1);
    assert_eq!(summary.category3_count, 1);
    assert_eq!(summary.processed_records, 10);
    assert_eq!(summary.required_length, 2);

    let a = summary.series("a").unwrap();
    assert_eq!(a.category, SeriesCategory::Critical);
    assert_eq!(a.critical_break_dates, vec![date(2024, 1, 3), date(2024, 1, 4)]);

    let b = summary.series("b").unwrap();
    assert_eq!(b.category, SeriesCategory::NonCriticalOnly);
    assert_eq!(b.non_critical_break_dates, vec![date(2024, 1, 2)]);
}

#[test]
fn test_validate_without_id_column_uses_single_series() {
    let data = gapwise::input::Parser::new()
        .parse_str("date,sales\n2024-01-01,1\n2024-01-03,2\n")
        .unwrap();
    let summary = Gapwise::new()
        .validate(&data, &ForecastConfig::new("date", "D", 1))
        .unwrap();

    assert_eq!(summary.total_series, 1);
    assert_eq!(summary.series_analysis[0].series_id, "overall");
    assert!(summary.has_critical_breaks());
}

#[test]
fn test_validate_rejects_bad_config() {
    let data = gapwise::input::Parser::new().parse_str(STORES).unwrap();
    let gapwise = Gapwise::new();

    let err = gapwise
        .validate(&data, &ForecastConfig::new("date", "fortnightly", 1))
        .unwrap_err();
    assert!(err.is_precondition());

    let err = gapwise
        .validate(&data, &ForecastConfig::new("date", "D", 0))
        .unwrap_err();
    assert!(err.is_precondition());

    let err = gapwise
        .validate(&data, &ForecastConfig::new("timestamp", "D", 1))
        .unwrap_err();
    assert!(err.is_precondition());
}

#[test]
fn test_summary_serializes_camel_case() {
    let data = gapwise::input::Parser::new().parse_str(STORES).unwrap();
    let summary = Gapwise::new().validate(&data, &daily_config()).unwrap();
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["totalSeries"], 3);
    assert_eq!(json["timeGranularity"], "D");
    assert_eq!(json["seriesAnalysis"][0]["seriesId"], "a");
    assert_eq!(json["seriesAnalysis"][0]["category"], 3);
    assert_eq!(json["seriesAnalysis"][0]["criticalBreakDates"][0], "2024-01-03");
}

// =============================================================================
// Repair and aggregation
// =============================================================================

#[test]
fn test_repair_then_revalidate_is_complete() {
    let data = gapwise::input::Parser::new().parse_str(STORES).unwrap();
    let gapwise = Gapwise::new();
    let config = daily_config();
    let summary = gapwise.validate(&data, &config).unwrap();

    let choices = GapChoices::new(CriticalPolicy::FillZeros, NonCriticalPolicy::FillZeros);
    let repaired = gapwise.repair(&data, &summary, &choices, &config).unwrap();
    assert_eq!(repaired.summary.rows_synthesized, 3);

    let again = gapwise::RowSet::from_rows(repaired.rows);
    let summary = gapwise.validate(&again, &config).unwrap();
    assert_eq!(summary.category1_count, 3);
}

#[test]
fn test_prepare_weekly_aggregates() {
    let data = gapwise::input::Parser::new().parse_str(STORES).unwrap();
    let gapwise = Gapwise::new();
    let profile = gapwise.profile(&data, &IndexMap::new());

    let config = ForecastConfig::new("date", "W", 1)
        .with_id_column("store")
        .with_target_column("sales");
    let mut methods = IndexMap::new();
    methods.insert("promo".to_string(), AggregationMethod::Max);
    // promo is binary; Max only suits numeric columns
    assert!(
        gapwise
            .prepare(&data, &profile, &config, &GapChoices::default(), &methods)
            .unwrap_err()
            .is_precondition()
    );

    let prepared = gapwise
        .prepare(&data, &profile, &config, &GapChoices::default(), &IndexMap::new())
        .unwrap();

    // 2024-01-01 is a Monday: every row lands in the same week
    assert_eq!(prepared.validation.category1_count, 3);
    assert_eq!(prepared.rows.len(), 3);
    assert_eq!(prepared.aggregation.unwrap().aggregated_count, 3);
    assert!(prepared.rows.iter().all(|r| r["date"] == RawValue::from("2024-01-01")));
}

#[test]
fn test_prepare_and_export() {
    let data = gapwise::input::Parser::new().parse_str(STORES).unwrap();
    let gapwise = Gapwise::new();
    let profile = gapwise.profile(&data, &IndexMap::new());
    let choices = GapChoices::new(CriticalPolicy::Remove, NonCriticalPolicy::MarkMissing);

    let prepared = gapwise
        .prepare(&data, &profile, &daily_config(), &choices, &IndexMap::new())
        .unwrap();
    assert!(prepared.aggregation.is_none());
    assert_eq!(prepared.repair.series_removed, 1);
    assert_eq!(prepared.rows.len(), 8);
    assert!(prepared.rows.iter().all(|r| r.contains_key(MISSING_FLAG_COLUMN)));

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prepared.csv");
    export_rows(&path, &prepared.rows, ExportFormat::Csv).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("date,store,sales,promo,is_missing\n"));
    assert!(written.contains("2024-01-02,b,0,,1\n"));

    let json = rows_to_string(&prepared.rows, ExportFormat::Json).unwrap();
    assert!(!json.contains("\"a\""));
}
