//! Turns the metrics endpoint's JSON into a [`Report`].
//!
//! The server contract is described by [`FIELD_MAP`]: every top-level key the
//! normalizer reads is listed there, together with the report field it fills.
//! Absent optional fields are replaced by empty values so consumers never have
//! to check for them.

use crate::core::error::SchemaError;
use crate::core::report::{
    CorrelationMatrix, HistoryPoint, Leverage, MonteCarloPoint, PeriodicReturn, RawPayload,
    Report, RiskAttribution, StressTest, Vitals, metric,
};
use crate::core::sort::{SortDirection, compare_values};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportField {
    Vitals,
    Leverage,
    ActiveRisks,
    StressTests,
    PeriodicReturns,
    MonteCarlo,
    History,
    YtdHistory,
    CorrelationMatrix,
    Error,
}

/// External payload key to report field.
pub const FIELD_MAP: &[(&str, ReportField)] = &[
    ("vitals", ReportField::Vitals),
    ("leverage", ReportField::Leverage),
    ("riskAttribution", ReportField::ActiveRisks),
    ("stressTests", ReportField::StressTests),
    ("periodicReturns", ReportField::PeriodicReturns),
    ("monteCarlo", ReportField::MonteCarlo),
    ("history", ReportField::History),
    ("ytdHistory", ReportField::YtdHistory),
    ("volumeWeightedCorrelation", ReportField::CorrelationMatrix),
    ("error", ReportField::Error),
];

impl ReportField {
    pub fn external_name(self) -> &'static str {
        FIELD_MAP
            .iter()
            .find(|(_, field)| *field == self)
            .map_or("<unmapped>", |(name, _)| name)
    }
}

/// Risk attribution entry when the server keys rows by ticker.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttributionStats {
    #[serde(default, alias = "Weight", deserialize_with = "crate::core::report::lenient_f64")]
    weight: Option<f64>,
    #[serde(default, alias = "Pct_Risk", deserialize_with = "crate::core::report::lenient_f64")]
    pct_risk: Option<f64>,
    #[serde(default, alias = "MCTR", deserialize_with = "crate::core::report::lenient_f64")]
    mctr: Option<f64>,
}

/// Looks up a mapped field. `null` is treated the same as a missing key.
struct Fields<'a> {
    object: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn get(&self, field: ReportField) -> Option<&'a Value> {
        self.object
            .get(field.external_name())
            .filter(|value| !value.is_null())
    }

    fn decode<T: DeserializeOwned>(&self, field: ReportField) -> Result<Option<T>, SchemaError> {
        self.get(field).map(|value| decode(field, value)).transpose()
    }

    fn collection<T: DeserializeOwned>(&self, field: ReportField) -> Result<Vec<T>, SchemaError> {
        match self.get(field) {
            None => Ok(Vec::new()),
            Some(Value::Array(rows)) => Ok(decode_rows(field, rows)),
            Some(other) => Err(SchemaError::InvalidField {
                field: field.external_name(),
                reason: format!("expected an array, found {other}"),
            }),
        }
    }
}

fn decode<T: DeserializeOwned>(field: ReportField, value: &Value) -> Result<T, SchemaError> {
    T::deserialize(value).map_err(|e| SchemaError::InvalidField {
        field: field.external_name(),
        reason: e.to_string(),
    })
}

/// Decodes each row on its own; a row that cannot be read is dropped so the
/// rest of the table still renders.
fn decode_rows<T: DeserializeOwned>(field: ReportField, rows: &[Value]) -> Vec<T> {
    rows.iter().filter_map(|row| decode_row(field, row)).collect()
}

fn decode_row<T: DeserializeOwned>(field: ReportField, row: &Value) -> Option<T> {
    T::deserialize(row)
        .inspect_err(|e| {
            warn!(field = field.external_name(), error = %e, "Dropping malformed row");
        })
        .ok()
}

fn invalid_shape(field: ReportField, value: &Value) -> SchemaError {
    SchemaError::InvalidField {
        field: field.external_name(),
        reason: format!("expected an object or an array, found {value}"),
    }
}

/// Builds a [`Report`] from the raw payload.
///
/// Fails only when the payload is not an object, `vitals` is missing, or a
/// mapped field has the wrong shape.
pub fn normalize(raw: &RawPayload) -> Result<Report, SchemaError> {
    let object = raw.as_object().ok_or(SchemaError::NotAnObject)?;
    for key in object.keys() {
        if !FIELD_MAP.iter().any(|(name, _)| name == key) {
            debug!(field = %key, "Ignoring unmapped response field");
        }
    }
    let fields = Fields { object };

    let error = fields.get(ReportField::Error).map(|value| match value {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    });

    let vitals: Vitals = fields
        .decode(ReportField::Vitals)?
        .ok_or_else(|| SchemaError::MissingVitals {
            server_error: error.clone(),
        })?;

    let report = Report {
        vitals,
        leverage: fields
            .decode::<Leverage>(ReportField::Leverage)?
            .unwrap_or_default(),
        active_risks: active_risks(fields.get(ReportField::ActiveRisks))?,
        stress_tests: stress_tests(fields.get(ReportField::StressTests))?,
        periodic_returns: fields.collection::<PeriodicReturn>(ReportField::PeriodicReturns)?,
        monte_carlo: fields.collection::<MonteCarloPoint>(ReportField::MonteCarlo)?,
        history: fields.collection::<HistoryPoint>(ReportField::History)?,
        ytd_history: fields.collection::<HistoryPoint>(ReportField::YtdHistory)?,
        correlation_matrix: correlation_matrix(
            fields.decode::<CorrelationMatrix>(ReportField::CorrelationMatrix)?,
        ),
        error,
    };

    debug!(
        active_risks = report.active_risks.len(),
        periodic_returns = report.periodic_returns.len(),
        history = report.history.len(),
        "Normalized risk report"
    );
    Ok(report)
}

fn active_risks(value: Option<&Value>) -> Result<Vec<RiskAttribution>, SchemaError> {
    let field = ReportField::ActiveRisks;
    let mut rows = match value {
        None => Vec::new(),
        Some(Value::Object(by_ticker)) => by_ticker
            .iter()
            .filter_map(|(ticker, stats)| {
                let stats: AttributionStats = decode_row(field, stats)?;
                Some(RiskAttribution {
                    ticker: ticker.clone(),
                    weight: stats.weight,
                    pct_risk: stats.pct_risk,
                    mctr: stats.mctr,
                })
            })
            .collect(),
        Some(Value::Array(rows)) => decode_rows(field, rows),
        Some(other) => return Err(invalid_shape(field, other)),
    };
    rows.sort_by(|a, b| compare_values(a.pct_risk, b.pct_risk, SortDirection::Descending));
    Ok(rows)
}

fn stress_tests(value: Option<&Value>) -> Result<Vec<StressTest>, SchemaError> {
    let field = ReportField::StressTests;
    match value {
        None => Ok(Vec::new()),
        Some(Value::Object(by_scenario)) => Ok(by_scenario
            .iter()
            .map(|(scenario, impact)| StressTest {
                scenario: scenario.clone(),
                impact: metric(impact),
            })
            .collect()),
        Some(Value::Array(rows)) => Ok(decode_rows(field, rows)),
        Some(other) => Err(invalid_shape(field, other)),
    }
}

fn correlation_matrix(matrix: Option<CorrelationMatrix>) -> Option<CorrelationMatrix> {
    let matrix = matrix.filter(|m| !m.tickers.is_empty())?;
    if !matrix.is_square() {
        warn!(
            tickers = matrix.tickers.len(),
            rows = matrix.matrix.len(),
            "Dropping correlation matrix with mismatched dimensions"
        );
        return None;
    }
    Some(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::{Direction, PeriodInfo};
    use serde_json::json;

    #[test]
    fn test_empty_object_is_schema_error() {
        let result = normalize(&json!({}));
        assert_eq!(
            result.unwrap_err(),
            SchemaError::MissingVitals { server_error: None }
        );
    }

    #[test]
    fn test_non_object_is_schema_error() {
        assert_eq!(
            normalize(&json!([1, 2])).unwrap_err(),
            SchemaError::NotAnObject
        );
    }

    #[test]
    fn test_server_error_without_vitals() {
        let result = normalize(&json!({"error": "risk.py not found or failed to import"}));
        assert_eq!(
            result.unwrap_err(),
            SchemaError::MissingVitals {
                server_error: Some("risk.py not found or failed to import".to_string())
            }
        );
    }

    #[test]
    fn test_null_vitals_is_schema_error() {
        assert!(matches!(
            normalize(&json!({"vitals": null})),
            Err(SchemaError::MissingVitals { .. })
        ));
    }

    #[test]
    fn test_vitals_only_defaults_everything_else() {
        let report = normalize(&json!({"vitals": {"beta": 0.9}})).unwrap();

        assert_eq!(report.vitals.beta, Some(0.9));
        assert!(report.active_risks.is_empty());
        assert!(report.stress_tests.is_empty());
        assert!(report.periodic_returns.is_empty());
        assert!(report.monte_carlo.is_empty());
        assert!(report.history.is_empty());
        assert!(report.ytd_history.is_empty());
        assert!(report.correlation_matrix.is_none());
        assert!(report.error.is_none());
        assert!(report.vitals.currency_exposure.is_empty());
        assert!(report.vitals.fx_watchlist.is_empty());
        assert_eq!(report.vitals.period_info, PeriodInfo::default());
        assert_eq!(report.vitals.period_info.start_date, "N/A");
        assert_eq!(report.leverage, Leverage::default());
    }

    #[test]
    fn test_null_collections_are_treated_as_absent() {
        let report = normalize(&json!({
            "vitals": {},
            "history": null,
            "monteCarlo": null,
            "leverage": null
        }))
        .unwrap();
        assert!(report.history.is_empty());
        assert!(report.monte_carlo.is_empty());
        assert_eq!(report.leverage, Leverage::default());
    }

    #[test]
    fn test_risk_attribution_mapping_end_to_end() {
        let report = normalize(&json!({
            "vitals": {"ytdReturn": 0.05},
            "riskAttribution": {"AAPL": {"Weight": 0.1, "Pct_Risk": 0.3, "MCTR": 0.02}}
        }))
        .unwrap();

        assert_eq!(report.vitals.ytd_return, Some(0.05));
        assert_eq!(
            report.active_risks,
            vec![RiskAttribution {
                ticker: "AAPL".to_string(),
                weight: Some(0.1),
                pct_risk: Some(0.3),
                mctr: Some(0.02),
            }]
        );
        assert!(report.history.is_empty());
    }

    #[test]
    fn test_active_risks_sorted_descending_and_stable() {
        let report = normalize(&json!({
            "vitals": {},
            "riskAttribution": {
                "XOM": {"Weight": 0.1, "Pct_Risk": 0.1, "MCTR": 0.01},
                "NVDA": {"Weight": 0.2, "Pct_Risk": 0.4, "MCTR": 0.03},
                "KO": {"Weight": 0.1, "Pct_Risk": 0.1, "MCTR": 0.01},
                "TSLA": {"Weight": 0.1, "Pct_Risk": null, "MCTR": 0.05},
                "AMD": {"Weight": 0.2, "Pct_Risk": 0.3, "MCTR": 0.02}
            }
        }))
        .unwrap();

        let order: Vec<&str> = report
            .active_risks
            .iter()
            .map(|r| r.ticker.as_str())
            .collect();
        assert_eq!(order, vec!["NVDA", "AMD", "XOM", "KO", "TSLA"]);

        let present: Vec<f64> = report
            .active_risks
            .iter()
            .filter_map(|r| r.pct_risk)
            .collect();
        assert!(present.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_risk_attribution_array_form() {
        let report = normalize(&json!({
            "vitals": {},
            "riskAttribution": [
                {"ticker": "KO", "weight": 0.1, "pctRisk": 0.05, "mctr": 0.01},
                {"ticker": "NVDA", "weight": 0.2, "pctRisk": 0.5, "mctr": 0.04}
            ]
        }))
        .unwrap();
        assert_eq!(report.active_risks[0].ticker, "NVDA");
        assert_eq!(report.active_risks[1].ticker, "KO");
    }

    #[test]
    fn test_stress_tests_mapping_and_array() {
        let from_map = normalize(&json!({
            "vitals": {},
            "stressTests": {"2008 Crisis": -0.35, "Rate Shock": -0.08}
        }))
        .unwrap();
        assert_eq!(from_map.stress_tests.len(), 2);
        assert_eq!(from_map.stress_tests[0].scenario, "2008 Crisis");
        assert_eq!(from_map.stress_tests[0].impact, Some(-0.35));

        let from_array = normalize(&json!({
            "vitals": {},
            "stressTests": [{"scenario": "Covid", "impact": null}]
        }))
        .unwrap();
        assert_eq!(from_array.stress_tests[0].scenario, "Covid");
        assert!(from_array.stress_tests[0].impact.is_none());
    }

    #[test]
    fn test_wrongly_shaped_field_names_external_key() {
        let err = normalize(&json!({"vitals": {}, "history": "yesterday"})).unwrap_err();
        match err {
            SchemaError::InvalidField { field, .. } => assert_eq!(field, "history"),
            other => panic!("Unexpected error: {other:?}"),
        }

        let err = normalize(&json!({"vitals": {}, "riskAttribution": 42})).unwrap_err();
        match err {
            SchemaError::InvalidField { field, .. } => assert_eq!(field, "riskAttribution"),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_periodic_returns_and_advisory_error() {
        let report = normalize(&json!({
            "vitals": {"currencyExposure": {"USD": 0.7, "PLN": 0.3}},
            "periodicReturns": [
                {"ticker": "CDR.WA", "ytd": -0.12, "r1m": null, "r1y": 0.2, "r5y": null,
                 "ytdContribution": -0.006, "weight": 0.05, "direction": "Long"}
            ],
            "error": "Partial data: MSCI benchmark unavailable"
        }))
        .unwrap();

        let row = &report.periodic_returns[0];
        assert_eq!(row.ticker, "CDR.WA");
        assert_eq!(row.direction, Some(Direction::Long));
        assert!(row.r1m.is_none());
        assert_eq!(
            report.error.as_deref(),
            Some("Partial data: MSCI benchmark unavailable")
        );
        let currencies: Vec<&String> = report.vitals.currency_exposure.keys().collect();
        assert_eq!(currencies, vec!["USD", "PLN"]);
    }

    #[test]
    fn test_correlation_matrix_validation() {
        let report = normalize(&json!({
            "vitals": {},
            "volumeWeightedCorrelation": {
                "tickers": ["A", "B"],
                "matrix": [[1.0, 0.4], [0.4, 1.0]]
            }
        }))
        .unwrap();
        assert!(report.correlation_matrix.is_some());

        let empty = normalize(&json!({
            "vitals": {},
            "volumeWeightedCorrelation": {"tickers": [], "matrix": []}
        }))
        .unwrap();
        assert!(empty.correlation_matrix.is_none());

        let ragged = normalize(&json!({
            "vitals": {},
            "volumeWeightedCorrelation": {"tickers": ["A", "B"], "matrix": [[1.0, 0.4]]}
        }))
        .unwrap();
        assert!(ragged.correlation_matrix.is_none());
    }

    #[test]
    fn test_field_map_covers_every_field_once() {
        let all = [
            ReportField::Vitals,
            ReportField::Leverage,
            ReportField::ActiveRisks,
            ReportField::StressTests,
            ReportField::PeriodicReturns,
            ReportField::MonteCarlo,
            ReportField::History,
            ReportField::YtdHistory,
            ReportField::CorrelationMatrix,
            ReportField::Error,
        ];
        assert_eq!(FIELD_MAP.len(), all.len());
        for field in all {
            assert_eq!(
                FIELD_MAP.iter().filter(|(_, f)| *f == field).count(),
                1,
                "{field:?}"
            );
        }
    }

    #[test]
    fn test_malformed_cell_blanks_only_that_cell() {
        let report = normalize(&json!({
            "vitals": {"beta": 1.1},
            "periodicReturns": [
                {"ticker": "AAPL", "ytd": 0.1},
                {"ticker": "MSFT", "ytd": "n/a", "r1y": 0.25}
            ]
        }))
        .unwrap();

        assert_eq!(report.periodic_returns.len(), 2);
        let msft = &report.periodic_returns[1];
        assert_eq!(msft.ticker, "MSFT");
        assert!(msft.ytd.is_none());
        assert_eq!(msft.r1y, Some(0.25));
    }

    #[test]
    fn test_non_numeric_vital_is_missing() {
        let report = normalize(&json!({"vitals": {"sharpe": "NaN", "beta": 1.1}})).unwrap();
        assert!(report.vitals.sharpe.is_none());
        assert_eq!(report.vitals.beta, Some(1.1));
    }

    #[test]
    fn test_partial_period_info_keeps_defaults() {
        let report = normalize(&json!({
            "vitals": {"periodInfo": {"Start_Date": "2021-01-04", "Years": "?"}}
        }))
        .unwrap();
        let period = &report.vitals.period_info;
        assert_eq!(period.start_date, "2021-01-04");
        assert_eq!(period.end_date, "N/A");
        assert_eq!(period.years, 0.0);

        let report = normalize(&json!({"vitals": {"periodInfo": "last 5y"}})).unwrap();
        assert_eq!(report.vitals.period_info, PeriodInfo::default());
    }

    #[test]
    fn test_unusable_shares_are_dropped() {
        let report = normalize(&json!({
            "vitals": {
                "currencyExposure": {"EUR": null, "USD": 0.8, "PLN": "0.2"},
                "fxWatchlist": ["EURUSD=X"]
            }
        }))
        .unwrap();
        let currencies: Vec<&String> = report.vitals.currency_exposure.keys().collect();
        assert_eq!(currencies, vec!["USD"]);
        assert!(report.vitals.fx_watchlist.is_empty());
    }

    #[test]
    fn test_unreadable_rows_are_dropped_individually() {
        let report = normalize(&json!({
            "vitals": {},
            "periodicReturns": [{"ytd": 0.1}, {"ticker": "KO", "ytd": 0.02}],
            "monteCarlo": [{"day": "end"}, {"day": 252, "p50": 104.0}],
            "riskAttribution": {"AAPL": "high", "KO": {"Pct_Risk": "?", "Weight": 0.1}}
        }))
        .unwrap();

        assert_eq!(report.periodic_returns.len(), 1);
        assert_eq!(report.periodic_returns[0].ticker, "KO");
        assert_eq!(report.monte_carlo.len(), 1);
        assert_eq!(report.monte_carlo[0].day, 252);
        assert_eq!(report.active_risks.len(), 1);
        assert!(report.active_risks[0].pct_risk.is_none());
        assert_eq!(report.active_risks[0].weight, Some(0.1));
    }

    #[test]
    fn test_malformed_impacts_and_correlations_degrade_per_cell() {
        let report = normalize(&json!({
            "vitals": {},
            "stressTests": {"2008 Crisis": "severe", "Rate Shock": -0.08},
            "volumeWeightedCorrelation": {
                "tickers": ["A", "B"],
                "matrix": [[1.0, "x"], [0.4, 1.0]]
            }
        }))
        .unwrap();

        assert!(report.stress_tests[0].impact.is_none());
        assert_eq!(report.stress_tests[1].impact, Some(-0.08));
        let matrix = report.correlation_matrix.unwrap();
        assert_eq!(matrix.get(0, 1), None);
        assert_eq!(matrix.get(1, 0), Some(0.4));
    }
}
