//! Canonical risk report types.
//!
//! Every value here is produced by [`crate::core::normalize::normalize`] and is
//! never patched afterwards: a refresh replaces the whole [`Report`].

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::Display;
use tracing::warn;

/// The raw JSON body returned by the metrics endpoint.
pub type RawPayload = serde_json::Value;

/// Reporting window of the backend's historical metrics. Keys that are
/// missing or malformed keep their `N/A` / `0` defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodInfo {
    #[serde(rename = "Start_Date", alias = "startDate", deserialize_with = "lenient_label")]
    pub start_date: String,
    #[serde(rename = "End_Date", alias = "endDate", deserialize_with = "lenient_label")]
    pub end_date: String,
    #[serde(rename = "Years", alias = "years", deserialize_with = "lenient_years")]
    pub years: f64,
}

impl Default for PeriodInfo {
    fn default() -> Self {
        PeriodInfo {
            start_date: "N/A".to_string(),
            end_date: "N/A".to_string(),
            years: 0.0,
        }
    }
}

/// Headline risk and return metrics.
///
/// The backend sends `null` for any metric it could not compute, so every
/// scalar is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Vitals {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub beta: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub annual_return: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub annual_vol: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sharpe: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sortino: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub max_drawdown: Option<f64>,
    #[serde(default, rename = "rolling1mVol", deserialize_with = "lenient_f64")]
    pub rolling_1m_vol: Option<f64>,
    #[serde(default, rename = "rolling1mVolBenchmark", deserialize_with = "lenient_f64")]
    pub rolling_1m_vol_benchmark: Option<f64>,
    #[serde(default, rename = "cvar95", deserialize_with = "lenient_f64")]
    pub cvar_95: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub jensens_alpha: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ytd_return: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ytd_alpha: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub benchmark_ytd: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ytd_beta: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ytd_max_drawdown: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub benchmark_ytd_max_drawdown: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ytd_sharpe: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub benchmark_ytd_sharpe: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub benchmark_hist_sharpe: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ytd_return_pln: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub wig_ytd: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub msci_ytd: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ytd_longs_contrib: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ytd_shorts_contrib: Option<f64>,
    /// Currency code to share of gross exposure, in server order.
    #[serde(deserialize_with = "lenient_shares")]
    pub currency_exposure: IndexMap<String, f64>,
    /// Currency pair to year-to-date return, in server order.
    #[serde(deserialize_with = "lenient_shares")]
    pub fx_watchlist: IndexMap<String, f64>,
    #[serde(deserialize_with = "lenient_or_default")]
    pub period_info: PeriodInfo,
}

/// Reads a metric cell. Anything but a JSON number counts as not computed,
/// so one bad value blanks one cell instead of failing the report.
pub(crate) fn metric(value: &Value) -> Option<f64> {
    match value {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        other => {
            warn!(value = %other, "Treating non-numeric metric as missing");
            None
        }
    }
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(metric(&Value::deserialize(deserializer)?))
}

fn lenient_years<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?.unwrap_or_default())
}

fn lenient_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(label) => label,
        Value::Null => "N/A".to_string(),
        other => {
            warn!(value = %other, "Treating non-string label as missing");
            "N/A".to_string()
        }
    })
}

/// Name-to-number mapping. Entries without a numeric value are dropped.
fn lenient_shares<'de, D>(deserializer: D) -> Result<IndexMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(entries) => Ok(entries
            .into_iter()
            .filter_map(|(name, value)| metric(&value).map(|share| (name, share)))
            .collect()),
        Value::Null => Ok(IndexMap::new()),
        other => {
            warn!(value = %other, "Ignoring malformed mapping");
            Ok(IndexMap::new())
        }
    }
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(T::deserialize(value).unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring malformed value");
        T::default()
    }))
}

fn lenient_matrix<'de, D>(deserializer: D) -> Result<Vec<Vec<Option<f64>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = Vec::<Vec<Value>>::deserialize(deserializer)?;
    Ok(rows
        .iter()
        .map(|row| row.iter().map(metric).collect())
        .collect())
}

/// Market regime implied by the year-to-date beta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Aggressive,
    Defensive,
}

impl Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Regime::Aggressive => write!(f, "Aggressive"),
            Regime::Defensive => write!(f, "Defensive"),
        }
    }
}

impl Vitals {
    pub fn regime(&self) -> Option<Regime> {
        self.ytd_beta.map(|beta| {
            if beta > 1.0 {
                Regime::Aggressive
            } else {
                Regime::Defensive
            }
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Leverage {
    #[serde(default, rename = "Long_Exp", alias = "longExp", deserialize_with = "lenient_f64")]
    pub long_exposure: Option<f64>,
    #[serde(default, rename = "Short_Exp", alias = "shortExp", deserialize_with = "lenient_f64")]
    pub short_exposure: Option<f64>,
    #[serde(default, rename = "Gross_Exp", alias = "grossExp", deserialize_with = "lenient_f64")]
    pub gross_exposure: Option<f64>,
    #[serde(default, rename = "Net_Exp", alias = "netExp", deserialize_with = "lenient_f64")]
    pub net_exposure: Option<f64>,
    #[serde(default, rename = "Daily_Drag", alias = "dailyDrag", deserialize_with = "lenient_f64")]
    pub daily_drag: Option<f64>,
}

/// One holding's share of portfolio risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAttribution {
    pub ticker: String,
    #[serde(default, alias = "Weight", deserialize_with = "lenient_f64")]
    pub weight: Option<f64>,
    #[serde(default, alias = "Pct_Risk", deserialize_with = "lenient_f64")]
    pub pct_risk: Option<f64>,
    #[serde(default, alias = "MCTR", deserialize_with = "lenient_f64")]
    pub mctr: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressTest {
    pub scenario: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub impact: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodicReturn {
    pub ticker: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub r1m: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub r1y: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub r5y: Option<f64>,
    // Part of the contract, but the backend emits null when the series is empty.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ytd: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ytd_contribution: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_direction")]
    pub direction: Option<Direction>,
}

/// Unknown direction labels are treated the same as a missing one.
fn lenient_direction<'de, D>(deserializer: D) -> Result<Option<Direction>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)?.as_str() {
        Some("Long") => Some(Direction::Long),
        Some("Short") => Some(Direction::Short),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloPoint {
    pub day: u32,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub p05: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub p50: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub p95: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub portfolio: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub benchmark: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub drawdown: Option<f64>,
}

/// Square matrix of pairwise correlations, rows and columns in `tickers` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub tickers: Vec<String>,
    #[serde(deserialize_with = "lenient_matrix")]
    pub matrix: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// True when the matrix is N×N for N tickers.
    pub fn is_square(&self) -> bool {
        let n = self.tickers.len();
        self.matrix.len() == n && self.matrix.iter().all(|row| row.len() == n)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.matrix.get(row).and_then(|r| r.get(col)).copied().flatten()
    }
}

/// A complete snapshot of the risk report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub vitals: Vitals,
    pub leverage: Leverage,
    /// Sorted descending by `pct_risk`.
    pub active_risks: Vec<RiskAttribution>,
    pub stress_tests: Vec<StressTest>,
    pub periodic_returns: Vec<PeriodicReturn>,
    pub monte_carlo: Vec<MonteCarloPoint>,
    pub history: Vec<HistoryPoint>,
    pub ytd_history: Vec<HistoryPoint>,
    pub correlation_matrix: Option<CorrelationMatrix>,
    /// Advisory message from the server, shown alongside the data.
    pub error: Option<String>,
}

impl Report {
    /// Date of the most recent history point, if any.
    pub fn as_of(&self) -> Option<&str> {
        self.history.last().map(|p| p.date.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periodic_return_with_unknown_direction() {
        let row: PeriodicReturn = serde_json::from_str(
            r#"{"ticker": "AAPL", "ytd": 0.1, "direction": "Sideways", "weight": null}"#,
        )
        .unwrap();
        assert_eq!(row.ticker, "AAPL");
        assert_eq!(row.ytd, Some(0.1));
        assert!(row.direction.is_none());
        assert!(row.r1m.is_none());
    }

    #[test]
    fn test_vitals_null_nested_fields_use_defaults() {
        let vitals: Vitals = serde_json::from_str(
            r#"{"beta": 1.1, "periodInfo": null, "fxWatchlist": null, "sharpe": null}"#,
        )
        .unwrap();
        assert_eq!(vitals.beta, Some(1.1));
        assert!(vitals.sharpe.is_none());
        assert_eq!(vitals.period_info, PeriodInfo::default());
        assert!(vitals.fx_watchlist.is_empty());
        assert!(vitals.currency_exposure.is_empty());
    }

    #[test]
    fn test_period_info_accepts_server_keys() {
        let vitals: Vitals = serde_json::from_str(
            r#"{"periodInfo": {"Start_Date": "2021-01-04", "End_Date": "2026-10-16", "Years": 5.8}}"#,
        )
        .unwrap();
        assert_eq!(vitals.period_info.start_date, "2021-01-04");
        assert_eq!(vitals.period_info.end_date, "2026-10-16");
        assert_eq!(vitals.period_info.years, 5.8);
    }

    #[test]
    fn test_vitals_regime() {
        let mut vitals = Vitals::default();
        assert!(vitals.regime().is_none());
        vitals.ytd_beta = Some(1.2);
        assert_eq!(vitals.regime(), Some(Regime::Aggressive));
        vitals.ytd_beta = Some(1.0);
        assert_eq!(vitals.regime(), Some(Regime::Defensive));
    }

    #[test]
    fn test_correlation_matrix_shape() {
        let matrix = CorrelationMatrix {
            tickers: vec!["A".to_string(), "B".to_string()],
            matrix: vec![vec![Some(1.0), Some(0.3)], vec![Some(0.3), None]],
        };
        assert!(matrix.is_square());
        assert_eq!(matrix.get(0, 1), Some(0.3));
        assert_eq!(matrix.get(1, 1), None);
        assert_eq!(matrix.get(5, 0), None);
    }
}
