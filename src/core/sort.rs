//! Ordering of the per-instrument returns table.

use crate::core::report::PeriodicReturn;
use anyhow::anyhow;
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Ticker,
    Ytd,
    YtdContribution,
    OneMonth,
    OneYear,
    FiveYears,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::Ticker,
        SortKey::YtdContribution,
        SortKey::Ytd,
        SortKey::OneMonth,
        SortKey::OneYear,
        SortKey::FiveYears,
    ];

    /// Numeric value of `row` for this key. `None` for [`SortKey::Ticker`].
    pub fn value(&self, row: &PeriodicReturn) -> Option<f64> {
        match self {
            SortKey::Ticker => None,
            SortKey::Ytd => row.ytd,
            SortKey::YtdContribution => row.ytd_contribution,
            SortKey::OneMonth => row.r1m,
            SortKey::OneYear => row.r1y,
            SortKey::FiveYears => row.r5y,
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SortKey::Ticker => "Ticker",
                SortKey::Ytd => "YTD",
                SortKey::YtdContribution => "YTD Contrib",
                SortKey::OneMonth => "1M",
                SortKey::OneYear => "1Y",
                SortKey::FiveYears => "5Y",
            }
        )
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ticker" => Ok(SortKey::Ticker),
            "ytd" => Ok(SortKey::Ytd),
            "contrib" | "ytdcontribution" | "ytd-contribution" => Ok(SortKey::YtdContribution),
            "1m" | "r1m" => Ok(SortKey::OneMonth),
            "1y" | "r1y" => Ok(SortKey::OneYear),
            "5y" | "r5y" => Ok(SortKey::FiveYears),
            _ => Err(anyhow!("Invalid sort key: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// The column a table is sorted by, as driven by header selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        SortState {
            key: SortKey::YtdContribution,
            direction: SortDirection::Descending,
        }
    }
}

impl SortState {
    /// Selecting the active key flips the direction; any other key becomes
    /// active in descending order.
    pub fn select(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Descending;
        }
    }

    pub fn apply(&self, rows: &[PeriodicReturn]) -> Vec<PeriodicReturn> {
        sort_rows(rows, self.key, self.direction)
    }
}

/// Compares two optional numbers. Present values follow `direction`; absent
/// values sort after every present value in either direction.
pub fn compare_values(a: Option<f64>, b: Option<f64>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match direction {
            SortDirection::Ascending => a.total_cmp(&b),
            SortDirection::Descending => b.total_cmp(&a),
        },
    }
}

/// Case-insensitive ticker order: Unicode lowercase, compared by code point,
/// with a byte-order tie-break so the result is total. This is not locale
/// collation; accented letters sort after `z` (`"Äb"` comes after `"Z"`).
fn compare_tickers(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Returns a stably sorted copy of `rows`.
pub fn sort_rows(
    rows: &[PeriodicReturn],
    key: SortKey,
    direction: SortDirection,
) -> Vec<PeriodicReturn> {
    let mut sorted = rows.to_vec();
    match key {
        SortKey::Ticker => sorted.sort_by(|a, b| {
            let ordering = compare_tickers(&a.ticker, &b.ticker);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        }),
        _ => sorted.sort_by(|a, b| compare_values(key.value(a), key.value(b), direction)),
    }
    sorted
}
