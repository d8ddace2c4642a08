use super::ui;
use crate::core::ReportSource;
use crate::core::buckets::{BucketKind, classify};
use crate::core::dashboard::FetchPolicy;
use crate::core::report::{Direction, PeriodicReturn, Report};
use crate::core::sort::{SortDirection, SortKey, SortState};
use anyhow::Result;
use comfy_table::{Cell, Color};

fn ticker_label(row: &PeriodicReturn) -> String {
    match row.direction {
        Some(Direction::Long) => format!("↗ {}", row.ticker),
        Some(Direction::Short) => format!("↘ {}", row.ticker),
        None => format!("  {}", row.ticker),
    }
}

fn header(key: SortKey, sort: &SortState) -> Cell {
    if key != sort.key {
        return ui::header_cell(&key.to_string());
    }
    let arrow = match sort.direction {
        SortDirection::Ascending => "▲",
        SortDirection::Descending => "▼",
    };
    ui::header_cell(&format!("{key} {arrow}"))
}

fn heat_cell(value: Option<f64>, decimals: usize) -> Cell {
    ui::bucket_cell(
        ui::format_signed_percent(value, decimals),
        classify(value, BucketKind::PeriodicReturn),
    )
}

/// Returns heatmap, rows ordered by `sort`.
pub fn display_returns(report: &Report, sort: &SortState) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Periodic Returns", ui::StyleType::Title)
    );

    if report.periodic_returns.is_empty() {
        output.push_str(&ui::style_text(
            "No holdings in this report.",
            ui::StyleType::Subtle,
        ));
        return output;
    }

    let mut table = ui::new_styled_table();
    table.set_header(SortKey::ALL.iter().map(|key| header(*key, sort)));

    for row in sort.apply(&report.periodic_returns) {
        let contribution = ui::change_cell(row.ytd_contribution, 2);
        table.add_row(vec![
            Cell::new(ticker_label(&row)).fg(Color::White),
            contribution,
            heat_cell(row.ytd, 1),
            heat_cell(row.r1m, 1),
            heat_cell(row.r1y, 1),
            heat_cell(row.r5y, 1),
        ]);
    }
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n{}",
        ui::style_text(
            "↗ long  ↘ short   YTD Contrib = weight × YTD return × direction",
            ui::StyleType::Subtle
        )
    ));
    output
}

pub async fn run(
    source: &(dyn ReportSource + Send + Sync),
    policy: FetchPolicy,
    sort: SortState,
    force: bool,
) -> Result<()> {
    let report = super::fetch_report(source, policy, force).await?;
    super::print_advisory(&report);
    println!("{}", display_returns(&report, &sort));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::normalize;
    use serde_json::json;

    fn report() -> Report {
        normalize(&json!({
            "vitals": {},
            "periodicReturns": [
                {"ticker": "MSFT", "ytd": 0.12, "ytdContribution": 0.012, "direction": "Long"},
                {"ticker": "TSLA", "ytd": -0.2, "ytdContribution": 0.01, "direction": "Short"},
                {"ticker": "NVDA", "ytd": null, "r1m": 0.03}
            ]
        }))
        .unwrap()
    }

    fn row_order(output: &str, tickers: &[&str]) -> Vec<usize> {
        tickers
            .iter()
            .map(|t| output.find(&format!(" {t}")).unwrap())
            .collect()
    }

    #[test]
    fn test_default_order_is_contribution_descending() {
        let output = display_returns(&report(), &SortState::default());
        let positions = row_order(&output, &["MSFT", "TSLA", "NVDA"]);
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(output.contains("YTD Contrib ▼"));
    }

    #[test]
    fn test_ascending_ticker_order() {
        let sort = SortState {
            key: SortKey::Ticker,
            direction: SortDirection::Ascending,
        };
        let output = display_returns(&report(), &sort);
        let positions = row_order(&output, &["MSFT", "NVDA", "TSLA"]);
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(output.contains("Ticker ▲"));
    }

    #[test]
    fn test_cells_render_signs_arrows_and_placeholders() {
        let output = display_returns(&report(), &SortState::default());
        assert!(output.contains("↗ MSFT"));
        assert!(output.contains("↘ TSLA"));
        assert!(output.contains("+12.0%"));
        assert!(output.contains("-20.0%"));
        assert!(output.contains("+1.20%"));
        assert!(output.contains(ui::PLACEHOLDER));
    }

    #[test]
    fn test_empty_returns() {
        let report = normalize(&json!({"vitals": {}})).unwrap();
        let output = display_returns(&report, &SortState::default());
        assert!(output.contains("No holdings"));
    }
}
