use super::ui;
use crate::core::ReportSource;
use crate::core::dashboard::FetchPolicy;
use crate::core::exposure::rank;
use crate::core::report::Report;
use anyhow::Result;
use comfy_table::Cell;

const BAR_WIDTH: f64 = 20.0;

/// `EURUSD=X` as quoted by the market data feed, shown as `EURUSD`.
pub fn display_pair(pair: &str) -> &str {
    pair.strip_suffix("=X").unwrap_or(pair)
}

fn share_bar(share: f64) -> String {
    let filled = (share.clamp(0.0, 1.0) * BAR_WIDTH).round() as usize;
    "█".repeat(filled)
}

pub fn display_exposure(report: &Report) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Currency Exposure", ui::StyleType::Title)
    );

    let ranked = rank(&report.vitals.currency_exposure);
    if ranked.is_empty() {
        output.push_str(&ui::style_text("No currency exposure.", ui::StyleType::Subtle));
    } else {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell("Share"),
            ui::header_cell(""),
        ]);
        for (currency, share) in &ranked {
            table.add_row(vec![
                Cell::new(currency),
                ui::value_cell(ui::format_percent(Some(*share), 1)),
                Cell::new(share_bar(*share)),
            ]);
        }
        output.push_str(&table.to_string());
    }

    output.push_str(&format!(
        "\n\n{}\n\n",
        ui::style_text("FX Watchlist (YTD)", ui::StyleType::Title)
    ));
    if report.vitals.fx_watchlist.is_empty() {
        output.push_str(&ui::style_text("No FX pairs tracked.", ui::StyleType::Subtle));
    } else {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Pair"), ui::header_cell("YTD")]);
        for (pair, ytd) in &report.vitals.fx_watchlist {
            table.add_row(vec![
                Cell::new(display_pair(pair)),
                ui::change_cell(Some(*ytd), 2),
            ]);
        }
        output.push_str(&table.to_string());
    }
    output
}

pub async fn run(
    source: &(dyn ReportSource + Send + Sync),
    policy: FetchPolicy,
    force: bool,
) -> Result<()> {
    let report = super::fetch_report(source, policy, force).await?;
    super::print_advisory(&report);
    println!("{}", display_exposure(&report));
    Ok(())
}
