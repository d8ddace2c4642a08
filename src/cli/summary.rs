use super::ui;
use crate::core::ReportSource;
use crate::core::config::DisplayConfig;
use crate::core::dashboard::FetchPolicy;
use crate::core::exposure::{preview, rank};
use crate::core::report::{Regime, Report};
use anyhow::Result;
use comfy_table::Cell;

/// The top-N currencies inline, the rest collapsed into `+N`.
pub fn fx_preview_line(report: &Report, n: usize) -> String {
    let ranked = rank(&report.vitals.currency_exposure);
    if ranked.is_empty() {
        return ui::PLACEHOLDER.to_string();
    }
    let (shown, remaining) = preview(&ranked, n);
    let mut parts: Vec<String> = shown
        .iter()
        .map(|(currency, share)| format!("{currency} {}", ui::format_percent(Some(*share), 0)))
        .collect();
    if remaining > 0 {
        parts.push(format!("+{remaining}"));
    }
    parts.join("  ")
}

fn regime_text(report: &Report) -> String {
    match report.vitals.regime() {
        Some(regime @ Regime::Aggressive) => {
            ui::style_text(&regime.to_string(), ui::StyleType::Negative)
        }
        Some(regime @ Regime::Defensive) => {
            ui::style_text(&regime.to_string(), ui::StyleType::Positive)
        }
        None => ui::PLACEHOLDER.to_string(),
    }
}

impl Report {
    pub fn display_summary(&self, display: &DisplayConfig) -> String {
        let v = &self.vitals;
        let mut output = format!(
            "{}\n{}\n\n",
            ui::style_text("Risk Dashboard", ui::StyleType::Title),
            ui::style_text(
                &format!(
                    "Live quantitative analysis, as of {}",
                    self.as_of().unwrap_or(ui::PLACEHOLDER)
                ),
                ui::StyleType::Subtle
            )
        );

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Metric"),
            ui::header_cell("Portfolio"),
            ui::header_cell("Benchmark"),
        ]);
        table.add_row(vec![
            Cell::new("YTD Return"),
            ui::change_cell(v.ytd_return, 2),
            ui::value_cell(format!(
                "SPY {}  MSCI {}",
                ui::format_signed_percent(v.benchmark_ytd, 2),
                ui::format_signed_percent(v.msci_ytd, 2)
            )),
        ]);
        table.add_row(vec![
            Cell::new("YTD Return (PLN)"),
            ui::change_cell(v.ytd_return_pln, 2),
            ui::value_cell(format!("WIG {}", ui::format_signed_percent(v.wig_ytd, 2))),
        ]);
        table.add_row(vec![
            Cell::new("Jensen's Alpha (YTD)"),
            ui::change_cell(v.ytd_alpha, 2),
            ui::value_cell(String::new()),
        ]);
        table.add_row(vec![
            Cell::new("YTD Sharpe"),
            ui::value_cell(ui::format_number(v.ytd_sharpe, 2)),
            ui::value_cell(format!(
                "{} (hist {})",
                ui::format_number(v.benchmark_ytd_sharpe, 2),
                ui::format_number(v.benchmark_hist_sharpe, 2)
            )),
        ]);
        table.add_row(vec![
            Cell::new("YTD Max Drawdown"),
            ui::change_cell(v.ytd_max_drawdown, 2),
            ui::value_cell(ui::format_percent(v.benchmark_ytd_max_drawdown, 2)),
        ]);
        table.add_row(vec![
            Cell::new("YTD Beta"),
            ui::value_cell(ui::format_number(v.ytd_beta, 2)),
            ui::value_cell(regime_text(self)),
        ]);
        output.push_str(&table.to_string());

        output.push_str(&format!(
            "\n\n{} Long {}  Short {}   {} Longs {}  Shorts {}\n{} {}\n",
            ui::style_text("Exposure:", ui::StyleType::Label),
            ui::format_percent(self.leverage.long_exposure, 1),
            ui::format_percent(self.leverage.short_exposure, 1),
            ui::style_text("YTD Contribution:", ui::StyleType::Label),
            ui::style_signed(
                &ui::format_signed_percent(v.ytd_longs_contrib, 2),
                v.ytd_longs_contrib
            ),
            ui::style_signed(
                &ui::format_signed_percent(v.ytd_shorts_contrib, 2),
                v.ytd_shorts_contrib
            ),
            ui::style_text("FX Exposure:", ui::StyleType::Label),
            fx_preview_line(self, display.exposure_preview),
        ));

        let mut hist = ui::new_styled_table();
        hist.set_header(vec![ui::header_cell("Historical"), ui::header_cell("Value")]);
        for (label, value) in [
            ("Annual Return", ui::format_percent(v.annual_return, 2)),
            ("Annual Volatility", ui::format_percent(v.annual_vol, 2)),
            ("Sharpe", ui::format_number(v.sharpe, 2)),
            ("Sortino", ui::format_number(v.sortino, 2)),
            ("Max Drawdown", ui::format_percent(v.max_drawdown, 2)),
            ("CVaR 95%", ui::format_percent(v.cvar_95, 2)),
            ("Beta", ui::format_number(v.beta, 2)),
            ("Jensen's Alpha", ui::format_percent(v.jensens_alpha, 2)),
            (
                "1M Volatility",
                format!(
                    "{} (bench {})",
                    ui::format_percent(v.rolling_1m_vol, 2),
                    ui::format_percent(v.rolling_1m_vol_benchmark, 2)
                ),
            ),
        ] {
            hist.add_row(vec![Cell::new(label), ui::value_cell(value)]);
        }
        output.push('\n');
        output.push_str(&hist.to_string());

        let period = &v.period_info;
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!(
                    "Period: {} to {} ({:.1} years)",
                    period.start_date, period.end_date, period.years
                ),
                ui::StyleType::Subtle
            )
        ));
        output
    }
}

pub async fn run(
    source: &(dyn ReportSource + Send + Sync),
    policy: FetchPolicy,
    display: &DisplayConfig,
    force: bool,
) -> Result<()> {
    let report = super::fetch_report(source, policy, force).await?;
    super::print_advisory(&report);
    println!("{}", report.display_summary(display));
    Ok(())
}
