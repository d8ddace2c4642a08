use super::ui;
use crate::core::ReportSource;
use crate::core::dashboard::FetchPolicy;
use crate::core::report::Report;
use anyhow::Result;
use comfy_table::Cell;

impl Report {
    pub fn display_risk(&self) -> String {
        let mut output = format!(
            "{}\n\n",
            ui::style_text("Risk Attribution", ui::StyleType::Title)
        );

        if self.active_risks.is_empty() {
            output.push_str(&ui::style_text("No attribution data.", ui::StyleType::Subtle));
        } else {
            let mut table = ui::new_styled_table();
            table.set_header(vec![
                ui::header_cell("Ticker"),
                ui::header_cell("Weight"),
                ui::header_cell("% of Risk"),
                ui::header_cell("MCTR"),
            ]);
            for row in &self.active_risks {
                table.add_row(vec![
                    Cell::new(&row.ticker),
                    ui::value_cell(ui::format_percent(row.weight, 2)),
                    ui::value_cell(ui::format_percent(row.pct_risk, 2)),
                    ui::value_cell(ui::format_number(row.mctr, 4)),
                ]);
            }
            output.push_str(&table.to_string());
        }

        output.push_str(&format!(
            "\n\n{}\n\n",
            ui::style_text("Stress Tests", ui::StyleType::Title)
        ));
        if self.stress_tests.is_empty() {
            output.push_str(&ui::style_text("No stress scenarios.", ui::StyleType::Subtle));
        } else {
            let mut table = ui::new_styled_table();
            table.set_header(vec![ui::header_cell("Scenario"), ui::header_cell("Impact")]);
            for test in &self.stress_tests {
                table.add_row(vec![Cell::new(&test.scenario), ui::change_cell(test.impact, 2)]);
            }
            output.push_str(&table.to_string());
        }

        let lev = &self.leverage;
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Long"),
            ui::header_cell("Short"),
            ui::header_cell("Gross"),
            ui::header_cell("Net"),
            ui::header_cell("Daily Drag"),
        ]);
        table.add_row(vec![
            ui::value_cell(ui::format_percent(lev.long_exposure, 1)),
            ui::value_cell(ui::format_percent(lev.short_exposure, 1)),
            ui::value_cell(ui::format_percent(lev.gross_exposure, 1)),
            ui::value_cell(ui::format_percent(lev.net_exposure, 1)),
            ui::value_cell(ui::format_percent(lev.daily_drag, 4)),
        ]);
        output.push_str(&format!(
            "\n\n{}\n\n{}",
            ui::style_text("Leverage", ui::StyleType::Title),
            table
        ));

        output.push_str(&format!(
            "\n\n{}\n",
            ui::style_text("Monte Carlo", ui::StyleType::Title)
        ));
        match self.monte_carlo.last() {
            Some(end) => output.push_str(&format!(
                "Day {}: worst 5% {}  median {}  best 5% {}",
                end.day,
                ui::format_number(end.p05, 2),
                ui::format_number(end.p50, 2),
                ui::format_number(end.p95, 2)
            )),
            None => output.push_str(&ui::style_text("No simulation data.", ui::StyleType::Subtle)),
        }
        output
    }
}

pub async fn run(
    source: &(dyn ReportSource + Send + Sync),
    policy: FetchPolicy,
    force: bool,
) -> Result<()> {
    let report = super::fetch_report(source, policy, force).await?;
    super::print_advisory(&report);
    println!("{}", report.display_risk());
    Ok(())
}
