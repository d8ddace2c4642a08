use super::ui;
use crate::core::ReportSource;
use crate::core::buckets::{BucketKind, classify};
use crate::core::dashboard::FetchPolicy;
use crate::core::report::{CorrelationMatrix, Report};
use anyhow::Result;
use comfy_table::Cell;

pub fn display_matrix(matrix: &CorrelationMatrix) -> String {
    let mut table = ui::new_styled_table();

    let mut header = vec![ui::header_cell("")];
    header.extend(matrix.tickers.iter().map(|t| ui::header_cell(t)));
    table.set_header(header);

    for (i, ticker) in matrix.tickers.iter().enumerate() {
        let mut row = vec![ui::header_cell(ticker)];
        for j in 0..matrix.tickers.len() {
            let value = matrix.get(i, j);
            row.push(ui::bucket_cell(
                ui::format_number(value, 2),
                classify(value, BucketKind::Correlation),
            ));
        }
        table.add_row(row);
    }
    table.to_string()
}

pub fn display_correlation(report: &Report) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Volume-Weighted Correlation", ui::StyleType::Title)
    );
    match &report.correlation_matrix {
        Some(matrix) => {
            output.push_str(&display_matrix(matrix));
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    "Green: move together  Red: move apart  Grey: unrelated",
                    ui::StyleType::Subtle
                )
            ));
        }
        None => output.push_str(&ui::style_text(
            "No correlation data in this report.",
            ui::StyleType::Subtle,
        )),
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
    println!("{}", display_correlation(&report));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::normalize;
    use serde_json::json;

    #[test]
    fn test_matrix_cells() {
        let report = normalize(&json!({
            "vitals": {},
            "volumeWeightedCorrelation": {
                "tickers": ["AAPL", "MSFT"],
                "matrix": [[1.0, 0.634], [0.634, null]]
            }
        }))
        .unwrap();

        let output = display_correlation(&report);
        assert!(output.contains("AAPL"));
        assert!(output.contains("1.00"));
        assert!(output.contains("0.63"));
        assert!(output.contains(ui::PLACEHOLDER));
    }

    #[test]
    fn test_missing_matrix() {
        let report = normalize(&json!({"vitals": {}})).unwrap();
        assert!(display_correlation(&report).contains("No correlation data"));
    }
}
