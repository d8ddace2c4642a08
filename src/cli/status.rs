use super::ui;
use crate::core::{ReportSource, ServiceStatus};
use anyhow::Result;

pub fn display_status(endpoint: &str, status: &ServiceStatus) -> String {
    let state = if status.is_ready() {
        ui::style_text(&status.state, ui::StyleType::Positive)
    } else {
        ui::style_text(&status.state, ui::StyleType::Warning)
    };
    format!(
        "{} {}\n{} {}\n{} {}",
        ui::style_text("Service:", ui::StyleType::Label),
        endpoint,
        ui::style_text("State:", ui::StyleType::Label),
        state,
        ui::style_text("Message:", ui::StyleType::Label),
        status.message
    )
}

pub async fn run(source: &(dyn ReportSource + Send + Sync)) -> Result<()> {
    let status = source.status().await?;
    println!("{}", display_status(&source.describe(), &status));
    Ok(())
}
