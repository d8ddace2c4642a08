pub mod correlation;
pub mod exposure;
pub mod returns;
pub mod risk;
pub mod setup;
pub mod status;
pub mod summary;
pub mod ui;
pub mod watch;

use crate::core::dashboard::{FetchPolicy, load_report};
use crate::core::{Report, ReportSource};
use anyhow::Result;

pub const ONE_SHOT_RETRY_HINT: &str = "Run the command again, with --force to bypass caches.";

/// Runs one refresh cycle behind a spinner. A failed cycle prints the
/// failure panel and comes back as an error so the process exits non-zero.
pub async fn fetch_report(
    source: &(dyn ReportSource + Send + Sync),
    policy: FetchPolicy,
    force: bool,
) -> Result<Report> {
    let pb = ui::new_spinner("Running risk engine...");
    let outcome = load_report(source, policy, force).await;
    pb.finish_and_clear();

    match outcome {
        Ok(report) => Ok(report),
        Err(e) => {
            println!(
                "{}",
                ui::failure_panel(&e, &source.describe(), ONE_SHOT_RETRY_HINT)
            );
            Err(e.into())
        }
    }
}

/// Prints the server's advisory message, if it sent one alongside data.
pub fn print_advisory(report: &Report) {
    if let Some(message) = &report.error {
        println!("{}\n", ui::advisory_banner(message));
    }
}
