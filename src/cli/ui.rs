use crate::core::buckets::Bucket;
use crate::core::error::ReportError;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Shown in place of any value that is absent or cannot be formatted.
pub const PLACEHOLDER: &str = "—";

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Positive,
    Negative,
    Warning,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Positive => style(text).green().bold(),
        StyleType::Negative => style(text).red().bold(),
        StyleType::Warning => style(text).yellow(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Styles a signed value green when non-negative and red otherwise.
pub fn style_signed(text: &str, value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) if v >= 0.0 => style_text(text, StyleType::Positive),
        Some(_) => style_text(text, StyleType::Negative),
        None => style_text(text, StyleType::Subtle),
    }
}

/// Formats a fraction as a percentage, e.g. `0.0512` as `5.12%`.
pub fn format_percent(value: Option<f64>, decimals: usize) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{:.*}%", decimals, v * 100.0),
        None => PLACEHOLDER.to_string(),
    }
}

/// Like [`format_percent`] with an explicit `+` on gains.
pub fn format_signed_percent(value: Option<f64>, decimals: usize) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) if v > 0.0 => format!("+{}", format_percent(Some(v), decimals)),
        _ => format_percent(value, decimals),
    }
}

pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{v:.decimals$}"),
        None => PLACEHOLDER.to_string(),
    }
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right-aligned numeric cell.
pub fn value_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Creates a cell for displaying a signed percentage with color coding.
pub fn change_cell(value: Option<f64>, decimals: usize) -> Cell {
    let cell = value_cell(format_signed_percent(value, decimals));
    match value.filter(|v| v.is_finite()) {
        Some(v) if v >= 0.0 => cell.fg(Color::Green),
        Some(_) => cell.fg(Color::Red),
        None => cell.fg(Color::DarkGrey),
    }
}

/// Background and foreground colours for a heatmap bucket.
pub fn bucket_colors(bucket: Bucket) -> (Option<Color>, Color) {
    let rgb = |r, g, b| Some(Color::Rgb { r, g, b });
    match bucket {
        Bucket::NoData => (None, Color::DarkGrey),
        Bucket::SelfCorrelation => (rgb(6, 78, 59), Color::Green),
        Bucket::StrongPositive | Bucket::DeepGain => (rgb(6, 78, 59), Color::White),
        Bucket::ModeratePositive | Bucket::LargeGain => (rgb(4, 120, 87), Color::White),
        Bucket::WeakPositive | Bucket::ModerateGain => (rgb(5, 150, 105), Color::White),
        Bucket::SmallGain => (rgb(16, 185, 129), Color::Black),
        Bucket::NearZero => (None, Color::Grey),
        Bucket::Zero => (rgb(55, 65, 81), Color::Grey),
        Bucket::SmallLoss => (rgb(239, 68, 68), Color::Black),
        Bucket::WeakNegative | Bucket::ModerateLoss => (rgb(220, 38, 38), Color::White),
        Bucket::ModerateNegative | Bucket::LargeLoss => (rgb(185, 28, 28), Color::White),
        Bucket::StrongNegative | Bucket::DeepLoss => (rgb(127, 29, 29), Color::White),
    }
}

/// A right-aligned cell painted with its bucket's colours.
pub fn bucket_cell(text: String, bucket: Bucket) -> Cell {
    let (background, foreground) = bucket_colors(bucket);
    let mut cell = value_cell(text).fg(foreground);
    if let Some(background) = background {
        cell = cell.bg(background);
    }
    if bucket == Bucket::SelfCorrelation {
        cell = cell.add_attribute(Attribute::Bold);
    }
    cell
}

/// Spinner shown while fetch attempts are outstanding.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Warning line for an advisory message the server sent alongside its data.
pub fn advisory_banner(message: &str) -> String {
    format!(
        "{} {}",
        style_text("⚠ Server notice:", StyleType::Warning),
        style_text(message, StyleType::Warning)
    )
}

/// The panel printed when a refresh cycle fails for good.
pub fn failure_panel(error: &ReportError, endpoint: &str, retry_hint: &str) -> String {
    let detail = match error {
        ReportError::Unreachable(_) => {
            "Failed to connect to the risk service. Please check that the server is running."
                .to_string()
        }
        ReportError::BadResponse(schema) => {
            format!("The risk service answered, but the report is unusable: {schema}")
        }
    };

    let mut output = format!(
        "{}\n\n{}\n{}\n\n{}\n",
        style_text(&format!("✖ Dashboard Error: {}", error.headline()), StyleType::Title),
        style_text(&detail, StyleType::Error),
        style_text(&error.to_string(), StyleType::Subtle),
        style_text(retry_hint, StyleType::Label),
    );
    output.push_str("\nTroubleshooting:\n");
    for tip in [
        "Ensure the risk backend is running".to_string(),
        "Check for errors in the backend console".to_string(),
        format!("Verify {endpoint} responds in a browser or with curl"),
    ] {
        output.push_str(&format!("  • {tip}\n"));
    }
    output
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}
