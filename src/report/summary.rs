//! Prediction summary report

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::PredictionReport;

/// Render the prediction counts as a styled table.
pub fn summary_table(report: &PredictionReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    table.add_row(vec![Cell::new("📁 Input Rows"), Cell::new(report.total_rows)]);

    table.add_row(vec![
        Cell::new("🗑️  Unscored (Missing)"),
        Cell::new(report.dropped_rows.len()).fg(if report.dropped_rows.is_empty() {
            Color::White
        } else {
            Color::Yellow
        }),
    ]);

    table.add_row(vec![
        Cell::new("🚩 Fraud (Y)"),
        Cell::new(report.fraud_count)
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    ]);

    table.add_row(vec![
        Cell::new("✅ Valid (N)"),
        Cell::new(report.valid_count)
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
    ]);

    let fraud_pct = if report.scored_rows > 0 {
        (report.fraud_count as f64 / report.scored_rows as f64) * 100.0
    } else {
        0.0
    };

    table.add_row(vec![
        Cell::new("📈 Fraud Rate"),
        Cell::new(format!("{:.1}%", fraud_pct)).fg(Color::Cyan),
    ]);

    table
}

/// Print the summary table and any unscored rows.
pub fn display_summary(report: &PredictionReport) {
    println!();
    println!(
        "    {} {}",
        style("📋").cyan(),
        style("PREDICTION SUMMARY").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    // Indent the table
    for line in summary_table(report).to_string().lines() {
        println!("    {}", line);
    }

    if !report.dropped_rows.is_empty() {
        println!();
        println!(
            "      {} {}:",
            style("Unscored rows").yellow(),
            style(format!("({})", report.dropped_rows.len())).dim()
        );
        // Rows are reported one-based to match spreadsheet numbering.
        let rows: Vec<String> = report
            .dropped_rows
            .iter()
            .map(|r| (r + 1).to_string())
            .collect();
        println!("        {} {}", style("•").dim(), rows.join(", "));
    }
}
