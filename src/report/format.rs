//! Plain-text layout of the update report.
//!
//! Kept separate from the counting so layout changes stay local.

use crate::report::ReportSummary;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_report(summary: &ReportSummary) -> String {
    let mut out = String::new();

    out.push_str("ROI DATA UPDATE REPORT\n");
    out.push_str(&format!("Generated: {}\n", summary.generated_at.format(TIMESTAMP_FORMAT)));
    out.push('\n');

    out.push_str(&format!("Window: last {} days ({} rows stored)\n", summary.window_days, summary.total_rows));
    out.push_str(&format!("Recent Updates: {}\n", summary.recent));
    out.push_str(&format!("Pending Validation: {}\n", summary.pending));
    out.push('\n');

    out.push_str("Summary by Product:\n");
    for (product, count) in &summary.by_product {
        out.push_str(&format!("{}: {} {}\n", product.display_name(), count, updates(*count)));
    }
    out.push('\n');

    out.push_str("Summary by Business Model:\n");
    for (model, count) in &summary.by_model {
        out.push_str(&format!("{}: {} {}\n", model.display_name(), count, updates(*count)));
    }

    out
}

fn updates(count: usize) -> &'static str {
    if count == 1 { "update" } else { "updates" }
}
