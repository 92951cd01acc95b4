use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{ModuleOutlook, RankedWorkItem};
use crate::outlook::{horizon_date, summarize_bands};

fn format_mark(value: Option<f64>) -> String {
    value
        .map(|mark| format!("{mark:.1}"))
        .unwrap_or_else(|| "n/a".to_string())
}

pub fn build_report(
    as_of: NaiveDate,
    horizon_days: i64,
    outlooks: &[ModuleOutlook],
    ranked: &[RankedWorkItem],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Module Grade & Priority Report");
    let _ = writeln!(
        output,
        "Generated on {} (work due through {})",
        as_of,
        horizon_date(as_of, horizon_days)
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Module Outlook");

    if outlooks.is_empty() {
        let _ = writeln!(output, "No modules loaded.");
    } else {
        for outlook in outlooks.iter() {
            let prediction = &outlook.prediction;
            let _ = writeln!(
                output,
                "- {} {}: obtained {:.1}, predicted {:.1}, {:.1}% remaining across {} graded of {} (target {}, needs {})",
                outlook.module_code,
                outlook.module_name,
                prediction.current_obtained,
                prediction.predicted_semester_mark,
                prediction.remaining_weight,
                prediction.graded_count,
                outlook.assignment_count,
                format_mark(outlook.target_mark),
                format_mark(prediction.required_average_on_remaining)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Priority Queue");

    if ranked.is_empty() {
        let _ = writeln!(output, "No open work in this window.");
    } else {
        for item in ranked.iter().take(10) {
            let due = item
                .due_date
                .map(|date| date.to_string())
                .unwrap_or_else(|| "no due date".to_string());
            let _ = writeln!(
                output,
                "- [{}] {} ({}) score {} due {}",
                item.priority.band, item.title, item.module_code, item.priority.score, due
            );
        }
    }

    let summary = summarize_bands(ranked);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Band Mix");
    let _ = writeln!(output, "- HIGH: {}", summary.high);
    let _ = writeln!(output, "- MEDIUM: {}", summary.medium);
    let _ = writeln!(output, "- LOW: {}", summary.low);

    output
}
