// Console rendering: metric tiles, distribution tables, line charts and the
// comparison table. Pure consumer of the engine output; no computation here.
use crate::types::{
    Comparison, ComparisonRow, HourlyMessagesRow, HourlyShortagesRow, MetricReport, MetricRow,
    MetricValue,
};
use crate::util::{format_int, format_number};
use tabled::{settings::Style, Table, Tabled};
use textplots::{Chart, Plot, Shape};

/// Marker for cells where arithmetic is not defined (label metrics, NaN
/// sentinels, zero baselines).
const NON_NUMERIC: &str = "n/a";

pub fn render_value(value: &MetricValue) -> String {
    match value {
        MetricValue::Count(n) => format_int(*n),
        MetricValue::Number(x) => format_number(*x, 2),
        MetricValue::Label(s) => s.clone(),
    }
}

pub fn metric_rows(report: &MetricReport) -> Vec<MetricRow> {
    report
        .entries
        .iter()
        .map(|(name, value)| MetricRow {
            metric: name.label().to_string(),
            value: render_value(value),
        })
        .collect()
}

pub fn comparison_rows(rows: &[Comparison]) -> Vec<ComparisonRow> {
    rows.iter()
        .map(|row| ComparisonRow {
            metric: row.name.label().to_string(),
            t0: render_value(&row.t0),
            t1: render_value(&row.t1),
            delta: row
                .delta
                .map(|d| format_number(d, 2))
                .unwrap_or_else(|| NON_NUMERIC.to_string()),
            delta_pct: row
                .pct_delta
                .map(|p| format_number(p, 2))
                .unwrap_or_else(|| NON_NUMERIC.to_string()),
        })
        .collect()
}

pub fn messages_rows(grouped: &[(i64, u64)]) -> Vec<HourlyMessagesRow> {
    grouped
        .iter()
        .map(|(hour, total)| HourlyMessagesRow {
            rounded_hour: *hour,
            messages_sent: format_int(*total),
        })
        .collect()
}

pub fn shortages_rows(grouped: &[(i64, u64)]) -> Vec<HourlyShortagesRow> {
    grouped
        .iter()
        .map(|(hour, total)| HourlyShortagesRow {
            rounded_hour: *hour,
            total_incidents: format_int(*total),
        })
        .collect()
}

pub fn show_metrics(report: &MetricReport, title: &str) {
    println!("{}\n", title);
    print_table(&metric_rows(report));
}

pub fn show_comparison(rows: &[Comparison]) {
    println!("T0 vs T1 comparison\n");
    print_table(&comparison_rows(rows));
}

/// The two distribution tables, each followed by its line chart.
pub fn show_distribution(messages: &[(i64, u64)], shortages: &[(i64, u64)]) {
    println!("Distribution by shortage duration (rounded hours)\n");

    println!("Table 1: messages sent by rounded shortage hours");
    print_table(&messages_rows(messages));
    line_chart(messages);

    println!("Table 2: total shortage incidents by rounded shortage hours");
    print_table(&shortages_rows(shortages));
    line_chart(shortages);
}

pub fn show_placeholder() {
    println!("Provide at least a T0 dataset to begin.\n");
}

fn print_table<T>(rows: &[T])
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(rows.to_vec()).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Terminal line chart: rounded hour on x, summed value on y, points joined
/// in key order with a marker at each data point.
fn line_chart(points: &[(i64, u64)]) {
    if points.is_empty() {
        return;
    }
    let pts: Vec<(f32, f32)> = points
        .iter()
        .map(|(hour, total)| (*hour as f32, *total as f32))
        .collect();
    let xmin = pts[0].0;
    let xmax = pts[pts.len() - 1].0;
    // Grouped keys are ascending, so only a single-key chart needs widening.
    let xmax = if xmax > xmin { xmax } else { xmin + 1.0 };
    Chart::new(160, 50, xmin, xmax)
        .lineplot(&Shape::Lines(&pts))
        .lineplot(&Shape::Points(&pts))
        .display();
    println!();
}
