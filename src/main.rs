// Entry point and high-level interactive flow.
//
// One analysis round mirrors one upload/render cycle:
// - prompt for the T0 dataset path (and optionally T1),
// - load, clean and compute metrics for each file,
// - render either the single-dataset report (tiles, distribution tables,
//   line charts) or the T0/T1 comparison table,
// - optionally export the rendered report to files.
//
// Every round recomputes from the files; no state is carried between rounds.
mod compare;
mod error;
mod loader;
mod metrics;
mod output;
mod render;
mod summary;
mod types;
mod util;

use error::ReportError;
use std::io::{self, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

use types::{MetricReport, Record};

struct Analysis {
    clean: Vec<Record>,
    metrics: MetricReport,
}

fn analyze(path: &str) -> Result<Analysis, ReportError> {
    let table = loader::load_table(path)?;
    let clean = metrics::clean(&table);
    info!(path, clean_rows = clean.len(), "clean table ready");
    let report = metrics::compute_metrics(&table, &clean);
    Ok(Analysis {
        clean,
        metrics: report,
    })
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn prompt_yes_no(prompt: &str) -> bool {
    loop {
        print!("{}", prompt);
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Render the single-dataset report and offer the export step.
fn run_single(analysis: &Analysis) {
    render::show_metrics(&analysis.metrics, "Metrics for T0");
    let messages = summary::messages_by_rounded_hour(&analysis.clean);
    let shortages = summary::shortages_by_rounded_hour(&analysis.clean);
    render::show_distribution(&messages, &shortages);

    if prompt_yes_no("Export report files (Y/N): ") {
        export_or_report("metrics.json", || {
            output::write_json("metrics.json", &output::metric_export(&analysis.metrics))
        });
        export_or_report("summary_messages.csv", || {
            output::write_csv("summary_messages.csv", &render::messages_rows(&messages))
        });
        export_or_report("summary_polycount.csv", || {
            output::write_csv("summary_polycount.csv", &render::shortages_rows(&shortages))
        });
    }
    println!();
}

/// Render the T0/T1 comparison and offer the export step.
fn run_comparison(t0: &Analysis, t1: &Analysis) {
    let rows = compare::compare(&t0.metrics, &t1.metrics);
    render::show_comparison(&rows);

    if prompt_yes_no("Export report files (Y/N): ") {
        export_or_report("comparison.csv", || {
            output::write_csv("comparison.csv", &render::comparison_rows(&rows))
        });
    }
    println!();
}

fn export_or_report(path: &str, write: impl FnOnce() -> Result<(), ReportError>) {
    match write() {
        Ok(()) => println!("(Exported to {})", path),
        Err(e) => eprintln!("Write error: {}", e),
    }
}

/// One full upload/render cycle. Parse and schema errors end the round with
/// a message; the session loop keeps running.
fn run_round() {
    let t0_path = read_line("T0 dataset path: ");
    if t0_path.is_empty() {
        render::show_placeholder();
        return;
    }
    let t1_path = read_line("T1 dataset path (optional, leave blank to skip): ");
    println!();

    let t0 = match analyze(&t0_path) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}\n", e);
            return;
        }
    };

    if t1_path.is_empty() {
        run_single(&t0);
        return;
    }
    match analyze(&t1_path) {
        Ok(t1) => run_comparison(&t0, &t1),
        Err(e) => eprintln!("Error: {}\n", e),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    println!("Shortage incident analysis");
    println!("Provide a baseline dataset (T0) and optionally a comparison dataset (T1).");
    println!("CSV and XLSX files are supported.\n");

    loop {
        run_round();
        if !prompt_yes_no("Analyze another dataset (Y/N): ") {
            println!("Exiting the program.");
            break;
        }
        println!();
    }
}
