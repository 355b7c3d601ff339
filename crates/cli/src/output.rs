//! Output formatting for CLI responses

use std::time::Duration;

use serde_json::{Value, json};
use stickflow_atomic::CounterSnapshot;
use stickflow_engine::LoopReport;

use crate::error::CliError;

fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

/// Report as a JSON document.
pub fn report_json(report: &LoopReport, counters: &CounterSnapshot) -> Value {
    json!({
        "success": true,
        "period_us": micros(report.period),
        "ticks": report.ticks,
        "late_ticks": report.late_ticks,
        "late_rate": report.late_rate(),
        "lateness_us": {
            "max": micros(report.max_lateness),
            "mean": micros(report.mean_lateness),
            "p50": micros(report.p50_lateness),
            "p99": micros(report.p99_lateness),
        },
        "resyncs": report.resyncs,
        "dropped_ticks": report.dropped_ticks,
        "chain_swaps": counters.chain_swaps,
        "input_batches": counters.input_batches,
    })
}

/// Print a finished loop's timing report.
pub fn print_report(report: &LoopReport, counters: &CounterSnapshot, json: bool) {
    if json {
        match serde_json::to_string_pretty(&report_json(report, counters)) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Failed to format report as JSON: {e}"),
        }
        return;
    }

    println!("Tick loop report");
    println!("  period:        {:?}", report.period);
    println!("  ticks:         {}", report.ticks);
    println!(
        "  late ticks:    {} ({:.2}%)",
        report.late_ticks,
        report.late_rate() * 100.0
    );
    println!(
        "  lateness:      max {:?}, mean {:?}, p50 {:?}, p99 {:?}",
        report.max_lateness, report.mean_lateness, report.p50_lateness, report.p99_lateness
    );
    println!(
        "  resyncs:       {} ({} ticks dropped)",
        report.resyncs, report.dropped_ticks
    );
    println!("  chain swaps:   {}", counters.chain_swaps);
}

/// Print the rule names of a checked config.
pub fn print_rules(rules: &[&str], json: bool) {
    if json {
        println!("{}", json!({ "success": true, "rules": rules }));
    } else if rules.is_empty() {
        println!("Config is valid; no macros enabled");
    } else {
        println!("Config is valid; rule chain:");
        for (position, name) in rules.iter().enumerate() {
            println!("  {}. {name}", position.saturating_add(1));
        }
    }
}

/// Print an error in the selected format.
pub fn print_error(error: &CliError, json: bool) {
    if json {
        let doc = json!({
            "success": false,
            "error": { "message": error.to_string(), "exit_code": error.exit_code() }
        });
        println!("{doc}");
        return;
    }

    eprintln!("Error: {error}");
    let mut source = std::error::Error::source(error);
    while let Some(err) = source {
        eprintln!("  Caused by: {err}");
        source = err.source();
    }
}
