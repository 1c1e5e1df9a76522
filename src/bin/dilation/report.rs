// Console Report Formatting
// Summary tables for single runs and sweeps; JSON passthrough for tooling

use dilation_engine::monte_carlo::{Stats, SweepReport};
use dilation_engine::{Preset, SimulationParameters, SimulationResult};
use serde::Serialize;
use tracing::error;

pub fn print_presets() {
    println!("\n  {:<16} {}", "Preset", "Description");
    println!("  {}", "-".repeat(72));
    for preset in Preset::ALL {
        println!("  {:<16} {}", preset.name(), preset.description());
    }
    println!();
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("failed to serialize report: {}", e),
    }
}

/// `inf` for an infinite ratio, fixed-point otherwise.
pub fn format_ratio(ratio: f64) -> String {
    if ratio.is_infinite() {
        "inf".to_string()
    } else {
        format!("{:.4}", ratio)
    }
}

pub fn print_single(params: &SimulationParameters, result: &SimulationResult) {
    println!("\n  Dual-Rate Comparison (seed {})", result.seed);
    println!("  Pattern: {} cells | External steps: {} | Dilation: {}x | Ratios: {:.2}/{:.2}",
        params.pattern_size,
        params.num_external_steps,
        params.dilation_factor,
        params.flat_position_ratio,
        params.dilated_position_ratio,
    );
    println!("  Initial: mean|x| {:.6}  var {:.6}\n", result.initial_mean_abs, result.initial_variance);

    println!("  {:<10} {:>8} {:>14} {:>14} {:>16}",
        "Zone", "Calls", "Final mean|x|", "Final var", "Accumulated");
    println!("  {}", "-".repeat(66));
    let zones = [("flat", &result.flat), ("dilated", &result.dilated.zone)];
    for (label, zone) in zones {
        println!("  {:<10} {:>8} {:>14.6} {:>14.6} {:>16.6}",
            label,
            zone.invocations,
            zone.final_mean_abs,
            zone.final_variance,
            zone.accumulated_computation,
        );
    }
    println!("  {}", "-".repeat(66));
    println!("  Performance ratio (dilated / flat): {}\n", format_ratio(result.performance_ratio_vs_flat()));
}

fn stats_row(label: &str, s: &Stats) {
    println!("  {:<22} {:>12.4} ±{:<10.4} {:>12.4} {:>12.4}", label, s.mean, s.half_width(), s.min, s.max);
}

pub fn print_sweep(report: &SweepReport) {
    println!("\n  Monte Carlo Sweep | Runs: {} | Base seed: {}", report.n_runs, report.base_seed);
    println!("  Pattern: {} cells | External steps: {} | Dilation: {}x\n",
        report.parameters.pattern_size,
        report.parameters.num_external_steps,
        report.parameters.dilation_factor,
    );
    println!("  {:<22} {:>12} {:>11} {:>12} {:>12}", "Metric", "Mean", "95% CI", "Min", "Max");
    println!("  {}", "-".repeat(72));
    stats_row("Flat accumulated", &report.flat_accumulated);
    stats_row("Dilated accumulated", &report.dilated_accumulated);
    stats_row("Performance ratio", &report.performance_ratio);
    println!("  {}", "-".repeat(72));
    println!("  Dilated win rate: {:.1}%  Infinite ratios: {}\n",
        report.dilated_win_rate * 100.0,
        report.infinite_ratio_count,
    );
}
