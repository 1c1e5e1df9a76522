// Dilation Runner — flat vs dilated comparison from the command line
// Single seeded run or a Monte Carlo sweep, summary tables or JSON on stdout
//
// Usage:
//   cargo run --release --bin dilation                          # Baseline, one run
//   cargo run --release --bin dilation -- --preset deep-dilation
//   cargo run --release --bin dilation -- --runs 30 --seed 42   # Monte Carlo sweep
//   cargo run --release --bin dilation -- --trace               # JSONL per step
//   cargo run --release --bin dilation -- --json                # Full result as JSON

mod report;
mod time_series;

use clap::Parser;
use dilation_engine::monte_carlo;
use dilation_engine::{DualRateSimulator, Preset, SimulationError, SimulationParameters};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use time_series::StepTraceWriter;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "dilation")]
#[command(about = "Compare flat and dilated propagation over the same pattern")]
struct Cli {
    /// Parameter preset to start from (baseline, deep-dilation, inverted, long-horizon, wide)
    #[arg(long, default_value = "baseline")]
    preset: String,

    #[arg(long)]
    pattern_size: Option<usize>,

    /// External steps per zone
    #[arg(long)]
    steps: Option<usize>,

    /// Inner steps per external step in the dilated zone
    #[arg(long)]
    dilation: Option<usize>,

    #[arg(long)]
    flat_ratio: Option<f64>,

    #[arg(long)]
    dilated_ratio: Option<f64>,

    #[arg(long)]
    scale_factor: Option<f64>,

    #[arg(long)]
    axion_mass: Option<f64>,

    /// Seed (single run) or base seed (sweep); omitted keeps the preset's seed (42)
    #[arg(long)]
    seed: Option<u64>,

    /// Draw the seed from OS entropy instead of the preset's
    #[arg(long, conflicts_with = "seed")]
    random_seed: bool,

    /// Number of seeded runs; more than one aggregates a Monte Carlo sweep
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
    runs: u64,

    /// Emit one JSON line per transform invocation (single run only)
    #[arg(long, conflicts_with = "json")]
    trace: bool,

    /// Print the result or sweep report as pretty JSON
    #[arg(long)]
    json: bool,

    /// List presets and exit
    #[arg(long)]
    list_presets: bool,
}

impl Cli {
    fn parameters(&self) -> Result<SimulationParameters, SimulationError> {
        let mut p = Preset::from_name(&self.preset)?.parameters();
        if let Some(v) = self.pattern_size { p.pattern_size = v; }
        if let Some(v) = self.steps { p.num_external_steps = v; }
        if let Some(v) = self.dilation { p.dilation_factor = v; }
        if let Some(v) = self.flat_ratio { p.flat_position_ratio = v; }
        if let Some(v) = self.dilated_ratio { p.dilated_position_ratio = v; }
        if let Some(v) = self.scale_factor { p.transform.scale_factor = v; }
        if let Some(v) = self.axion_mass { p.transform.axion_mass = v; }
        if let Some(seed) = self.seed {
            p.seed = Some(seed);
        } else if self.random_seed {
            p.seed = None;
        }
        p.validate()?;
        Ok(p)
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dilation=info,dilation_engine=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if cli.list_presets {
        report::print_presets();
        return;
    }

    if let Err(e) = execute(&cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn execute(cli: &Cli) -> Result<(), SimulationError> {
    let params = cli.parameters()?;

    if cli.runs > 1 {
        let base_seed = params.seed.unwrap_or_else(rand::random);
        info!(runs = cli.runs, base_seed, preset = %cli.preset, "running sweep");
        let sweep = monte_carlo::run_sweep(&params, cli.runs as usize, base_seed)?;
        if cli.json {
            report::print_json(&sweep);
        } else {
            report::print_sweep(&sweep);
        }
        return Ok(());
    }

    let mut sim = DualRateSimulator::new(params)?;
    info!(seed = sim.seed(), preset = %cli.preset, "running single comparison");

    let result = if cli.trace {
        let mut writer = StepTraceWriter::stdout();
        let result = sim.run_observed(None, &mut writer)?;
        info!(lines = writer.lines_written(), "step trace written");
        writer.finish();
        result
    } else {
        sim.run(None)?
    };

    if cli.json {
        report::print_json(&result);
    } else if !cli.trace {
        report::print_single(sim.params(), &result);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("dilation").chain(args.iter().copied()))
    }

    #[test]
    fn default_run_keeps_preset_seed() {
        let cli = parse(&[]).expect("test: parse");
        let params = cli.parameters().expect("test: parameters");
        assert_eq!(params.seed, Some(42));
        assert_eq!(cli.runs, 1);
    }

    #[test]
    fn explicit_and_random_seed_override_preset() {
        let cli = parse(&["--seed", "7"]).expect("test: parse");
        assert_eq!(cli.parameters().expect("test: parameters").seed, Some(7));

        let cli = parse(&["--random-seed"]).expect("test: parse");
        assert_eq!(cli.parameters().expect("test: parameters").seed, None);

        assert!(parse(&["--seed", "7", "--random-seed"]).is_err());
    }

    #[test]
    fn zero_runs_is_rejected() {
        assert!(parse(&["--runs", "0"]).is_err());
        assert_eq!(parse(&["--runs", "3"]).expect("test: parse").runs, 3);
    }

    #[test]
    fn trace_and_json_cannot_share_stdout() {
        assert!(parse(&["--trace", "--json"]).is_err());
        assert!(parse(&["--trace"]).is_ok());
        assert!(parse(&["--json"]).is_ok());
    }

    #[test]
    fn flags_override_preset() {
        let cli = parse(&["--preset", "wide", "--steps", "5", "--dilation", "2", "--flat-ratio", "0.9"])
            .expect("test: parse");
        let p = cli.parameters().expect("test: parameters");
        assert_eq!(p.pattern_size, 1000);
        assert_eq!(p.num_external_steps, 5);
        assert_eq!(p.dilation_factor, 2);
        assert_eq!(p.flat_position_ratio, 0.9);
    }

    #[test]
    fn zero_dilation_flag_fails_validation() {
        let cli = parse(&["--dilation", "0"]).expect("test: parse");
        assert!(matches!(cli.parameters(), Err(SimulationError::Config(_))));
    }
}
