//! SwingBand CLI — run the band/swing signal engine over CSV bar files.
//!
//! Commands:
//! - `run` — process one or more CSV files, one independent stream per file
//! - `check-config` — validate a TOML config and print its fingerprint
//! - `defaults` — print the default configuration as TOML

mod logging;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use swingband_core::domain::PriceSource;
use swingband_core::export::{outputs_to_csv, outputs_to_json};
use swingband_core::{load_bars_csv, Bar, BandSwing, BarOutput, IndicatorConfig};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(
    name = "swingband",
    about = "SwingBand CLI — Bollinger bands with swing-based stop/target signals"
)]
struct Cli {
    /// Emit logs as JSON instead of human-readable text.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute per-bar bands and signals for CSV bar files.
    Run {
        /// CSV files with timestamp,open,high,low,close[,volume] columns.
        #[arg(long = "input", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// TOML config file. Flags below override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: ParamOverrides,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Directory for `<stem>.signals.<ext>` files. Without it, a single
        /// input is written to stdout.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Validate a TOML config file and print its fingerprint.
    CheckConfig {
        /// Path to the TOML config file.
        path: PathBuf,
    },
    /// Print the default configuration as TOML.
    Defaults,
}

#[derive(Args, Default)]
struct ParamOverrides {
    /// Rolling window length (>= 1).
    #[arg(long)]
    length: Option<usize>,

    /// Outer band multiplier (0.001 to 50).
    #[arg(long)]
    mult: Option<f64>,

    /// Take-profit distance as a multiple of risk (>= 1.0).
    #[arg(long)]
    risk_reward: Option<f64>,

    /// Stop distance beyond the swing extreme, in percent (>= 0).
    #[arg(long)]
    stop_offset: Option<f64>,

    /// Price source: open, high, low, close, hl2, hlc3, ohlc4.
    #[arg(long)]
    source: Option<PriceSource>,
}

impl ParamOverrides {
    fn apply(&self, mut config: IndicatorConfig) -> IndicatorConfig {
        if let Some(length) = self.length {
            config.length = length;
        }
        if let Some(mult) = self.mult {
            config.mult = mult;
        }
        if let Some(rr) = self.risk_reward {
            config.risk_reward_ratio = rr;
        }
        if let Some(offset) = self.stop_offset {
            config.stop_loss_offset = offset;
        }
        if let Some(source) = self.source {
            config.source = source;
        }
        config
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }

    fn write<W: Write>(&self, writer: W, outputs: &[BarOutput]) -> Result<()> {
        match self {
            OutputFormat::Csv => outputs_to_csv(writer, outputs)?,
            OutputFormat::Json => outputs_to_json(writer, outputs)?,
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_json);

    match cli.command {
        Commands::Run {
            inputs,
            config,
            overrides,
            format,
            output_dir,
        } => run_cmd(inputs, config, overrides, format, output_dir),
        Commands::CheckConfig { path } => check_config_cmd(&path),
        Commands::Defaults => defaults_cmd(),
    }
}

/// File values first, then flag overrides, then a single validation pass.
fn resolve_config(path: Option<&Path>, overrides: &ParamOverrides) -> Result<IndicatorConfig> {
    let base = match path {
        Some(p) => IndicatorConfig::read_toml_file(p)
            .with_context(|| format!("loading config {}", p.display()))?,
        None => IndicatorConfig::default(),
    };
    let config = overrides.apply(base);
    config.validate().context("invalid indicator parameters")?;
    Ok(config)
}

fn run_cmd(
    inputs: Vec<PathBuf>,
    config_path: Option<PathBuf>,
    overrides: ParamOverrides,
    format: OutputFormat,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let config = resolve_config(config_path.as_deref(), &overrides)?;
    let fingerprint = config.fingerprint()?;
    info!(fingerprint = %fingerprint, streams = inputs.len(), "starting run");

    let Some(dir) = output_dir else {
        if inputs.len() != 1 {
            bail!("--output-dir is required when processing more than one input");
        }
        let outputs = process_stream(&inputs[0], config)?;
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        format.write(&mut lock, &outputs)?;
        lock.flush()?;
        return Ok(());
    };

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    // One independent BandSwing per file; nothing is shared between streams.
    let results: Vec<(PathBuf, Result<PathBuf>)> = inputs
        .par_iter()
        .map(|input| {
            let written = process_stream(input, config).and_then(|outputs| {
                let target = output_path(&dir, input, format);
                let file = File::create(&target)
                    .with_context(|| format!("creating {}", target.display()))?;
                let mut writer = BufWriter::new(file);
                format.write(&mut writer, &outputs)?;
                writer.flush()?;
                Ok(target)
            });
            (input.clone(), written)
        })
        .collect();

    let mut failures = 0usize;
    for (input, result) in &results {
        match result {
            Ok(target) => info!(input = %input.display(), output = %target.display(), "wrote signals"),
            Err(e) => {
                failures += 1;
                error!(input = %input.display(), "failed: {e:#}");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} inputs failed", results.len());
    }
    Ok(())
}

fn process_stream(input: &Path, config: IndicatorConfig) -> Result<Vec<BarOutput>> {
    let bars = load_bars_csv(input).with_context(|| format!("reading {}", input.display()))?;
    let malformed = count_malformed(&bars);
    if malformed > 0 {
        warn!(
            input = %input.display(),
            malformed,
            "bars with NaN fields or inconsistent OHLC ranges"
        );
    }
    let mut stream = BandSwing::new(config)?;
    let outputs = stream.run(&bars);

    let buys = outputs.iter().filter(|o| o.transitions.buy).count();
    let sells = outputs.iter().filter(|o| o.transitions.sell).count();
    let resets = outputs.iter().filter(|o| o.transitions.reset).count();
    info!(
        input = %input.display(),
        bars = bars.len(),
        buys,
        sells,
        resets,
        final_phase = stream.state().phase().as_str(),
        "stream processed"
    );
    Ok(outputs)
}

/// Bars that are void or whose high/low do not bracket open and close.
fn count_malformed(bars: &[Bar]) -> usize {
    bars.iter().filter(|bar| !bar.is_sane()).count()
}

fn output_path(dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bars".to_string());
    dir.join(format!("{stem}.signals.{}", format.extension()))
}

fn check_config_cmd(path: &Path) -> Result<()> {
    let config = IndicatorConfig::from_toml_file(path)
        .with_context(|| format!("checking {}", path.display()))?;
    println!("ok: {}", path.display());
    println!("fingerprint: {}", config.fingerprint()?);
    Ok(())
}

fn defaults_cmd() -> Result<()> {
    let text = IndicatorConfig::default()
        .to_toml_string()
        .context("serializing default config")?;
    print!("{text}");
    Ok(())
}
