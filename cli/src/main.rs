//! docmine CLI - quality-gated PDF text and table extraction

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docmine::config::PipelineConfig;
use docmine::{Docmine, ExtractionStatus, NormalizePreset, OutputWriter, QualityThresholds};

#[derive(Parser)]
#[command(name = "docmine")]
#[command(version)]
#[command(about = "Extract text and tables from PDFs, with OCR fallback", long_about = None)]
struct Cli {
    /// Input PDF file or directory
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output directory for extracted artifacts
    #[arg(short, long, value_name = "DIR", default_value = "out")]
    output: PathBuf,

    /// Worker count (0 = available parallelism - 1)
    #[arg(short, long, default_value = "0")]
    workers: usize,

    /// Recurse into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Configuration file (defaults to ./docmine.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Per-document time limit in seconds (0 = unlimited)
    #[arg(short, long, default_value = "0")]
    timeout: u64,

    /// Quality profile
    #[arg(long, value_enum, default_value = "standard")]
    profile: Profile,

    /// Text normalization level
    #[arg(long, value_enum)]
    normalize: Option<NormalizeLevel>,

    /// Render resolution for the OCR rungs
    #[arg(long, value_name = "DPI")]
    dpi: Option<u32>,

    /// Skip OCR entirely; use the document text layer only
    #[arg(long)]
    no_ocr: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that external tools for the OCR rungs are installed
    Check,
    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Profile {
    /// Accept anything with 50+ words
    Standard,
    /// Require 100+ words before accepting a strategy's output
    Strict,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum NormalizeLevel {
    /// Unicode normalization only
    Minimal,
    /// OCR artifact correction and whitespace cleanup (default)
    Standard,
    /// Also strip page numbers and tighten blank lines
    Aggressive,
}

impl From<NormalizeLevel> for NormalizePreset {
    fn from(level: NormalizeLevel) -> Self {
        match level {
            NormalizeLevel::Minimal => NormalizePreset::Minimal,
            NormalizeLevel::Standard => NormalizePreset::Standard,
            NormalizeLevel::Aggressive => NormalizePreset::Aggressive,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let code = match cli.command {
        Some(Commands::Check) => cmd_check(cli.config.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            0
        }
        None => match cli.input.clone() {
            Some(input) => cmd_run(&cli, &input),
            None => {
                println!("{}", "Usage: docmine <INPUT> [-o OUTPUT]".yellow());
                println!("       docmine --help for more information");
                0
            }
        },
    };
    std::process::exit(code);
}

fn build_config(cli: &Cli) -> Result<PipelineConfig, docmine::Error> {
    let mut config = PipelineConfig::load(cli.config.as_deref())?;
    if cli.workers > 0 {
        config.workers = cli.workers;
    }
    if cli.timeout > 0 {
        config.timeout_secs = cli.timeout;
    }
    if let Some(dpi) = cli.dpi {
        config.render_dpi = dpi;
    }
    if let Some(level) = cli.normalize {
        config.normalize = level.into();
    }
    if cli.profile == Profile::Strict {
        config.thresholds = QualityThresholds::strict();
    }
    if cli.no_ocr {
        config.ocr = false;
    }
    Ok(config)
}

fn cmd_run(cli: &Cli, input: &Path) -> i32 {
    let config = match build_config(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            return 2;
        }
    };
    // OCR backends are surfaced as a startup error, not mid-batch.
    if config.ocr {
        if let Err(e) = config.engine_set().validate() {
            eprintln!(
                "{}: {} (install it, or pass --no-ocr)",
                "Error".red().bold(),
                e
            );
            return 2;
        }
    }

    let miner = Docmine::new()
        .with_config(config)
        .with_output(&cli.output);

    if input.is_dir() {
        run_batch(&miner, input, cli.recursive)
    } else {
        run_single(&miner, input, &cli.output)
    }
}

fn run_single(miner: &Docmine, input: &Path, output: &Path) -> i32 {
    let start = Instant::now();
    let processed = match miner.process(input) {
        Ok(processed) => processed,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            return 1;
        }
    };

    let writer = OutputWriter::new(output);
    if let Err(e) = writer.ensure_layout().and_then(|_| {
        if processed.result.is_usable() {
            writer.write_document(&processed).map(|_| ())
        } else {
            Ok(())
        }
    }) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        return 1;
    }

    let elapsed = start.elapsed().as_secs_f64();
    match processed.result.status {
        ExtractionStatus::Success => {
            println!(
                "{} {} ({} words, {} table(s), {:.1}s)",
                "OK".green().bold(),
                input.display(),
                processed.metrics.word_count,
                processed.tables.len(),
                elapsed
            );
            0
        }
        ExtractionStatus::Degraded => {
            println!(
                "{} {} (below quality threshold, {} words kept)",
                "DEGRADED".yellow().bold(),
                input.display(),
                processed.metrics.word_count
            );
            0
        }
        ExtractionStatus::Failed => {
            eprintln!(
                "{} {}: {}",
                "FAILED".red().bold(),
                input.display(),
                processed
                    .result
                    .failure
                    .as_deref()
                    .unwrap_or("extraction failed")
            );
            1
        }
    }
}

fn run_batch(miner: &Docmine, input: &Path, recursive: bool) -> i32 {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message(format!("Processing {}...", input.display()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let report = match miner.run(input, recursive) {
        Ok(report) => report,
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{}: {}", "Error".red().bold(), e);
            return 2;
        }
    };
    spinner.finish_and_clear();

    println!("{}", "Batch complete".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Attempted".bold(), report.attempted);
    println!(
        "{}: {} ({} degraded)",
        "Succeeded".bold(),
        report.succeeded.to_string().green(),
        report.degraded
    );
    println!("{}: {}", "Failed".bold(), report.failed.to_string().red());
    println!(
        "{}: {:.1}s ({:.2} docs/s)",
        "Elapsed".bold(),
        report.elapsed.as_secs_f64(),
        report.throughput()
    );

    let failures: Vec<_> = report.outcomes.iter().filter(|o| o.is_failure()).collect();
    if !failures.is_empty() {
        println!();
        println!("{}", "Failures".red().bold());
        for outcome in failures {
            println!(
                "  {} {}: {}",
                "✗".red(),
                outcome.path.display(),
                outcome.error.as_deref().unwrap_or("unknown cause")
            );
        }
    }

    if report.any_succeeded() {
        0
    } else {
        1
    }
}

fn cmd_check(config_path: Option<&Path>) -> i32 {
    let config = match PipelineConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            return 2;
        }
    };

    println!("{}", "Backend availability".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let set = config.engine_set();
    let mut all_ok = true;
    if set.recognizers.is_empty() {
        println!("{} no recognition engines configured", "·".dimmed());
    }
    for engine in &set.recognizers {
        if engine.available() {
            println!("  {} {}", "✓".green(), engine.name());
        } else {
            println!("  {} {} (not found)", "✗".red(), engine.name());
            all_ok = false;
        }
    }

    if all_ok {
        0
    } else {
        1
    }
}

fn cmd_version() {
    println!("{} {}", "docmine".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Quality-gated PDF text and table extraction");
}
