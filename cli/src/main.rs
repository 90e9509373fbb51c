//! Expense Simulator CLI - generate calibrated expense months from a target sheet.
//!
//! # Commands
//!
//! - `expense-sim generate` - Generate transactions as CSV or JSON
//! - `expense-sim summary` - Print the target vs actual table for a run
//! - `expense-sim catalog` - Print the item catalog
//!
//! # Examples
//!
//! ```bash
//! # September 2024 as CSV on stdout
//! expense-sim generate --targets target.json --year 2024 --month 9
//!
//! # Explicit range, JSON file, custom seed
//! expense-sim generate --targets target.json --start 2024-09-01 --end 2024-09-15 \
//!     --format json --output sept.json --seed 7
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use expense_simulator_core_rs::report::export_records;
use expense_simulator_core_rs::{
    ExpenseGenerator, GenerationResult, GeneratorConfig, Period, TargetSheet, TargetSummary,
};

mod error;

use error::{CliError, CliResult};

/// Expense Simulator - adaptive expense transaction generator
#[derive(Parser)]
#[command(name = "expense-sim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (per-day factors)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a calibrated transaction set
    Generate {
        #[command(flatten)]
        run: RunArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the target vs actual table for a generated run
    Summary {
        #[command(flatten)]
        run: RunArgs,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the item catalog as JSON
    Catalog {
        /// Generator config file (JSON, partial allowed)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Inputs shared by every command that runs the generator
#[derive(Args)]
struct RunArgs {
    /// Target sheet (JSON object of category → amount)
    #[arg(short, long)]
    targets: PathBuf,

    /// Year of the month to generate
    #[arg(long, requires = "month", conflicts_with_all = ["start", "end"])]
    year: Option<i32>,

    /// Month number (1-12)
    #[arg(long, requires = "year")]
    month: Option<u32>,

    /// First day of the period (YYYY-MM-DD)
    #[arg(long, requires = "end")]
    start: Option<NaiveDate>,

    /// Last day of the period (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,

    /// Generator config file (JSON, partial allowed)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the config's RNG seed
    #[arg(short, long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Generate {
            run,
            format,
            output,
        } => cmd_generate(&run, format, output.as_deref(), cli.quiet),
        Commands::Summary { run, json } => cmd_summary(&run, json),
        Commands::Catalog { config } => cmd_catalog(config.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&Path>, seed: Option<u64>) -> CliResult<GeneratorConfig> {
    let mut config = match path {
        Some(p) => GeneratorConfig::from_json_str(&fs::read_to_string(p)?)?,
        None => GeneratorConfig::default(),
    };
    if let Some(seed) = seed {
        config.rng_seed = seed;
    }
    Ok(config)
}

fn resolve_period(args: &RunArgs) -> CliResult<Period> {
    match (args.year, args.month, args.start, args.end) {
        (Some(year), Some(month), None, None) => Ok(Period::month(year, month)?),
        (None, None, Some(start), Some(end)) => Ok(Period::new(start, end)?),
        _ => Err(CliError::Args(
            "give either --year/--month or --start/--end".to_string(),
        )),
    }
}

/// Run the generator once for the command's inputs
fn run_generator(args: &RunArgs) -> CliResult<(ExpenseGenerator, TargetSheet, GenerationResult)> {
    let config = load_config(args.config.as_deref(), args.seed)?;
    let targets = TargetSheet::from_json_str(&fs::read_to_string(&args.targets)?)?;
    let period = resolve_period(args)?;

    let mut generator = ExpenseGenerator::new(config)?;
    let result = generator.generate(&targets, period.start(), period.end())?;
    Ok((generator, targets, result))
}

fn cmd_generate(
    args: &RunArgs,
    format: OutputFormat,
    output: Option<&Path>,
    quiet: bool,
) -> CliResult<()> {
    let (generator, targets, result) = run_generator(args)?;
    let records = export_records(&result.transactions, &generator.config().pic);

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(fs::File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };

    match format {
        OutputFormat::Csv => {
            let mut csv_writer = csv::Writer::from_writer(&mut writer);
            for record in &records {
                csv_writer.serialize(record)?;
            }
            csv_writer.flush()?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &records)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;

    let summary = TargetSummary::build(
        &targets,
        &result.transactions,
        &generator.config().calibration_policy(),
    );
    write_summary(&mut io::stderr().lock(), &summary, quiet)?;
    info!(
        transactions = records.len(),
        total = summary.total_actual,
        fingerprint = %result.fingerprint,
        "wrote transactions"
    );
    Ok(())
}

/// Target vs actual table for `generate`, which keeps stdout for the records
fn write_summary<W: Write>(out: &mut W, summary: &TargetSummary, quiet: bool) -> io::Result<()> {
    if quiet {
        return Ok(());
    }
    write!(out, "{}", summary.to_table())
}

fn cmd_summary(args: &RunArgs, json: bool) -> CliResult<()> {
    let (generator, targets, result) = run_generator(args)?;
    let summary = TargetSummary::build(
        &targets,
        &result.transactions,
        &generator.config().calibration_policy(),
    );

    let mut stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, &summary)?;
        writeln!(stdout)?;
    } else {
        write!(stdout, "{}", summary.to_table())?;
    }

    for unmet in result.calibration.unmet() {
        eprintln!(
            "unmet: {} (target {}, realized {})",
            unmet.category, unmet.target, unmet.actual_before
        );
    }
    Ok(())
}

fn cmd_catalog(config: Option<&Path>) -> CliResult<()> {
    let config = load_config(config, None)?;
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &config.catalog)?;
    writeln!(stdout)?;
    Ok(())
}
