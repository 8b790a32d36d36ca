//! cbr CLI: fetch and normalize Bank of Russia time series.
//!
//! Commands:
//! - `key-rate`, `ibor`, `metals`, `reserves`, `roisfix`: one endpoint each
//! - `ruonia [SYMBOL]`: the RUONIA index table, or one RUONIA series
//! - `currency <SYMBOL>`: official rate history, e.g. `USDRUB.CBR`
//! - `currencies`: the currency directory
//!
//! Set `RUST_LOG=debug` to trace the pipeline stages.

use anyhow::{Context, Result};
use cbr_core::endpoints::{self, Query};
use cbr_core::export::{to_csv, to_json, write_parquet};
use cbr_core::{CbrConfig, Frame, Frequency, RawSource, SoapSource};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "cbr",
    about = "Bank of Russia time series: key rate, RUONIA, currencies, metals, reserves"
)]
struct Cli {
    /// TOML file with client settings (endpoint_url, timeout_secs, user_agent).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Window {
    /// First date (YYYY-MM-DD or YYYY-MM). Defaults to the first published date.
    #[arg(long)]
    start: Option<String>,

    /// Last date (YYYY-MM-DD or YYYY-MM). Defaults to today.
    #[arg(long)]
    end: Option<String>,

    /// Output period: D (daily) or M (monthly). Each series has its own default.
    #[arg(long, value_parser = parse_period)]
    period: Option<Frequency>,

    #[command(flatten)]
    output: Output,
}

#[derive(Args)]
struct Output {
    /// How to print the result.
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Also write the result to this Parquet file.
    #[arg(long)]
    parquet: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Key rate (daily by default).
    KeyRate {
        #[command(flatten)]
        window: Window,
    },
    /// Interbank rates MIBID / MIBOR / MIACR by tenor (monthly by default).
    Ibor {
        #[command(flatten)]
        window: Window,
    },
    /// Precious metals prices.
    Metals {
        #[command(flatten)]
        window: Window,
    },
    /// International reserves (monthly by default).
    Reserves {
        #[command(flatten)]
        window: Window,
    },
    /// RUONIA: the index table, or one series (RUONIA.INDX, RUONIA_AVG_1M.RATE, ...).
    Ruonia {
        symbol: Option<String>,
        #[command(flatten)]
        window: Window,
    },
    /// ROISfix fixings.
    Roisfix {
        #[command(flatten)]
        window: Window,
    },
    /// Official exchange rate, e.g. USDRUB.CBR or RUBUSD.CBR.
    Currency {
        symbol: String,
        #[command(flatten)]
        window: Window,
    },
    /// List currencies known to the service.
    Currencies {
        #[command(flatten)]
        output: Output,
    },
}

fn parse_period(s: &str) -> Result<Frequency, String> {
    Frequency::from_code(s).ok_or_else(|| format!("unknown period '{s}': expected D or M"))
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => CbrConfig::from_file(path)?,
        None => CbrConfig::default(),
    };
    let source = SoapSource::new(&config)?;
    let today = Local::now().date_naive();
    info!(endpoint = %config.endpoint_url, %today, "starting");

    match cli.command {
        Commands::KeyRate { window } => run(&source, window, today, endpoints::key_rate),
        Commands::Ibor { window } => run(&source, window, today, endpoints::ibor),
        Commands::Metals { window } => run(&source, window, today, endpoints::metals_prices),
        Commands::Reserves { window } => run(&source, window, today, endpoints::mrrf),
        Commands::Roisfix { window } => run(&source, window, today, endpoints::roisfix),
        Commands::Ruonia { symbol, window } => match symbol {
            Some(symbol) => run(&source, window, today, |src, q| {
                endpoints::ruonia_ts(src, &symbol, q)
            }),
            None => run(&source, window, today, endpoints::ruonia_index),
        },
        Commands::Currency { symbol, window } => run(&source, window, today, |src, q| {
            endpoints::currency_rate(src, &symbol, q)
        }),
        Commands::Currencies { output } => {
            let list = endpoints::currencies_list(&source, today)?;
            emit(&list, &output)
        }
    }
}

fn run<F>(source: &dyn RawSource, window: Window, today: NaiveDate, fetch: F) -> Result<()>
where
    F: FnOnce(&dyn RawSource, &Query) -> Result<cbr_core::Normalized, cbr_core::CbrError>,
{
    let mut query = Query::new(today);
    query.first = window.start;
    query.last = window.end;
    query.period = window.period;

    let data = fetch(source, &query)?;
    if data.is_empty() {
        eprintln!("No data published for the requested window.");
    }
    emit(&Frame::from(data), &window.output)
}

fn emit(frame: &Frame, output: &Output) -> Result<()> {
    match output.format {
        Format::Table => print_table(frame),
        Format::Csv => print!("{}", to_csv(frame)?),
        Format::Json => println!("{}", to_json(frame)?),
    }
    if let Some(path) = &output.parquet {
        save_parquet(frame, path)?;
    }
    Ok(())
}

fn save_parquet(frame: &Frame, path: &Path) -> Result<()> {
    write_parquet(frame, path).with_context(|| format!("writing {}", path.display()))?;
    println!("Saved {} rows to {}", frame.height(), path.display());
    Ok(())
}

fn print_table(frame: &Frame) {
    let dated = frame.index().is_dated();
    let labels: Vec<String> = frame.keys().map(|k| k.to_string()).collect();
    let widths: Vec<usize> = frame
        .columns()
        .iter()
        .zip(&labels)
        .map(|((_, cells), label)| {
            cells
                .iter()
                .map(|c| format_cell(c).len())
                .chain([label.len(), 8])
                .max()
                .unwrap_or(8)
        })
        .collect();

    let mut header = String::new();
    if dated {
        header.push_str(&format!("{:<12}", "date"));
    }
    for (label, width) in labels.iter().zip(&widths) {
        header.push_str(&format!(" {label:>width$}"));
    }
    println!("{header}");
    println!("{}", "-".repeat(header.len()));

    for row in 0..frame.height() {
        let mut line = String::new();
        if dated {
            line.push_str(&format!("{:<12}", frame.index().label(row)));
        }
        for ((_, cells), width) in frame.columns().iter().zip(&widths) {
            line.push_str(&format!(" {:>width$}", format_cell(&cells[row])));
        }
        println!("{line}");
    }
}

fn format_cell(cell: &cbr_core::Cell) -> String {
    match cell {
        cbr_core::Cell::Float(v) => format!("{v:.4}"),
        other => other.to_string(),
    }
}
