use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use schedule_parser::{output, parser, reader};

const DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Parser)]
#[command(name = "schedule_parser", about = "University timetable PDF to JSON events")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the timetable into a JSON list of events
    Parse {
        /// Input pdf file path
        #[arg(short, long)]
        input: PathBuf,
        /// Output json file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Initial date in 'dd.mm.yyyy' format to determine years of event dates (default: today)
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Dump the positioned text fragments of the timetable page as JSON
    Fragments {
        /// Input pdf file path
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Show the grouped cells with their anchor positions
    Cells {
        /// Input pdf file path
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| format!("expected dd.mm.yyyy: {}", e))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            input,
            output,
            date,
            pretty,
        } => {
            let reference = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            match output {
                Some(path) => {
                    let count = schedule_parser::parse_file(&input, &path, reference, pretty)?;
                    eprintln!(
                        "Parsing completed successfully: {} events.\nOutput JSON file: {}",
                        count,
                        path.display()
                    );
                }
                None => {
                    let fragments = reader::read_file(&input)
                        .with_context(|| format!("reading {}", input.display()))?;
                    let events = parser::parse_fragments(&fragments, reference)
                        .context("parsing error")?;
                    let bytes = output::to_json(&events, pretty)?;
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&bytes)?;
                    writeln!(stdout)?;
                }
            }
            Ok(())
        }
        Commands::Fragments { input } => {
            let fragments = reader::read_file(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            println!("{}", serde_json::to_string_pretty(&fragments)?);
            Ok(())
        }
        Commands::Cells { input } => {
            let fragments = reader::read_file(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let cells = parser::collect_cells(&fragments);
            if cells.is_empty() {
                println!("No cells found.");
                return Ok(());
            }
            println!("{:>3} | {:>7} | {:>7} | {}", "#", "x", "y", "Text");
            println!("{}", "-".repeat(80));
            for (i, cell) in cells.iter().enumerate() {
                println!("{:>3} | {:>7.2} | {:>7.2} | {}", i, cell.x, cell.y, cell.data);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
