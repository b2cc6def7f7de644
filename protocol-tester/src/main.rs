mod briefing;
mod logic;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use protocol_game::{BriefingProvider, LoadoutId, ProtocolEngine, StaticBriefing, StaticContent};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use briefing::GeminiBriefing;
use logic::{PlayStrategy, PlaythroughRecord, PlaythroughRunner};
use util::split_csv;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BriefingSource {
    /// Canned fallback briefing, no network
    Static,
    /// Gemini over HTTP, configured from the environment
    Remote,
}

#[derive(Debug, Parser)]
#[command(name = "protocol-tester", version = "0.1.0")]
#[command(about = "Automated playthroughs of the Birthday Protocol campaign")]
struct Args {
    /// Strategies to play (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    strategies: String,

    /// List all available strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Loadouts to play (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    loadouts: String,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Retries allowed per mission after a lethal choice
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Where mission briefings come from
    #[arg(long, value_enum, default_value_t = BriefingSource::Static)]
    briefing: BriefingSource,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_strategies(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let strategies = expand_strategies(&args.strategies)?;
    let loadouts = expand_loadouts(&args.loadouts)?;
    let seeds = parse_seeds(&args.seeds)?;

    let session = ProtocolEngine::new(StaticContent).create_session()?;
    let provider = select_provider(args.briefing);
    let runner = PlaythroughRunner::new(
        session.content().clone(),
        session.config().clone(),
        provider,
        args.max_retries,
        args.verbose,
    );

    println!("{}", "🧠 Running Playthroughs".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());
    let records = runner.run_matrix(&strategies, &loadouts, &seeds).await;

    write_reports(&args, &records, start_time)?;

    if records.iter().any(|r| !r.passed()) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_strategies(args: &Args) -> Result<bool> {
    if !args.list_strategies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available strategies:")?;
    for strategy in PlayStrategy::ALL {
        writeln!(
            output_target.writer(),
            "  {:15} - {}",
            strategy.key(),
            strategy.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎮 Birthday Protocol Automated Tester".bright_cyan().bold());
    println!("{}", "=====================================".cyan());
}

fn expand_strategies(arg: &str) -> Result<Vec<PlayStrategy>> {
    let tokens = split_csv(arg);
    if tokens.iter().any(|t| t.eq_ignore_ascii_case("all")) {
        return Ok(PlayStrategy::ALL.to_vec());
    }
    tokens
        .iter()
        .map(|t| t.parse::<PlayStrategy>())
        .collect::<Result<Vec<_>>>()
        .context("parsing --strategies")
}

fn expand_loadouts(arg: &str) -> Result<Vec<LoadoutId>> {
    let tokens = split_csv(arg);
    if tokens.iter().any(|t| t.eq_ignore_ascii_case("all")) {
        return Ok(LoadoutId::ALL.to_vec());
    }
    tokens
        .iter()
        .map(|t| t.parse::<LoadoutId>())
        .collect::<Result<Vec<_>, _>>()
        .context("parsing --loadouts")
}

fn parse_seeds(arg: &str) -> Result<Vec<u64>> {
    split_csv(arg)
        .iter()
        .map(|s| {
            s.parse::<u64>()
                .with_context(|| format!("invalid seed '{s}'"))
        })
        .collect()
}

fn select_provider(source: BriefingSource) -> Arc<dyn BriefingProvider> {
    match source {
        BriefingSource::Static => Arc::new(StaticBriefing::default()),
        BriefingSource::Remote => match GeminiBriefing::from_env() {
            Ok(provider) => {
                log::info!("Using remote briefings from {}", provider.model());
                Arc::new(provider)
            }
            Err(err) => {
                eprintln!("⚠️  {err}; using static briefings");
                log::warn!("Remote briefing unavailable: {err}");
                Arc::new(StaticBriefing::default())
            }
        },
    }
}

fn write_reports(args: &Args, records: &[PlaythroughRecord], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, records)?,
        "markdown" => {
            if records.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Birthday Protocol Playthrough Results\n\n_No playthroughs executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(
                    &mut output_target,
                    records,
                    chrono::Utc::now(),
                )?;
            }
        }
        _ => {
            let duration = start_time.elapsed();
            if records.is_empty() {
                writeln!(&mut output_target, "No playthroughs executed.")?;
            } else {
                logic::reports::generate_console_report(&mut output_target, records, duration)?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
