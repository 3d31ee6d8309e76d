use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use lorawan_timeserver::config::TimeserverConfig;
use lorawan_timeserver::controller::TimeserverController;
use lorawan_timeserver::io::{JsonLinesSink, JsonLinesSource};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Uplink feed, one JSON event per line (stdin if omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Where to write outbound messages (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the gateway time tolerance in milliseconds
    #[arg(long)]
    tolerance_ms: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TimeserverConfig::load(path)?,
        None => TimeserverConfig::default(),
    };
    if let Some(tolerance_ms) = args.tolerance_ms {
        config.tolerance_ms = tolerance_ms;
    }
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(e);
    }

    info!(
        "Timeserver started (tolerance {}ms, end marker {}, answer port {})",
        config.tolerance_ms, config.end_of_sync_seq_no, config.answer_port
    );

    let reader: Box<dyn io::BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout()),
    };

    let mut controller = TimeserverController::new(
        JsonLinesSource::new(reader),
        JsonLinesSink::new(writer),
        config,
    );
    let stats = controller.run()?;

    info!(
        "Exiting. {} of {} request(s) answered with a time.",
        stats.answered, stats.received
    );
    Ok(())
}
