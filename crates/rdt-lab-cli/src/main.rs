use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use rand::Rng;
use rdt_lab_abstract::ChannelConfig;
use rdt_lab_engine::{TransferReport, TransferSession, scenario_runner};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Message used by every stress iteration.
const STRESS_MESSAGE: &str = "TEST";

#[derive(Parser, Debug)]
#[command(author, version, about = "Alternating-bit (RDT 2.2) transfer simulator")]
struct Args {
    /// Message to transfer through the unreliable channel.
    #[arg(long)]
    message: Option<String>,

    /// Per-transmission delivery probability, in (0, 1].
    #[arg(long, default_value_t = 1.0)]
    reliability: f64,

    /// Channel latency added to every exchange, in milliseconds.
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Sender acknowledgment window, in milliseconds.
    #[arg(long, default_value_t = 2000)]
    timeout_ms: u64,

    /// Allow the channel to corrupt data packets.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    corrupt_packet: bool,

    /// Allow the channel to corrupt acknowledgments.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    corrupt_ack: bool,

    /// RNG seed for a reproducible fault sequence.
    #[arg(long)]
    seed: Option<u64>,

    /// Run the engine N times with random reliability values and count
    /// failed deliveries, instead of a single transfer.
    #[arg(long, value_name = "N")]
    stress: Option<u32>,

    /// Run a scenario TOML file instead of a single transfer.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Write a JSON trace of the finished transfer.
    #[arg(long)]
    trace_out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt::init();
    info!("rdt-lab starting…");

    if args.scenario.is_some() && args.stress.is_some() {
        anyhow::bail!("--scenario and --stress cannot be used together");
    }

    let timeout = Duration::from_millis(args.timeout_ms);
    let report = if let Some(path) = &args.scenario {
        scenario_runner::run_scenario(path)?
    } else if let Some(runs) = args.stress {
        return run_stress(runs, timeout);
    } else {
        let message = args
            .message
            .as_deref()
            .context("--message is required unless --stress or --scenario is given")?;
        run_transfer(&args, message, timeout)?
    };

    println!("{}", report.delivered);
    log_summary(&report);

    if let Some(path) = &args.trace_out {
        write_trace(path, &report)?;
    }
    Ok(())
}

fn run_transfer(args: &Args, message: &str, timeout: Duration) -> Result<TransferReport> {
    let config = ChannelConfig {
        reliability: args.reliability,
        delay: Duration::from_millis(args.delay_ms),
        corrupt_packet: args.corrupt_packet,
        corrupt_ack: args.corrupt_ack,
        seed: args.seed,
    };
    let mut session = TransferSession::new(config, timeout)?;
    info!("sender transmitting {message:?}");
    session.run(message);
    Ok(session.report())
}

/// Batch driver: hammer the engine with random reliability values and
/// count runs whose delivery buffer does not match the input.
fn run_stress(runs: u32, timeout: Duration) -> Result<()> {
    let mut rng = rand::rng();
    let mut failures = 0u32;

    for run in 0..runs {
        let config = ChannelConfig {
            reliability: rng.random_range(0.1..=1.0),
            delay: Duration::ZERO,
            corrupt_packet: true,
            corrupt_ack: true,
            seed: None,
        };
        let reliability = config.reliability;
        // Fresh session per run so no sequence state leaks across runs.
        let mut session = TransferSession::new(config, timeout)?;
        session.run(STRESS_MESSAGE);
        if session.delivered() != STRESS_MESSAGE {
            warn!(
                "run {run}: delivered {:?} at reliability {reliability:.3}",
                session.delivered()
            );
            failures += 1;
        }
    }

    info!("stress complete: {failures}/{runs} runs failed");
    println!("{failures}");
    Ok(())
}

fn log_summary(report: &TransferReport) {
    info!(
        "transfer duration: {} ms | packets sent: {} | retransmissions: {}",
        report.duration_ms, report.packets_sent, report.retransmissions
    );
}

fn write_trace(path: &Path, report: &TransferReport) -> Result<()> {
    let data = serde_json::to_vec_pretty(report).context("Failed to serialize transfer trace")?;
    fs::write(path, &data)
        .with_context(|| format!("Failed to write trace file {}", path.display()))?;
    Ok(())
}
