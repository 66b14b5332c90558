use crate::session::TransferSession;
use crate::trace::TransferReport;
use anyhow::{Context, Result, bail};
use rdt_lab_abstract::{ChannelConfig, TestAction, TestAssertion, TestScenario};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// The reference ack window; scenarios shorten it via `timeout_ms`.
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Load a scenario from a TOML file and run it to completion.
pub fn run_scenario(path: impl AsRef<Path>) -> Result<TransferReport> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
    let scenario: TestScenario =
        toml::from_str(&content).context("Failed to parse scenario file")?;
    run(&scenario)
}

/// Run an already-parsed scenario: build a fresh session, replay the
/// actions in order, then evaluate every assertion against the report.
pub fn run(scenario: &TestScenario) -> Result<TransferReport> {
    let mut config = ChannelConfig::default();
    scenario.config.apply_to(&mut config);
    let timeout = scenario
        .config
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TIMEOUT);

    let mut session = TransferSession::new(config, timeout)?;
    info!("running scenario '{}': {}", scenario.name, scenario.description);

    for action in &scenario.actions {
        match action {
            TestAction::SendMessage { data } => session.run(data),
            TestAction::DropNextPacket => session.inject_packet_drop(),
            TestAction::DropNextReply => session.inject_reply_drop(),
            TestAction::CorruptNextPacket => session.inject_packet_corruption(),
            TestAction::CorruptNextAck => session.inject_ack_corruption(),
        }
    }

    let report = session.report();
    for assertion in &scenario.assertions {
        check(&report, assertion)
            .with_context(|| format!("scenario '{}' failed", scenario.name))?;
    }
    info!("scenario '{}' passed", scenario.name);
    Ok(report)
}

fn check(report: &TransferReport, assertion: &TestAssertion) -> Result<()> {
    match assertion {
        TestAssertion::Delivered { data } => {
            if report.delivered != *data {
                bail!(
                    "expected delivery {:?}, receiver buffer holds {:?}",
                    data,
                    report.delivered
                );
            }
        }
        TestAssertion::PacketCount { min, max } => {
            check_range("packet count", report.packets_sent, *min, *max)?;
        }
        TestAssertion::Retransmissions { min, max } => {
            check_range("retransmissions", report.retransmissions, *min, *max)?;
        }
        TestAssertion::MaxDurationMs { ms } => {
            if report.duration_ms > *ms {
                bail!("transfer took {} ms, limit was {} ms", report.duration_ms, ms);
            }
        }
    }
    Ok(())
}

fn check_range(what: &str, value: u32, min: u32, max: Option<u32>) -> Result<()> {
    if value < min {
        bail!("{what} = {value}, expected at least {min}");
    }
    if let Some(max) = max
        && value > max
    {
        bail!("{what} = {value}, expected at most {max}");
    }
    Ok(())
}
