use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fault model of one channel instance. Immutable once the channel is
/// built; construct a fresh channel (and receiver) per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Per-transmission delivery probability, in (0, 1]. Applies
    /// independently to the forward packet and the returned reply.
    pub reliability: f64,
    /// Latency added to every `transfer` call before it returns.
    pub delay: Duration,
    /// Allow the channel to corrupt data packets in transit.
    pub corrupt_packet: bool,
    /// Allow the channel to corrupt acknowledgments in transit.
    pub corrupt_ack: bool,
    /// RNG seed for reproducible fault sequences; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            reliability: 1.0,
            delay: Duration::ZERO,
            corrupt_packet: true,
            corrupt_ack: true,
            seed: None,
        }
    }
}
