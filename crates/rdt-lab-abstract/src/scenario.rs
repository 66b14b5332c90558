use crate::config::ChannelConfig;
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize, Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub description: String,
    pub config: ChannelOverride,
    pub actions: Vec<TestAction>,
    pub assertions: Vec<TestAssertion>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ChannelOverride {
    pub reliability: Option<f64>,
    pub delay_ms: Option<u64>,
    pub corrupt_packet: Option<bool>,
    pub corrupt_ack: Option<bool>,
    pub seed: Option<u64>,
    /// Sender-side ack window, not a channel knob, but scenarios need to
    /// shorten it to keep fault runs fast.
    pub timeout_ms: Option<u64>,
}

impl ChannelOverride {
    pub fn apply_to(&self, config: &mut ChannelConfig) {
        if let Some(v) = self.reliability {
            config.reliability = v;
        }
        if let Some(v) = self.delay_ms {
            config.delay = Duration::from_millis(v);
        }
        if let Some(v) = self.corrupt_packet {
            config.corrupt_packet = v;
        }
        if let Some(v) = self.corrupt_ack {
            config.corrupt_ack = v;
        }
        if let Some(v) = self.seed {
            config.seed = Some(v);
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestAction {
    /// Transfer a message through the channel.
    SendMessage { data: String },
    /// Deterministically drop the next data packet on the forward leg.
    DropNextPacket,
    /// Deterministically drop the next acknowledgment on the return leg.
    DropNextReply,
    /// Deterministically corrupt the next data packet in transit.
    CorruptNextPacket,
    /// Deterministically corrupt the next acknowledgment in transit.
    CorruptNextAck,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestAssertion {
    /// Assert the exact content of the receiver's delivery buffer.
    Delivered { data: String },
    /// Assert that the number of packets put on the channel is within range.
    PacketCount { min: u32, max: Option<u32> },
    /// Assert that the number of retransmissions is within range.
    Retransmissions { min: u32, max: Option<u32> },
    /// Assert that the transfer finished within time.
    MaxDurationMs { ms: u64 },
}
