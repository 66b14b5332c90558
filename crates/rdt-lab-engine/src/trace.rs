use rdt_lab_abstract::ChannelConfig;
use serde::Serialize;

/// A compact textual summary of one link-layer event (send, drop,
/// corruption, delivery), timestamped in milliseconds since the channel
/// was created.
#[derive(Debug, Clone, Serialize)]
pub struct LinkEvent {
    pub time: u64,
    pub description: String,
}

/// Serializable snapshot of a finished transfer.
#[derive(Debug, Clone, Serialize)]
pub struct TransferReport {
    pub config: ChannelConfig,
    pub duration_ms: u64,
    pub delivered: String,
    pub packets_sent: u32,
    pub retransmissions: u32,
    pub link_events: Vec<LinkEvent>,
}
