use crate::channel::UnreliableChannel;
use crate::error::EngineError;
use crate::receiver::RdtReceiver;
use crate::sender::RdtSender;
use crate::trace::TransferReport;
use rdt_lab_abstract::ChannelConfig;
use std::time::Duration;

/// One complete run of the engine: a sender and a channel (which owns
/// the receiver), wired together for the harness. Build a fresh session
/// per run so no sequence state leaks across transfers.
pub struct TransferSession {
    sender: RdtSender,
    channel: UnreliableChannel,
}

impl TransferSession {
    pub fn new(config: ChannelConfig, timeout: Duration) -> Result<Self, EngineError> {
        let channel = UnreliableChannel::new(config, RdtReceiver::new())?;
        Ok(Self {
            sender: RdtSender::new(timeout),
            channel,
        })
    }

    /// Transfer `message` through the channel; returns once every unit
    /// has been acknowledged.
    pub fn run(&mut self, message: &str) {
        self.sender.send_all(&mut self.channel, message);
    }

    /// Contents of the receiver's delivery buffer.
    pub fn delivered(&self) -> String {
        self.channel.receiver().delivered().iter().collect()
    }

    pub fn clear_delivered(&mut self) {
        self.channel.receiver_mut().clear();
    }

    pub fn inject_packet_drop(&mut self) {
        self.channel.inject_packet_drop();
    }

    pub fn inject_reply_drop(&mut self) {
        self.channel.inject_reply_drop();
    }

    pub fn inject_packet_corruption(&mut self) {
        self.channel.inject_packet_corruption();
    }

    pub fn inject_ack_corruption(&mut self) {
        self.channel.inject_ack_corruption();
    }

    pub fn report(&self) -> TransferReport {
        TransferReport {
            config: self.channel.config().clone(),
            duration_ms: self.channel.elapsed_ms(),
            delivered: self.delivered(),
            packets_sent: self.channel.packets_sent(),
            retransmissions: self.sender.stats().retransmissions,
            link_events: self.channel.link_events().to_vec(),
        }
    }
}
