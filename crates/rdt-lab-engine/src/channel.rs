use crate::error::EngineError;
use crate::receiver::RdtReceiver;
use crate::trace::LinkEvent;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rdt_lab_abstract::{ChannelConfig, Packet, Reply};
use std::thread;
use std::time::Instant;
use tracing::debug;

/// The simulated unreliable link between sender and receiver.
///
/// Owns the receiver: a `transfer` carries the packet across the forward
/// leg, collects the receiver's reply, and carries it back, rolling loss
/// and corruption independently on each leg. A drop never raises and
/// never blocks the sender forever: the call returns a garbled reply
/// that fails the sender's validation just like a corrupted ack, which
/// is what lets the retry loop make progress from its own ack checks
/// plus the timer alone.
pub struct UnreliableChannel {
    config: ChannelConfig,
    rng: StdRng,
    receiver: RdtReceiver,
    origin: Instant,
    packets_sent: u32,
    link_events: Vec<LinkEvent>,
    // One-shot forced faults, consumed before any RNG roll. Scenario and
    // test hooks; a forced fault does not advance the seeded sequence.
    forced_packet_drops: u32,
    forced_reply_drops: u32,
    forced_packet_corruptions: u32,
    forced_ack_corruptions: u32,
}

impl UnreliableChannel {
    pub fn new(config: ChannelConfig, receiver: RdtReceiver) -> Result<Self, EngineError> {
        // The open bound rejects zero and NaN alike: either would let
        // the sender retry forever with no possible clean round trip.
        if !(config.reliability > 0.0 && config.reliability <= 1.0) {
            return Err(EngineError::ReliabilityOutOfRange(config.reliability));
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            config,
            rng,
            receiver,
            origin: Instant::now(),
            packets_sent: 0,
            link_events: Vec::new(),
            forced_packet_drops: 0,
            forced_reply_drops: 0,
            forced_packet_corruptions: 0,
            forced_ack_corruptions: 0,
        })
    }

    /// Carry one packet to the receiver and its acknowledgment back.
    pub fn transfer(&mut self, mut packet: Packet) -> Reply {
        self.packets_sent += 1;
        let seq = packet.seq;

        let forward_lost = self.take_forced(Forced::PacketDrop) || self.roll_lost();
        let mut reply = if forward_lost {
            self.record(format!("[Sender->Receiver] DROP seq={seq}"));
            debug!("packet seq={seq} lost in channel");
            Reply::garbled(seq)
        } else {
            if self.config.corrupt_packet
                && (self.take_forced(Forced::PacketCorruption) || self.roll_corrupt())
            {
                packet.checksum = !packet.checksum;
                self.record(format!("[Sender->Receiver] CORRUPT seq={seq}"));
                debug!("packet seq={seq} corrupted in channel");
            }
            self.record(format!(
                "[Sender->Receiver] SEND seq={seq} payload={:?}",
                packet.payload
            ));
            self.receiver.receive(&packet)
        };

        // The return leg only exists when the receiver actually replied.
        if !forward_lost {
            if self.take_forced(Forced::ReplyDrop) || self.roll_lost() {
                self.record(format!("[Receiver->Sender] DROP ack={}", reply.ack));
                debug!("reply ack={} lost in channel", reply.ack);
                reply = Reply::garbled(seq);
            } else {
                if self.config.corrupt_ack
                    && (self.take_forced(Forced::AckCorruption) || self.roll_corrupt())
                {
                    reply.checksum = !reply.checksum;
                    self.record(format!("[Receiver->Sender] CORRUPT ack={}", reply.ack));
                    debug!("reply ack={} corrupted in channel", reply.ack);
                }
                self.record(format!("[Receiver->Sender] SEND ack={}", reply.ack));
            }
        }

        if !self.config.delay.is_zero() {
            thread::sleep(self.config.delay);
        }
        reply
    }

    /// Force the next data packet to be dropped on the forward leg.
    pub fn inject_packet_drop(&mut self) {
        self.forced_packet_drops += 1;
    }

    /// Force the next acknowledgment to be dropped on the return leg.
    pub fn inject_reply_drop(&mut self) {
        self.forced_reply_drops += 1;
    }

    /// Force the next surviving data packet to be corrupted in transit.
    pub fn inject_packet_corruption(&mut self) {
        self.forced_packet_corruptions += 1;
    }

    /// Force the next surviving acknowledgment to be corrupted in transit.
    pub fn inject_ack_corruption(&mut self) {
        self.forced_ack_corruptions += 1;
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn receiver(&self) -> &RdtReceiver {
        &self.receiver
    }

    pub fn receiver_mut(&mut self) -> &mut RdtReceiver {
        &mut self.receiver
    }

    /// Number of transfers attempted so far, retransmissions included.
    pub fn packets_sent(&self) -> u32 {
        self.packets_sent
    }

    pub fn link_events(&self) -> &[LinkEvent] {
        &self.link_events
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn take_forced(&mut self, kind: Forced) -> bool {
        let counter = match kind {
            Forced::PacketDrop => &mut self.forced_packet_drops,
            Forced::ReplyDrop => &mut self.forced_reply_drops,
            Forced::PacketCorruption => &mut self.forced_packet_corruptions,
            Forced::AckCorruption => &mut self.forced_ack_corruptions,
        };
        if *counter > 0 {
            *counter -= 1;
            true
        } else {
            false
        }
    }

    fn roll_lost(&mut self) -> bool {
        self.rng.random::<f64>() >= self.config.reliability
    }

    // Corruption chance mirrors the loss chance: the less reliable the
    // link, the more it mangles what it does deliver.
    fn roll_corrupt(&mut self) -> bool {
        self.rng.random::<f64>() >= self.config.reliability
    }

    fn record(&mut self, description: String) {
        self.link_events.push(LinkEvent {
            time: self.elapsed_ms(),
            description,
        });
    }
}

#[derive(Clone, Copy)]
enum Forced {
    PacketDrop,
    ReplyDrop,
    PacketCorruption,
    AckCorruption,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdt_lab_abstract::SeqBit;
    use std::time::Duration;

    fn perfect_config() -> ChannelConfig {
        ChannelConfig {
            reliability: 1.0,
            delay: Duration::ZERO,
            corrupt_packet: false,
            corrupt_ack: false,
            seed: Some(7),
        }
    }

    fn perfect_channel() -> UnreliableChannel {
        UnreliableChannel::new(perfect_config(), RdtReceiver::new()).unwrap()
    }

    #[test]
    fn rejects_reliability_outside_unit_interval() {
        for bad in [0.0, -0.3, 1.5, f64::NAN] {
            let config = ChannelConfig {
                reliability: bad,
                ..perfect_config()
            };
            assert!(
                UnreliableChannel::new(config, RdtReceiver::new()).is_err(),
                "reliability {bad} should be rejected"
            );
        }
    }

    #[test]
    fn perfect_channel_is_a_pass_through() {
        let mut channel = perfect_channel();

        let reply = channel.transfer(Packet::new(SeqBit::Zero, 'A'));
        assert!(!reply.is_corrupted());
        assert_eq!(reply.ack, SeqBit::Zero);

        let reply = channel.transfer(Packet::new(SeqBit::One, 'B'));
        assert_eq!(reply.ack, SeqBit::One);

        assert_eq!(channel.receiver().delivered(), ['A', 'B']);
        assert_eq!(channel.packets_sent(), 2);
    }

    #[test]
    fn forced_packet_drop_yields_garbled_reply() {
        let mut channel = perfect_channel();
        channel.inject_packet_drop();

        let reply = channel.transfer(Packet::new(SeqBit::Zero, 'A'));

        assert!(reply.is_corrupted());
        assert_ne!(reply.ack, SeqBit::Zero);
        assert!(
            channel.receiver().delivered().is_empty(),
            "a dropped packet must never reach the receiver"
        );
    }

    #[test]
    fn forced_reply_drop_yields_garbled_reply_after_delivery() {
        let mut channel = perfect_channel();
        channel.inject_reply_drop();

        let reply = channel.transfer(Packet::new(SeqBit::Zero, 'A'));

        // Delivered on the forward leg, lost on the way back.
        assert!(reply.is_corrupted());
        assert_eq!(channel.receiver().delivered(), ['A']);
    }

    #[test]
    fn forced_packet_corruption_is_rejected_by_receiver() {
        let config = ChannelConfig {
            corrupt_packet: true,
            ..perfect_config()
        };
        let mut channel = UnreliableChannel::new(config, RdtReceiver::new()).unwrap();
        channel.inject_packet_corruption();

        let reply = channel.transfer(Packet::new(SeqBit::Zero, 'A'));

        assert!(channel.receiver().delivered().is_empty());
        // The receiver's negative ack is well-formed but mismatched.
        assert!(!reply.is_corrupted());
        assert_ne!(reply.ack, SeqBit::Zero);
    }

    #[test]
    fn forced_ack_corruption_fails_validation() {
        let config = ChannelConfig {
            corrupt_ack: true,
            ..perfect_config()
        };
        let mut channel = UnreliableChannel::new(config, RdtReceiver::new()).unwrap();
        channel.inject_ack_corruption();

        let reply = channel.transfer(Packet::new(SeqBit::Zero, 'A'));

        assert_eq!(channel.receiver().delivered(), ['A']);
        assert!(reply.is_corrupted());
    }

    #[test]
    fn delay_holds_the_call() {
        let config = ChannelConfig {
            delay: Duration::from_millis(20),
            ..perfect_config()
        };
        let mut channel = UnreliableChannel::new(config, RdtReceiver::new()).unwrap();

        let before = Instant::now();
        channel.transfer(Packet::new(SeqBit::Zero, 'A'));
        assert!(before.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn link_events_are_recorded() {
        let mut channel = perfect_channel();
        channel.transfer(Packet::new(SeqBit::Zero, 'A'));
        let descriptions: Vec<_> = channel
            .link_events()
            .iter()
            .map(|e| e.description.as_str())
            .collect();
        assert!(descriptions.iter().any(|d| d.contains("SEND seq=0")));
        assert!(descriptions.iter().any(|d| d.contains("SEND ack=0")));
    }
}
