use rdt_lab_abstract::{Packet, Reply, SeqBit};
use tracing::debug;

/// Receiver side of the alternating-bit protocol.
///
/// Validates integrity and sequencing of incoming packets, appends
/// accepted payload to the delivery buffer, and acknowledges every
/// packet it sees; a duplicate is re-acknowledged but never delivered
/// twice.
#[derive(Debug, Default)]
pub struct RdtReceiver {
    expected: SeqBit,
    buffer: Vec<char>,
}

impl RdtReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn receive(&mut self, packet: &Packet) -> Reply {
        if packet.is_corrupted() || packet.seq != self.expected {
            debug!(
                "rejecting packet seq={} (corrupted={}, expected={})",
                packet.seq,
                packet.is_corrupted(),
                self.expected
            );
            // Re-ack the last accepted bit. For a fresh unit this fails
            // the sender's match test; for a retransmission whose ack
            // was lost it lets the sender advance.
            return Reply::new(self.expected.flip());
        }

        debug!("delivering '{}' seq={}", packet.payload, packet.seq);
        self.buffer.push(packet.payload);
        let acked = packet.seq;
        self.expected = self.expected.flip();
        Reply::new(acked)
    }

    /// Bit the receiver expects on the next new packet.
    pub fn expected_seq(&self) -> SeqBit {
        self.expected
    }

    pub fn delivered(&self) -> &[char] {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdt_lab_abstract::Packet;

    #[test]
    fn accepts_in_order_packets() {
        let mut receiver = RdtReceiver::new();

        let reply = receiver.receive(&Packet::new(SeqBit::Zero, 'A'));
        assert!(!reply.is_corrupted());
        assert_eq!(reply.ack, SeqBit::Zero);

        let reply = receiver.receive(&Packet::new(SeqBit::One, 'B'));
        assert_eq!(reply.ack, SeqBit::One);

        assert_eq!(receiver.delivered(), ['A', 'B']);
        assert_eq!(receiver.expected_seq(), SeqBit::Zero);
    }

    #[test]
    fn duplicate_is_reacked_but_not_redelivered() {
        let mut receiver = RdtReceiver::new();
        let packet = Packet::new(SeqBit::Zero, 'A');

        let first = receiver.receive(&packet);
        let second = receiver.receive(&packet);

        // Both replies are well-formed positive acks for bit 0.
        assert!(!first.is_corrupted());
        assert!(!second.is_corrupted());
        assert_eq!(first.ack, SeqBit::Zero);
        assert_eq!(second.ack, SeqBit::Zero);

        assert_eq!(receiver.delivered(), ['A'], "duplicate must not be delivered twice");
        assert_eq!(receiver.expected_seq(), SeqBit::One);
    }

    #[test]
    fn corrupted_packet_is_never_accepted() {
        let mut receiver = RdtReceiver::new();
        let mut packet = Packet::new(SeqBit::Zero, 'A');
        packet.checksum = !packet.checksum;

        let reply = receiver.receive(&packet);

        assert!(receiver.delivered().is_empty());
        assert_eq!(receiver.expected_seq(), SeqBit::Zero);
        // The reply itself is well-formed but acks the wrong bit.
        assert!(!reply.is_corrupted());
        assert_ne!(reply.ack, SeqBit::Zero);
    }

    #[test]
    fn clear_resets_the_buffer_only() {
        let mut receiver = RdtReceiver::new();
        receiver.receive(&Packet::new(SeqBit::Zero, 'A'));
        receiver.clear();
        assert!(receiver.delivered().is_empty());
        assert_eq!(receiver.expected_seq(), SeqBit::One);
    }
}
