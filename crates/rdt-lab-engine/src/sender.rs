use crate::channel::UnreliableChannel;
use crate::timer::AckTimer;
use rdt_lab_abstract::{Packet, Reply, SeqBit};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// How often the sender re-checks the ack window while a reply it cannot
/// accept is pending.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Per-unit sender states: dispatch a copy of the outstanding packet, or
/// sit on the last reply until it validates or the ack window runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SenderState {
    AwaitingDispatch,
    AwaitingAck,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SenderStats {
    pub retransmissions: u32,
}

/// Sender side of the alternating-bit protocol.
///
/// Drives the transfer one payload unit at a time: at most one packet is
/// in flight, and the sequence bit toggles only after a reply is
/// accepted for the outstanding packet. Retransmission is triggered by
/// timer expiration alone; an invalid reply with an unexpired window
/// just keeps the sender polling. The channel's guarantee that
/// reliability is strictly positive is what makes this loop terminate;
/// there is no retry ceiling.
pub struct RdtSender {
    sequence: SeqBit,
    timeout: Duration,
    stats: SenderStats,
}

impl RdtSender {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sequence: SeqBit::Zero,
            timeout,
            stats: SenderStats::default(),
        }
    }

    /// Transfer every unit of `message`, in order, retrying each until
    /// its acknowledgment validates.
    pub fn send_all(&mut self, channel: &mut UnreliableChannel, message: &str) {
        let mut timer = AckTimer::new(self.timeout);
        for unit in message.chars() {
            // The original is kept untouched; every attempt dispatches a
            // fresh working copy.
            let original = Packet::new(self.sequence, unit);
            timer.start();
            let mut attempts: u32 = 1;
            let mut reply = channel.transfer(original.clone());
            let mut state = SenderState::AwaitingAck;

            loop {
                state = match state {
                    SenderState::AwaitingDispatch => {
                        timer.stop();
                        timer.start();
                        debug!(
                            "ack window expired, resending seq={} payload={:?}",
                            original.seq, original.payload
                        );
                        self.stats.retransmissions += 1;
                        attempts += 1;
                        reply = channel.transfer(original.clone());
                        SenderState::AwaitingAck
                    }
                    SenderState::AwaitingAck => {
                        if self.accepts(&reply) {
                            break;
                        }
                        if timer.is_expired() {
                            SenderState::AwaitingDispatch
                        } else {
                            // Retry-on-timeout only: an invalid reply by
                            // itself does not trigger a resend.
                            thread::sleep(POLL_INTERVAL);
                            SenderState::AwaitingAck
                        }
                    }
                };
            }

            info!(
                "'{}' seq={} acknowledged after {} attempt(s)",
                original.payload, original.seq, attempts
            );
            self.sequence = self.sequence.flip();
            timer.stop();
        }
    }

    fn accepts(&self, reply: &Reply) -> bool {
        !reply.is_corrupted() && reply.ack == self.sequence
    }

    /// Bit the next outgoing packet will carry.
    pub fn sequence(&self) -> SeqBit {
        self.sequence
    }

    pub fn stats(&self) -> SenderStats {
        self.stats
    }
}
