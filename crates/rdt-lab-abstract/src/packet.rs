use serde::{Deserialize, Serialize};
use std::fmt;

/// The alternating sequence bit of the stop-and-wait protocol.
///
/// Only two values exist; successive payload units toggle between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeqBit {
    #[default]
    Zero,
    One,
}

impl SeqBit {
    pub fn flip(self) -> Self {
        match self {
            SeqBit::Zero => SeqBit::One,
            SeqBit::One => SeqBit::Zero,
        }
    }

    /// Numeric form, used as the checksum a well-formed reply must echo.
    pub fn code(self) -> u32 {
        match self {
            SeqBit::Zero => 0,
            SeqBit::One => 1,
        }
    }
}

impl fmt::Display for SeqBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Checksum over one payload unit: the unit's ordinal code.
/// Sender and receiver must use the same function for corruption
/// detection to work; collisions are acceptable for a lab channel.
pub fn payload_checksum(data: char) -> u32 {
    data as u32
}

/// One unit of data-bearing traffic, sender to receiver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Packet {
    pub seq: SeqBit,
    pub payload: char,
    pub checksum: u32,
}

impl Packet {
    pub fn new(seq: SeqBit, payload: char) -> Self {
        Self {
            seq,
            payload,
            checksum: payload_checksum(payload),
        }
    }

    /// Recompute the checksum over the payload and compare with the
    /// carried value.
    pub fn is_corrupted(&self) -> bool {
        payload_checksum(self.payload) != self.checksum
    }
}

/// The receiver's acknowledgment, receiver to sender.
///
/// A well-formed reply carries `checksum == ack.code()`, so corrupting
/// either field makes it fail validation on the sender side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reply {
    pub ack: SeqBit,
    pub checksum: u32,
}

impl Reply {
    pub fn new(ack: SeqBit) -> Self {
        Self {
            ack,
            checksum: ack.code(),
        }
    }

    /// The stand-in a channel returns for a lost transmission: the ack
    /// bit cannot match `seq` and the checksum fails validation, so the
    /// sender treats it exactly like a corrupted acknowledgment.
    pub fn garbled(seq: SeqBit) -> Self {
        let ack = seq.flip();
        Self {
            ack,
            checksum: !ack.code(),
        }
    }

    pub fn is_corrupted(&self) -> bool {
        self.checksum != self.ack.code()
    }
}
