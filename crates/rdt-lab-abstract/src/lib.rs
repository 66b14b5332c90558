pub mod config;
pub mod packet;
pub mod scenario;

pub use packet::{Packet, Reply, SeqBit, payload_checksum};

pub use config::ChannelConfig;
pub use scenario::{ChannelOverride, TestAction, TestAssertion, TestScenario};
