use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A reliability of zero (or worse) would make forward progress
    /// impossible; reject it before the channel is ever used.
    #[error("channel reliability must be within (0, 1], got {0}")]
    ReliabilityOutOfRange(f64),
}
