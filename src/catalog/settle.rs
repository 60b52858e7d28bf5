use std::time::Duration;

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(3);

/// How to wait for dimensions and measures to become visible before schemas
/// that link to them are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleStrategy {
    /// Sleep once for a fixed duration.
    Fixed(Duration),
    /// Probe every linked resource until all answer 200, sleeping `interval`
    /// between rounds, for at most `max_attempts` rounds.
    Poll {
        interval: Duration,
        max_attempts: u32,
    },
    /// Do not wait.
    Skip,
}

impl Default for SettleStrategy {
    fn default() -> Self {
        SettleStrategy::Fixed(DEFAULT_SETTLE_DELAY)
    }
}
