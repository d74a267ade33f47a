use std::time::Duration;

/// <sup>[`serde`](https://serde.rs)</sup>
/// Reconnect strategy for a transport.
///
/// When a transport fails and can be repaired, it is reconnected according to this strategy.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Retry {
    /// Never reconnect (default value).
    #[default]
    Never,
    /// Always try to reconnect with a specified interval.
    Always(
        /// Interval between attempts.
        Duration,
    ),
    /// Perform several reconnect attempts with a specified interval.
    Attempts(
        /// Number of attempts.
        usize,
        /// Interval between attempts.
        Duration,
    ),
}

impl Retry {
    /// Delay before reconnect attempt number `attempt` (starting from zero).
    ///
    /// Returns `None` when no more attempts are allowed.
    pub fn delay(&self, attempt: usize) -> Option<Duration> {
        match *self {
            Retry::Never => None,
            Retry::Always(interval) => Some(interval),
            Retry::Attempts(attempts, interval) if attempt < attempts => Some(interval),
            Retry::Attempts(..) => None,
        }
    }
}
