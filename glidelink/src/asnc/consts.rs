use std::time::Duration;

/// Lines longer than this are split.
pub(crate) const MAX_LINE_LENGTH: usize = 1024;

pub(crate) const WRITE_TIMEOUT: Duration = Duration::from_secs(1);
