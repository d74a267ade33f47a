use crate::core::io::Port;
use crate::core::SlotId;

/// Per-channel context passed to every [`Driver`](super::Driver) operation.
#[derive(Debug)]
pub struct DriverContext<'a> {
    slot: SlotId,
    port: &'a Port,
    primary_baro: bool,
}

impl<'a> DriverContext<'a> {
    /// Creates a context. Useful for testing drivers in isolation.
    pub fn new(slot: SlotId, port: &'a Port, primary_baro: bool) -> Self {
        Self {
            slot,
            port,
            primary_baro,
        }
    }

    /// Slot of the channel.
    #[inline(always)]
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// Outbound port of the channel.
    #[inline(always)]
    pub fn port(&self) -> &'a Port {
        self.port
    }

    /// Returns `true` if this channel is currently the primary barometric altitude source.
    ///
    /// Drivers should write [`NavInfo::baro_altitude`](crate::core::nav::NavInfo::baro_altitude)
    /// only when this is `true`.
    #[inline(always)]
    pub fn is_primary_baro_source(&self) -> bool {
        self.primary_baro
    }
}
