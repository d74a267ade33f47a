use crate::core::device::BaroSources;
use crate::core::SlotId;

/// Events emitted by the device layer.
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceEvent {
    /// Channel has been bound to a driver.
    Bound {
        /// Channel slot.
        slot: SlotId,
        /// Driver name.
        driver: String,
    },
    /// Channel has been unbound.
    Unbound {
        /// Channel slot.
        slot: SlotId,
    },
    /// Channel has been silent for longer than the link timeout.
    LinkTimeout {
        /// Channel slot.
        slot: SlotId,
    },
    /// Driver resolved a link timeout in place.
    Recovered {
        /// Channel slot.
        slot: SlotId,
    },
    /// Channel has been restarted after a failed recovery.
    Restarted {
        /// Channel slot.
        slot: SlotId,
    },
    /// Channel failed to recover and restart. Requires operator attention.
    Failed {
        /// Channel slot.
        slot: SlotId,
        /// Driver name.
        driver: String,
    },
    /// Transport of a channel reported an error.
    TransportFailure {
        /// Channel slot.
        slot: SlotId,
        /// Error description.
        reason: String,
    },
    /// Barometric sources have been re-elected.
    BaroSourcesChanged(BaroSources),
}

impl DeviceEvent {
    /// Slot the event relates to.
    pub fn slot(&self) -> Option<SlotId> {
        match self {
            DeviceEvent::Bound { slot, .. }
            | DeviceEvent::Unbound { slot }
            | DeviceEvent::LinkTimeout { slot }
            | DeviceEvent::Recovered { slot }
            | DeviceEvent::Restarted { slot }
            | DeviceEvent::Failed { slot, .. }
            | DeviceEvent::TransportFailure { slot, .. } => Some(*slot),
            DeviceEvent::BaroSourcesChanged(_) => None,
        }
    }
}
