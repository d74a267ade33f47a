use crate::core::device::Channel;
use crate::core::SlotId;

/// Authoritative barometric altitude sources.
///
/// Derived from channel bindings: the first operational channel (in slot order) whose driver
/// reports [`is_baro_source`](crate::core::driver::Driver::is_baro_source) is primary, the next
/// one is secondary. Both pointers always reference distinct, currently bound, baro-capable
/// channels.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BaroSources {
    pub(super) primary: Option<SlotId>,
    pub(super) secondary: Option<SlotId>,
}

impl BaroSources {
    /// Primary baro source.
    #[inline(always)]
    pub fn primary(&self) -> Option<SlotId> {
        self.primary
    }

    /// Secondary baro source.
    #[inline(always)]
    pub fn secondary(&self) -> Option<SlotId> {
        self.secondary
    }

    /// Returns `true` if there is a primary baro source.
    #[inline(always)]
    pub fn is_available(&self) -> bool {
        self.primary.is_some()
    }

    /// Returns `true` if `slot` is the primary baro source.
    #[inline(always)]
    pub fn is_primary(&self, slot: SlotId) -> bool {
        self.primary == Some(slot)
    }

    pub(super) fn elect(channels: &[Channel]) -> Self {
        let mut candidates = channels
            .iter()
            .filter(|channel| channel.is_operational() && channel.is_baro_source())
            .map(|channel| channel.slot());

        Self {
            primary: candidates.next(),
            secondary: candidates.next(),
        }
    }
}
