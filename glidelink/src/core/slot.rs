use std::fmt::{Display, Formatter};

/// Position of a channel in the device registry.
///
/// Slot identifiers are stable: a channel keeps its slot across rebinding. Any [`SlotId`] can be
/// constructed, but every registry operation checks it against the actual number of slots and
/// returns [`Error::InvalidSlot`](crate::error::Error::InvalidSlot) when it is out of range.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(usize);

impl SlotId {
    /// Creates a slot identifier from a registry index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Registry index of this slot.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for SlotId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl Display for SlotId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "slot #{}", self.0)
    }
}
