use std::fmt::{Debug, Formatter};
use std::ops::{BitOr, BitOrAssign};

/// Declared ability of a driver.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Provides GPS position.
    Gps,
    /// Flight recorder, accepts task declarations.
    Logger,
    /// Provides airspeed.
    Speed,
    /// Provides vario readings.
    Vario,
    /// Provides barometric altitude.
    BaroAlt,
    /// Provides wind.
    Wind,
    /// Speaks voice messages.
    Voice,
    /// Accepts NMEA output relayed from other devices.
    NmeaOut,
    /// Radio transceiver.
    Radio,
    /// Condor flight simulator.
    Condor,
}

impl Capability {
    /// All capabilities in declaration order.
    pub const ALL: [Capability; 10] = [
        Capability::Gps,
        Capability::Logger,
        Capability::Speed,
        Capability::Vario,
        Capability::BaroAlt,
        Capability::Wind,
        Capability::Voice,
        Capability::NmeaOut,
        Capability::Radio,
        Capability::Condor,
    ];

    #[inline(always)]
    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// Set of [`Capability`] flags.
///
/// ```rust
/// use glidelink::core::driver::{Capabilities, Capability};
///
/// let caps = Capabilities::of(&[Capability::Gps, Capability::BaroAlt]);
///
/// assert!(caps.contains(Capability::BaroAlt));
/// assert!(!caps.contains(Capability::Radio));
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Capabilities(u16);

impl Capabilities {
    /// Empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Creates a set from a list of capabilities.
    pub const fn of(capabilities: &[Capability]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < capabilities.len() {
            bits |= capabilities[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Returns a copy of this set with `capability` added.
    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    /// Returns a copy of this set with `capability` removed.
    pub const fn without(self, capability: Capability) -> Self {
        Self(self.0 & !capability.bit())
    }

    /// Returns `true` if set contains `capability`.
    #[inline(always)]
    pub const fn contains(&self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    /// Returns `true` if set is empty.
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates over capabilities in this set.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL
            .into_iter()
            .filter(|capability| self.contains(*capability))
    }
}

impl From<Capability> for Capabilities {
    fn from(value: Capability) -> Self {
        Self(value.bit())
    }
}

impl BitOr<Capability> for Capabilities {
    type Output = Capabilities;

    fn bitor(self, rhs: Capability) -> Self::Output {
        self.with(rhs)
    }
}

impl BitOr for Capabilities {
    type Output = Capabilities;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign<Capability> for Capabilities {
    fn bitor_assign(&mut self, rhs: Capability) {
        self.0 |= rhs.bit();
    }
}

impl Debug for Capabilities {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
