use std::path::PathBuf;
use std::time::Duration;

use crate::consts::{
    DEFAULT_EVENTS_CAPACITY, DEFAULT_LINK_TIMEOUT, DEVICE_NAME_CAPACITY, NUM_DEVICES,
};
use crate::core::utils::BoundedText;
use crate::core::SlotId;

use crate::prelude::*;

/// Device registry configuration.
///
/// Instantiated through [`DevicesConf::builder`] or [`Default`].
#[derive(Clone, Debug)]
pub struct DevicesConf {
    pub(crate) slot_count: usize,
    pub(crate) link_timeout: Duration,
    pub(crate) events_capacity: usize,
}

impl DevicesConf {
    /// Creates a [`DevicesConfBuilder`] populated with default values.
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use glidelink::core::DevicesConf;
    ///
    /// let conf = DevicesConf::builder()
    ///     .link_timeout(Duration::from_secs(5))
    ///     .build();
    ///
    /// assert_eq!(conf.slot_count(), 2);
    /// assert_eq!(conf.link_timeout(), Duration::from_secs(5));
    /// ```
    pub fn builder() -> DevicesConfBuilder {
        DevicesConfBuilder {
            conf: Self::default(),
        }
    }

    /// Number of device slots.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Silence interval after which a link is considered timed out.
    pub fn link_timeout(&self) -> Duration {
        self.link_timeout
    }

    /// Capacity of the events channel.
    pub fn events_capacity(&self) -> usize {
        self.events_capacity
    }
}

impl Default for DevicesConf {
    fn default() -> Self {
        Self {
            slot_count: NUM_DEVICES,
            link_timeout: DEFAULT_LINK_TIMEOUT,
            events_capacity: DEFAULT_EVENTS_CAPACITY,
        }
    }
}

/// Builder for [`DevicesConf`].
#[derive(Clone, Debug)]
pub struct DevicesConfBuilder {
    conf: DevicesConf,
}

impl DevicesConfBuilder {
    /// Sets number of device slots.
    pub fn slot_count(mut self, slot_count: usize) -> Self {
        self.conf.slot_count = slot_count;
        self
    }

    /// Sets link timeout.
    pub fn link_timeout(mut self, link_timeout: Duration) -> Self {
        self.conf.link_timeout = link_timeout;
        self
    }

    /// Sets capacity of the events channel. Zero is bumped to one.
    pub fn events_capacity(mut self, events_capacity: usize) -> Self {
        self.conf.events_capacity = events_capacity.max(1);
        self
    }

    /// Builds configuration.
    pub fn build(self) -> DevicesConf {
        self.conf
    }
}

/// Binding of a channel to a driver.
///
/// ```rust
/// use glidelink::core::{Binding, SlotId};
///
/// let binding = Binding::new("LX")
///     .display_name("Vario").unwrap()
///     .pipe_to(SlotId::new(1));
///
/// assert_eq!(binding.driver_name(), "LX");
/// assert_eq!(binding.get_display_name(), Some("Vario"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub(crate) driver: String,
    pub(crate) display_name: Option<BoundedText<DEVICE_NAME_CAPACITY>>,
    pub(crate) pipe_to: Option<SlotId>,
    pub(crate) traffic_log: Option<PathBuf>,
}

impl Binding {
    /// Creates a binding to a driver by its name.
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            display_name: None,
            pipe_to: None,
            traffic_log: None,
        }
    }

    /// Sets operator-facing name. By default channel is named after its driver.
    pub fn display_name(mut self, name: &str) -> Result<Self> {
        self.display_name = Some(BoundedText::new(name)?);
        Ok(self)
    }

    /// Relays every received line to another channel.
    pub fn pipe_to(mut self, slot: SlotId) -> Self {
        self.pipe_to = Some(slot);
        self
    }

    /// Logs raw received traffic into a file.
    ///
    /// Channels bound through the asynchronous manager are logged by their link task instead of
    /// the registry.
    pub fn traffic_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.traffic_log = Some(path.into());
        self
    }

    /// Driver name.
    pub fn driver_name(&self) -> &str {
        &self.driver
    }

    /// Operator-facing name, if set.
    pub fn get_display_name(&self) -> Option<&str> {
        self.display_name.as_ref().map(|name| name.as_str())
    }

    /// Relay target, if set.
    pub fn get_pipe_to(&self) -> Option<SlotId> {
        self.pipe_to
    }
}
