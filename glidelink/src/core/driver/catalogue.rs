use std::sync::Arc;

use crate::core::driver::Driver;
use crate::drivers::{Generic, Lx};

use crate::prelude::*;

/// Name-indexed catalogue of available drivers.
///
/// Built once at startup and handed over to [`Devices`](crate::core::Devices). Names are unique,
/// registration order is preserved for display purposes.
///
/// The catalogue may also designate a fallback driver. When the bound driver of a GPS-capable
/// channel does not recognise a line, the router offers the line to the fallback, which usually
/// understands standard NMEA sentences.
#[derive(Clone, Debug, Default)]
pub struct DriverCatalogue {
    drivers: Vec<Arc<dyn Driver>>,
    fallback: Option<Arc<dyn Driver>>,
}

impl DriverCatalogue {
    /// Creates an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalogue with built-in [`drivers`](crate::drivers).
    ///
    /// [`Generic`] is registered as the fallback driver.
    pub fn builtin() -> Self {
        let generic: Arc<dyn Driver> = Arc::new(Generic);

        Self {
            drivers: vec![
                generic.clone(),
                Arc::new(Lx::lx()),
                Arc::new(Lx::gps_only()),
                Arc::new(Lx::condor()),
            ],
            fallback: Some(generic),
        }
    }

    /// Registers a driver.
    ///
    /// Fails with [`Error::DuplicateDriver`] if a driver with the same name already exists.
    pub fn register(&mut self, driver: impl Driver + 'static) -> Result<()> {
        self.register_shared(Arc::new(driver))
    }

    /// Registers a shared driver.
    pub fn register_shared(&mut self, driver: Arc<dyn Driver>) -> Result<()> {
        if self.get(driver.name()).is_some() {
            return Err(Error::DuplicateDriver(driver.name().to_string()));
        }
        log::trace!("registered driver {}", driver.name());
        self.drivers.push(driver);
        Ok(())
    }

    /// Designates a registered driver as fallback parser.
    pub fn set_fallback(&mut self, name: &str) -> Result<()> {
        let driver = self
            .get(name)
            .ok_or_else(|| Error::UnknownDriver(name.to_string()))?;
        self.fallback = Some(driver.clone());
        Ok(())
    }

    /// Removes fallback parser.
    pub fn clear_fallback(&mut self) {
        self.fallback = None;
    }

    /// Fallback parser, if any.
    pub fn fallback(&self) -> Option<&Arc<dyn Driver>> {
        self.fallback.as_ref()
    }

    /// Looks up a driver by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Driver>> {
        self.drivers.iter().find(|driver| driver.name() == name)
    }

    /// Name of the driver registered at `index`.
    pub fn driver_name(&self, index: usize) -> Option<&str> {
        self.drivers.get(index).map(|driver| driver.name())
    }

    /// Iterates over driver names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.drivers.iter().map(|driver| driver.name())
    }

    /// Number of registered drivers.
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    /// Returns `true` if catalogue has no drivers.
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}
