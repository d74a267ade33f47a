#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use glidelink::core::driver::DriverCatalogue;
use glidelink::core::nav::NavInfo;
use glidelink::prelude::*;

static INIT: Once = Once::new();
const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Debug;

pub fn initialize() {
    INIT.call_once(|| {
        env_logger::builder()
            // Suppress everything below `warn` for third-party modules
            .filter_level(log::LevelFilter::Warn)
            // Allow everything above `LOG_LEVEL` from current package
            .filter_module(env!("CARGO_PKG_NAME"), LOG_LEVEL)
            .is_test(true)
            .init();
    });
}

/// Calls observed by a [`TestDriver`].
#[derive(Debug, Default)]
pub struct Calls {
    pub parses: AtomicUsize,
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub link_timeouts: AtomicUsize,
    pub settings: AtomicUsize,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Tracks parses running at the same time across drivers sharing it.
#[derive(Debug, Default)]
pub struct ParseGate {
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ParseGate {
    fn enter(&self) {
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        // Keep the parse busy long enough for a concurrent one to overlap.
        std::thread::sleep(Duration::from_micros(200));
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Driver which accepts `$TEST,<altitude>` lines and, optionally, settings.
#[derive(Debug)]
pub struct TestDriver {
    name: &'static str,
    capabilities: Capabilities,
    settings: bool,
    recovers: bool,
    reopens: bool,
    calls: Arc<Calls>,
    gate: Option<Arc<ParseGate>>,
}

impl TestDriver {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            capabilities: Capabilities::empty(),
            settings: false,
            recovers: false,
            reopens: true,
            calls: Arc::default(),
            gate: None,
        }
    }

    pub fn baro(mut self) -> Self {
        self.capabilities = self.capabilities.with(Capability::BaroAlt);
        self
    }

    /// Accepts MacCready, bugs and ballast settings by writing them to the port.
    pub fn with_settings(mut self) -> Self {
        self.settings = true;
        self
    }

    /// Recovers from link timeouts in place.
    pub fn recovering(mut self) -> Self {
        self.recovers = true;
        self
    }

    /// Opens once, every following `open` is rejected.
    pub fn fragile(mut self) -> Self {
        self.reopens = false;
        self
    }

    /// Reports every parse to a shared gate.
    pub fn gated(mut self, gate: Arc<ParseGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Arc<Calls> {
        self.calls.clone()
    }

    fn setting(&self, ctx: &DriverContext<'_>, body: String) -> Outcome {
        if !self.settings {
            return Outcome::Unsupported;
        }
        self.calls.settings.fetch_add(1, Ordering::SeqCst);
        ctx.port().write_nmea(&body).into()
    }
}

impl Driver for TestDriver {
    fn name(&self) -> &str {
        self.name
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn parse(&self, ctx: &DriverContext<'_>, line: &str, nav: &mut NavInfo) -> Outcome {
        self.calls.parses.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.enter();
            gate.exit();
        }

        let Some(altitude) = line.strip_prefix("$TEST,") else {
            return Outcome::Rejected;
        };
        let Ok(altitude) = altitude.parse() else {
            return Outcome::Rejected;
        };
        if ctx.is_primary_baro_source() {
            nav.baro_altitude = Some(altitude);
        }
        Outcome::Accepted
    }

    fn put_mac_cready(&self, ctx: &DriverContext<'_>, value: f64) -> Outcome {
        self.setting(ctx, format!("PTMC,{value:.1}"))
    }

    fn put_bugs(&self, ctx: &DriverContext<'_>, value: f64) -> Outcome {
        self.setting(ctx, format!("PTBUG,{value:.2}"))
    }

    fn put_ballast(&self, ctx: &DriverContext<'_>, value: f64) -> Outcome {
        self.setting(ctx, format!("PTBAL,{value:.2}"))
    }

    fn open(&self, _: &DriverContext<'_>) -> Outcome {
        let opened = self.calls.opens.fetch_add(1, Ordering::SeqCst);
        (opened == 0 || self.reopens).into()
    }

    fn close(&self, _: &DriverContext<'_>) -> Outcome {
        self.calls.closes.fetch_add(1, Ordering::SeqCst);
        Outcome::Accepted
    }

    fn on_link_timeout(&self, _: &DriverContext<'_>) -> Outcome {
        self.calls.link_timeouts.fetch_add(1, Ordering::SeqCst);
        if self.recovers {
            Outcome::Accepted
        } else {
            Outcome::Unsupported
        }
    }
}

/// Built-in catalogue extended with test drivers.
pub fn catalogue(drivers: Vec<TestDriver>) -> DriverCatalogue {
    let mut catalogue = DriverCatalogue::builtin();
    for driver in drivers {
        catalogue.register(driver).unwrap();
    }
    catalogue
}
