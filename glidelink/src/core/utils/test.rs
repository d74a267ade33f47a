//! Configurable driver for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::core::declaration::Declaration;
use crate::core::driver::{Capabilities, Capability, Driver, DriverContext, Outcome};
use crate::core::nav::NavInfo;

/// Calls observed by a [`Probe`].
#[derive(Debug, Default)]
pub(crate) struct Counters {
    parses: AtomicUsize,
    opens: AtomicUsize,
    closes: AtomicUsize,
    timeouts: AtomicUsize,
    ticks: AtomicUsize,
    commands: AtomicUsize,
    declarations: AtomicUsize,
}

macro_rules! counter {
    ($($name:ident),*) => {
        impl Counters {
            $(
                pub(crate) fn $name(&self) -> usize {
                    self.$name.load(Ordering::SeqCst)
                }
            )*
        }
    };
}

counter!(parses, opens, closes, timeouts, ticks, commands, declarations);

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

/// Test driver with scripted outcomes.
///
/// Lines starting with `$OK` are accepted, `$ALT,<metres>` is accepted and written into
/// baro altitude when the channel is the primary baro source. Everything else gets the scripted
/// parse outcome.
#[derive(Debug)]
pub(crate) struct Probe {
    name: String,
    capabilities: Capabilities,
    parse: Outcome,
    open: Outcome,
    link_timeout: Outcome,
    commands: Outcome,
    counters: Arc<Counters>,
}

impl Probe {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            capabilities: Capabilities::empty(),
            parse: Outcome::Rejected,
            open: Outcome::Accepted,
            link_timeout: Outcome::Unsupported,
            commands: Outcome::Unsupported,
            counters: Arc::default(),
        }
    }

    pub(crate) fn caps(mut self, capabilities: &[Capability]) -> Self {
        self.capabilities = Capabilities::of(capabilities);
        self
    }

    pub(crate) fn parse_outcome(mut self, outcome: Outcome) -> Self {
        self.parse = outcome;
        self
    }

    pub(crate) fn open_outcome(mut self, outcome: Outcome) -> Self {
        self.open = outcome;
        self
    }

    pub(crate) fn timeout_outcome(mut self, outcome: Outcome) -> Self {
        self.link_timeout = outcome;
        self
    }

    pub(crate) fn command_outcome(mut self, outcome: Outcome) -> Self {
        self.commands = outcome;
        self
    }

    pub(crate) fn counters(&self) -> Arc<Counters> {
        self.counters.clone()
    }

    fn command(&self) -> Outcome {
        bump(&self.counters.commands);
        self.commands
    }
}

impl Driver for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn parse(&self, ctx: &DriverContext<'_>, line: &str, nav: &mut NavInfo) -> Outcome {
        bump(&self.counters.parses);

        if let Some(altitude) = line.strip_prefix("$ALT,") {
            if ctx.is_primary_baro_source() {
                nav.baro_altitude = altitude.parse().ok();
            }
            return Outcome::Accepted;
        }
        if line.starts_with("$OK") {
            return Outcome::Accepted;
        }
        self.parse
    }

    fn put_mac_cready(&self, _: &DriverContext<'_>, _: f64) -> Outcome {
        self.command()
    }

    fn put_bugs(&self, _: &DriverContext<'_>, _: f64) -> Outcome {
        self.command()
    }

    fn put_ballast(&self, _: &DriverContext<'_>, _: f64) -> Outcome {
        self.command()
    }

    fn put_qnh(&self, _: &DriverContext<'_>, _: f64) -> Outcome {
        self.command()
    }

    fn open(&self, _: &DriverContext<'_>) -> Outcome {
        bump(&self.counters.opens);
        self.open
    }

    fn close(&self, _: &DriverContext<'_>) -> Outcome {
        bump(&self.counters.closes);
        Outcome::Accepted
    }

    fn on_link_timeout(&self, _: &DriverContext<'_>) -> Outcome {
        bump(&self.counters.timeouts);
        self.link_timeout
    }

    fn declare_task(&self, _: &DriverContext<'_>, _: &Declaration) -> Outcome {
        bump(&self.counters.declarations);
        if self.is_logger() {
            Outcome::Accepted
        } else {
            Outcome::Unsupported
        }
    }

    fn on_sys_tick(&self, _: &DriverContext<'_>) -> Outcome {
        bump(&self.counters.ticks);
        Outcome::Accepted
    }
}
