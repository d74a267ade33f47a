//! # Common constants

use std::time::Duration;

/// Number of device slots in a registry unless configured otherwise.
pub const NUM_DEVICES: usize = 2;

/// Maximum length of a channel display name.
pub const DEVICE_NAME_CAPACITY: usize = 32;

/// Maximum length of a pilot name in a task declaration.
pub const PILOT_NAME_CAPACITY: usize = 64;

/// Maximum length of aircraft type and registration in a task declaration.
pub const AIRCRAFT_FIELD_CAPACITY: usize = 32;

/// Maximum number of waypoints in a task declaration.
pub const MAX_TASK_POINTS: usize = 10;

/// Default silence interval after which a link is considered timed out.
pub const DEFAULT_LINK_TIMEOUT: Duration = Duration::from_secs(10);

/// Default capacity of the device events channel.
pub const DEFAULT_EVENTS_CAPACITY: usize = 256;

/// Capacity of an outbound port queue.
///
/// Writes to a full queue are rejected rather than blocking the caller.
pub const PORT_QUEUE_CAPACITY: usize = 64;

/// Default interval between health monitor ticks of the asynchronous device manager.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
