//! # Glidelink errors
//!
//! All fallible operations return [`Result`] with the crate-level [`Error`].

use crate::core::SlotId;

/// Glidelink result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Glidelink errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying transport I/O error.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// Serial port can't be opened.
    #[cfg(feature = "serial")]
    #[error("serial port error: {0:?}")]
    Serial(#[from] tokio_serial::Error),

    /// Slot index is outside the registry.
    #[error("slot {index} is out of range, registry has {count} slots")]
    InvalidSlot {
        /// Requested slot index.
        index: usize,
        /// Number of slots in the registry.
        count: usize,
    },

    /// Pipe target points to the same channel.
    #[error("{0} can't pipe to itself")]
    SelfPipe(SlotId),

    /// No driver with such name in the catalogue.
    #[error("unknown driver: {0}")]
    UnknownDriver(String),

    /// Driver with such name has been already registered.
    #[error("driver {0} is already registered")]
    DuplicateDriver(String),

    /// Driver rejected opening the channel.
    #[error("driver {driver} failed to open {slot}")]
    OpenFailed {
        /// Channel slot.
        slot: SlotId,
        /// Driver name.
        driver: String,
    },

    /// Command can't be delivered since no channel is bound.
    #[error("no device bound")]
    NoDeviceBound,

    /// Text exceeds the capacity of a bounded field.
    #[error("text of {len} characters exceeds capacity of {capacity}")]
    TextTooLong {
        /// Length of the provided text in characters.
        len: usize,
        /// Maximum allowed length.
        capacity: usize,
    },

    /// Task declaration contains too many waypoints.
    #[error("declaration has {count} waypoints, at most {max} are allowed")]
    TooManyWaypoints {
        /// Provided number of waypoints.
        count: usize,
        /// Maximum number of waypoints.
        max: usize,
    },

    /// Device layer has been shut down.
    #[error("device layer is shut down")]
    Shutdown,
}
